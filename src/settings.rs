//! Per-call export settings.
//!
//! Settings arrive as camelCase JSON from the calling layer. Every field has a
//! default, so `{}` is a valid settings document.

use serde::Deserialize;

/// Default activity-id prefix for xAPI and cmi5 packages.
pub const DEFAULT_ACTIVITY_ID_PREFIX: &str = "https://courses.example.org/activities";

/// Settings for one export call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub scorm: ScormSettings,
    pub xapi: XapiSettings,
    pub packaging: PackagingSettings,
}

/// SCORM schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ScormVersion {
    #[serde(rename = "1.2")]
    V1_2,
    #[serde(rename = "2004")]
    V2004,
}

/// Whether attempts count toward credit in the host LMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreditMode {
    #[default]
    Credit,
    NoCredit,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScormSettings {
    /// Requested schema version. The registry format decides; a mismatch is
    /// reported as a warning.
    pub version: Option<ScormVersion>,
    /// Passing score in percent (0-100).
    pub passing_score: u8,
    /// Time limit in minutes.
    pub time_limit: Option<u32>,
    pub allow_review: bool,
    pub credit: CreditMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XapiSettings {
    pub activity_id_prefix: String,
    pub verbose_tracking: bool,
    /// Fallback LRS endpoint used when the launch URL supplies none.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackagingSettings {
    pub compress: bool,
    /// Deflate level (0-9).
    pub compression_level: u32,
}

impl Default for ScormSettings {
    fn default() -> Self {
        Self {
            version: None,
            passing_score: 80,
            time_limit: None,
            allow_review: true,
            credit: CreditMode::Credit,
        }
    }
}

impl Default for XapiSettings {
    fn default() -> Self {
        Self {
            activity_id_prefix: DEFAULT_ACTIVITY_ID_PREFIX.to_string(),
            verbose_tracking: false,
            endpoint: None,
        }
    }
}

impl Default for PackagingSettings {
    fn default() -> Self {
        Self {
            compress: true,
            compression_level: 6,
        }
    }
}

impl ExportSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_passing_score(mut self, score: u8) -> Self {
        self.scorm.passing_score = score;
        self
    }

    pub fn with_time_limit(mut self, minutes: u32) -> Self {
        self.scorm.time_limit = Some(minutes);
        self
    }

    pub fn with_activity_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.xapi.activity_id_prefix = prefix.into();
        self
    }

    pub fn with_verbose_tracking(mut self, verbose: bool) -> Self {
        self.xapi.verbose_tracking = verbose;
        self
    }

    pub fn with_compression(mut self, compress: bool, level: u32) -> Self {
        self.packaging.compress = compress;
        self.packaging.compression_level = level;
        self
    }
}

impl ScormVersion {
    /// Value of the manifest's `<schemaversion>` element.
    pub fn schema_version(self) -> &'static str {
        match self {
            ScormVersion::V1_2 => "1.2",
            ScormVersion::V2004 => "2004 4th Edition",
        }
    }

    /// Short label used in file names and logs.
    pub fn label(self) -> &'static str {
        match self {
            ScormVersion::V1_2 => "1.2",
            ScormVersion::V2004 => "2004",
        }
    }
}

impl CreditMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CreditMode::Credit => "credit",
            CreditMode::NoCredit => "no-credit",
        }
    }
}

impl ScormSettings {
    /// Passing score as a 0.0-1.0 fraction.
    pub fn mastery_fraction(&self) -> f64 {
        f64::from(self.passing_score.min(100)) / 100.0
    }
}

impl XapiSettings {
    /// Prefix with any trailing slashes removed, falling back to the default.
    pub fn prefix(&self) -> &str {
        let trimmed = self.activity_id_prefix.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            DEFAULT_ACTIVITY_ID_PREFIX
        } else {
            trimmed
        }
    }
}

impl PackagingSettings {
    /// Compression level clamped into the deflate range.
    pub fn level(&self) -> i64 {
        i64::from(self.compression_level.min(9))
    }
}
