//! Target package formats.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::settings::ScormVersion;

/// A package format the compiler can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    Scorm12,
    Scorm2004,
    Xapi,
    Cmi5,
    Html5,
}

impl Format {
    /// Every supported format, in listing order.
    pub const ALL: [Format; 5] = [
        Format::Scorm12,
        Format::Scorm2004,
        Format::Xapi,
        Format::Cmi5,
        Format::Html5,
    ];

    /// Canonical identifier accepted by the registry.
    pub fn id(self) -> &'static str {
        match self {
            Format::Scorm12 => "scorm12",
            Format::Scorm2004 => "scorm2004",
            Format::Xapi => "xapi",
            Format::Cmi5 => "cmi5",
            Format::Html5 => "html5",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Format::Scorm12 => "SCORM 1.2",
            Format::Scorm2004 => "SCORM 2004 (4th Edition)",
            Format::Xapi => "xAPI (Tin Can)",
            Format::Cmi5 => "cmi5",
            Format::Html5 => "HTML5 (standalone)",
        }
    }

    /// Every format ships as a zip archive.
    pub fn mime_type(self) -> &'static str {
        "application/zip"
    }

    pub fn extension(self) -> &'static str {
        "zip"
    }

    /// Suffix placed between the course slug and the date in archive names.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Format::Scorm12 => "scorm12",
            Format::Scorm2004 => "scorm2004",
            Format::Xapi => "xapi",
            Format::Cmi5 => "cmi5",
            Format::Html5 => "html5",
        }
    }

    /// Error code carried by failure envelopes for generation errors.
    pub fn error_code(self) -> &'static str {
        match self {
            Format::Scorm12 | Format::Scorm2004 => "SCORM_EXPORT_ERROR",
            Format::Xapi => "XAPI_EXPORT_ERROR",
            Format::Cmi5 => "CMI5_EXPORT_ERROR",
            Format::Html5 => "HTML5_EXPORT_ERROR",
        }
    }

    /// Global function that interactive blocks call on this target.
    pub fn answer_hook(self) -> &'static str {
        match self {
            Format::Scorm12 | Format::Scorm2004 => "recordInteraction",
            Format::Xapi => "trackAnswer",
            Format::Cmi5 => "cmi5RecordAnswer",
            Format::Html5 => "checkAnswer",
        }
    }

    pub fn scorm_version(self) -> Option<ScormVersion> {
        match self {
            Format::Scorm12 => Some(ScormVersion::V1_2),
            Format::Scorm2004 => Some(ScormVersion::V2004),
            _ => None,
        }
    }

    pub fn is_scorm(self) -> bool {
        self.scorm_version().is_some()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | '.' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "scorm12" => Ok(Format::Scorm12),
            "scorm2004" => Ok(Format::Scorm2004),
            "xapi" | "tincan" => Ok(Format::Xapi),
            "cmi5" => Ok(Format::Cmi5),
            "html5" | "html" => Ok(Format::Html5),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}
