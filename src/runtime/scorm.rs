//! SCORM runtime configuration.

use serde::Serialize;

use crate::error::Result;
use crate::settings::{ScormSettings, ScormVersion};

use super::SCORM_API;

#[derive(Serialize)]
struct RuntimeConfig {
    version: &'static str,
}

/// Render `scorm-api.js` for the given schema version.
pub fn scorm_api(version: ScormVersion) -> Result<String> {
    SCORM_API.render(&RuntimeConfig {
        version: version.label(),
    })
}

/// Per-lesson settings embedded in a launcher page as
/// `window.COURSEPACK_LAUNCH`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScormLaunch {
    pub lesson_id: String,
    pub title: String,
    /// Page loaded into the launcher's frame.
    pub content: String,
    pub passing_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<u64>,
    pub allow_review: bool,
    pub credit: &'static str,
}

impl ScormLaunch {
    pub fn new(lesson_id: &str, title: &str, content: &str, settings: &ScormSettings) -> Self {
        Self {
            lesson_id: lesson_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            passing_score: settings.passing_score.min(100),
            time_limit_seconds: settings.time_limit.map(|m| u64::from(m) * 60),
            allow_review: settings.allow_review,
            credit: settings.credit.as_str(),
        }
    }
}
