//! cmi5 assignable-unit runtime configuration.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::settings::XapiSettings;

use super::vocabulary::CMI5_CATEGORIZED;
use super::{
    ACTIVITY_TYPES, CMI5_AU, CMI5_CATEGORY, CMI5_VERBS, MOVE_ON_CATEGORY, SESSION_ID_EXTENSION,
    table,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeConfig<'a> {
    language: &'a str,
    verbose: bool,
    verbs: BTreeMap<&'static str, &'static str>,
    activity_types: BTreeMap<&'static str, &'static str>,
    categorized: &'static [&'static str],
    categories: Categories,
    extensions: Extensions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Categories {
    cmi5: &'static str,
    move_on: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Extensions {
    session_id: &'static str,
}

/// Render `cmi5-au.js`.
pub fn cmi5_au(settings: &XapiSettings, language: &str) -> Result<String> {
    CMI5_AU.render(&RuntimeConfig {
        language,
        verbose: settings.verbose_tracking,
        verbs: table(CMI5_VERBS),
        activity_types: table(ACTIVITY_TYPES),
        categorized: CMI5_CATEGORIZED,
        categories: Categories {
            cmi5: CMI5_CATEGORY,
            move_on: MOVE_ON_CATEGORY,
        },
        extensions: Extensions {
            session_id: SESSION_ID_EXTENSION,
        },
    })
}

/// Per-AU settings embedded in the AU page as `window.COURSEPACK_LAUNCH`.
///
/// Values from the LMS launch (`activityId`, `LMS.LaunchData.masteryScore`)
/// take precedence at runtime.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cmi5Launch {
    pub activity_id: String,
    pub lesson_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastery_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_au_runtime_config() {
        let js = cmi5_au(&XapiSettings::default(), "en").unwrap();
        assert!(js.contains(SESSION_ID_EXTENSION));
        assert!(js.contains("https://w3id.org/xapi/adl/verbs/waived"));
        assert!(js.contains("'auth-token'"));
        assert!(js.contains("window.cmi5RecordAnswer"));
    }

    #[test]
    fn test_launch_skips_missing_mastery() {
        let launch = Cmi5Launch {
            activity_id: "urn:a".into(),
            lesson_id: "l".into(),
            mastery_score: None,
        };
        let value = serde_json::to_value(&launch).unwrap();
        assert!(value.get("masteryScore").is_none());
        assert_eq!(value["activityId"], "urn:a");
    }
}
