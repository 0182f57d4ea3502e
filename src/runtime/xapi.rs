//! xAPI runtime configuration and the statement template data file.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::manifest::{ActivityIds, activity_types};
use crate::settings::XapiSettings;

use super::{ACTIVITY_TYPES, XAPI_VERBS, XAPI_WRAPPER, table};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeConfig<'a> {
    course_activity_id: &'a str,
    language: &'a str,
    verbose: bool,
    endpoint: Option<&'a str>,
    verbs: BTreeMap<&'static str, &'static str>,
    activity_types: BTreeMap<&'static str, &'static str>,
}

/// Render `xapi-wrapper.js`.
pub fn xapi_wrapper(settings: &XapiSettings, ids: &ActivityIds, language: &str) -> Result<String> {
    XAPI_WRAPPER.render(&RuntimeConfig {
        course_activity_id: ids.course(),
        language,
        verbose: settings.verbose_tracking,
        endpoint: settings.endpoint.as_deref(),
        verbs: table(XAPI_VERBS),
        activity_types: table(ACTIVITY_TYPES),
    })
}

/// A lesson's activity definition as exposed to page scripts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonActivity {
    /// Activity IRI.
    pub id: String,
    pub lesson_id: String,
    pub module_id: String,
    pub name: String,
    pub href: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CourseActivity<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Build `statement-templates.js`, which declares `XAPI_VERBS`,
/// `ACTIVITY_TYPES`, `COURSE_ACTIVITY` and `LESSON_ACTIVITIES` as globals.
pub fn statement_templates(
    ids: &ActivityIds,
    course_title: &str,
    lessons: &[LessonActivity],
) -> Result<String> {
    let course = CourseActivity {
        id: ids.course(),
        name: course_title,
        kind: activity_types::COURSE,
    };

    let mut js = String::from("/* coursepack xAPI statement templates. Generated file. */\n");
    for (name, json) in [
        ("XAPI_VERBS", serde_json::to_string_pretty(&table(XAPI_VERBS))?),
        (
            "ACTIVITY_TYPES",
            serde_json::to_string_pretty(&table(ACTIVITY_TYPES))?,
        ),
        ("COURSE_ACTIVITY", serde_json::to_string_pretty(&course)?),
        ("LESSON_ACTIVITIES", serde_json::to_string_pretty(lessons)?),
    ] {
        js.push_str(&format!("var {name} = {json};\n"));
    }
    Ok(js)
}
