//! Verb and activity-type vocabularies.
//!
//! These are data, not code: the tables are serialized into the runtimes and
//! into `statement-templates.js`.

use std::collections::BTreeMap;

use crate::manifest::activity_types;

/// ADL verbs used by xAPI packages.
pub const XAPI_VERBS: &[(&str, &str)] = &[
    ("initialized", "http://adlnet.gov/expapi/verbs/initialized"),
    ("launched", "http://adlnet.gov/expapi/verbs/launched"),
    ("experienced", "http://adlnet.gov/expapi/verbs/experienced"),
    ("progressed", "http://adlnet.gov/expapi/verbs/progressed"),
    ("answered", "http://adlnet.gov/expapi/verbs/answered"),
    ("completed", "http://adlnet.gov/expapi/verbs/completed"),
    ("passed", "http://adlnet.gov/expapi/verbs/passed"),
    ("failed", "http://adlnet.gov/expapi/verbs/failed"),
    ("terminated", "http://adlnet.gov/expapi/verbs/terminated"),
];

/// cmi5 defined verbs plus `answered` for in-lesson questions.
pub const CMI5_VERBS: &[(&str, &str)] = &[
    ("launched", "http://adlnet.gov/expapi/verbs/launched"),
    ("initialized", "http://adlnet.gov/expapi/verbs/initialized"),
    ("answered", "http://adlnet.gov/expapi/verbs/answered"),
    ("completed", "http://adlnet.gov/expapi/verbs/completed"),
    ("passed", "http://adlnet.gov/expapi/verbs/passed"),
    ("failed", "http://adlnet.gov/expapi/verbs/failed"),
    ("abandoned", "https://w3id.org/xapi/adl/verbs/abandoned"),
    ("waived", "https://w3id.org/xapi/adl/verbs/waived"),
    ("satisfied", "https://w3id.org/xapi/adl/verbs/satisfied"),
    ("terminated", "http://adlnet.gov/expapi/verbs/terminated"),
];

/// Verbs that carry the cmi5 context category.
pub const CMI5_CATEGORIZED: &[&str] = &["initialized", "completed", "passed", "failed", "terminated"];

pub const ACTIVITY_TYPES: &[(&str, &str)] = &[
    ("course", activity_types::COURSE),
    ("module", activity_types::MODULE),
    ("lesson", activity_types::LESSON),
    ("interaction", activity_types::INTERACTION),
    ("question", activity_types::QUESTION),
];

pub const CMI5_CATEGORY: &str = "https://w3id.org/xapi/cmi5/context/categories/cmi5";
pub const MOVE_ON_CATEGORY: &str = "https://w3id.org/xapi/cmi5/context/categories/moveon";
pub const SESSION_ID_EXTENSION: &str = "https://w3id.org/xapi/cmi5/context/extensions/sessionid";

/// Turn a vocabulary table into a name-keyed map.
pub fn table(entries: &[(&'static str, &'static str)]) -> BTreeMap<&'static str, &'static str> {
    entries.iter().copied().collect()
}
