//! Tracking runtimes shipped inside packages.
//!
//! Each runtime is a hand-written script under `templates/` with exactly one
//! configuration slot ([`CONFIG_PLACEHOLDER`]). The Rust side only produces
//! the JSON that fills the slot, so protocol logic and export data never mix.

mod cmi5;
mod navigation;
mod scorm;
mod vocabulary;
mod xapi;

use serde::Serialize;

use crate::error::{Error, Result};

pub use cmi5::{Cmi5Launch, cmi5_au};
pub use navigation::{NavigationConfig, navigation};
pub use scorm::{ScormLaunch, scorm_api};
pub use vocabulary::{
    ACTIVITY_TYPES, CMI5_CATEGORY, CMI5_VERBS, MOVE_ON_CATEGORY, SESSION_ID_EXTENSION,
    XAPI_VERBS, table,
};
pub use xapi::{LessonActivity, statement_templates, xapi_wrapper};

/// Marker replaced by the serialized configuration.
pub const CONFIG_PLACEHOLDER: &str = "/*@coursepack-config@*/null";

/// Fraction of a page that must be scrolled before a lesson counts as
/// completed. The scripts carry the same constant.
pub const COMPLETION_SCROLL_THRESHOLD: f64 = 0.9;

/// A script with a single configuration slot.
#[derive(Debug, Clone, Copy)]
pub struct ScriptTemplate {
    name: &'static str,
    source: &'static str,
}

pub const SCORM_API: ScriptTemplate =
    ScriptTemplate::new("scorm-api.js", include_str!("templates/scorm-api.js"));
pub const XAPI_WRAPPER: ScriptTemplate =
    ScriptTemplate::new("xapi-wrapper.js", include_str!("templates/xapi-wrapper.js"));
pub const CMI5_AU: ScriptTemplate =
    ScriptTemplate::new("cmi5-au.js", include_str!("templates/cmi5-au.js"));
pub const NAVIGATION: ScriptTemplate =
    ScriptTemplate::new("navigation.js", include_str!("templates/navigation.js"));

impl ScriptTemplate {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self { name, source }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Fill the configuration slot with `config` serialized as JSON.
    pub fn render<T: Serialize>(&self, config: &T) -> Result<String> {
        if self.source.matches(CONFIG_PLACEHOLDER).count() != 1 {
            return Err(Error::MissingElement(format!(
                "configuration slot in {}",
                self.name
            )));
        }
        let json = serde_json::to_string_pretty(config)?;
        Ok(self.source.replacen(CONFIG_PLACEHOLDER, &json, 1))
    }
}

/// Serialize `value` for embedding inside an HTML `<script>` element.
///
/// `</` is escaped so string content can never close the element.
pub fn inline_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_has_one_slot() {
        for template in [SCORM_API, XAPI_WRAPPER, CMI5_AU, NAVIGATION] {
            assert_eq!(
                template.source().matches(CONFIG_PLACEHOLDER).count(),
                1,
                "{}",
                template.name()
            );
        }
    }

    #[test]
    fn test_render_replaces_slot() {
        let out = NAVIGATION
            .render(&serde_json::json!({"storageKey": "k"}))
            .unwrap();
        assert!(!out.contains(CONFIG_PLACEHOLDER));
        assert!(out.contains("\"storageKey\": \"k\""));
    }

    #[test]
    fn test_render_without_slot_fails() {
        let template = ScriptTemplate::new("broken.js", "var x = 1;");
        assert!(matches!(
            template.render(&1),
            Err(Error::MissingElement(_))
        ));
    }

    #[test]
    fn test_inline_json_escapes_script_close() {
        let json = inline_json(&"</script><b>").unwrap();
        assert_eq!(json, "\"<\\/script><b>\"");
    }

    #[test]
    fn test_scroll_threshold_matches_scripts() {
        for template in [SCORM_API, CMI5_AU] {
            assert!(
                template
                    .source()
                    .contains("COMPLETION_SCROLL_THRESHOLD = 0.9;")
            );
        }
        assert!((COMPLETION_SCROLL_THRESHOLD - 0.9).abs() < f64::EPSILON);
    }
}
