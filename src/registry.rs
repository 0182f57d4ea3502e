//! Format handler registry.
//!
//! The registry is built once and never mutated. [`Registry::global`] gives
//! a shared instance holding every built-in handler; callers that need a
//! different set construct their own with [`Registry::from_handlers`].

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::export::FormatHandler;
use crate::format::Format;

/// Format metadata, available without invoking a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatInfo {
    pub format_id: &'static str,
    pub display_name: &'static str,
    pub mime_type: &'static str,
    pub extension: &'static str,
}

impl From<Format> for FormatInfo {
    fn from(format: Format) -> Self {
        Self {
            format_id: format.id(),
            display_name: format.display_name(),
            mime_type: format.mime_type(),
            extension: format.extension(),
        }
    }
}

#[derive(Debug)]
pub struct Registry {
    handlers: HashMap<Format, FormatHandler>,
}

impl Registry {
    /// A registry with the built-in handler for every format.
    pub fn new() -> Self {
        Self::from_handlers(Format::ALL.into_iter().map(FormatHandler::for_format))
    }

    /// A registry with exactly the given handlers. A later handler for the
    /// same format replaces an earlier one.
    pub fn from_handlers(handlers: impl IntoIterator<Item = FormatHandler>) -> Self {
        Self {
            handlers: handlers.into_iter().map(|h| (h.format(), h)).collect(),
        }
    }

    /// The process-wide registry of built-in handlers.
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::new)
    }

    /// Look up a handler by format id or alias. Unknown ids give `None`.
    pub fn resolve(&self, format_id: &str) -> Option<&FormatHandler> {
        let format = format_id.parse::<Format>().ok()?;
        self.get(format)
    }

    pub fn get(&self, format: Format) -> Option<&FormatHandler> {
        self.handlers.get(&format)
    }

    /// Registered formats in canonical order.
    pub fn list_formats(&self) -> Vec<FormatInfo> {
        Format::ALL
            .into_iter()
            .filter(|f| self.handlers.contains_key(f))
            .map(FormatInfo::from)
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
