//! Shared package stylesheet.

/// Stylesheet emitted once per package.
pub const STYLESHEET: &str = include_str!("styles.css");
