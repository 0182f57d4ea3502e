//! Navigation and progress script shared by the xAPI and HTML5 bundles.

use serde::Serialize;

use crate::error::Result;

use super::NAVIGATION;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationConfig {
    /// localStorage key holding progress for this course.
    pub storage_key: String,
    pub track_progress: bool,
    /// Lesson ids in package order.
    pub lessons: Vec<String>,
}

impl NavigationConfig {
    pub fn new(course_id: &str, lessons: Vec<String>) -> Self {
        Self {
            storage_key: format!("coursepack-progress:{course_id}"),
            track_progress: true,
            lessons,
        }
    }
}

/// Render `navigation.js`.
pub fn navigation(config: &NavigationConfig) -> Result<String> {
    NAVIGATION.render(config)
}
