//! Package descriptors.
//!
//! Each backend describes its package with a declarative document: SCORM
//! `imsmanifest.xml`, cmi5 `cmi5.xml`, xAPI `tincan.xml`, or the HTML5
//! `manifest.json`. All of them are built in two steps:
//!
//! 1. `build(metadata, modules, ..)` produces a small manifest IR that keeps
//!    module/lesson containment and order.
//! 2. `to_xml()` (or `to_json()`) serializes that IR, escaping every free-text
//!    field.
//!
//! The inputs ([`ManifestMetadata`], [`ModuleItem`], [`LessonItem`]) are plain
//! data so the builders can be exercised without a full course.

mod cmi5;
mod scorm;
mod tincan;
mod web;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::model::Course;
use crate::util::encode_href;

pub use cmi5::{AssignableUnit, CourseStructure, StructureBlock};
pub use scorm::{
    OrgItem, Organization, ScoType, ScormManifest, ScormOptions, ScormResource, schema_catalog,
};
pub use tincan::{TinCanActivity, TinCanManifest};
pub use web::{WebManifest, WebManifestLesson, WebManifestModule};

/// Course-level fields every descriptor needs.
#[derive(Debug, Clone, Default)]
pub struct ManifestMetadata {
    pub identifier: String,
    pub title: String,
    pub description: String,
    pub language: String,
    pub version: String,
    pub author: Option<String>,
    pub copyright: Option<String>,
    pub keywords: Vec<String>,
    /// RFC 3339 generation timestamp.
    pub generated_at: String,
}

/// A module and its lessons, already in package order.
#[derive(Debug, Clone, Default)]
pub struct ModuleItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub lessons: Vec<LessonItem>,
}

/// A lesson as seen by a descriptor.
#[derive(Debug, Clone, Default)]
pub struct LessonItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Package-relative launch path.
    pub launch: String,
    /// Additional package-relative files belonging to the lesson.
    pub files: Vec<String>,
    pub resources: Vec<ResourceRef>,
    pub duration_minutes: u32,
}

/// A lesson resource that has a record (file name or URL).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub mime_type: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl ManifestMetadata {
    pub fn from_course(course: &Course, generated_at: DateTime<Utc>) -> Self {
        Self {
            identifier: course.id.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            language: course.language_or_default().to_string(),
            version: course.version_or_default().to_string(),
            author: course.metadata.author.clone(),
            copyright: course.metadata.copyright.clone(),
            keywords: course.metadata.keywords.clone(),
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Activity IRIs for xAPI and cmi5 statements and descriptors.
///
/// Ids are `<prefix>/<course>`, `<prefix>/<course>/modules/<module>`, and
/// `<prefix>/<course>/lessons/<lesson>`, with each id percent-encoded.
#[derive(Debug, Clone)]
pub struct ActivityIds {
    course: String,
}

impl ActivityIds {
    pub fn new(prefix: &str, course_id: &str) -> Self {
        Self {
            course: format!(
                "{}/{}",
                prefix.trim_end_matches('/'),
                encode_href(course_id)
            ),
        }
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn module(&self, module_id: &str) -> String {
        format!("{}/modules/{}", self.course, encode_href(module_id))
    }

    pub fn lesson(&self, lesson_id: &str) -> String {
        format!("{}/lessons/{}", self.course, encode_href(lesson_id))
    }
}

/// Standard xAPI activity type IRIs.
pub mod activity_types {
    pub const COURSE: &str = "http://adlnet.gov/expapi/activities/course";
    pub const MODULE: &str = "http://adlnet.gov/expapi/activities/module";
    pub const LESSON: &str = "http://adlnet.gov/expapi/activities/lesson";
    pub const INTERACTION: &str = "http://adlnet.gov/expapi/activities/cmi.interaction";
    pub const QUESTION: &str = "http://adlnet.gov/expapi/activities/question";
}
