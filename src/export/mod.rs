//! Format handlers and the shared export pipeline.
//!
//! Every target format goes through the same steps:
//!
//! 1. Validate the course (structural preconditions only).
//! 2. Build a [`CoursePlan`]: modules, lessons and blocks in `order`, id
//!    checks, non-fatal warnings.
//! 3. Emit package-level files (descriptor, runtime script, stylesheet,
//!    index pages) through [`Exporter::package_files`].
//! 4. Render lesson pages through [`Exporter::lesson_files`], fanned out
//!    across threads and collected back in plan order.
//! 5. Pack the file tree into a zip archive. This is the only `await`.
//!
//! The format-specific parts live behind the [`Exporter`] trait; the
//! orchestration lives in [`FormatHandler`].
//!
//! # Example
//!
//! ```no_run
//! use coursepack::export::{ExportContext, FormatHandler};
//! use coursepack::{Course, ExportSettings, Format};
//!
//! # async fn run(course: Course) -> coursepack::Result<()> {
//! let settings = ExportSettings::default();
//! let handler = FormatHandler::for_format(Format::Scorm12);
//! let ctx = ExportContext::new(&course, &settings);
//!
//! let package = handler.export(&ctx).await.into_package()?;
//! std::fs::write(&package.filename, &package.blob)?;
//! # Ok(())
//! # }
//! ```

mod cmi5;
mod css;
mod html5;
mod package;
mod pages;
mod plan;
mod readme;
mod scorm;
mod xapi;

use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::format::Format;
use crate::model::Course;
use crate::settings::{ExportSettings, ScormVersion};
use crate::util::generate_filename_on;

pub use cmi5::Cmi5Exporter;
pub use css::STYLESHEET;
pub use html5::Html5Exporter;
pub use package::{FileTree, pack, write_archive};
pub use pages::PageShell;
pub use plan::{CoursePlan, LessonEntry, ModulePlan};
pub use scorm::ScormExporter;
pub use xapi::XapiExporter;

/// Error code for envelopes produced by a failed validation.
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

/// Everything one export call reads.
#[derive(Debug, Clone, Copy)]
pub struct ExportContext<'a> {
    pub course: &'a Course,
    pub settings: &'a ExportSettings,
    /// Embedded in descriptors, the README and zip entry times.
    pub generated_at: DateTime<Utc>,
}

impl<'a> ExportContext<'a> {
    pub fn new(course: &'a Course, settings: &'a ExportSettings) -> Self {
        Self {
            course,
            settings,
            generated_at: Utc::now(),
        }
    }

    /// Pin the generation time, making the archive reproducible.
    pub fn with_timestamp(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }
}

/// Outcome of [`FormatHandler::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    /// Number of files in the archive.
    pub total_items: usize,
    /// Archive size in bytes.
    pub total_size: u64,
    pub duration_ms: u64,
    pub warning_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warning_messages: Vec<String>,
}

impl ExportStats {
    fn elapsed(started: Instant) -> Self {
        Self {
            duration_ms: started.elapsed().as_millis() as u64,
            ..Default::default()
        }
    }
}

/// A finished archive.
#[derive(Debug, Clone)]
pub struct ExportedPackage {
    pub blob: Vec<u8>,
    pub filename: String,
    pub mime_type: &'static str,
    pub stats: ExportStats,
}

#[derive(Debug)]
pub struct ExportFailure {
    pub error: Error,
    pub error_code: &'static str,
    pub stats: ExportStats,
}

/// Result envelope, produced exactly once per export call.
#[derive(Debug)]
pub enum ExportResult {
    Success(ExportedPackage),
    Failure(ExportFailure),
}

impl ExportResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExportResult::Success(_))
    }

    pub fn stats(&self) -> &ExportStats {
        match self {
            ExportResult::Success(package) => &package.stats,
            ExportResult::Failure(failure) => &failure.stats,
        }
    }

    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            ExportResult::Success(_) => None,
            ExportResult::Failure(failure) => Some(failure.error_code),
        }
    }

    pub fn package(&self) -> Option<&ExportedPackage> {
        match self {
            ExportResult::Success(package) => Some(package),
            ExportResult::Failure(_) => None,
        }
    }

    /// Convert into a `Result`, discarding the failure envelope's stats.
    pub fn into_package(self) -> Result<ExportedPackage> {
        match self {
            ExportResult::Success(package) => Ok(package),
            ExportResult::Failure(failure) => Err(failure.error),
        }
    }
}

/// The format-specific half of an export.
///
/// Implementations only produce files; ordering, validation, packaging and
/// error wrapping are handled by [`FormatHandler`].
pub trait Exporter: Send + Sync {
    fn format(&self) -> Format;

    /// Validation rules on top of the shared ones.
    fn extra_checks(&self, _course: &Course, _errors: &mut Vec<String>) {}

    /// Non-fatal remarks about how `settings` apply to this format.
    fn notes(&self, _settings: &ExportSettings) -> Vec<String> {
        Vec::new()
    }

    /// Files that exist once per package.
    fn package_files(
        &self,
        plan: &CoursePlan<'_>,
        ctx: &ExportContext<'_>,
        files: &mut FileTree,
    ) -> Result<()>;

    /// `(path, contents)` pairs for one lesson. Called concurrently for
    /// different lessons.
    fn lesson_files<'a>(
        &self,
        plan: &CoursePlan<'a>,
        entry: &LessonEntry<'a>,
        ctx: &ExportContext<'_>,
    ) -> Result<Vec<(String, String)>>;
}

/// Validation rules shared by every format.
pub fn validate_course(course: &Course) -> Vec<String> {
    let mut errors = Vec::new();
    if course.title.trim().is_empty() {
        errors.push("Course title is required".to_string());
    }
    if course.modules.is_empty() {
        errors.push("Course must have at least one module".to_string());
    } else if course.lesson_count() == 0 {
        errors.push("Course must have at least one lesson".to_string());
    }
    errors
}

/// Validates and exports courses for one format.
pub struct FormatHandler {
    exporter: Box<dyn Exporter>,
}

struct Generated {
    files: FileTree,
    warnings: Vec<String>,
}

impl FormatHandler {
    pub fn new(exporter: impl Exporter + 'static) -> Self {
        Self {
            exporter: Box::new(exporter),
        }
    }

    /// The built-in handler for `format`.
    pub fn for_format(format: Format) -> Self {
        match format {
            Format::Scorm12 => Self::new(ScormExporter::new(ScormVersion::V1_2)),
            Format::Scorm2004 => Self::new(ScormExporter::new(ScormVersion::V2004)),
            Format::Xapi => Self::new(XapiExporter::new()),
            Format::Cmi5 => Self::new(Cmi5Exporter::new()),
            Format::Html5 => Self::new(Html5Exporter::new()),
        }
    }

    pub fn format(&self) -> Format {
        self.exporter.format()
    }

    /// Check structural preconditions. Never fails; problems are reported in
    /// the returned [`Validation`].
    pub fn validate(&self, ctx: &ExportContext<'_>) -> Validation {
        let mut errors = validate_course(ctx.course);
        self.exporter.extra_checks(ctx.course, &mut errors);
        Validation::from_errors(errors)
    }

    /// Export the course. Every error ends in a failure envelope.
    pub async fn export(&self, ctx: &ExportContext<'_>) -> ExportResult {
        let started = Instant::now();
        let format = self.format();
        info!(
            format = %format,
            course = %ctx.course.id,
            lessons = ctx.course.lesson_count(),
            "export started"
        );

        let validation = self.validate(ctx);
        if !validation.valid {
            warn!(format = %format, errors = ?validation.errors, "validation failed");
            return ExportResult::Failure(ExportFailure {
                error: Error::Validation(validation.errors),
                error_code: VALIDATION_ERROR,
                stats: ExportStats::elapsed(started),
            });
        }

        match self.run(ctx).await {
            Ok((blob, total_items, warnings)) => {
                let filename = generate_filename_on(
                    &ctx.course.title,
                    Some(format.file_suffix()),
                    format.extension(),
                    ctx.generated_at.date_naive(),
                );
                let stats = ExportStats {
                    total_items,
                    total_size: blob.len() as u64,
                    warning_count: warnings.len(),
                    warning_messages: warnings,
                    ..ExportStats::elapsed(started)
                };
                info!(
                    format = %format,
                    filename = %filename,
                    files = stats.total_items,
                    bytes = stats.total_size,
                    warnings = stats.warning_count,
                    duration_ms = stats.duration_ms,
                    "export finished"
                );
                ExportResult::Success(ExportedPackage {
                    blob,
                    filename,
                    mime_type: format.mime_type(),
                    stats,
                })
            }
            Err(error) => {
                warn!(format = %format, error = %error, "export failed");
                ExportResult::Failure(ExportFailure {
                    error,
                    error_code: format.error_code(),
                    stats: ExportStats::elapsed(started),
                })
            }
        }
    }

    async fn run(&self, ctx: &ExportContext<'_>) -> Result<(Vec<u8>, usize, Vec<String>)> {
        let Generated { files, warnings } = self.generate(ctx)?;
        let total_items = files.len();
        let blob = pack(files, ctx.settings.packaging.clone(), ctx.generated_at).await?;
        Ok((blob, total_items, warnings))
    }

    /// Build the complete file tree without packing it.
    pub fn build_files(&self, ctx: &ExportContext<'_>) -> Result<FileTree> {
        Ok(self.generate(ctx)?.files)
    }

    fn generate(&self, ctx: &ExportContext<'_>) -> Result<Generated> {
        let plan = CoursePlan::new(ctx.course)?;
        let mut warnings = plan.warnings().to_vec();
        warnings.extend(self.exporter.notes(ctx.settings));
        for warning in &warnings {
            warn!(format = %self.format(), "{warning}");
        }

        let mut files = FileTree::new();
        self.exporter.package_files(&plan, ctx, &mut files)?;

        let pages: Vec<Result<Vec<(String, String)>>> = plan
            .lessons()
            .par_iter()
            .map(|entry| self.exporter.lesson_files(&plan, entry, ctx))
            .collect();
        for lesson in pages {
            for (path, contents) in lesson? {
                files.insert(path, contents)?;
            }
        }

        debug!(
            format = %self.format(),
            files = files.len(),
            bytes = files.total_size(),
            "file tree built"
        );
        Ok(Generated { files, warnings })
    }
}

impl std::fmt::Debug for FormatHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatHandler")
            .field("format", &self.format())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Lesson, Module};

    fn course() -> Course {
        Course::new("c1", "Intro to Rust").with_module(
            Module::new("m1", "Basics").with_lesson(
                Lesson::new("l1", "Welcome").with_block(Block::paragraph("p", 0, "Hello")),
            ),
        )
    }

    #[test]
    fn test_validate_ok_for_every_format() {
        let course = course();
        let settings = ExportSettings::default();
        let ctx = ExportContext::new(&course, &settings);
        for format in Format::ALL {
            let validation = FormatHandler::for_format(format).validate(&ctx);
            assert_eq!(validation, Validation::from_errors(Vec::new()), "{format}");
        }
    }

    #[test]
    fn test_validate_messages() {
        let course = Course::new("", "  ").with_module(Module::new("m", "Empty"));
        let settings = ExportSettings::default();
        let ctx = ExportContext::new(&course, &settings);

        let html = FormatHandler::for_format(Format::Html5).validate(&ctx);
        assert!(!html.valid);
        assert_eq!(
            html.errors,
            ["Course title is required", "Course must have at least one lesson"]
        );

        let scorm = FormatHandler::for_format(Format::Scorm2004).validate(&ctx);
        assert!(scorm.errors.iter().any(|e| e.contains("Course id")));
    }

    #[test]
    fn test_build_files_layout() {
        let course = course();
        let settings = ExportSettings::default();
        let ctx = ExportContext::new(&course, &settings);
        let files = FormatHandler::for_format(Format::Html5)
            .build_files(&ctx)
            .unwrap();
        let paths: Vec<_> = files.paths().collect();
        assert_eq!(
            paths,
            [
                "css/styles.css",
                "index.html",
                "js/navigation.js",
                "lessons/l1.html",
                "manifest.json"
            ]
        );
    }

    #[tokio::test]
    async fn test_validation_failure_envelope() {
        let course = Course::new("c", "Empty");
        let settings = ExportSettings::default();
        let ctx = ExportContext::new(&course, &settings);

        let result = FormatHandler::for_format(Format::Xapi).export(&ctx).await;
        assert!(!result.is_success());
        assert_eq!(result.error_code(), Some(VALIDATION_ERROR));
        assert_eq!(result.stats().total_items, 0);
    }

    #[tokio::test]
    async fn test_generation_failure_uses_format_code() {
        let course = Course::new("c", "Dupes").with_module(
            Module::new("m", "M")
                .with_lesson(Lesson::new("x", "A"))
                .with_lesson(Lesson::new("x", "B")),
        );
        let settings = ExportSettings::default();
        let ctx = ExportContext::new(&course, &settings);

        let result = FormatHandler::for_format(Format::Cmi5).export(&ctx).await;
        assert_eq!(result.error_code(), Some("CMI5_EXPORT_ERROR"));
        assert!(matches!(
            result.into_package(),
            Err(Error::DuplicateId { kind: "lesson", .. })
        ));
    }
}
