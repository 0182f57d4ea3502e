//! SCORM 1.2 and SCORM 2004 packages.
//!
//! Both versions share this exporter. Each lesson is a SCO with two pages:
//! a launcher (`content/<lesson>/index.html`) that owns the LMS session and
//! embeds the tracking settings, and the content page it frames.

use crate::error::Result;
use crate::format::Format;
use crate::manifest::{ManifestMetadata, ScormManifest, ScormOptions, schema_catalog};
use crate::model::Course;
use crate::runtime::{ScormLaunch, inline_json, scorm_api};
use crate::settings::{ExportSettings, ScormVersion};
use crate::util::escape_html;

use super::css::STYLESHEET;
use super::pages::{PageShell, lesson_body};
use super::plan::{CoursePlan, LessonEntry};
use super::readme::readme;
use super::{ExportContext, Exporter, FileTree};

const MANIFEST: &str = "imsmanifest.xml";
const SCRIPT: &str = "shared/scripts/scorm-api.js";
const STYLES: &str = "shared/css/styles.css";
const CATALOG: &str = "shared/schemas/catalog.xml";

/// Path from a lesson page back to the package root.
const ROOT: &str = "../../";

#[derive(Debug, Clone, Copy)]
pub struct ScormExporter {
    version: ScormVersion,
}

impl ScormExporter {
    pub fn new(version: ScormVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> ScormVersion {
        self.version
    }

    fn launcher_path(entry: &LessonEntry<'_>) -> String {
        format!("content/{}/index.html", entry.segment)
    }

    fn content_path(entry: &LessonEntry<'_>) -> String {
        format!("content/{}/content.html", entry.segment)
    }
}

impl Exporter for ScormExporter {
    fn format(&self) -> Format {
        match self.version {
            ScormVersion::V1_2 => Format::Scorm12,
            ScormVersion::V2004 => Format::Scorm2004,
        }
    }

    fn extra_checks(&self, course: &Course, errors: &mut Vec<String>) {
        if course.id.trim().is_empty() {
            errors.push("Course id is required for SCORM export".to_string());
        }
    }

    fn notes(&self, settings: &ExportSettings) -> Vec<String> {
        match settings.scorm.version {
            Some(requested) if requested != self.version => vec![format!(
                "Settings request SCORM {} but the package is SCORM {}",
                requested.label(),
                self.version.label()
            )],
            _ => Vec::new(),
        }
    }

    fn package_files(
        &self,
        plan: &CoursePlan<'_>,
        ctx: &ExportContext<'_>,
        files: &mut FileTree,
    ) -> Result<()> {
        let settings = &ctx.settings.scorm;
        let metadata = ManifestMetadata::from_course(ctx.course, ctx.generated_at);
        let outline = plan.outline(Self::launcher_path, |e| vec![Self::content_path(e)]);
        let options = ScormOptions {
            mastery_score: Some(settings.passing_score.min(100)),
            time_limit_minutes: settings.time_limit,
            shared_files: vec![SCRIPT.to_string(), STYLES.to_string()],
        };
        let manifest = ScormManifest::build(&metadata, &outline, self.version, &options);

        files.insert(MANIFEST, manifest.to_xml())?;
        files.insert(SCRIPT, scorm_api(self.version)?)?;
        files.insert(STYLES, STYLESHEET)?;
        files.insert(CATALOG, schema_catalog(self.version))?;
        files.insert(
            "README.txt",
            readme(
                plan,
                ctx,
                self.format(),
                "Upload this zip file to your LMS as a SCORM package. Do not unzip it first;\n\
                 the LMS reads imsmanifest.xml from the root of the archive.",
            ),
        )?;
        Ok(())
    }

    fn lesson_files<'a>(
        &self,
        _plan: &CoursePlan<'a>,
        entry: &LessonEntry<'a>,
        ctx: &ExportContext<'_>,
    ) -> Result<Vec<(String, String)>> {
        let lesson = entry.lesson;
        let language = ctx.course.language_or_default();
        let styles = format!("{ROOT}{STYLES}");
        let script = format!("{ROOT}{SCRIPT}");

        let launch = ScormLaunch::new(&lesson.id, &lesson.title, "content.html", &ctx.settings.scorm);
        let launcher = PageShell::new(&lesson.title, language)
            .stylesheet(&styles)
            .inline_script(format!("window.COURSEPACK_LAUNCH = {};", inline_json(&launch)?))
            .head_script(&script)
            .body_class("launcher")
            .body_attr("data-lesson-id", &lesson.id)
            .render(&format!(
                "<iframe class=\"lesson-frame\" src=\"content.html\" title=\"{}\"></iframe>\n",
                escape_html(&lesson.title)
            ));

        let content = PageShell::new(&lesson.title, language)
            .stylesheet(&styles)
            .body_attr("data-lesson-id", &lesson.id)
            .script(&script)
            .render(&lesson_body(entry, self.format()));

        Ok(vec![
            (Self::launcher_path(entry), launcher),
            (Self::content_path(entry), content),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Lesson, Module};

    fn course() -> Course {
        Course::new("c1", "Course").with_module(
            Module::new("m1", "Intro").with_lesson(
                Lesson::new("l1", "Welcome").with_block(Block::heading("h", 0, 1, "Welcome")),
            ),
        )
    }

    #[test]
    fn test_course_id_required() {
        let mut errors = Vec::new();
        ScormExporter::new(ScormVersion::V1_2).extra_checks(&Course::new("", "T"), &mut errors);
        assert_eq!(errors, ["Course id is required for SCORM export"]);
    }

    #[test]
    fn test_version_mismatch_note() {
        let mut settings = ExportSettings::default();
        settings.scorm.version = Some(ScormVersion::V2004);
        let exporter = ScormExporter::new(ScormVersion::V1_2);
        assert_eq!(exporter.notes(&settings).len(), 1);

        settings.scorm.version = Some(ScormVersion::V1_2);
        assert!(exporter.notes(&settings).is_empty());
    }

    #[test]
    fn test_lesson_pages() {
        let course = course();
        let settings = ExportSettings::default().with_time_limit(20);
        let ctx = ExportContext::new(&course, &settings);
        let plan = CoursePlan::new(&course).unwrap();
        let exporter = ScormExporter::new(ScormVersion::V2004);

        let pages = exporter.lesson_files(&plan, &plan.lessons()[0], &ctx).unwrap();
        assert_eq!(pages[0].0, "content/l1/index.html");
        assert_eq!(pages[1].0, "content/l1/content.html");

        let launcher = &pages[0].1;
        assert!(launcher.contains("window.COURSEPACK_LAUNCH = {"));
        assert!(launcher.contains("\"timeLimitSeconds\":1200"));
        assert!(launcher.contains("\"passingScore\":80"));
        assert!(launcher.contains("src=\"content.html\""));
        assert!(launcher.contains("src=\"../../shared/scripts/scorm-api.js\""));

        let content = &pages[1].1;
        assert!(content.contains("<h1>Welcome</h1>"));
        assert!(content.contains("href=\"../../shared/css/styles.css\""));
    }

    #[test]
    fn test_package_files() {
        let course = course();
        let settings = ExportSettings::default();
        let ctx = ExportContext::new(&course, &settings);
        let plan = CoursePlan::new(&course).unwrap();
        let mut files = FileTree::new();
        ScormExporter::new(ScormVersion::V1_2)
            .package_files(&plan, &ctx, &mut files)
            .unwrap();

        for path in [MANIFEST, SCRIPT, STYLES, CATALOG, "README.txt"] {
            assert!(files.contains(path), "{path}");
        }
        let manifest = String::from_utf8(files.get(MANIFEST).unwrap().to_vec()).unwrap();
        assert!(manifest.contains("href=\"content/l1/index.html\""));
        assert!(manifest.contains("<file href=\"content/l1/content.html\"/>"));
    }
}
