//! Standalone HTML5 bundles.
//!
//! No LMS involved: the bundle opens from `index.html` and keeps progress in
//! the browser's local storage.

use crate::error::Result;
use crate::format::Format;
use crate::manifest::{ManifestMetadata, WebManifest};
use crate::runtime::{NavigationConfig, navigation};

use super::css::STYLESHEET;
use super::pages::{PageShell, course_index, lesson_body, lesson_nav};
use super::plan::{CoursePlan, LessonEntry};
use super::{ExportContext, Exporter, FileTree};

const INDEX: &str = "index.html";
const NAVIGATION: &str = "js/navigation.js";
const STYLES: &str = "css/styles.css";
const MANIFEST: &str = "manifest.json";

#[derive(Debug, Clone, Copy, Default)]
pub struct Html5Exporter;

impl Html5Exporter {
    pub fn new() -> Self {
        Self
    }

    fn lesson_path(entry: &LessonEntry<'_>) -> String {
        format!("lessons/{}.html", entry.segment)
    }
}

impl Exporter for Html5Exporter {
    fn format(&self) -> Format {
        Format::Html5
    }

    fn package_files(
        &self,
        plan: &CoursePlan<'_>,
        ctx: &ExportContext<'_>,
        files: &mut FileTree,
    ) -> Result<()> {
        let course = ctx.course;
        let metadata = ManifestMetadata::from_course(course, ctx.generated_at);
        let outline = plan.outline(Self::lesson_path, |_| Vec::new());

        files.insert(MANIFEST, WebManifest::build(&metadata, &outline, INDEX).to_json()?)?;
        files.insert(
            NAVIGATION,
            navigation(&NavigationConfig::new(&course.id, plan.lesson_ids()))?,
        )?;
        files.insert(STYLES, STYLESHEET)?;

        let index = PageShell::new(&course.title, course.language_or_default())
            .stylesheet(STYLES)
            .script(NAVIGATION)
            .render(&course_index(plan, Self::lesson_path, ""));
        files.insert(INDEX, index)?;
        Ok(())
    }

    fn lesson_files<'a>(
        &self,
        plan: &CoursePlan<'a>,
        entry: &LessonEntry<'a>,
        ctx: &ExportContext<'_>,
    ) -> Result<Vec<(String, String)>> {
        let lesson = entry.lesson;
        let mut body = lesson_body(entry, Format::Html5);
        body.push_str(&lesson_nav(plan, entry, "../index.html", |e| {
            format!("{}.html", e.segment)
        }));

        let page = PageShell::new(&lesson.title, ctx.course.language_or_default())
            .stylesheet("../css/styles.css")
            .body_attr("data-lesson-id", &lesson.id)
            .script("../js/navigation.js")
            .render(&body);

        Ok(vec![(Self::lesson_path(entry), page)])
    }
}
