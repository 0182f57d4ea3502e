//! xAPI (Tin Can) packages.
//!
//! A course index launches the package; each lesson is a page under
//! `lessons/`. Statements go to the LRS named in the launch URL.

use crate::error::Result;
use crate::format::Format;
use crate::manifest::{ActivityIds, ManifestMetadata, TinCanManifest};
use crate::runtime::{
    LessonActivity, NavigationConfig, navigation, statement_templates, xapi_wrapper,
};
use crate::util::escape_html;

use super::css::STYLESHEET;
use super::pages::{PageShell, course_index, lesson_body, lesson_nav};
use super::plan::{CoursePlan, LessonEntry};
use super::{ExportContext, Exporter, FileTree};

const DESCRIPTOR: &str = "tincan.xml";
const INDEX: &str = "index.html";
const WRAPPER: &str = "js/xapi-wrapper.js";
const TEMPLATES: &str = "js/statement-templates.js";
const NAVIGATION: &str = "js/navigation.js";
const STYLES: &str = "css/styles.css";

#[derive(Debug, Clone, Copy, Default)]
pub struct XapiExporter;

impl XapiExporter {
    pub fn new() -> Self {
        Self
    }

    fn lesson_path(entry: &LessonEntry<'_>) -> String {
        format!("lessons/{}.html", entry.segment)
    }

    fn activity_ids(ctx: &ExportContext<'_>) -> ActivityIds {
        ActivityIds::new(ctx.settings.xapi.prefix(), &ctx.course.id)
    }
}

impl Exporter for XapiExporter {
    fn format(&self) -> Format {
        Format::Xapi
    }

    fn package_files(
        &self,
        plan: &CoursePlan<'_>,
        ctx: &ExportContext<'_>,
        files: &mut FileTree,
    ) -> Result<()> {
        let course = ctx.course;
        let language = course.language_or_default();
        let ids = Self::activity_ids(ctx);
        let metadata = ManifestMetadata::from_course(course, ctx.generated_at);
        let outline = plan.outline(Self::lesson_path, |_| Vec::new());

        let lessons: Vec<LessonActivity> = plan
            .lessons()
            .iter()
            .map(|entry| LessonActivity {
                id: ids.lesson(&entry.lesson.id),
                lesson_id: entry.lesson.id.clone(),
                module_id: entry.module.id.clone(),
                name: entry.lesson.title.clone(),
                href: Self::lesson_path(entry),
            })
            .collect();

        files.insert(
            DESCRIPTOR,
            TinCanManifest::build(&metadata, &outline, &ids, INDEX).to_xml(),
        )?;
        files.insert(WRAPPER, xapi_wrapper(&ctx.settings.xapi, &ids, language)?)?;
        files.insert(TEMPLATES, statement_templates(&ids, &course.title, &lessons)?)?;
        files.insert(
            NAVIGATION,
            navigation(&NavigationConfig::new(&course.id, plan.lesson_ids()))?,
        )?;
        files.insert(STYLES, STYLESHEET)?;

        let footer = "<p><button type=\"button\" class=\"button finish\" onclick=\"finishCourse()\">Finish course</button></p>\n";
        let index = PageShell::new(&course.title, language)
            .stylesheet(STYLES)
            .script(TEMPLATES)
            .script(NAVIGATION)
            .script(WRAPPER)
            .render(&course_index(plan, Self::lesson_path, footer));
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
        let mut body = lesson_body(entry, Format::Xapi);
        body.push_str(&format!(
            "<p class=\"lesson-complete\"><button type=\"button\" class=\"button\" onclick=\"markLessonComplete({})\">Mark lesson complete</button></p>\n",
            escape_html(&serde_json::to_string(&lesson.id)?)
        ));
        body.push_str(&lesson_nav(plan, entry, "../index.html", |e| {
            format!("{}.html", e.segment)
        }));

        let page = PageShell::new(&lesson.title, ctx.course.language_or_default())
            .stylesheet("../css/styles.css")
            .body_attr("data-lesson-id", &lesson.id)
            .script("../js/statement-templates.js")
            .script("../js/navigation.js")
            .script("../js/xapi-wrapper.js")
            .render(&body);

        Ok(vec![(Self::lesson_path(entry), page)])
    }
}
