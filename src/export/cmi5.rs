//! cmi5 packages.
//!
//! Every lesson is an assignable unit launched from `au/<lesson>/index.html`.
//! The AU page is self-contained: it carries its launch settings and its
//! content, and loads the shared cmi5 runtime.

use crate::error::Result;
use crate::format::Format;
use crate::manifest::{ActivityIds, CourseStructure, ManifestMetadata};
use crate::runtime::{Cmi5Launch, cmi5_au, inline_json};

use super::css::STYLESHEET;
use super::pages::{PageShell, lesson_body};
use super::plan::{CoursePlan, LessonEntry};
use super::readme::readme;
use super::{ExportContext, Exporter, FileTree};

const STRUCTURE: &str = "cmi5.xml";
const SCRIPT: &str = "shared/js/cmi5-au.js";
const STYLES: &str = "shared/css/styles.css";

#[derive(Debug, Clone, Copy, Default)]
pub struct Cmi5Exporter;

impl Cmi5Exporter {
    pub fn new() -> Self {
        Self
    }

    fn au_path(entry: &LessonEntry<'_>) -> String {
        format!("au/{}/index.html", entry.segment)
    }

    /// Mastery score as a 0.0-1.0 fraction, or `None` when no passing score
    /// is set.
    fn mastery(ctx: &ExportContext<'_>) -> Option<f64> {
        let scorm = &ctx.settings.scorm;
        (scorm.passing_score > 0).then(|| scorm.mastery_fraction())
    }
}

impl Exporter for Cmi5Exporter {
    fn format(&self) -> Format {
        Format::Cmi5
    }

    fn package_files(
        &self,
        plan: &CoursePlan<'_>,
        ctx: &ExportContext<'_>,
        files: &mut FileTree,
    ) -> Result<()> {
        let ids = ActivityIds::new(ctx.settings.xapi.prefix(), &ctx.course.id);
        let metadata = ManifestMetadata::from_course(ctx.course, ctx.generated_at);
        let outline = plan.outline(Self::au_path, |_| Vec::new());
        let structure = CourseStructure::build(&metadata, &outline, &ids, Self::mastery(ctx));

        files.insert(STRUCTURE, structure.to_xml())?;
        files.insert(
            SCRIPT,
            cmi5_au(&ctx.settings.xapi, ctx.course.language_or_default())?,
        )?;
        files.insert(STYLES, STYLESHEET)?;
        files.insert(
            "README.txt",
            readme(
                plan,
                ctx,
                Format::Cmi5,
                "Import this zip file into a cmi5-conformant LMS. The LMS reads cmi5.xml\n\
                 from the root of the archive and launches each assignable unit with its\n\
                 endpoint, fetch URL, actor and registration.",
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
        let ids = ActivityIds::new(ctx.settings.xapi.prefix(), &ctx.course.id);
        let launch = Cmi5Launch {
            activity_id: ids.lesson(&lesson.id),
            lesson_id: lesson.id.clone(),
            mastery_score: Self::mastery(ctx),
        };

        let mut body = lesson_body(entry, Format::Cmi5);
        body.push_str(
            "<p class=\"lesson-exit\"><button type=\"button\" class=\"button\" onclick=\"cmi5Exit()\">Exit lesson</button></p>\n",
        );

        let page = PageShell::new(&lesson.title, ctx.course.language_or_default())
            .stylesheet(&format!("../../{STYLES}"))
            .inline_script(format!("window.COURSEPACK_LAUNCH = {};", inline_json(&launch)?))
            .body_attr("data-lesson-id", &lesson.id)
            .script(&format!("../../{SCRIPT}"))
            .render(&body);

        Ok(vec![(Self::au_path(entry), page)])
    }
}
