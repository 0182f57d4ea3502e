//! Plain-text `README.txt` for LMS-bound packages.

use chrono::SecondsFormat;

use crate::format::Format;

use super::ExportContext;
use super::plan::CoursePlan;

const GENERATOR: &str = concat!("coursepack ", env!("CARGO_PKG_VERSION"));

/// Summary of the package for whoever uploads it.
pub fn readme(plan: &CoursePlan<'_>, ctx: &ExportContext<'_>, format: Format, launch: &str) -> String {
    let course = plan.course();
    let title = course.title.trim();
    let mut text = String::with_capacity(1024);

    text.push_str(title);
    text.push('\n');
    text.push_str(&"=".repeat(title.chars().count().max(1)));
    text.push_str("\n\n");

    text.push_str(&format!("Version:   {}\n", course.version_or_default()));
    if let Some(ref author) = course.metadata.author {
        text.push_str(&format!("Author:    {author}\n"));
    }
    if let Some(ref organization) = course.metadata.organization {
        text.push_str(&format!("Publisher: {organization}\n"));
    }
    text.push_str(&format!("Format:    {}\n", format.display_name()));
    text.push_str(&format!(
        "Generated: {}\n",
        ctx.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    text.push_str(&format!("Generator: {GENERATOR}\n"));

    if !course.description.trim().is_empty() {
        text.push('\n');
        text.push_str(course.description.trim());
        text.push('\n');
    }

    text.push_str("\nContents\n--------\n");
    let mut number = 0;
    for module in plan.modules() {
        let lessons = plan.module_lessons(module);
        if lessons.is_empty() {
            continue;
        }
        number += 1;
        text.push_str(&format!("{number}. {}\n", module.module.title));
        for (i, entry) in lessons.iter().enumerate() {
            text.push_str(&format!("   {number}.{} {}", i + 1, entry.lesson.title));
            if entry.lesson.duration > 0 {
                text.push_str(&format!(" ({} min)", entry.lesson.duration));
            }
            text.push('\n');
        }
    }

    text.push_str("\nInstallation\n------------\n");
    text.push_str(launch);
    text.push('\n');

    if let Some(ref copyright) = course.metadata.copyright {
        text.push_str(&format!("\n{copyright}\n"));
    }
    text
}
