//! HTML page shells shared by the exporters.

use crate::format::Format;
use crate::render::render_blocks;
use crate::util::{encode_href, escape_html};

use super::plan::{CoursePlan, LessonEntry};

/// Builder for a complete HTML document.
#[derive(Debug, Default)]
pub struct PageShell {
    title: String,
    language: String,
    stylesheet: Option<String>,
    head_scripts: Vec<String>,
    inline_scripts: Vec<String>,
    scripts: Vec<String>,
    body_class: Option<&'static str>,
    body_attrs: Vec<(&'static str, String)>,
}

impl PageShell {
    pub fn new(title: &str, language: &str) -> Self {
        Self {
            title: title.to_string(),
            language: language.to_string(),
            ..Default::default()
        }
    }

    pub fn stylesheet(mut self, href: &str) -> Self {
        self.stylesheet = Some(href.to_string());
        self
    }

    /// Script loaded at the end of `<body>`.
    pub fn script(mut self, src: &str) -> Self {
        self.scripts.push(src.to_string());
        self
    }

    /// Script loaded in `<head>`, before the page is parsed.
    pub fn head_script(mut self, src: &str) -> Self {
        self.head_scripts.push(src.to_string());
        self
    }

    /// Inline script placed in `<head>` ahead of every external script.
    /// The caller is responsible for escaping.
    pub fn inline_script(mut self, js: String) -> Self {
        self.inline_scripts.push(js);
        self
    }

    pub fn body_class(mut self, class: &'static str) -> Self {
        self.body_class = Some(class);
        self
    }

    pub fn body_attr(mut self, name: &'static str, value: &str) -> Self {
        self.body_attrs.push((name, value.to_string()));
        self
    }

    pub fn render(&self, body: &str) -> String {
        let mut html = String::with_capacity(body.len() + 1024);
        html.push_str("<!DOCTYPE html>\n");
        html.push_str(&format!(
            "<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n",
            escape_html(&self.language)
        ));
        html.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        );
        html.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        if let Some(ref href) = self.stylesheet {
            html.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{}\">\n",
                escape_html(href)
            ));
        }
        for js in &self.inline_scripts {
            html.push_str(&format!("<script>\n{js}\n</script>\n"));
        }
        for src in &self.head_scripts {
            html.push_str(&format!("<script src=\"{}\"></script>\n", escape_html(src)));
        }
        html.push_str("</head>\n<body");
        if let Some(class) = self.body_class {
            html.push_str(&format!(" class=\"{class}\""));
        }
        for (name, value) in &self.body_attrs {
            html.push_str(&format!(" {name}=\"{}\"", escape_html(value)));
        }
        html.push_str(">\n");
        html.push_str(body);
        for src in &self.scripts {
            html.push_str(&format!("<script src=\"{}\"></script>\n", escape_html(src)));
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

/// The lesson header, rendered blocks, and resource list.
pub fn lesson_body(entry: &LessonEntry<'_>, format: Format) -> String {
    let lesson = entry.lesson;
    let mut html = String::with_capacity(4096);

    html.push_str("<header class=\"lesson-header\">\n");
    html.push_str(&format!(
        "<p class=\"module-title\">{}</p>\n<h1 class=\"lesson-title\">{}</h1>\n",
        escape_html(&entry.module.title),
        escape_html(&lesson.title)
    ));
    if let Some(ref description) = lesson.description
        && !description.trim().is_empty()
    {
        html.push_str(&format!(
            "<p class=\"lesson-description\">{}</p>\n",
            escape_html(description)
        ));
    }
    html.push_str("</header>\n");

    html.push_str(&format!(
        "<main class=\"lesson-content\" id=\"lesson-{}\">\n",
        escape_html(&entry.segment)
    ));
    html.push_str(&render_blocks(&entry.blocks, format));
    html.push('\n');

    if !entry.resources.is_empty() {
        html.push_str("<section class=\"resources\">\n<h2>Resources</h2>\n<ul>\n");
        for resource in &entry.resources {
            let target = if resource.url.trim().is_empty() {
                encode_href(resource.filename.trim())
            } else {
                resource.url.trim().to_string()
            };
            let label = if resource.filename.trim().is_empty() {
                resource.url.trim()
            } else {
                resource.filename.trim()
            };
            html.push_str(&format!(
                "  <li><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></li>\n",
                escape_html(&target),
                escape_html(label)
            ));
        }
        html.push_str("</ul>\n</section>\n");
    }

    html.push_str("</main>\n");
    html
}

/// Previous/next links between sibling lesson pages and a link home.
///
/// `href` maps a lesson to its path relative to the current page.
pub fn lesson_nav<'a, F>(
    plan: &CoursePlan<'a>,
    entry: &LessonEntry<'a>,
    index_href: &str,
    href: F,
) -> String
where
    F: Fn(&LessonEntry<'a>) -> String,
{
    let mut html = String::from("<nav class=\"lesson-nav\" aria-label=\"Lesson navigation\">\n");
    match plan.previous(entry) {
        Some(prev) => html.push_str(&format!(
            "  <a class=\"button prev\" rel=\"prev\" href=\"{}\">&larr; {}</a>\n",
            escape_html(&href(prev)),
            escape_html(&prev.lesson.title)
        )),
        None => html.push_str("  <span></span>\n"),
    }
    html.push_str(&format!(
        "  <a class=\"button home\" href=\"{}\">Course overview</a>\n",
        escape_html(index_href)
    ));
    match plan.next(entry) {
        Some(next) => html.push_str(&format!(
            "  <a class=\"button next\" rel=\"next\" href=\"{}\">{} &rarr;</a>\n",
            escape_html(&href(next)),
            escape_html(&next.lesson.title)
        )),
        None => html.push_str("  <span></span>\n"),
    }
    html.push_str("</nav>\n");
    html
}

/// Course overview with one link per lesson.
///
/// Every lesson link carries `data-lesson-id`, which the navigation script
/// uses to mark visited lessons.
pub fn course_index<'a, F>(plan: &CoursePlan<'a>, href: F, footer: &str) -> String
where
    F: Fn(&LessonEntry<'a>) -> String,
{
    let course = plan.course();
    let mut html = String::with_capacity(2048);

    html.push_str("<header class=\"course-header\">\n");
    html.push_str(&format!(
        "<h1 class=\"course-title\">{}</h1>\n",
        escape_html(&course.title)
    ));
    if !course.description.trim().is_empty() {
        html.push_str(&format!(
            "<p class=\"course-description\">{}</p>\n",
            escape_html(&course.description)
        ));
    }
    html.push_str(
        "<div class=\"progress\" role=\"progressbar\" aria-valuemin=\"0\" aria-valuemax=\"100\">\
         <div class=\"progress-bar\" data-progress></div></div>\n",
    );
    html.push_str("</header>\n<main>\n<ol class=\"course-outline\">\n");

    for module in plan.modules() {
        let lessons = plan.module_lessons(module);
        if lessons.is_empty() {
            continue;
        }
        html.push_str(&format!(
            "  <li class=\"module\" data-module-id=\"{}\">\n    <h2>{}</h2>\n",
            escape_html(&module.module.id),
            escape_html(&module.module.title)
        ));
        if let Some(ref description) = module.module.description
            && !description.trim().is_empty()
        {
            html.push_str(&format!("    <p>{}</p>\n", escape_html(description)));
        }
        html.push_str("    <ol class=\"lesson-list\">\n");
        for entry in lessons {
            html.push_str(&format!(
                "      <li><a href=\"{}\" data-lesson-id=\"{}\">{}</a>",
                escape_html(&href(entry)),
                escape_html(&entry.lesson.id),
                escape_html(&entry.lesson.title)
            ));
            if entry.lesson.duration > 0 {
                html.push_str(&format!(
                    " <span class=\"duration\">({} min)</span>",
                    entry.lesson.duration
                ));
            }
            html.push_str("</li>\n");
        }
        html.push_str("    </ol>\n  </li>\n");
    }

    html.push_str("</ol>\n");
    html.push_str(footer);
    html.push_str("</main>\n");
    html
}
