//! Content block renderer - turns parsed blocks into HTML fragments.
//!
//! Every text field is passed through [`escape_html`] before it is embedded.
//! Interactive blocks call the target's answer hook (see
//! [`Format::answer_hook`]) from inline handlers; everything else renders the
//! same for every target.
//!
//! # Example
//!
//! ```
//! use coursepack::Format;
//! use coursepack::model::Block;
//! use coursepack::render::render_block;
//!
//! let html = render_block(&Block::heading("b1", 0, 1, "Welcome"), Format::Html5);
//! assert!(html.contains("<h1>Welcome</h1>"));
//! ```

use crate::format::Format;
use crate::model::{Block, BlockContent, FillInBlank, MultipleChoice, Section};
use crate::util::escape_html;

/// Render a single block, wrapped in its container element.
pub fn render_block(block: &Block, target: Format) -> String {
    let mut ctx = RenderContext {
        out: String::with_capacity(256),
        target,
        block,
    };
    ctx.block();
    ctx.out
}

/// Render blocks in the given order, one container per block.
pub fn render_blocks(blocks: &[&Block], target: Format) -> String {
    blocks
        .iter()
        .map(|block| render_block(block, target))
        .collect::<Vec<_>>()
        .join("\n")
}

struct RenderContext<'a> {
    out: String,
    target: Format,
    block: &'a Block,
}

impl RenderContext<'_> {
    fn block(&mut self) {
        let tag = self.block.tag();
        let class = match &self.block.content {
            BlockContent::Unknown { .. } => "unknown".to_string(),
            _ => tag.to_string(),
        };

        self.out.push_str(&format!(
            "<div class=\"block block-{}\" data-block-id=\"{}\" data-block-type=\"{}\">\n",
            escape_html(&class),
            escape_html(&self.block.id),
            escape_html(tag)
        ));

        match &self.block.content {
            BlockContent::Paragraph { text } => {
                self.out.push_str(&format!("<p>{}</p>", multiline(text)));
            }
            BlockContent::Heading { level, text } => {
                let level = (*level).clamp(1, 6);
                self.out
                    .push_str(&format!("<h{level}>{}</h{level}>", escape_html(text)));
            }
            BlockContent::Image { src, alt, caption } => self.image(src, alt, caption.as_deref()),
            BlockContent::Video {
                src,
                title,
                caption,
                poster,
            } => self.video(src, title.as_deref(), caption.as_deref(), poster.as_deref()),
            BlockContent::Quote { text, citation } => {
                self.out.push_str("<blockquote>\n");
                self.out.push_str(&format!("<p>{}</p>\n", multiline(text)));
                if let Some(citation) = citation {
                    self.out
                        .push_str(&format!("<cite>{}</cite>\n", escape_html(citation)));
                }
                self.out.push_str("</blockquote>");
            }
            BlockContent::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                self.out.push_str(&format!("<{tag}>\n"));
                for item in items {
                    self.out
                        .push_str(&format!("  <li>{}</li>\n", escape_html(item)));
                }
                self.out.push_str(&format!("</{tag}>"));
            }
            BlockContent::Divider => self.out.push_str("<hr>"),
            BlockContent::Accordion { sections } => self.accordion(sections),
            BlockContent::Tabs { tabs } => self.tabs(tabs),
            BlockContent::MultipleChoice(question) => self.multiple_choice(question),
            BlockContent::FillInBlank(question) => self.fill_in_blank(question),
            BlockContent::Unknown { tag, .. } => {
                self.out.push_str(&format!(
                    "<p class=\"placeholder\">[{} content]</p>",
                    escape_html(tag)
                ));
            }
        }

        self.out.push_str("\n</div>");
    }

    fn image(&mut self, src: &str, alt: &str, caption: Option<&str>) {
        if src.trim().is_empty() {
            self.out
                .push_str("<p class=\"placeholder\">[image unavailable]</p>");
            return;
        }

        self.out.push_str("<figure>\n");
        self.out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">\n",
            escape_html(src),
            escape_html(alt)
        ));
        if let Some(caption) = caption {
            self.out
                .push_str(&format!("<figcaption>{}</figcaption>\n", escape_html(caption)));
        }
        self.out.push_str("</figure>");
    }

    fn video(&mut self, src: &str, title: Option<&str>, caption: Option<&str>, poster: Option<&str>) {
        if src.trim().is_empty() {
            self.out
                .push_str("<p class=\"placeholder\">[video unavailable]</p>");
            return;
        }

        self.out.push_str("<figure>\n<video controls preload=\"metadata\"");
        self.out.push_str(&format!(" src=\"{}\"", escape_html(src)));
        if let Some(poster) = poster {
            self.out
                .push_str(&format!(" poster=\"{}\"", escape_html(poster)));
        }
        if let Some(title) = title {
            self.out.push_str(&format!(" title=\"{}\"", escape_html(title)));
        }
        self.out.push_str(&format!(
            "><a href=\"{}\">Download video</a></video>\n",
            escape_html(src)
        ));
        if let Some(caption) = caption {
            self.out
                .push_str(&format!("<figcaption>{}</figcaption>\n", escape_html(caption)));
        }
        self.out.push_str("</figure>");
    }

    fn accordion(&mut self, sections: &[Section]) {
        self.out.push_str("<div class=\"accordion\">\n");
        for section in sections {
            self.out.push_str(&format!(
                "<details class=\"accordion-section\">\n<summary>{}</summary>\n<div class=\"accordion-body\">{}</div>\n</details>\n",
                escape_html(&section.title),
                multiline(&section.content)
            ));
        }
        self.out.push_str("</div>");
    }

    /// Tabs switch via `:target`, so they work without any runtime script.
    fn tabs(&mut self, tabs: &[Section]) {
        let base = format!("{}-tab", self.block.id);

        self.out.push_str("<div class=\"tabs\">\n<nav class=\"tab-list\">\n");
        for (i, tab) in tabs.iter().enumerate() {
            self.out.push_str(&format!(
                "  <a class=\"tab\" href=\"#{}-{i}\">{}</a>\n",
                escape_html(&base),
                escape_html(&tab.title)
            ));
        }
        self.out.push_str("</nav>\n");
        for (i, tab) in tabs.iter().enumerate() {
            self.out.push_str(&format!(
                "<section class=\"tab-panel\" id=\"{}-{i}\">\n<h4 class=\"tab-title\">{}</h4>\n<div>{}</div>\n</section>\n",
                escape_html(&base),
                escape_html(&tab.title),
                multiline(&tab.content)
            ));
        }
        self.out.push_str("</div>");
    }

    fn multiple_choice(&mut self, question: &MultipleChoice) {
        let id = js_string_attr(&self.block.id);
        let hook = self.target.answer_hook();

        self.out.push_str(&format!(
            "<div class=\"question multiple-choice\" data-question-id=\"{}\" data-allow-multiple=\"{}\">\n",
            escape_html(&self.block.id),
            question.allow_multiple
        ));
        self.out.push_str(&format!(
            "<p class=\"question-text\">{}</p>\n<ol class=\"choices\">\n",
            escape_html(&question.question)
        ));
        for (i, choice) in question.choices.iter().enumerate() {
            self.out.push_str(&format!(
                "  <li><button type=\"button\" class=\"choice\" data-choice-index=\"{i}\" onclick=\"{hook}({id}, {i}, {}, this)\">{}</button></li>\n",
                choice.correct,
                escape_html(&choice.text)
            ));
        }
        self.out.push_str("</ol>\n");
        self.feedback(question.explanation.as_deref());
        self.out.push_str("</div>");
    }

    fn fill_in_blank(&mut self, question: &FillInBlank) {
        let id = js_string_attr(&self.block.id);
        let hook = self.target.answer_hook();
        let answers = serde_json::to_string(&question.answers).unwrap_or_else(|_| "[]".into());

        self.out.push_str(&format!(
            "<div class=\"question fill-in-blank\" data-question-id=\"{}\" data-answers=\"{}\" data-case-sensitive=\"{}\">\n",
            escape_html(&self.block.id),
            escape_html(&answers),
            question.case_sensitive
        ));
        self.out.push_str(&format!(
            "<label><span class=\"question-text\">{}</span>\n<input type=\"text\" class=\"blank-input\" autocomplete=\"off\"></label>\n",
            escape_html(&question.prompt)
        ));
        self.out.push_str(&format!(
            "<button type=\"button\" class=\"check-answer\" onclick=\"{hook}({id}, this.parentNode.querySelector('.blank-input').value, null, this)\">Check answer</button>\n"
        ));
        self.feedback(question.explanation.as_deref());
        self.out.push_str("</div>");
    }

    fn feedback(&mut self, explanation: Option<&str>) {
        self.out
            .push_str("<div class=\"feedback\" aria-live=\"polite\" hidden></div>\n");
        if let Some(explanation) = explanation {
            self.out.push_str(&format!(
                "<div class=\"explanation\" hidden>{}</div>\n",
                multiline(explanation)
            ));
        }
    }
}

/// Escape text and keep author line breaks.
fn multiline(text: &str) -> String {
    escape_html(text).replace('\n', "<br>\n")
}

/// A JS string literal, escaped again for an HTML attribute.
fn js_string_attr(value: &str) -> String {
    let literal = serde_json::to_string(value).unwrap_or_else(|_| "\"\"".into());
    escape_html(&literal)
}
