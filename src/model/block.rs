//! Content blocks.
//!
//! Blocks arrive from the authoring layer as a type tag plus a loosely-typed
//! JSON payload. They are parsed once, leniently, into [`BlockContent`]:
//! missing text fields become empty strings, and sub-payloads that should be
//! arrays but are not degrade to empty lists. Tags the compiler does not know
//! are kept verbatim as [`BlockContent::Unknown`] so they can still be shown.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A content block inside a lesson.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawBlock")]
pub struct Block {
    pub id: String,
    /// Canonical sequencing key within the lesson.
    pub order: i64,
    pub content: BlockContent,
}

/// Parsed block payload.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Paragraph { text: String },
    Heading { level: u8, text: String },
    Image { src: String, alt: String, caption: Option<String> },
    Video { src: String, title: Option<String>, caption: Option<String>, poster: Option<String> },
    Quote { text: String, citation: Option<String> },
    List { ordered: bool, items: Vec<String> },
    Divider,
    Accordion { sections: Vec<Section> },
    Tabs { tabs: Vec<Section> },
    MultipleChoice(MultipleChoice),
    FillInBlank(FillInBlank),
    /// A tag this compiler does not recognize.
    Unknown { tag: String, payload: Map<String, Value> },
}

/// A titled panel (accordion section or tab).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultipleChoice {
    pub question: String,
    pub choices: Vec<Choice>,
    pub explanation: Option<String>,
    pub allow_multiple: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Choice {
    pub text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FillInBlank {
    pub prompt: String,
    pub answers: Vec<String>,
    pub case_sensitive: bool,
    pub explanation: Option<String>,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    order: i64,
    content: Value,
}

impl Default for RawBlock {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: String::new(),
            order: 0,
            content: Value::Null,
        }
    }
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        Block::from_parts(raw.id, raw.order, &raw.kind, raw.content)
    }
}

impl Block {
    pub fn new(id: impl Into<String>, order: i64, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            order,
            content,
        }
    }

    /// Parse a block from its type tag and raw payload.
    ///
    /// Never fails: unrecognized tags become [`BlockContent::Unknown`].
    pub fn from_parts(id: impl Into<String>, order: i64, tag: &str, payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            Value::String(text) => {
                let mut map = Map::new();
                map.insert("text".to_string(), Value::String(text));
                map
            }
            _ => Map::new(),
        };
        Self::new(id, order, BlockContent::parse(tag, payload))
    }

    pub fn paragraph(id: impl Into<String>, order: i64, text: impl Into<String>) -> Self {
        Self::new(id, order, BlockContent::Paragraph { text: text.into() })
    }

    pub fn heading(id: impl Into<String>, order: i64, level: u8, text: impl Into<String>) -> Self {
        Self::new(
            id,
            order,
            BlockContent::Heading {
                level: level.clamp(1, 6),
                text: text.into(),
            },
        )
    }

    /// Canonical type tag (or the raw tag for unknown blocks).
    pub fn tag(&self) -> &str {
        self.content.tag()
    }
}

impl BlockContent {
    /// Parse a payload for the given tag.
    pub fn parse(tag: &str, payload: Map<String, Value>) -> Self {
        let normalized = normalize_tag(tag);
        match normalized.as_str() {
            "paragraph" | "text" => BlockContent::Paragraph {
                text: str_field(&payload, &["text", "content", "html"]),
            },
            "heading" | "title" => BlockContent::Heading {
                level: heading_level(&payload),
                text: str_field(&payload, &["text", "content", "title"]),
            },
            "image" => BlockContent::Image {
                src: str_field(&payload, &["src", "url"]),
                alt: str_field(&payload, &["alt", "altText", "caption"]),
                caption: opt_field(&payload, &["caption"]),
            },
            "video" => BlockContent::Video {
                src: str_field(&payload, &["src", "url"]),
                title: opt_field(&payload, &["title"]),
                caption: opt_field(&payload, &["caption"]),
                poster: opt_field(&payload, &["poster", "thumbnail"]),
            },
            "quote" | "blockquote" => BlockContent::Quote {
                text: str_field(&payload, &["text", "quote", "content"]),
                citation: opt_field(&payload, &["author", "citation", "source"]),
            },
            "list" | "bullet-list" | "numbered-list" => BlockContent::List {
                ordered: normalized == "numbered-list"
                    || bool_field(&payload, &["ordered", "numbered"])
                    || str_field(&payload, &["style", "listType"]) == "ordered",
                items: array_field(&payload, &["items"])
                    .iter()
                    .map(|item| match item {
                        Value::Object(map) => str_field(map, &["text", "content"]),
                        other => value_text(other),
                    })
                    .collect(),
            },
            "divider" | "separator" => BlockContent::Divider,
            "accordion" => BlockContent::Accordion {
                sections: sections(&payload, &["sections", "items", "panels"]),
            },
            "tabs" => BlockContent::Tabs {
                tabs: sections(&payload, &["tabs", "items"]),
            },
            "multiple-choice-question" | "multiple-choice" | "mcq" => {
                BlockContent::MultipleChoice(multiple_choice(&payload))
            }
            "fill-in-blank-question" | "fill-in-blank" | "fill-in-the-blank" => {
                BlockContent::FillInBlank(fill_in_blank(&payload))
            }
            _ => BlockContent::Unknown {
                tag: tag.to_string(),
                payload,
            },
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            BlockContent::Paragraph { .. } => "paragraph",
            BlockContent::Heading { .. } => "heading",
            BlockContent::Image { .. } => "image",
            BlockContent::Video { .. } => "video",
            BlockContent::Quote { .. } => "quote",
            BlockContent::List { .. } => "list",
            BlockContent::Divider => "divider",
            BlockContent::Accordion { .. } => "accordion",
            BlockContent::Tabs { .. } => "tabs",
            BlockContent::MultipleChoice(_) => "multiple-choice-question",
            BlockContent::FillInBlank(_) => "fill-in-blank-question",
            BlockContent::Unknown { tag, .. } => tag,
        }
    }

    /// Whether the block records learner answers.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            BlockContent::MultipleChoice(_) | BlockContent::FillInBlank(_)
        )
    }
}

/// Lower-case, turn `_` and camelCase humps into `-`.
fn normalize_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len() + 4);
    for (i, c) in tag.trim().chars().enumerate() {
        if c == '_' || c == ' ' {
            out.push('-');
        } else if c.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('-') {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// First present string-ish field among `keys`, or empty.
fn str_field(map: &Map<String, Value>, keys: &[&str]) -> String {
    opt_field(map, keys).unwrap_or_default()
}

fn opt_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .map(value_text)
        .find(|s| !s.is_empty())
}

fn bool_field(map: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .any(|v| matches!(v, Value::Bool(true)) || v.as_str() == Some("true"))
}

/// First array field among `keys`; anything else degrades to empty.
fn array_field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find_map(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn heading_level(map: &Map<String, Value>) -> u8 {
    let level = match map.get("level") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(2),
        Some(Value::String(s)) => s.trim_start_matches(['h', 'H']).parse().unwrap_or(2),
        _ => 2,
    };
    level.clamp(1, 6) as u8
}

fn sections(map: &Map<String, Value>, keys: &[&str]) -> Vec<Section> {
    array_field(map, keys)
        .iter()
        .filter_map(Value::as_object)
        .map(|item| Section {
            title: str_field(item, &["title", "label", "heading"]),
            content: str_field(item, &["content", "text", "body"]),
        })
        .collect()
}

fn multiple_choice(map: &Map<String, Value>) -> MultipleChoice {
    let mut choices: Vec<Choice> = array_field(map, &["options", "choices", "answers"])
        .iter()
        .map(|option| match option {
            Value::Object(o) => Choice {
                text: str_field(o, &["text", "label", "content"]),
                correct: bool_field(o, &["correct", "isCorrect"]),
            },
            other => Choice {
                text: value_text(other),
                correct: false,
            },
        })
        .collect();

    // Correct answers may also be given by index.
    let mut indices: Vec<usize> = Vec::new();
    for key in ["correctAnswer", "correctIndex", "correctAnswers"] {
        match map.get(key) {
            Some(Value::Number(n)) => indices.extend(n.as_u64().map(|i| i as usize)),
            Some(Value::Array(items)) => {
                indices.extend(items.iter().filter_map(Value::as_u64).map(|i| i as usize))
            }
            _ => {}
        }
    }
    for index in indices {
        if let Some(choice) = choices.get_mut(index) {
            choice.correct = true;
        }
    }

    let correct_count = choices.iter().filter(|c| c.correct).count();
    MultipleChoice {
        question: str_field(map, &["question", "text", "prompt"]),
        choices,
        explanation: opt_field(map, &["explanation", "feedback"]),
        allow_multiple: bool_field(map, &["allowMultiple", "multiple"]) || correct_count > 1,
    }
}

fn fill_in_blank(map: &Map<String, Value>) -> FillInBlank {
    let mut answers: Vec<String> = array_field(map, &["answers", "correctAnswers", "blanks"])
        .iter()
        .map(value_text)
        .filter(|a| !a.is_empty())
        .collect();
    if answers.is_empty() {
        answers.extend(opt_field(map, &["answer", "correctAnswer"]));
    }

    FillInBlank {
        prompt: str_field(map, &["question", "text", "prompt", "sentence"]),
        answers,
        case_sensitive: bool_field(map, &["caseSensitive"]),
        explanation: opt_field(map, &["explanation", "feedback"]),
    }
}
