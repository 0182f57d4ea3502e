use serde::Deserialize;

use super::block::Block;

/// A course: the root of the model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub version: String,
    pub language: String,
    pub metadata: CourseMetadata,
    /// Total duration in minutes.
    pub total_duration: u32,
    pub modules: Vec<Module>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Descriptive course metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseMetadata {
    pub author: Option<String>,
    pub copyright: Option<String>,
    pub organization: Option<String>,
    pub license: Option<String>,
    pub keywords: Vec<String>,
}

/// An ordered group of lessons.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub order: i64,
    pub lessons: Vec<Lesson>,
}

/// One launchable unit of content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub order: i64,
    /// Duration in minutes.
    pub duration: u32,
    pub content_type: String,
    pub blocks: Vec<Block>,
    pub resources: Vec<Resource>,
}

/// A file attached to a lesson.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub filename: String,
}

impl Course {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.metadata.author = Some(author.into());
        self
    }

    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Number of lessons across all modules.
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Language tag, falling back to `en`.
    pub fn language_or_default(&self) -> &str {
        if self.language.trim().is_empty() {
            "en"
        } else {
            &self.language
        }
    }

    /// Version string, falling back to `1.0`.
    pub fn version_or_default(&self) -> &str {
        if self.version.trim().is_empty() {
            "1.0"
        } else {
            &self.version
        }
    }
}

impl Module {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_lesson(mut self, lesson: Lesson) -> Self {
        self.lessons.push(lesson);
        self
    }

    /// Lessons sorted by their `order` field. Ties keep input order.
    pub fn ordered_lessons(&self) -> Vec<&Lesson> {
        let mut lessons: Vec<&Lesson> = self.lessons.iter().collect();
        lessons.sort_by_key(|l| l.order);
        lessons
    }
}

impl Lesson {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Blocks sorted by their `order` field. Ties keep input order.
    pub fn ordered_blocks(&self) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self.blocks.iter().collect();
        blocks.sort_by_key(|b| b.order);
        blocks
    }
}

impl Resource {
    pub fn new(id: impl Into<String>, filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// A resource with neither a file name nor a URL has no record to point at.
    pub fn is_present(&self) -> bool {
        !self.filename.trim().is_empty() || !self.url.trim().is_empty()
    }
}
