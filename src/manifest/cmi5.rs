//! cmi5 course structure (`cmi5.xml`).
//!
//! Modules become `<block>` elements and lessons become assignable units
//! (`<au>`). Every AU is launched from its own page inside the package.

use crate::util::escape_xml;

use super::{ActivityIds, ManifestMetadata, ModuleItem, activity_types};

const NAMESPACE: &str = "https://w3id.org/xapi/profiles/cmi5/v1/CourseStructure.xsd";

#[derive(Debug, Clone)]
pub struct CourseStructure {
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub language: String,
    pub blocks: Vec<StructureBlock>,
}

#[derive(Debug, Clone)]
pub struct StructureBlock {
    pub id: String,
    pub title: String,
    pub description: String,
    pub units: Vec<AssignableUnit>,
}

#[derive(Debug, Clone)]
pub struct AssignableUnit {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    /// Passing score as a 0.0-1.0 fraction.
    pub mastery_score: Option<f64>,
    pub move_on: &'static str,
}

impl CourseStructure {
    pub fn build(
        metadata: &ManifestMetadata,
        modules: &[ModuleItem],
        ids: &ActivityIds,
        mastery_score: Option<f64>,
    ) -> Self {
        let blocks = modules
            .iter()
            .filter(|m| !m.lessons.is_empty())
            .map(|module| StructureBlock {
                id: ids.module(&module.id),
                title: module.title.clone(),
                description: module.description.clone().unwrap_or_default(),
                units: module
                    .lessons
                    .iter()
                    .map(|lesson| AssignableUnit {
                        id: ids.lesson(&lesson.id),
                        title: lesson.title.clone(),
                        description: lesson.description.clone().unwrap_or_default(),
                        url: lesson.launch.clone(),
                        mastery_score,
                        move_on: if mastery_score.is_some() {
                            "CompletedOrPassed"
                        } else {
                            "Completed"
                        },
                    })
                    .collect(),
            })
            .collect();

        CourseStructure {
            course_id: ids.course().to_string(),
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            language: metadata.language.clone(),
            blocks,
        }
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(2048);
        let lang = escape_xml(&self.language);
        let langstring =
            |s: &str| format!("<langstring lang=\"{lang}\">{}</langstring>", escape_xml(s));

        xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        xml.push_str(&format!("<courseStructure xmlns=\"{NAMESPACE}\">\n"));
        xml.push_str(&format!(
            "  <course id=\"{}\">\n    <title>{}</title>\n    <description>{}</description>\n  </course>\n",
            escape_xml(&self.course_id),
            langstring(&self.title),
            langstring(&self.description)
        ));

        for block in &self.blocks {
            xml.push_str(&format!(
                "  <block id=\"{}\">\n    <title>{}</title>\n    <description>{}</description>\n",
                escape_xml(&block.id),
                langstring(&block.title),
                langstring(&block.description)
            ));
            for au in &block.units {
                xml.push_str(&format!(
                    "    <au id=\"{}\" moveOn=\"{}\" launchMethod=\"AnyWindow\" activityType=\"{}\"",
                    escape_xml(&au.id),
                    au.move_on,
                    activity_types::LESSON
                ));
                if let Some(score) = au.mastery_score {
                    xml.push_str(&format!(" masteryScore=\"{score}\""));
                }
                xml.push_str(&format!(
                    ">\n      <title>{}</title>\n      <description>{}</description>\n      <url>{}</url>\n    </au>\n",
                    langstring(&au.title),
                    langstring(&au.description),
                    escape_xml(&au.url)
                ));
            }
            xml.push_str("  </block>\n");
        }

        xml.push_str("</courseStructure>\n");
        xml
    }
}
