//! HTML5 bundle descriptor (`manifest.json`).

use serde::Serialize;

use crate::error::Result;

use super::{ManifestMetadata, ModuleItem, ResourceRef};

/// Name written into the `generator` field.
const GENERATOR: &str = concat!("coursepack ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebManifest {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub generator: &'static str,
    pub generated_at: String,
    pub start_url: String,
    pub modules: Vec<WebManifestModule>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebManifestModule {
    pub id: String,
    pub title: String,
    pub lessons: Vec<WebManifestLesson>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebManifestLesson {
    pub id: String,
    pub title: String,
    pub href: String,
    pub duration_minutes: u32,
    pub resources: Vec<ResourceRef>,
}

impl WebManifest {
    pub fn build(metadata: &ManifestMetadata, modules: &[ModuleItem], start_url: &str) -> Self {
        WebManifest {
            id: metadata.identifier.clone(),
            name: metadata.title.clone(),
            description: metadata.description.clone(),
            version: metadata.version.clone(),
            language: metadata.language.clone(),
            author: metadata.author.clone(),
            generator: GENERATOR,
            generated_at: metadata.generated_at.clone(),
            start_url: start_url.to_string(),
            modules: modules
                .iter()
                .map(|module| WebManifestModule {
                    id: module.id.clone(),
                    title: module.title.clone(),
                    lessons: module
                        .lessons
                        .iter()
                        .map(|lesson| WebManifestLesson {
                            id: lesson.id.clone(),
                            title: lesson.title.clone(),
                            href: lesson.launch.clone(),
                            duration_minutes: lesson.duration_minutes,
                            resources: lesson.resources.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
