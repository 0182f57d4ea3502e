//! xAPI package descriptor (`tincan.xml`).

use crate::util::escape_xml;

use super::{ActivityIds, ManifestMetadata, ModuleItem, activity_types};

const NAMESPACE: &str = "http://projecttincan.com/tincan.xsd";

#[derive(Debug, Clone)]
pub struct TinCanManifest {
    pub language: String,
    pub activities: Vec<TinCanActivity>,
}

#[derive(Debug, Clone)]
pub struct TinCanActivity {
    pub id: String,
    pub activity_type: &'static str,
    pub name: String,
    pub description: String,
    /// Only the course activity is launchable.
    pub launch: Option<String>,
}

impl TinCanManifest {
    /// The course activity comes first, then each module followed by its
    /// lessons.
    pub fn build(
        metadata: &ManifestMetadata,
        modules: &[ModuleItem],
        ids: &ActivityIds,
        launch: &str,
    ) -> Self {
        let mut activities = vec![TinCanActivity {
            id: ids.course().to_string(),
            activity_type: activity_types::COURSE,
            name: metadata.title.clone(),
            description: metadata.description.clone(),
            launch: Some(launch.to_string()),
        }];

        for module in modules {
            activities.push(TinCanActivity {
                id: ids.module(&module.id),
                activity_type: activity_types::MODULE,
                name: module.title.clone(),
                description: module.description.clone().unwrap_or_default(),
                launch: None,
            });
            for lesson in &module.lessons {
                activities.push(TinCanActivity {
                    id: ids.lesson(&lesson.id),
                    activity_type: activity_types::LESSON,
                    name: lesson.title.clone(),
                    description: lesson.description.clone().unwrap_or_default(),
                    launch: None,
                });
            }
        }

        TinCanManifest {
            language: metadata.language.clone(),
            activities,
        }
    }

    pub fn to_xml(&self) -> String {
        let lang = escape_xml(&self.language);
        let mut xml = String::with_capacity(2048);

        xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
        xml.push_str(&format!("<tincan xmlns=\"{NAMESPACE}\">\n  <activities>\n"));
        for activity in &self.activities {
            xml.push_str(&format!(
                "    <activity id=\"{}\" type=\"{}\">\n",
                escape_xml(&activity.id),
                activity.activity_type
            ));
            xml.push_str(&format!(
                "      <name lang=\"{lang}\">{}</name>\n",
                escape_xml(&activity.name)
            ));
            xml.push_str(&format!(
                "      <description lang=\"{lang}\">{}</description>\n",
                escape_xml(&activity.description)
            ));
            if let Some(ref launch) = activity.launch {
                xml.push_str(&format!(
                    "      <launch lang=\"{lang}\">{}</launch>\n",
                    escape_xml(launch)
                ));
            }
            xml.push_str("    </activity>\n");
        }
        xml.push_str("  </activities>\n</tincan>\n");
        xml
    }
}
