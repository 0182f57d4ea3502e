//! SCORM `imsmanifest.xml` for 1.2 and 2004.
//!
//! One builder serves both versions; namespaces, attribute spellings, and the
//! per-item tracking elements come from a schema profile picked by
//! [`ScormVersion`].

use crate::settings::ScormVersion;
use crate::util::{escape_xml, format_cmi_timespan, minutes_to_iso8601, path_segment};

use super::{ManifestMetadata, ModuleItem};

/// Identifier of the shared asset resource every SCO depends on.
const SHARED_RESOURCE_ID: &str = "SHARED-ASSETS";

// Item identifier prefixes. They must stay disjoint so lesson and module
// identifiers cannot collide.
const LESSON_ITEM_PREFIX: &str = "ITEM-";
const MODULE_ITEM_PREFIX: &str = "MODULE-";

/// Manifest IR.
#[derive(Debug, Clone)]
pub struct ScormManifest {
    pub identifier: String,
    pub version: ScormVersion,
    pub metadata: ManifestMetadata,
    pub organization: Organization,
    pub resources: Vec<ScormResource>,
}

#[derive(Debug, Clone)]
pub struct Organization {
    pub identifier: String,
    pub title: String,
    pub items: Vec<OrgItem>,
}

#[derive(Debug, Clone)]
pub struct OrgItem {
    pub identifier: String,
    pub title: String,
    pub resource_ref: Option<String>,
    /// Passing score in percent.
    pub mastery_score: Option<u8>,
    pub time_limit_minutes: Option<u32>,
    pub children: Vec<OrgItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoType {
    Sco,
    Asset,
}

#[derive(Debug, Clone)]
pub struct ScormResource {
    pub identifier: String,
    pub href: Option<String>,
    pub sco_type: ScoType,
    pub files: Vec<String>,
    pub dependencies: Vec<String>,
}

/// Tracking options applied to every SCO item.
#[derive(Debug, Clone, Default)]
pub struct ScormOptions {
    pub mastery_score: Option<u8>,
    pub time_limit_minutes: Option<u32>,
    /// Files shared by all SCOs (runtime script, stylesheet).
    pub shared_files: Vec<String>,
}

struct SchemaProfile {
    namespace: &'static str,
    adlcp: &'static str,
    extra_namespaces: &'static [(&'static str, &'static str)],
    /// (namespace, schema file, published location)
    schemas: &'static [(&'static str, &'static str, &'static str)],
    scorm_type_attr: &'static str,
}

const SCORM_12: SchemaProfile = SchemaProfile {
    namespace: "http://www.imsproject.org/xsd/imscp_rootv1p1p2",
    adlcp: "http://www.adlnet.org/xsd/adlcp_rootv1p2",
    extra_namespaces: &[],
    schemas: &[
        (
            "http://www.imsproject.org/xsd/imscp_rootv1p1p2",
            "imscp_rootv1p1p2.xsd",
            "http://www.imsglobal.org/xsd/imscp_rootv1p1p2.xsd",
        ),
        (
            "http://www.imsglobal.org/xsd/imsmd_rootv1p2p1",
            "imsmd_rootv1p2p1.xsd",
            "http://www.imsglobal.org/xsd/imsmd_rootv1p2p1.xsd",
        ),
        (
            "http://www.adlnet.org/xsd/adlcp_rootv1p2",
            "adlcp_rootv1p2.xsd",
            "http://www.adlnet.org/xsd/adlcp_rootv1p2.xsd",
        ),
    ],
    scorm_type_attr: "adlcp:scormtype",
};

const SCORM_2004: SchemaProfile = SchemaProfile {
    namespace: "http://www.imsglobal.org/xsd/imscp_v1p1",
    adlcp: "http://www.adlnet.org/xsd/adlcp_v1p3",
    extra_namespaces: &[
        ("adlseq", "http://www.adlnet.org/xsd/adlseq_v1p3"),
        ("adlnav", "http://www.adlnet.org/xsd/adlnav_v1p3"),
        ("imsss", "http://www.imsglobal.org/xsd/imsss"),
    ],
    schemas: &[
        (
            "http://www.imsglobal.org/xsd/imscp_v1p1",
            "imscp_v1p1.xsd",
            "http://www.imsglobal.org/xsd/imscp_v1p1.xsd",
        ),
        (
            "http://www.adlnet.org/xsd/adlcp_v1p3",
            "adlcp_v1p3.xsd",
            "http://www.adlnet.org/xsd/adlcp_v1p3.xsd",
        ),
        (
            "http://www.adlnet.org/xsd/adlseq_v1p3",
            "adlseq_v1p3.xsd",
            "http://www.adlnet.org/xsd/adlseq_v1p3.xsd",
        ),
        (
            "http://www.adlnet.org/xsd/adlnav_v1p3",
            "adlnav_v1p3.xsd",
            "http://www.adlnet.org/xsd/adlnav_v1p3.xsd",
        ),
        (
            "http://www.imsglobal.org/xsd/imsss",
            "imsss_v1p0.xsd",
            "http://www.imsglobal.org/xsd/imsss_v1p0.xsd",
        ),
        (
            "http://ltsc.ieee.org/xsd/LOM",
            "lom.xsd",
            "http://ltsc.ieee.org/xsd/lomv1.0/lom.xsd",
        ),
    ],
    scorm_type_attr: "adlcp:scormType",
};

fn profile(version: ScormVersion) -> &'static SchemaProfile {
    match version {
        ScormVersion::V1_2 => &SCORM_12,
        ScormVersion::V2004 => &SCORM_2004,
    }
}

impl ScormManifest {
    /// Build the manifest IR from ordered modules.
    ///
    /// Modules without lessons are left out of the organization, since an
    /// empty cluster item is not launchable.
    pub fn build(
        metadata: &ManifestMetadata,
        modules: &[ModuleItem],
        version: ScormVersion,
        options: &ScormOptions,
    ) -> Self {
        let course_key = path_segment(&metadata.identifier);
        let mut items = Vec::new();
        let mut resources = Vec::new();
        let has_shared = !options.shared_files.is_empty();

        for module in modules.iter().filter(|m| !m.lessons.is_empty()) {
            let mut children = Vec::with_capacity(module.lessons.len());

            for lesson in &module.lessons {
                let key = path_segment(&lesson.id);
                let resource_id = format!("RES-{key}");

                children.push(OrgItem {
                    identifier: format!("{LESSON_ITEM_PREFIX}{key}"),
                    title: lesson.title.clone(),
                    resource_ref: Some(resource_id.clone()),
                    mastery_score: options.mastery_score,
                    time_limit_minutes: options.time_limit_minutes,
                    children: Vec::new(),
                });

                let mut files = Vec::with_capacity(lesson.files.len() + 1);
                files.push(lesson.launch.clone());
                files.extend(lesson.files.iter().cloned());

                resources.push(ScormResource {
                    identifier: resource_id,
                    href: Some(lesson.launch.clone()),
                    sco_type: ScoType::Sco,
                    files,
                    dependencies: if has_shared {
                        vec![SHARED_RESOURCE_ID.to_string()]
                    } else {
                        Vec::new()
                    },
                });
            }

            items.push(OrgItem {
                identifier: format!("{MODULE_ITEM_PREFIX}{}", path_segment(&module.id)),
                title: module.title.clone(),
                resource_ref: None,
                mastery_score: None,
                time_limit_minutes: None,
                children,
            });
        }

        if has_shared {
            resources.push(ScormResource {
                identifier: SHARED_RESOURCE_ID.to_string(),
                href: None,
                sco_type: ScoType::Asset,
                files: options.shared_files.clone(),
                dependencies: Vec::new(),
            });
        }

        ScormManifest {
            identifier: format!("MANIFEST-{course_key}"),
            version,
            metadata: metadata.clone(),
            organization: Organization {
                identifier: format!("ORG-{course_key}"),
                title: metadata.title.clone(),
                items,
            },
            resources,
        }
    }

    /// Serialize to `imsmanifest.xml`.
    pub fn to_xml(&self) -> String {
        let profile = profile(self.version);
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<manifest identifier=\"{}\" version=\"{}\"\n  xmlns=\"{}\"\n  xmlns:adlcp=\"{}\"\n",
            escape_xml(&self.identifier),
            escape_xml(&self.metadata.version),
            profile.namespace,
            profile.adlcp
        ));
        for (prefix, ns) in profile.extra_namespaces {
            xml.push_str(&format!("  xmlns:{prefix}=\"{ns}\"\n"));
        }
        let locations = profile
            .schemas
            .iter()
            .map(|(ns, _, location)| format!("{ns} {location}"))
            .collect::<Vec<_>>()
            .join(" ");
        xml.push_str(&format!(
            "  xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n  xsi:schemaLocation=\"{locations}\">\n"
        ));

        self.write_metadata(&mut xml);

        // Organizations
        let org = &self.organization;
        xml.push_str(&format!(
            "  <organizations default=\"{}\">\n",
            escape_xml(&org.identifier)
        ));
        xml.push_str(&format!(
            "    <organization identifier=\"{}\">\n      <title>{}</title>\n",
            escape_xml(&org.identifier),
            escape_xml(&org.title)
        ));
        for item in &org.items {
            self.write_item(&mut xml, item, 3);
        }
        if self.version == ScormVersion::V2004 {
            xml.push_str(
                "      <imsss:sequencing>\n        <imsss:controlMode choice=\"true\" flow=\"true\"/>\n      </imsss:sequencing>\n",
            );
        }
        xml.push_str("    </organization>\n  </organizations>\n");

        // Resources
        xml.push_str("  <resources>\n");
        for resource in &self.resources {
            let sco_type = match resource.sco_type {
                ScoType::Sco => "sco",
                ScoType::Asset => "asset",
            };
            xml.push_str(&format!(
                "    <resource identifier=\"{}\" type=\"webcontent\" {}=\"{}\"",
                escape_xml(&resource.identifier),
                profile.scorm_type_attr,
                sco_type
            ));
            if let Some(ref href) = resource.href {
                xml.push_str(&format!(" href=\"{}\"", escape_xml(href)));
            }
            xml.push_str(">\n");
            for file in &resource.files {
                xml.push_str(&format!("      <file href=\"{}\"/>\n", escape_xml(file)));
            }
            for dependency in &resource.dependencies {
                xml.push_str(&format!(
                    "      <dependency identifierref=\"{}\"/>\n",
                    escape_xml(dependency)
                ));
            }
            xml.push_str("    </resource>\n");
        }
        xml.push_str("  </resources>\n</manifest>\n");
        xml
    }

    fn write_metadata(&self, xml: &mut String) {
        let meta = &self.metadata;
        let lang = escape_xml(&meta.language);

        xml.push_str("  <metadata>\n    <schema>ADL SCORM</schema>\n");
        xml.push_str(&format!(
            "    <schemaversion>{}</schemaversion>\n",
            self.version.schema_version()
        ));

        let lom_ns = match self.version {
            ScormVersion::V1_2 => "http://www.imsglobal.org/xsd/imsmd_rootv1p2p1",
            ScormVersion::V2004 => "http://ltsc.ieee.org/xsd/LOM",
        };
        let text = |s: &str| lom_string(self.version, &lang, s);

        xml.push_str(&format!("    <lom xmlns=\"{lom_ns}\">\n      <general>\n"));
        xml.push_str(&format!("        <title>{}</title>\n", text(&meta.title)));
        xml.push_str(&format!("        <language>{lang}</language>\n"));
        if !meta.description.is_empty() {
            xml.push_str(&format!(
                "        <description>{}</description>\n",
                text(&meta.description)
            ));
        }
        for keyword in &meta.keywords {
            xml.push_str(&format!("        <keyword>{}</keyword>\n", text(keyword)));
        }
        xml.push_str("      </general>\n");
        if let Some(ref copyright) = meta.copyright {
            xml.push_str(&format!(
                "      <rights>\n        <description>{}</description>\n      </rights>\n",
                text(copyright)
            ));
        }
        xml.push_str("    </lom>\n  </metadata>\n");
    }

    fn write_item(&self, xml: &mut String, item: &OrgItem, depth: usize) {
        let indent = "  ".repeat(depth);

        xml.push_str(&format!("{indent}<item identifier=\"{}\"", escape_xml(&item.identifier)));
        if let Some(ref resource) = item.resource_ref {
            xml.push_str(&format!(" identifierref=\"{}\"", escape_xml(resource)));
        }
        xml.push_str(">\n");
        xml.push_str(&format!("{indent}  <title>{}</title>\n", escape_xml(&item.title)));

        for child in &item.children {
            self.write_item(xml, child, depth + 1);
        }

        match self.version {
            ScormVersion::V1_2 => {
                if let Some(minutes) = item.time_limit_minutes {
                    xml.push_str(&format!(
                        "{indent}  <adlcp:maxtimeallowed>{}</adlcp:maxtimeallowed>\n",
                        format_cmi_timespan(u64::from(minutes) * 60)
                    ));
                    xml.push_str(&format!(
                        "{indent}  <adlcp:timelimitaction>exit,message</adlcp:timelimitaction>\n"
                    ));
                }
                if let Some(score) = item.mastery_score {
                    xml.push_str(&format!(
                        "{indent}  <adlcp:masteryscore>{}</adlcp:masteryscore>\n",
                        score.min(100)
                    ));
                }
            }
            ScormVersion::V2004 => {
                if item.mastery_score.is_none() && item.time_limit_minutes.is_none() {
                    xml.push_str(&format!("{indent}</item>\n"));
                    return;
                }
                xml.push_str(&format!("{indent}  <imsss:sequencing>\n"));
                if let Some(minutes) = item.time_limit_minutes {
                    xml.push_str(&format!(
                        "{indent}    <imsss:limitConditions attemptAbsoluteDurationLimit=\"{}\"/>\n",
                        minutes_to_iso8601(minutes)
                    ));
                }
                if let Some(score) = item.mastery_score {
                    xml.push_str(&format!(
                        "{indent}    <imsss:objectives>\n{indent}      <imsss:primaryObjective objectiveID=\"PRIMARYOBJ-{}\" satisfiedByMeasure=\"true\">\n{indent}        <imsss:minNormalizedMeasure>{}</imsss:minNormalizedMeasure>\n{indent}      </imsss:primaryObjective>\n{indent}    </imsss:objectives>\n",
                        escape_xml(&item.identifier),
                        f64::from(score.min(100)) / 100.0
                    ));
                }
                xml.push_str(&format!("{indent}  </imsss:sequencing>\n"));
            }
        }

        xml.push_str(&format!("{indent}</item>\n"));
    }
}

/// LOM 1.2 uses `<langstring xml:lang>`, LOM 1.0 (2004) uses `<string language>`.
fn lom_string(version: ScormVersion, lang: &str, text: &str) -> String {
    match version {
        ScormVersion::V1_2 => format!(
            "<langstring xml:lang=\"{lang}\">{}</langstring>",
            escape_xml(text)
        ),
        ScormVersion::V2004 => format!("<string language=\"{lang}\">{}</string>", escape_xml(text)),
    }
}

/// An OASIS XML catalog mapping the manifest's schema namespaces to their
/// published XSD locations, shipped as `shared/schemas/catalog.xml`.
pub fn schema_catalog(version: ScormVersion) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<catalog xmlns=\"urn:oasis:names:tc:entity:xmlns:xml:catalog\">\n",
    );
    for (ns, file, location) in profile(version).schemas {
        xml.push_str(&format!(
            "  <uri name=\"{ns}\" uri=\"{location}\"/>\n  <system systemId=\"{file}\" uri=\"{location}\"/>\n"
        ));
    }
    xml.push_str("</catalog>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::LessonItem;

    fn sample() -> (ManifestMetadata, Vec<ModuleItem>) {
        let meta = ManifestMetadata {
            identifier: "course-1".into(),
            title: "Rust & You".into(),
            description: "Learn <Rust>".into(),
            language: "en".into(),
            version: "1.0".into(),
            keywords: vec!["rust".into()],
            ..Default::default()
        };
        let modules = vec![
            ModuleItem {
                id: "m1".into(),
                title: "Intro".into(),
                description: None,
                lessons: vec![LessonItem {
                    id: "l1".into(),
                    title: "Welcome".into(),
                    launch: "content/l1/index.html".into(),
                    files: vec!["content/l1/content.html".into()],
                    ..Default::default()
                }],
            },
            ModuleItem {
                id: "empty".into(),
                title: "Nothing here".into(),
                description: None,
                lessons: vec![],
            },
        ];
        (meta, modules)
    }

    fn options() -> ScormOptions {
        ScormOptions {
            mastery_score: Some(80),
            time_limit_minutes: Some(30),
            shared_files: vec!["shared/scripts/scorm-api.js".into()],
        }
    }

    #[test]
    fn test_build_keeps_containment() {
        let (meta, modules) = sample();
        let manifest = ScormManifest::build(&meta, &modules, ScormVersion::V1_2, &options());

        assert_eq!(manifest.organization.items.len(), 1);
        let module = &manifest.organization.items[0];
        assert_eq!(module.title, "Intro");
        assert_eq!(module.children.len(), 1);
        assert_eq!(module.children[0].title, "Welcome");
        assert_eq!(module.children[0].resource_ref.as_deref(), Some("RES-l1"));
        assert_eq!(manifest.resources.len(), 2);
    }

    #[test]
    fn test_scorm12_xml() {
        let (meta, modules) = sample();
        let xml = ScormManifest::build(&meta, &modules, ScormVersion::V1_2, &options()).to_xml();

        assert!(xml.contains("xmlns=\"http://www.imsproject.org/xsd/imscp_rootv1p1p2\""));
        assert!(xml.contains("<schemaversion>1.2</schemaversion>"));
        assert!(xml.contains("adlcp:scormtype=\"sco\""));
        assert!(xml.contains("<adlcp:masteryscore>80</adlcp:masteryscore>"));
        assert!(xml.contains("<adlcp:maxtimeallowed>00:30:00</adlcp:maxtimeallowed>"));
        assert!(xml.contains("<title>Rust &amp; You</title>"));
        assert!(xml.contains("Learn &lt;Rust&gt;"));
        assert!(!xml.contains("imsss:"));
    }

    #[test]
    fn test_scorm2004_xml() {
        let (meta, modules) = sample();
        let xml = ScormManifest::build(&meta, &modules, ScormVersion::V2004, &options()).to_xml();

        assert!(xml.contains("xmlns=\"http://www.imsglobal.org/xsd/imscp_v1p1\""));
        assert!(xml.contains("<schemaversion>2004 4th Edition</schemaversion>"));
        assert!(xml.contains("adlcp:scormType=\"sco\""));
        assert!(xml.contains("attemptAbsoluteDurationLimit=\"PT30M\""));
        assert!(xml.contains("<imsss:minNormalizedMeasure>0.8</imsss:minNormalizedMeasure>"));
        assert!(!xml.contains("adlcp:masteryscore"));
    }

    #[test]
    fn test_lesson_without_files_still_listed() {
        let (meta, mut modules) = sample();
        modules[0].lessons[0].files.clear();
        let manifest = ScormManifest::build(&meta, &modules, ScormVersion::V1_2, &ScormOptions::default());

        assert_eq!(manifest.resources.len(), 1);
        assert_eq!(manifest.resources[0].files, vec!["content/l1/index.html".to_string()]);
        assert!(manifest.resources[0].dependencies.is_empty());
    }

    #[test]
    fn test_schema_locations_are_absolute() {
        let (meta, modules) = sample();
        for version in [ScormVersion::V1_2, ScormVersion::V2004] {
            let xml = ScormManifest::build(&meta, &modules, version, &options()).to_xml();
            let start = xml.find("xsi:schemaLocation=\"").unwrap() + "xsi:schemaLocation=\"".len();
            let end = start + xml[start..].find('"').unwrap();
            let parts: Vec<_> = xml[start..end].split_whitespace().collect();

            assert_eq!(parts.len() % 2, 0);
            for location in parts.iter().skip(1).step_by(2) {
                assert!(location.starts_with("http://"), "{location}");
                assert!(location.ends_with(".xsd"), "{location}");
            }
        }
    }

    #[test]
    fn test_item_identifiers_are_unique() {
        let (meta, _) = sample();
        let lesson = |id: &str| LessonItem {
            id: id.into(),
            title: id.into(),
            launch: format!("content/{id}/index.html"),
            ..Default::default()
        };
        let modules = vec![
            ModuleItem {
                id: "x".into(),
                title: "X".into(),
                description: None,
                lessons: vec![lesson("MOD-x"), lesson("MODULE-x")],
            },
            ModuleItem {
                id: "MOD-x".into(),
                title: "Y".into(),
                description: None,
                lessons: vec![lesson("x")],
            },
        ];
        let manifest = ScormManifest::build(&meta, &modules, ScormVersion::V2004, &options());

        let mut ids = Vec::new();
        for module in &manifest.organization.items {
            ids.push(module.identifier.clone());
            ids.extend(module.children.iter().map(|c| c.identifier.clone()));
        }
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total, "{ids:?}");
    }

    #[test]
    fn test_schema_catalog() {
        let catalog = schema_catalog(ScormVersion::V2004);
        assert!(catalog.contains("imsss_v1p0.xsd"));
        assert!(catalog.starts_with("<?xml"));
    }
}
