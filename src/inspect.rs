//! Read packages back and check their structure.
//!
//! [`verify`] answers "would a host runtime find everything this package
//! points at?": the format's descriptor must exist and parse, and every
//! launch path or file it references must be present in the archive.

use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::util::{is_external_url, unescape_xml};

/// Upper bound on the buffer reserved up front for one archive entry.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// Decompressed archive contents keyed by path.
#[derive(Debug, Clone, Default)]
pub struct PackageContents {
    entries: BTreeMap<String, Vec<u8>>,
}

impl PackageContents {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// An entry as UTF-8 text.
    pub fn text(&self, path: &str) -> Result<String> {
        let bytes = self
            .entries
            .get(path)
            .ok_or_else(|| Error::MissingElement(path.to_string()))?;
        Ok(String::from_utf8(bytes.clone())?)
    }
}

/// Decompress every file entry of a zip archive.
pub fn read_package(bytes: &[u8]) -> Result<PackageContents> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = BTreeMap::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        // The declared size comes from the archive header and is not trusted.
        let mut contents = Vec::with_capacity(file.size().min(MAX_PREALLOCATION) as usize);
        file.read_to_end(&mut contents)?;
        entries.insert(file.name().to_string(), contents);
    }

    Ok(PackageContents { entries })
}

/// Check a package's structure for `format`.
///
/// Returns the problems found; an empty list means the package is valid.
/// Only an unreadable archive is an `Err`.
pub fn verify(bytes: &[u8], format: Format) -> Result<Vec<String>> {
    let package = read_package(bytes)?;
    let mut problems = Vec::new();

    let (descriptor, required): (&str, &[&str]) = match format {
        Format::Scorm12 | Format::Scorm2004 => (
            "imsmanifest.xml",
            &["shared/scripts/scorm-api.js", "shared/css/styles.css"],
        ),
        Format::Xapi => (
            "tincan.xml",
            &[
                "index.html",
                "js/xapi-wrapper.js",
                "js/statement-templates.js",
                "js/navigation.js",
                "css/styles.css",
            ],
        ),
        Format::Cmi5 => ("cmi5.xml", &["shared/js/cmi5-au.js", "shared/css/styles.css"]),
        Format::Html5 => (
            "manifest.json",
            &["index.html", "js/navigation.js", "css/styles.css"],
        ),
    };

    for path in required {
        if !package.contains(path) {
            problems.push(format!("missing {path}"));
        }
    }

    let text = match package.text(descriptor) {
        Ok(text) => text,
        Err(_) => {
            problems.push(format!("missing {descriptor}"));
            return Ok(problems);
        }
    };

    let references = match format {
        Format::Scorm12 | Format::Scorm2004 => {
            scorm_references(&text, format, &package, &mut problems)
        }
        Format::Xapi => element_text(&text, b"launch"),
        Format::Cmi5 => element_text(&text, b"url"),
        Format::Html5 => web_references(&text),
    };

    match references {
        Ok(paths) => {
            if paths.is_empty() {
                problems.push(format!("{descriptor} references no launchable content"));
            }
            for path in paths {
                if !is_external_url(&path) && !package.contains(&path) {
                    problems.push(format!("{descriptor} references missing file {path}"));
                }
            }
        }
        Err(e) => problems.push(format!("{descriptor} could not be parsed: {e}")),
    }

    Ok(problems)
}

fn local_name(name: &[u8]) -> &[u8] {
    match memchr::memchr(b':', name) {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

fn attr_value(value: &[u8]) -> String {
    unescape_xml(&String::from_utf8_lossy(value))
}

/// Resource hrefs and file hrefs from a SCORM manifest. Item and dependency
/// references to unknown resource identifiers, and schema locations that
/// point at files missing from the package, are reported directly.
fn scorm_references(
    xml: &str,
    format: Format,
    package: &PackageContents,
    problems: &mut Vec<String>,
) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut paths = Vec::new();
    let mut resource_ids = HashSet::new();
    let mut identifier_refs = Vec::new();
    let mut schema_locations = Vec::new();
    let mut in_schema_version = false;
    let mut schema_version = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                in_schema_version = local == b"schemaversion";
                for attr in e.attributes().flatten() {
                    match (local, attr.key.as_ref()) {
                        (b"resource", b"identifier") => {
                            resource_ids.insert(attr_value(&attr.value));
                        }
                        (b"resource" | b"file", b"href") => paths.push(attr_value(&attr.value)),
                        (b"item" | b"dependency", b"identifierref") => {
                            identifier_refs.push(attr_value(&attr.value))
                        }
                        (b"manifest", b"xsi:schemaLocation") => {
                            schema_locations.extend(
                                attr_value(&attr.value)
                                    .split_whitespace()
                                    .skip(1)
                                    .step_by(2)
                                    .map(str::to_string),
                            );
                        }
                        _ => {}
                    }
                }
            }
            Event::Text(e) if in_schema_version => {
                schema_version.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::End(_) => in_schema_version = false,
            Event::Eof => break,
            _ => {}
        }
    }

    for reference in identifier_refs {
        if !resource_ids.contains(&reference) {
            problems.push(format!(
                "imsmanifest.xml references unknown resource {reference}"
            ));
        }
    }

    for location in schema_locations {
        if !is_external_url(&location) && !package.contains(&location) {
            problems.push(format!(
                "imsmanifest.xml schema location {location} is not in the package"
            ));
        }
    }

    let expected = format
        .scorm_version()
        .map(|v| v.schema_version())
        .unwrap_or_default();
    if schema_version.trim() != expected {
        problems.push(format!(
            "imsmanifest.xml declares schema version \"{}\", expected \"{expected}\"",
            schema_version.trim()
        ));
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Text content of every element named `element`, ignoring namespaces.
fn element_text(xml: &str, element: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut values = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if local_name(e.name().as_ref()) == element => {
                current = Some(String::new());
            }
            Event::Text(e) => {
                if let Some(ref mut text) = current {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(ref mut text) = current {
                    let entity = format!("&{};", String::from_utf8_lossy(e.as_ref()));
                    text.push_str(&unescape_xml(&entity));
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == element => {
                if let Some(text) = current.take() {
                    values.push(text.trim().to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(values)
}

/// `startUrl` and every lesson `href` from an HTML5 `manifest.json`.
fn web_references(json: &str) -> Result<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let mut paths = Vec::new();

    if let Some(start) = value["startUrl"].as_str() {
        paths.push(start.to_string());
    }
    for module in value["modules"].as_array().into_iter().flatten() {
        for lesson in module["lessons"].as_array().into_iter().flatten() {
            if let Some(href) = lesson["href"].as_str() {
                paths.push(href.to_string());
            }
        }
    }
    Ok(paths)
}
