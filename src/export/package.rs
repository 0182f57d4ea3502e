//! Packaging: the virtual file tree and the zip step.
//!
//! Entries are written in sorted path order with one fixed timestamp taken
//! from the generation time, so identical inputs give identical archives.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::settings::PackagingSettings;

/// Package contents keyed by archive path.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    files: BTreeMap<String, Vec<u8>>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file. Each path may be written once.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Result<()> {
        let path = path.into();
        if self.files.contains_key(&path) {
            return Err(Error::Packaging(format!("duplicate archive path: {path}")));
        }
        self.files.insert(path, contents.into());
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of uncompressed file sizes.
    pub fn total_size(&self) -> u64 {
        self.files.values().map(|f| f.len() as u64).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(p, f)| (p.as_str(), f.as_slice()))
    }
}

/// Compress `files` into a zip archive off the async executor.
///
/// This is the only suspension point of an export.
pub async fn pack(
    files: FileTree,
    packaging: PackagingSettings,
    timestamp: DateTime<Utc>,
) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || write_archive(&files, &packaging, timestamp))
        .await
        .map_err(|e| Error::Packaging(format!("packaging task failed: {e}")))?
}

/// Write `files` into an in-memory zip archive.
///
/// Deflate at level 0 is written as stored entries.
pub fn write_archive(
    files: &FileTree,
    packaging: &PackagingSettings,
    timestamp: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let level = packaging.level();
    let options = if packaging.compress && level > 0 {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level))
    } else {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    };
    let options = options.last_modified_time(zip_timestamp(timestamp));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, contents) in files.iter() {
        zip.start_file(path, options)?;
        zip.write_all(contents)?;
    }
    let bytes = zip.finish()?.into_inner();

    debug!(
        entries = files.len(),
        uncompressed = files.total_size(),
        compressed = bytes.len(),
        "archive written"
    );
    Ok(bytes)
}

/// Zip timestamps are DOS times: local, two-second resolution, 1980-2107.
fn zip_timestamp(timestamp: DateTime<Utc>) -> zip::DateTime {
    let year = timestamp.year().clamp(1980, 2107) as u16;
    zip::DateTime::from_date_and_time(
        year,
        timestamp.month() as u8,
        timestamp.day() as u8,
        timestamp.hour() as u8,
        timestamp.minute() as u8,
        timestamp.second() as u8,
    )
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn timestamp() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-05T06:07:08Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn tree() -> FileTree {
        let mut files = FileTree::new();
        files.insert("b.txt", "bravo").unwrap();
        files.insert("a/index.html", "<p>alpha</p>").unwrap();
        files
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut files = tree();
        assert!(matches!(
            files.insert("b.txt", "again"),
            Err(Error::Packaging(_))
        ));
        assert_eq!(files.get("b.txt"), Some(&b"bravo"[..]));
    }

    #[test]
    fn test_archive_is_sorted_and_readable() {
        let bytes = write_archive(&tree(), &PackagingSettings::default(), timestamp()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["a/index.html", "b.txt"]);

        let mut text = String::new();
        archive.by_name("b.txt").unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "bravo");
    }

    #[test]
    fn test_stored_when_uncompressed() {
        let settings = PackagingSettings {
            compress: false,
            compression_level: 6,
        };
        let bytes = write_archive(&tree(), &settings, timestamp()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            archive.by_name("b.txt").unwrap().compression(),
            CompressionMethod::Stored
        );
    }

    #[test]
    fn test_deterministic_bytes() {
        let settings = PackagingSettings::default();
        let first = write_archive(&tree(), &settings, timestamp()).unwrap();
        let second = write_archive(&tree(), &settings, timestamp()).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_pack_runs_blocking() {
        let bytes = pack(tree(), PackagingSettings::default(), timestamp())
            .await
            .unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
