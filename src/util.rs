//! Escaping, naming, and duration helpers shared by every backend.
//!
//! Everything here is pure string transformation. Markup escaping is used for
//! HTML pages, XML escaping for manifests; the two differ only in how the
//! apostrophe is spelled.

use chrono::{NaiveDate, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

// ============================================================================
// Escaping
// ============================================================================

const MARKUP_ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&#x27;", '\''),
    ("&apos;", '\''),
];

const XML_ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&apos;", '\''),
];

/// Escape text for embedding in HTML content or attribute values.
///
/// ```
/// use coursepack::util::escape_html;
///
/// assert_eq!(escape_html("<b>Tom & Jerry</b>"), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
/// assert_eq!(escape_html("it's"), "it&#39;s");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_html`].
///
/// Unknown entities are left untouched.
pub fn unescape_html(s: &str) -> String {
    unescape_with(s, MARKUP_ENTITIES)
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_xml`].
pub fn unescape_xml(s: &str) -> String {
    unescape_with(s, XML_ENTITIES)
}

/// Single left-to-right pass, so `&amp;lt;` decodes to `&lt;` and not `<`.
fn unescape_with(s: &str, table: &[(&str, char)]) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut pos = 0;

    while let Some(offset) = memchr::memchr(b'&', &bytes[pos..]) {
        let amp = pos + offset;
        out.push_str(&s[pos..amp]);
        let rest = &s[amp..];
        match table.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                pos = amp + entity.len();
            }
            None => {
                out.push('&');
                pos = amp + 1;
            }
        }
    }

    out.push_str(&s[pos..]);
    out
}

// ============================================================================
// Names and Paths
// ============================================================================

/// Maximum slug length before the date and extension are appended.
pub const SLUG_MAX_LEN: usize = 50;

/// Characters left as-is inside a percent-encoded path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Lower-case a title and collapse every non-alphanumeric run into a single
/// hyphen, trimming hyphens at both ends and truncating to [`SLUG_MAX_LEN`].
///
/// ```
/// use coursepack::util::slugify;
///
/// assert_eq!(slugify("My Course!! 2024"), "my-course-2024");
/// assert_eq!(slugify("  --Intro--  "), "intro");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    // ASCII only, so byte truncation is char-safe.
    slug.truncate(SLUG_MAX_LEN);
    slug
}

/// Build `<slug>.<extension>` stamped with today's date.
///
/// ```
/// use coursepack::util::generate_filename;
///
/// let name = generate_filename("My Course!! 2024", "zip");
/// assert!(name.starts_with("my-course-2024-"));
/// assert!(name.ends_with(".zip"));
/// ```
pub fn generate_filename(title: &str, extension: &str) -> String {
    generate_filename_on(title, None, extension, Utc::now().date_naive())
}

/// Build `<slug>[-<suffix>]-<date>.<extension>`.
pub fn generate_filename_on(
    title: &str,
    suffix: Option<&str>,
    extension: &str,
    date: NaiveDate,
) -> String {
    let mut slug = slugify(title);
    if slug.is_empty() {
        slug.push_str("course");
    }

    match suffix {
        Some(suffix) => format!("{slug}-{suffix}-{date}.{extension}"),
        None => format!("{slug}-{date}.{extension}"),
    }
}

/// Reduce an identifier to a single safe archive path segment.
///
/// Keeps ASCII alphanumerics, `-`, `_` and `.`; everything else becomes `_`.
pub fn path_segment(id: &str) -> String {
    let segment: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if segment.is_empty() || segment.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        segment
    }
}

/// Percent-encode each segment of a relative path for use in `href`/`src`.
pub fn encode_href(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether a URL points outside the package.
pub fn is_external_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:")
        || lower.starts_with("mailto:")
}

// ============================================================================
// Durations
// ============================================================================

/// Format seconds as an ISO-8601 duration (`PT1H2M3S`).
///
/// ```
/// use coursepack::util::format_iso8601_duration;
///
/// assert_eq!(format_iso8601_duration(0), "PT0S");
/// assert_eq!(format_iso8601_duration(3723), "PT1H2M3S");
/// assert_eq!(format_iso8601_duration(1800), "PT30M");
/// ```
pub fn format_iso8601_duration(total_seconds: u64) -> String {
    if total_seconds == 0 {
        return "PT0S".to_string();
    }

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if seconds > 0 {
        out.push_str(&format!("{seconds}S"));
    }
    out
}

/// Format minutes as an ISO-8601 duration.
pub fn minutes_to_iso8601(minutes: u32) -> String {
    format_iso8601_duration(u64::from(minutes) * 60)
}

/// Format seconds as a SCORM 1.2 `CMITimespan` (`HH:MM:SS`).
pub fn format_cmi_timespan(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
