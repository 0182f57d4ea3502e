//! End-to-end export tests: course in, archive out, archive read back.

use chrono::{DateTime, Utc};

use coursepack::model::{Block, Course, Lesson, Module};
use coursepack::{
    ExportContext, ExportSettings, ExportedPackage, Format, FormatHandler, Registry, read_package,
    verify,
};

fn welcome_course() -> Course {
    Course::new("intro-course", "Getting Started").with_module(
        Module::new("m-intro", "Intro").with_lesson(
            Lesson::new("lesson-welcome", "Welcome")
                .with_block(Block::paragraph("b2", 2, "Hello world"))
                .with_block(Block::heading("b1", 1, 1, "Welcome")),
        ),
    )
}

fn fixture() -> Course {
    serde_json::from_str(include_str!("fixtures/course.json")).expect("fixture parses")
}

fn timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T09:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

async fn export(course: &Course, settings: &ExportSettings, format: &str) -> ExportedPackage {
    let handler = Registry::global().resolve(format).expect("format registered");
    let ctx = ExportContext::new(course, settings).with_timestamp(timestamp());
    handler
        .export(&ctx)
        .await
        .into_package()
        .expect("export succeeds")
}

// ============================================================================
// SCORM
// ============================================================================

#[tokio::test]
async fn test_scorm12_welcome_course() {
    let package = export(&welcome_course(), &ExportSettings::default(), "scorm12").await;
    assert_eq!(package.mime_type, "application/zip");
    assert_eq!(package.filename, "getting-started-scorm12-2024-05-01.zip");

    let contents = read_package(&package.blob).unwrap();
    let manifest = contents.text("imsmanifest.xml").unwrap();
    assert!(manifest.contains("<schemaversion>1.2</schemaversion>"));
    assert_eq!(manifest.matches("<title>Welcome</title>").count(), 1);
    assert!(manifest.contains("identifierref=\"RES-lesson-welcome\""));

    let content = contents
        .text("content/lesson-welcome/content.html")
        .unwrap();
    assert!(content.contains("<h1>Welcome</h1>"));
    assert!(content.contains("<p>Hello world</p>"));
    assert!(content.find("<h1>Welcome</h1>").unwrap() < content.find("Hello world").unwrap());

    for path in [
        "content/lesson-welcome/index.html",
        "shared/scripts/scorm-api.js",
        "shared/css/styles.css",
        "shared/schemas/catalog.xml",
        "README.txt",
    ] {
        assert!(contents.contains(path), "{path}");
    }

    assert!(verify(&package.blob, Format::Scorm12).unwrap().is_empty());
}

#[tokio::test]
async fn test_scorm2004_sequencing() {
    let settings = ExportSettings::default()
        .with_passing_score(70)
        .with_time_limit(30);
    let package = export(&welcome_course(), &settings, "scorm-2004").await;

    let contents = read_package(&package.blob).unwrap();
    let manifest = contents.text("imsmanifest.xml").unwrap();
    assert!(manifest.contains("<schemaversion>2004 4th Edition</schemaversion>"));
    assert!(manifest.contains("attemptAbsoluteDurationLimit=\"PT30M\""));
    assert!(manifest.contains("<imsss:minNormalizedMeasure>0.7</imsss:minNormalizedMeasure>"));

    let script = contents.text("shared/scripts/scorm-api.js").unwrap();
    assert!(script.contains("\"version\": \"2004\""));

    assert!(verify(&package.blob, Format::Scorm2004).unwrap().is_empty());
}

#[tokio::test]
async fn test_scorm_version_mismatch_is_a_warning() {
    let mut settings = ExportSettings::default();
    settings.scorm.version = Some(coursepack::ScormVersion::V2004);
    let package = export(&welcome_course(), &settings, "scorm12").await;

    assert_eq!(package.stats.warning_count, 1);
    assert!(package.stats.warning_messages[0].contains("SCORM 2004"));
}

// ============================================================================
// xAPI and cmi5
// ============================================================================

#[tokio::test]
async fn test_xapi_index_and_statement_templates() {
    let package = export(&welcome_course(), &ExportSettings::default(), "xapi").await;
    let contents = read_package(&package.blob).unwrap();

    let index = contents.text("index.html").unwrap();
    assert!(index.contains("data-lesson-id=\"lesson-welcome\""));
    assert!(index.contains("href=\"lessons/lesson-welcome.html\""));

    let templates = contents.text("js/statement-templates.js").unwrap();
    let start = templates.find("var LESSON_ACTIVITIES").unwrap();
    let lesson_activities = &templates[start..];
    assert!(lesson_activities.contains(
        "\"id\": \"https://courses.example.org/activities/intro-course/lessons/lesson-welcome\""
    ));

    let descriptor = contents.text("tincan.xml").unwrap();
    assert!(descriptor.contains("<launch lang=\"en\">index.html</launch>"));

    assert!(verify(&package.blob, Format::Xapi).unwrap().is_empty());
}

#[tokio::test]
async fn test_cmi5_structure() {
    let settings = ExportSettings::default().with_activity_id_prefix("https://lms.test/acts/");
    let package = export(&fixture(), &settings, "cmi5").await;
    let contents = read_package(&package.blob).unwrap();

    let structure = contents.text("cmi5.xml").unwrap();
    assert!(structure.contains("<course id=\"https://lms.test/acts/safety-101\">"));
    assert_eq!(structure.matches("<au ").count(), 3);

    let au = contents.text("au/ppe/index.html").unwrap();
    assert!(au.contains("cmi5RecordAnswer("));
    assert!(au.contains("window.COURSEPACK_LAUNCH"));

    assert!(verify(&package.blob, Format::Cmi5).unwrap().is_empty());
}

// ============================================================================
// HTML5
// ============================================================================

#[tokio::test]
async fn test_html5_bundle() {
    let package = export(&fixture(), &ExportSettings::default(), "html5").await;
    let contents = read_package(&package.blob).unwrap();

    let paths: Vec<_> = contents.paths().collect();
    assert_eq!(
        paths,
        [
            "css/styles.css",
            "index.html",
            "js/navigation.js",
            "lessons/ppe.html",
            "lessons/rules.html",
            "lessons/welcome.html",
            "manifest.json",
        ]
    );

    let manifest: serde_json::Value =
        serde_json::from_str(&contents.text("manifest.json").unwrap()).unwrap();
    assert_eq!(manifest["modules"][0]["id"], "m-intro");
    assert_eq!(manifest["modules"][1]["lessons"][0]["resources"][0]["id"], "r1");

    let ppe = contents.text("lessons/ppe.html").unwrap();
    assert!(ppe.contains("[hologram content]"));
    assert!(ppe.contains("Gear up"));
    assert!(ppe.contains("Which gloves?"));
    assert!(ppe.contains("rel=\"prev\" href=\"rules.html\""));

    assert!(verify(&package.blob, Format::Html5).unwrap().is_empty());
}

// ============================================================================
// Ordering, warnings, determinism
// ============================================================================

#[tokio::test]
async fn test_fixture_warnings() {
    let package = export(&fixture(), &ExportSettings::default(), "html5").await;
    let warnings = &package.stats.warning_messages;

    assert_eq!(package.stats.warning_count, warnings.len());
    assert!(warnings.iter().any(|w| w.contains("\"hologram\"")));
    assert!(warnings.iter().any(|w| w.contains("resource \"r2\"")));
}

#[tokio::test]
async fn test_every_format_is_deterministic() {
    let course = fixture();
    let settings = ExportSettings::default();

    for format in Format::ALL {
        let first = export(&course, &settings, format.id()).await;
        let second = export(&course, &settings, format.id()).await;
        assert_eq!(first.blob, second.blob, "{format}");
        assert_eq!(first.stats.total_items, second.stats.total_items);
    }
}

#[tokio::test]
async fn test_concurrent_exports_do_not_interfere() {
    let course = fixture();
    let settings = ExportSettings::default();

    let (scorm, xapi) = tokio::join!(
        export(&course, &settings, "scorm12"),
        export(&course, &settings, "xapi")
    );
    assert!(read_package(&scorm.blob).unwrap().contains("imsmanifest.xml"));
    assert!(read_package(&xapi.blob).unwrap().contains("tincan.xml"));
}

#[tokio::test]
async fn test_uncompressed_archive_is_larger() {
    let course = fixture();
    let compressed = export(&course, &ExportSettings::default(), "html5").await;
    let stored = export(
        &course,
        &ExportSettings::default().with_compression(false, 0),
        "html5",
    )
    .await;
    assert!(stored.stats.total_size > compressed.stats.total_size);
    assert_eq!(stored.stats.total_items, compressed.stats.total_items);
}

#[tokio::test]
async fn test_handler_without_registry() {
    let course = welcome_course();
    let settings = ExportSettings::default();
    let ctx = ExportContext::new(&course, &settings);

    let result = FormatHandler::for_format(Format::Html5).export(&ctx).await;
    assert!(result.is_success());
    assert_eq!(result.stats().total_items, 5);
}
