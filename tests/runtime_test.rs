//! Behaviour of the packaged tracking scripts.
//!
//! Each test exports a package, takes the generated scripts out of the
//! archive, and runs them under `node` against the stub browser, LMS and
//! LRS in `tests/fixtures/runtime/`. Tests are skipped when `node` is not
//! installed.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

use coursepack::model::{Block, Course, Lesson, Module};
use coursepack::{ExportSettings, PackageContents, Registry, read_package};

const RUNTIME_FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/runtime");

fn short_course() -> Course {
    Course::new("intro-course", "Getting Started").with_module(
        Module::new("m-intro", "Intro").with_lesson(
            Lesson::new("lesson-welcome", "Welcome")
                .with_block(Block::heading("b1", 1, 1, "Welcome"))
                .with_block(Block::paragraph("b2", 2, "Hello world")),
        ),
    )
}

fn fixture() -> Course {
    serde_json::from_str(include_str!("fixtures/course.json")).expect("fixture parses")
}

async fn package(course: &Course, format: &str) -> PackageContents {
    let settings = ExportSettings::default();
    let handler = Registry::global().resolve(format).expect("format registered");
    let ctx = coursepack::ExportContext::new(course, &settings);
    let package = handler.export(&ctx).await.into_package().expect("export succeeds");
    read_package(&package.blob).unwrap()
}

fn node_available() -> bool {
    let found = Command::new("node")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false);
    if !found {
        eprintln!("node is not installed; skipping runtime script test");
    }
    found
}

/// Copy a package entry into `dir` and return its path.
fn extract(dir: &TempDir, contents: &PackageContents, path: &str) -> PathBuf {
    let target = dir.path().join(path.replace('/', "_"));
    std::fs::write(&target, contents.get(path).unwrap()).unwrap();
    target
}

/// The inline `window.COURSEPACK_LAUNCH = ...;` statement of a lesson page.
fn launch_script(dir: &TempDir, page: &str) -> PathBuf {
    let start = page.find("window.COURSEPACK_LAUNCH").expect("page carries launch settings");
    let end = start + page[start..].find("</script>").unwrap();
    let target = dir.path().join("launch.js");
    std::fs::write(&target, page[start..end].trim()).unwrap();
    target
}

fn run_scenario<I, S>(scenario: &str, args: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new("node")
        .arg(Path::new(RUNTIME_FIXTURES).join(scenario))
        .args(args)
        .output()
        .expect("Failed to run node");
    assert!(
        output.status.success(),
        "{scenario}: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn strings(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect()
}

// ============================================================================
// SCORM
// ============================================================================

#[tokio::test]
async fn test_scorm12_short_page_completes_after_late_launcher_load() {
    if !node_available() {
        return;
    }
    let contents = package(&short_course(), "scorm12").await;
    let dir = TempDir::new().unwrap();
    let launcher = contents.text("content/lesson-welcome/index.html").unwrap();
    let launch = launch_script(&dir, &launcher);
    let runtime = extract(&dir, &contents, "shared/scripts/scorm-api.js");

    let result = run_scenario("scorm_session.js", [&launch, &runtime]);
    assert!(result["beforeLauncherLoad"].as_array().unwrap().is_empty());
    assert_eq!(result["correct"], true);

    let calls = strings(&result["calls"]);
    assert_eq!(calls.first(), Some(&"initialize"));
    assert_eq!(calls.last(), Some(&"terminate"));
    assert_eq!(calls.iter().filter(|c| **c == "terminate").count(), 1);

    let position = |call: &str| calls.iter().position(|c| *c == call).unwrap_or_else(|| panic!("{call}"));
    assert!(position("cmi.core.lesson_status=incomplete") < position("cmi.interactions.0.id=q1"));
    assert!(position("cmi.interactions.0.result=correct") < position("cmi.core.lesson_status=passed"));
    assert!(calls.contains(&"cmi.core.score.raw=100"));
    assert!(calls.contains(&"cmi.core.exit="));
}

#[tokio::test]
async fn test_scorm2004_reports_completion_and_success() {
    if !node_available() {
        return;
    }
    let contents = package(&short_course(), "scorm2004").await;
    let dir = TempDir::new().unwrap();
    let launcher = contents.text("content/lesson-welcome/index.html").unwrap();
    let launch = launch_script(&dir, &launcher);
    let runtime = extract(&dir, &contents, "shared/scripts/scorm-api.js");

    let result = run_scenario("scorm_session.js", [&launch, &runtime]);
    let calls = strings(&result["calls"]);
    assert!(calls.contains(&"cmi.completion_status=completed"));
    assert!(calls.contains(&"cmi.success_status=passed"));
    assert!(calls.contains(&"cmi.score.scaled=1"));
    assert!(calls.contains(&"cmi.exit=normal"));
    assert!(calls.iter().any(|c| c.starts_with("cmi.session_time=PT")));
}

// ============================================================================
// xAPI
// ============================================================================

#[tokio::test]
async fn test_xapi_lesson_pages_use_the_index_launch() {
    if !node_available() {
        return;
    }
    let contents = package(&short_course(), "xapi").await;
    let dir = TempDir::new().unwrap();
    let templates = extract(&dir, &contents, "js/statement-templates.js");
    let wrapper = extract(&dir, &contents, "js/xapi-wrapper.js");

    let result = run_scenario(
        "xapi_pages.js",
        [templates.as_os_str(), wrapper.as_os_str(), OsStr::new("lesson-welcome")],
    );
    assert_eq!(result["indexRequests"], 1);

    let requests = result["requests"].as_array().unwrap();
    let verbs: Vec<_> = requests.iter().map(|r| r["verb"].as_str().unwrap()).collect();
    assert_eq!(verbs, ["initialized", "experienced", "answered", "completed"]);
    for request in requests {
        assert_eq!(request["url"], "https://lrs.test/xapi/statements");
        assert_eq!(request["authorization"], "Basic dGVzdA==");
        assert_eq!(request["actor"], "Ada");
    }
    assert_eq!(
        requests[1]["object"],
        "https://courses.example.org/activities/intro-course/lessons/lesson-welcome"
    );

    let links = strings(&result["links"]);
    assert!(links[0].starts_with("lessons/lesson-welcome.html?endpoint="));
    assert!(links[1].starts_with("lessons/other.html?endpoint="));
    assert!(links[1].ends_with("#top"));
    assert_eq!(links[2], "css/styles.css");
    assert_eq!(links[3], "https://elsewhere.test/page.html");
}

#[tokio::test]
async fn test_xapi_undelivered_statements_are_retried() {
    if !node_available() {
        return;
    }
    let contents = package(&short_course(), "xapi").await;
    let dir = TempDir::new().unwrap();
    let templates = extract(&dir, &contents, "js/statement-templates.js");
    let wrapper = extract(&dir, &contents, "js/xapi-wrapper.js");

    let result = run_scenario(
        "xapi_retry.js",
        [templates.as_os_str(), wrapper.as_os_str(), OsStr::new("lesson-welcome")],
    );
    let attempts = result["attempts"].as_array().unwrap();
    let initialized: Vec<_> = attempts.iter().filter(|a| a["verb"] == "initialized").collect();

    // Rejected, then dropped, then accepted from the next page.
    assert_eq!(initialized.len(), 3);
    assert!(initialized.iter().all(|a| a["id"] == initialized[0]["id"]));
    assert_eq!(initialized[0]["outcome"], 503);
    assert_eq!(initialized[1]["outcome"], "offline");
    assert_eq!(initialized[2]["outcome"], 200);
    assert_eq!(strings(&result["storedBetweenPages"]), [initialized[0]["id"].as_str().unwrap()]);

    for verb in ["answered", "experienced"] {
        let delivered = attempts
            .iter()
            .filter(|a| a["verb"] == verb && a["outcome"] == 200)
            .count();
        assert_eq!(delivered, 1, "{verb}");
    }
    assert!(result["remaining"].as_array().unwrap().is_empty());
}

// ============================================================================
// cmi5
// ============================================================================

#[tokio::test]
async fn test_cmi5_statements_wait_for_launch_data() {
    if !node_available() {
        return;
    }
    let contents = package(&short_course(), "cmi5").await;
    let dir = TempDir::new().unwrap();
    let page = contents.text("au/lesson-welcome/index.html").unwrap();
    let launch = launch_script(&dir, &page);
    let runtime = extract(&dir, &contents, "shared/js/cmi5-au.js");

    let result = run_scenario("cmi5_session.js", [&launch, &runtime]);
    assert_eq!(
        strings(&result["handshake"]),
        ["POST https://lms.test/fetch", "GET https://lms.test/lrs/activities/state"]
    );

    let statements = result["statements"].as_array().unwrap();
    let verbs: Vec<_> = statements.iter().map(|s| s["verb"].as_str().unwrap()).collect();
    assert_eq!(verbs, ["initialized", "answered", "completed", "passed", "terminated"]);

    for statement in statements {
        assert_eq!(statement["sessionId"], "S-LMS", "{}", statement["verb"]);
        assert_eq!(statement["registration"], "R-1");
        assert_eq!(statement["authorization"], "Basic dG9r");
        assert_eq!(strings(&statement["grouping"]), ["https://lms.test/course/1"]);
    }

    let categories = |i: usize| strings(&statements[i]["categories"]).len();
    assert_eq!(categories(0), 1);
    assert_eq!(categories(1), 0);
    assert_eq!(categories(2), 2);
    assert_eq!(statements[3]["result"]["score"]["scaled"], 1.0);
}

// ============================================================================
// Navigation
// ============================================================================

#[tokio::test]
async fn test_navigation_tracks_visits_and_answers() {
    if !node_available() {
        return;
    }
    let contents = package(&fixture(), "html5").await;
    let dir = TempDir::new().unwrap();
    let runtime = extract(&dir, &contents, "js/navigation.js");

    let result = run_scenario(
        "navigation_progress.js",
        [runtime.as_os_str(), OsStr::new("welcome"), OsStr::new("rules")],
    );
    assert_eq!(result["correct"], true);
    assert_eq!(result["wrong"], false);
    assert_eq!(result["feedbackClass"], "feedback is-incorrect");
    assert_eq!(result["explanationHidden"], false);
    assert_eq!(result["percent"], 33);
    assert_eq!(result["barWidth"], "33%");
    assert_eq!(strings(&result["linkClasses"]), ["visited", ""]);

    let progress = &result["stored"]["coursepack-progress:safety-101"];
    assert_eq!(progress["visited"]["welcome"], true);
    assert_eq!(progress["answers"]["q1"]["correct"], true);
}
