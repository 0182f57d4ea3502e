//! coursepack - compile courses into SCORM, xAPI, cmi5 and HTML5 packages

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use coursepack::{Course, ExportContext, ExportResult, ExportSettings, Format, Registry};

#[derive(Parser)]
#[command(name = "coursepack")]
#[command(version, about = "Compile courses into LMS packages", long_about = None)]
#[command(after_help = "EXAMPLES:
    coursepack export course.json --format scorm12
    coursepack export course.json -f cmi5 -s settings.json -o out/
    coursepack verify course-scorm12-2024-05-01.zip -f scorm12
    coursepack formats")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Export a course (JSON) as a package
    Export {
        /// Course JSON file
        #[arg(value_name = "COURSE")]
        course: PathBuf,

        /// Target format (scorm12, scorm2004, xapi, cmi5, html5)
        #[arg(short, long)]
        format: String,

        /// Export settings JSON file
        #[arg(short, long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Output file, or a directory to place the generated file name in
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// List supported formats
    Formats,

    /// Check the structure of an existing package
    Verify {
        /// Package archive
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Format the package claims to be
        #[arg(short, long)]
        format: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let outcome = match cli.command {
        Command::Export {
            course,
            format,
            settings,
            output,
        } => export(&course, &format, settings.as_deref(), output.as_deref()).await,
        Command::Formats => {
            list_formats();
            Ok(())
        }
        Command::Verify { archive, format } => verify(&archive, &format),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn export(
    course_path: &Path,
    format: &str,
    settings_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), String> {
    let handler = Registry::global()
        .resolve(format)
        .ok_or_else(|| format!("unknown format: {format}"))?;

    let course: Course = read_json(course_path)?;
    let settings: ExportSettings = match settings_path {
        Some(path) => read_json(path)?,
        None => ExportSettings::default(),
    };

    let ctx = ExportContext::new(&course, &settings);
    match handler.export(&ctx).await {
        ExportResult::Success(package) => {
            let target = match output {
                Some(path) if path.is_dir() => path.join(&package.filename),
                Some(path) => path.to_path_buf(),
                None => PathBuf::from(&package.filename),
            };
            fs::write(&target, &package.blob)
                .map_err(|e| format!("{}: {e}", target.display()))?;

            println!("Wrote {}", target.display());
            println!(
                "  {} files, {} bytes, {} ms",
                package.stats.total_items, package.stats.total_size, package.stats.duration_ms
            );
            for warning in &package.stats.warning_messages {
                println!("  warning: {warning}");
            }
            Ok(())
        }
        ExportResult::Failure(failure) => Err(format!("[{}] {}", failure.error_code, failure.error)),
    }
}

fn list_formats() {
    for info in Registry::global().list_formats() {
        println!(
            "{:<10} {:<26} {} (.{})",
            info.format_id, info.display_name, info.mime_type, info.extension
        );
    }
}

fn verify(archive: &Path, format: &str) -> Result<(), String> {
    let format = format.parse::<Format>().map_err(|e| e.to_string())?;
    let bytes = fs::read(archive).map_err(|e| format!("{}: {e}", archive.display()))?;
    let problems = coursepack::verify(&bytes, format).map_err(|e| e.to_string())?;

    if problems.is_empty() {
        println!("{}: valid {format} package", archive.display());
        Ok(())
    } else {
        for problem in &problems {
            println!("  {problem}");
        }
        Err(format!("{} problem(s) found", problems.len()))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))
}
