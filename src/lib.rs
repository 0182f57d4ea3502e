//! # coursepack
//!
//! Compile one course model into self-contained learning packages.
//!
//! ## Features
//!
//! - SCORM 1.2 and SCORM 2004 (4th Edition) packages with `imsmanifest.xml`
//! - xAPI (Tin Can) packages with `tincan.xml`
//! - cmi5 course structures with one assignable unit per lesson
//! - Standalone HTML5 bundles with local progress tracking
//! - Deterministic zip output for a pinned generation time
//!
//! ## Quick Start
//!
//! ```no_run
//! use coursepack::{Course, ExportContext, ExportSettings, Registry};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let course: Course = serde_json::from_str(&std::fs::read_to_string("course.json")?)?;
//! let settings = ExportSettings::default().with_passing_score(70);
//!
//! let handler = Registry::global().resolve("scorm-1.2").ok_or("unknown format")?;
//! let ctx = ExportContext::new(&course, &settings);
//!
//! let validation = handler.validate(&ctx);
//! if !validation.valid {
//!     return Err(validation.errors.join("; ").into());
//! }
//!
//! let package = handler.export(&ctx).await.into_package()?;
//! std::fs::write(&package.filename, &package.blob)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Building Courses in Code
//!
//! ```
//! use coursepack::model::{Block, Course, Lesson, Module};
//!
//! let course = Course::new("rust-101", "Rust 101")
//!     .with_language("en")
//!     .with_module(
//!         Module::new("basics", "Basics").with_lesson(
//!             Lesson::new("hello", "Hello, world")
//!                 .with_duration(10)
//!                 .with_block(Block::heading("b1", 0, 1, "Hello"))
//!                 .with_block(Block::paragraph("b2", 1, "Your first program.")),
//!         ),
//!     );
//!
//! assert_eq!(course.lesson_count(), 1);
//! ```

pub mod error;
pub mod export;
pub mod format;
pub mod inspect;
pub mod manifest;
pub mod model;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod settings;
pub mod util;

pub use error::{Error, Result};
pub use export::{
    ExportContext, ExportFailure, ExportResult, ExportStats, ExportedPackage, Exporter,
    FormatHandler, Validation,
};
pub use format::Format;
pub use inspect::{PackageContents, read_package, verify};
pub use model::{Block, BlockContent, Course, Lesson, Module, Resource};
pub use registry::{FormatInfo, Registry};
pub use settings::{ExportSettings, PackagingSettings, ScormSettings, ScormVersion, XapiSettings};
