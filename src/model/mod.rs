//! Canonical course model consumed by every backend.
//!
//! This module contains:
//! - Course, module, and lesson records ([`Course`], [`Module`], [`Lesson`])
//! - Lesson resources ([`Resource`])
//! - Content blocks as a closed sum type with an open `Unknown` escape hatch
//!   ([`Block`], [`BlockContent`])
//!
//! The model is owned by the caller. Backends only ever borrow it.

mod block;
mod course;

pub use block::{Block, BlockContent, Choice, FillInBlank, MultipleChoice, Section};
pub use course::{Course, CourseMetadata, Lesson, Module, Resource};
