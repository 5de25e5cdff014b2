//! Core types for the beads-sync system.
//!
//! This crate holds the canonical [`Issue`] record and the small set of
//! enums, validation rules, and id-generation helpers shared by every
//! other crate in the workspace. It has no knowledge of JSONL files,
//! Markdown frontmatter, or the filesystem -- those live in
//! `beads-storage` and `beads-markdown` respectively.

pub mod enums;
pub mod idgen;
pub mod issue;
pub mod jsonl;
pub mod validation;

pub use enums::{IssueSource, IssueType, Status};
pub use issue::{Issue, IssueBuilder};
pub use validation::{validate, ValidationError};
