//! Markdown Codec (C2) and filename Pattern Engine (C3) for the beads-sync
//! system.

pub mod error;
pub mod frontmatter;
pub mod pattern;
mod scalar;

pub use error::{MarkdownError, Result};
pub use frontmatter::{parse_file, serialize_file, truncate_title};
pub use pattern::{apply_pattern, extract_id};
