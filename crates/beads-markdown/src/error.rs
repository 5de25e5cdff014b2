use thiserror::Error;

/// Errors raised while parsing or serializing a `.todo/*.md` file, or while
/// applying/reversing a filename pattern.
#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error("file has no frontmatter block")]
    MissingFrontmatter,

    #[error("frontmatter is missing a required `id` field")]
    MissingId,

    #[error("malformed frontmatter line: {0}")]
    MalformedLine(String),

    #[error(transparent)]
    Validation(#[from] beads_core::ValidationError),

    #[error("pattern `{0}` contains no [id] token and filenames cannot be reversed")]
    PatternHasNoId(String),

    #[error("exhausted {0} disambiguation suffixes for filename")]
    DisambiguationExhausted(u32),
}

pub type Result<T> = std::result::Result<T, MarkdownError>;
