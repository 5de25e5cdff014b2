//! Mirror Orchestrator (C9): three-way sync between the local `.beads`
//! store and an external issue tracker (currently GitHub Issues), per
//! spec.md §4.9.

mod conventions;
mod conversion;
mod error;
mod github;
mod mapping;
mod orchestrator;

pub use conventions::{Conventions, DependencyConventions, EpicConventions, LabelConventions, StatusLabelConventions};
pub use conversion::{to_external, to_local};
pub use error::{MirrorError, Result};
pub use github::{ExternalIssue, ExternalIssuePatch, GithubClient};
pub use mapping::{IssueMapping, MappingStore};
pub use orchestrator::MirrorOrchestrator;
