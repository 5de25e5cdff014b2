//! Webhook Ingestor (C8): signed HTTP delivery intake for the external
//! mirror, with delivery dedupe and discriminated event decoding.

mod dedupe;
mod error;
mod event;
mod server;
mod signature;

pub use dedupe::{DeliveryDedupe, DEFAULT_CAPACITY};
pub use error::{Result, WebhookError};
pub use event::{decode, WebhookEvent};
pub use server::{EventHandler, WebhookServer};
pub use signature::verify;
