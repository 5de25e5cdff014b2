//! Errors surfaced by the Webhook Ingestor (C8).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("failed to bind webhook server: {0}")]
    Bind(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, WebhookError>;
