//! Decodes an inbound webhook body into the discriminated union spec.md
//! §4.8 step 3 describes.

use serde_json::Value;

/// A decoded webhook delivery. `Unknown` deliveries are ACK'd by the
/// server without being handed to a handler (spec.md §4.8 step 3).
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    Issues {
        action: String,
        delivery_id: String,
        payload: Value,
    },
    Installation {
        action: String,
        delivery_id: String,
        payload: Value,
    },
    IssueComment {
        action: String,
        delivery_id: String,
        payload: Value,
    },
    Unknown {
        event: String,
        delivery_id: String,
    },
}

impl WebhookEvent {
    pub fn delivery_id(&self) -> &str {
        match self {
            Self::Issues { delivery_id, .. }
            | Self::Installation { delivery_id, .. }
            | Self::IssueComment { delivery_id, .. }
            | Self::Unknown { delivery_id, .. } => delivery_id,
        }
    }
}

/// Parses `body` as JSON and classifies it by `event_name` (the
/// `X-GitHub-Event` header). An unrecognized `event_name` decodes to
/// [`WebhookEvent::Unknown`] rather than an error -- per spec.md §4.8,
/// unknown events are acknowledged, not rejected.
pub fn decode(event_name: &str, delivery_id: &str, body: &[u8]) -> serde_json::Result<WebhookEvent> {
    let delivery_id = delivery_id.to_string();

    if !matches!(event_name, "issues" | "installation" | "issue_comment") {
        return Ok(WebhookEvent::Unknown {
            event: event_name.to_string(),
            delivery_id,
        });
    }

    let payload: Value = serde_json::from_slice(body)?;
    let action = payload
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(match event_name {
        "issues" => WebhookEvent::Issues {
            action,
            delivery_id,
            payload,
        },
        "installation" => WebhookEvent::Installation {
            action,
            delivery_id,
            payload,
        },
        _ => WebhookEvent::IssueComment {
            action,
            delivery_id,
            payload,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_an_issues_event() {
        let event = decode("issues", "d1", br#"{"action":"opened"}"#).unwrap();
        match event {
            WebhookEvent::Issues { action, delivery_id, .. } => {
                assert_eq!(action, "opened");
                assert_eq!(delivery_id, "d1");
            }
            other => panic!("expected Issues, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_event_name_decodes_to_unknown_without_parsing() {
        let event = decode("pull_request", "d2", b"not json at all").unwrap();
        assert_eq!(
            event,
            WebhookEvent::Unknown {
                event: "pull_request".to_string(),
                delivery_id: "d2".to_string(),
            }
        );
    }

    #[test]
    fn malformed_json_for_a_known_event_is_an_error() {
        assert!(decode("issues", "d3", b"{not json").is_err());
    }
}
