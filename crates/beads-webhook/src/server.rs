//! Synchronous HTTP server (`tiny_http`) handling signed webhook deliveries
//! on a pool of worker threads, per spec.md §4.8.

use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;

use tiny_http::{Response, Server, StatusCode};
use tracing::{error, warn};

use crate::dedupe::{DeliveryDedupe, DEFAULT_CAPACITY};
use crate::error::{Result, WebhookError};
use crate::event::{decode, WebhookEvent};
use crate::signature::verify;

/// Hands a decoded event to the Mirror Orchestrator. Errors become a 5xx
/// so the sender retries -- the dedupe check in [`DeliveryDedupe`] makes
/// that retry safe.
pub type EventHandler =
    Box<dyn Fn(WebhookEvent) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

pub struct WebhookServer {
    server: Server,
    secret: Vec<u8>,
    dedupe: DeliveryDedupe,
    handler: EventHandler,
}

impl WebhookServer {
    pub fn bind(addr: &str, secret: impl Into<Vec<u8>>, handler: EventHandler) -> Result<Self> {
        let server = Server::http(addr).map_err(WebhookError::Bind)?;
        Ok(Self {
            server,
            secret: secret.into(),
            dedupe: DeliveryDedupe::new(DEFAULT_CAPACITY),
            handler,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        match self.server.server_addr() {
            tiny_http::ListenAddr::IP(addr) => addr,
            #[allow(unreachable_patterns)]
            _ => unreachable!("webhook server always binds a TCP address"),
        }
    }

    /// Runs `worker_count` request-handling threads, blocking the caller
    /// for as long as the server is bound. Each inbound connection is
    /// handled by whichever worker thread's `recv()` call wins the race --
    /// `tiny_http::Server` is safe to call from multiple threads.
    pub fn run(&self, worker_count: usize) {
        std::thread::scope(|scope| {
            for _ in 0..worker_count.max(1) {
                scope.spawn(|| self.worker_loop());
            }
        });
    }

    fn worker_loop(&self) {
        loop {
            let mut request = match self.server.recv() {
                Ok(request) => request,
                Err(err) => {
                    error!(error = %err, "webhook server recv failed");
                    continue;
                }
            };
            let response = self.handle(&mut request);
            if let Err(err) = request.respond(response) {
                warn!(error = %err, "failed to write webhook response");
            }
        }
    }

    fn handle(&self, request: &mut tiny_http::Request) -> Response<std::io::Cursor<Vec<u8>>> {
        let signature = header_value(request, "X-Hub-Signature-256");
        let event_name = header_value(request, "X-GitHub-Event").unwrap_or_default();
        let delivery_id = header_value(request, "X-GitHub-Delivery").unwrap_or_default();

        let mut body = Vec::new();
        if request.as_reader().read_to_end(&mut body).is_err() {
            return text_response(400, "could not read request body");
        }

        let Some(signature) = signature else {
            return text_response(401, "missing signature header");
        };
        if !verify(&self.secret, &body, &signature) {
            return text_response(401, "signature mismatch");
        }

        if self.dedupe.check_and_insert(&delivery_id) {
            return text_response(200, "duplicate delivery, already processed");
        }

        let event = match decode(&event_name, &delivery_id, &body) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "malformed webhook payload");
                return text_response(400, "malformed payload");
            }
        };

        if matches!(event, WebhookEvent::Unknown { .. }) {
            return text_response(200, "unknown event acknowledged");
        }

        match (self.handler)(event) {
            Ok(()) => text_response(200, "ok"),
            Err(err) => {
                error!(error = %err, "mirror orchestrator failed to process webhook event");
                text_response(500, "processing failed, retry")
            }
        }
    }
}

fn header_value(request: &tiny_http::Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str().to_string())
}

fn text_response(status: u16, body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body).with_status_code(StatusCode(status))
}
