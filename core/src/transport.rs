//! Transport collaborator boundary
//!
//! The core never performs network I/O itself. It hands a fully built
//! [`RequestDescriptor`](crate::request::RequestDescriptor) to a [`Transport`]
//! and gets back either a [`RawResponse`] or a [`TransportError`]. The one
//! thing the lifecycle needs to ask of a failure is whether it was a
//! cancellation, so [`TransportError`] keeps that distinction explicit.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::request::RequestDescriptor;

/// Raw response as reported by the transport, before any response transforms run.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response payload, if the response carried one
    pub data: Option<Value>,
}

impl RawResponse {
    /// Create a response with the given status and no headers or payload.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            data: None,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Errors a transport can report for a dispatch attempt
#[derive(Debug, Error)]
pub enum TransportError {
    /// The in-flight call was canceled through its cancellation signal
    #[error("request was canceled before completion")]
    Canceled,

    /// The descriptor could not be turned into a wire request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other transport failure (connect, I/O, protocol)
    #[error("request failed: {0}")]
    Failed(String),
}

impl TransportError {
    /// Whether this failure means the call was canceled rather than broken.
    ///
    /// The lifecycle uses this to classify failures into
    /// [`RequestError::Canceled`](crate::error::RequestError::Canceled) versus
    /// [`RequestError::Transport`](crate::error::RequestError::Transport).
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

/// The network collaborator the lifecycle dispatches through.
///
/// Implementations must watch `request.signal` and fail with
/// [`TransportError::Canceled`] when it fires before the call settles.
/// Timeouts, connection pooling, and the wire protocol all live behind
/// this trait; the core knows nothing about them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the network call described by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Canceled`] if the attempt's cancellation
    /// signal fired first, any other variant for real failures.
    async fn dispatch(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canceled_is_the_only_cancellation() {
        assert!(TransportError::Canceled.is_cancellation());
        assert!(!TransportError::Failed("boom".to_string()).is_cancellation());
        assert!(!TransportError::InvalidRequest("bad".to_string()).is_cancellation());
    }

    #[test]
    fn raw_response_builders() {
        let raw = RawResponse::new(200)
            .with_header("content-type", "application/json")
            .with_data(serde_json::json!({"ok": true}));

        assert_eq!(raw.status, 200);
        assert_eq!(
            raw.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(raw.data, Some(serde_json::json!({"ok": true})));
    }
}
