//! Failure taxonomy surfaced to callers
//!
//! Every recognized failure mode is a [`RequestError`] variant returned in
//! the `Err` position of a normal `Result` — callers never need to catch
//! anything for expected failures. Variants that arise from a real response
//! (validation-driven ones) keep both the transformed and the raw response;
//! transport-level failures by definition have neither.

use serde_json::Value;
use thiserror::Error;

use crate::transport::{RawResponse, TransportError};

/// Terminal failure of a logical request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The transport reported the dispatch was canceled
    #[error("request was canceled")]
    Canceled,

    /// The transport failed for any non-cancellation reason
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),

    /// A validator kept requesting retries past budget exhaustion
    #[error("retry budget exhausted")]
    RetriesExhausted {
        /// Transformed response of the final attempt
        response: Option<Value>,
        /// Raw response of the final attempt
        raw: RawResponse,
    },

    /// A validator asked to cancel all in-flight requests
    #[error("canceled all in-flight requests")]
    CanceledAll {
        /// Transformed response that triggered the cancel-all
        response: Option<Value>,
        /// Raw response that triggered the cancel-all
        raw: RawResponse,
    },

    /// A validator rejected the response with an application error code
    #[error("response rejected by validator")]
    Validation {
        /// Application-defined error code recorded by the validator
        code: Option<Value>,
        /// Transformed response that was rejected
        response: Option<Value>,
        /// Raw response that was rejected
        raw: RawResponse,
    },
}

impl RequestError {
    /// Whether this failure carries a real (non-exception) response.
    #[must_use]
    pub const fn has_response(&self) -> bool {
        matches!(
            self,
            Self::RetriesExhausted { .. } | Self::CanceledAll { .. } | Self::Validation { .. }
        )
    }
}
