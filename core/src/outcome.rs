//! Validation outcomes
//!
//! A response validator receives the raw response together with a mutable
//! [`ValidationOutcome`] and records what the lifecycle should do next:
//! nothing (the default), retry with a budget, fail with an application
//! error code, or cancel every in-flight request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a validator asked the lifecycle to do.
///
/// Serialized as SCREAMING_SNAKE_CASE: `NO_ERROR` / `RETRY` / `ERROR` /
/// `CANCEL_ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationKind {
    /// Response accepted; continue on the success path
    #[default]
    NoError,
    /// Re-dispatch the request; the payload carries the initial retry budget
    Retry,
    /// Reject the response with an application error code
    Error,
    /// Cancel every in-flight request and fail this one
    CancelAll,
}

/// Mutable recorder handed to each validator in turn.
///
/// Starts as [`ValidationKind::NoError`]; the first validator that records
/// anything else wins and no later validator runs (see
/// [`run_validations`](crate::pipeline::run_validations)).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    kind: ValidationKind,
    payload: Option<Value>,
}

impl ValidationOutcome {
    /// Fresh outcome in the `NoError` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            kind: ValidationKind::NoError,
            payload: None,
        }
    }

    /// Request a retry with the given initial budget.
    ///
    /// The budget only seeds the retry chain on the first RETRY outcome of a
    /// logical request; budgets recorded on later attempts are ignored in
    /// favor of the inherited, decremented count.
    pub fn retry(&mut self, budget: u64) {
        self.kind = ValidationKind::Retry;
        self.payload = Some(Value::from(budget));
    }

    /// Reject the response with an application-defined error code.
    pub fn reject(&mut self, code: Value) {
        self.kind = ValidationKind::Error;
        self.payload = Some(code);
    }

    /// Ask the lifecycle to cancel every in-flight request.
    pub fn cancel_all(&mut self) {
        self.kind = ValidationKind::CancelAll;
        self.payload = None;
    }

    /// The recorded kind.
    #[must_use]
    pub const fn kind(&self) -> ValidationKind {
        self.kind
    }

    /// The recorded payload (retry budget or error code), if any.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Whether anything other than `NoError` has been recorded.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.kind != ValidationKind::NoError
    }
}
