//! Pipeline executors
//!
//! Two pure reducers over the ordered function lists held in a
//! [`RequestConfig`](crate::config::RequestConfig): a transform fold that
//! clones its input exactly once, and a validation fold that stops at the
//! first validator to flag anything.

use serde_json::Value;

use crate::config::{Transform, Validation};
use crate::outcome::ValidationOutcome;
use crate::transport::RawResponse;

/// Fold `input` through every transform in order.
///
/// An absent or null input is returned unchanged without running any
/// transform. Otherwise the input is deep-copied once up front, so
/// transforms own their value and may mutate it freely without touching the
/// caller's original.
#[must_use]
pub fn run_transforms(transforms: &[Transform], input: Option<&Value>) -> Option<Value> {
    let seed = match input {
        Some(value) if !value.is_null() => value,
        other => return other.cloned(),
    };

    let mut value = seed.clone();
    for transform in transforms {
        value = transform(value);
    }
    Some(value)
}

/// Run validators in order until one flags a non-default outcome.
///
/// First non-`NO_ERROR` verdict wins; later validators never run. If no
/// validator flags anything the returned outcome stays `NO_ERROR`.
#[must_use]
pub fn run_validations(validations: &[Validation], raw: &RawResponse) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::new();
    for validate in validations {
        validate(raw, &mut outcome);
        if outcome.is_flagged() {
            break;
        }
    }
    outcome
}
