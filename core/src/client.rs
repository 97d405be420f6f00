//! Client and the request lifecycle state machine
//!
//! [`Client::request`] drives one logical request through the full
//! lifecycle: before hooks → build → dispatch → classify or validate →
//! retry / cancel-all / reject / succeed → after hooks. Retries re-enter
//! the same machine with a decremented budget and never re-run the hooks,
//! which fire exactly once per top-level call.
//!
//! The only suspension points are the transport dispatch and the recursive
//! retry re-entry; hooks, transforms, and validations run synchronously in
//! between.

use serde_json::Value;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::cancel::CancellationRegistry;
use crate::config::RequestConfig;
use crate::error::RequestError;
use crate::outcome::ValidationKind;
use crate::pipeline::{run_transforms, run_validations};
use crate::request::{self, READ_METHOD};
use crate::transport::{RawResponse, Transport};

/// Successful terminal result of a logical request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientResponse {
    /// Response payload after the response transform pipeline
    pub data: Option<Value>,
    /// Raw response as the transport reported it
    pub raw: RawResponse,
}

/// Terminal result returned to callers; every expected failure mode is a
/// typed [`RequestError`], nothing escapes as a panic.
pub type RequestResult = Result<ClientResponse, RequestError>;

/// Configurable request executor.
///
/// Cheap to clone; clones share the transport and the cancellation
/// registry. Derive specialized clients with [`extend`](Self::extend) —
/// the configuration itself is never mutated.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    config: Arc<RequestConfig>,
    registry: CancellationRegistry,
}

impl Client {
    /// Client with an empty configuration.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_config(transport, RequestConfig::new())
    }

    /// Client with the given configuration and a fresh registry.
    #[must_use]
    pub fn with_config(transport: Arc<dyn Transport>, config: RequestConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            registry: CancellationRegistry::new(),
        }
    }

    /// Derive a new client whose configuration is `merge(current, partial)`.
    ///
    /// The derived client shares this client's transport and cancellation
    /// registry; neither configuration is mutated.
    #[must_use]
    pub fn extend(&self, partial: &RequestConfig) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::new(self.config.merge(partial)),
            registry: self.registry.clone(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// The shared cancellation registry, for external cancellation of
    /// in-flight attempts.
    #[must_use]
    pub const fn registry(&self) -> &CancellationRegistry {
        &self.registry
    }

    /// Execute one logical request through the lifecycle.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] for every recognized failure mode:
    /// cancellation, transport failure, retry-budget exhaustion,
    /// validator-driven cancel-all, or validator rejection.
    pub async fn request(&self, method: &str, url: &str, data: Option<Value>) -> RequestResult {
        self.execute(method, url, data.as_ref(), false, 0).await
    }

    /// GET without a payload.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(&self, url: &str) -> RequestResult {
        self.request(READ_METHOD, url, None).await
    }

    /// GET with query parameters.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get_with(&self, url: &str, params: Value) -> RequestResult {
        self.request(READ_METHOD, url, Some(params)).await
    }

    /// POST with a body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post(&self, url: &str, body: Value) -> RequestResult {
        self.request("post", url, Some(body)).await
    }

    /// PUT with a body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put(&self, url: &str, body: Value) -> RequestResult {
        self.request("put", url, Some(body)).await
    }

    /// PATCH with a body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn patch(&self, url: &str, body: Value) -> RequestResult {
        self.request("patch", url, Some(body)).await
    }

    /// DELETE without a payload.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete(&self, url: &str) -> RequestResult {
        self.request("delete", url, None).await
    }

    /// The lifecycle entry point.
    ///
    /// `retry=false` marks the top-level call: only that level runs the
    /// before/after hooks, no matter how many retries happen underneath.
    /// Returns a boxed future because retries re-enter this function
    /// recursively.
    fn execute<'a>(
        &'a self,
        method: &'a str,
        url: &'a str,
        data: Option<&'a Value>,
        retry: bool,
        retry_num: u64,
    ) -> BoxFuture<'a, RequestResult> {
        Box::pin(async move {
            if !retry {
                for hook in &self.config.before {
                    hook();
                }
            }

            let result = self.attempt(method, url, data, retry, retry_num).await;

            if !retry {
                for hook in &self.config.after {
                    hook();
                }
            }

            result
        })
    }

    /// One dispatch attempt: build, dispatch, settle, validate, branch.
    async fn attempt(
        &self,
        method: &str,
        url: &str,
        data: Option<&Value>,
        retry: bool,
        retry_num: u64,
    ) -> RequestResult {
        let handle = self.registry.issue();
        let descriptor = request::build(method, url, data, &self.config, handle.signal.clone());

        tracing::debug!(method, url, attempt_id = handle.id, retry, "dispatching");
        let dispatched = self.transport.dispatch(descriptor).await;
        // The handle must not outlive its attempt: retire on both settle
        // paths before doing anything with the result.
        self.registry.retire(&handle);

        let raw = match dispatched {
            Ok(raw) => raw,
            Err(err) if err.is_cancellation() => {
                tracing::debug!(method, url, attempt_id = handle.id, "dispatch canceled");
                return Err(RequestError::Canceled);
            }
            Err(err) => {
                tracing::warn!(method, url, attempt_id = handle.id, error = %err, "dispatch failed");
                return Err(RequestError::Transport(err));
            }
        };

        let response = run_transforms(&self.config.transform_response, raw.data.as_ref());
        let outcome = run_validations(&self.config.response_validations, &raw);

        match outcome.kind() {
            ValidationKind::NoError => Ok(ClientResponse {
                data: response,
                raw,
            }),
            ValidationKind::Retry => {
                if !retry || retry_num > 0 {
                    // The first RETRY seeds the budget from the validator's
                    // payload; later RETRYs inherit the decremented count and
                    // their own payload is ignored.
                    let budget = if retry {
                        retry_num
                    } else {
                        outcome.payload().and_then(Value::as_u64).unwrap_or(0)
                    };
                    let remaining = budget.saturating_sub(1);
                    tracing::info!(method, url, remaining, "validator requested retry");
                    self.execute(method, url, data, true, remaining).await
                } else {
                    tracing::warn!(method, url, "retry budget exhausted");
                    Err(RequestError::RetriesExhausted { response, raw })
                }
            }
            ValidationKind::CancelAll => {
                tracing::warn!(method, url, "validator canceled all in-flight requests");
                self.registry.cancel_all();
                Err(RequestError::CanceledAll { response, raw })
            }
            ValidationKind::Error => Err(RequestError::Validation {
                code: outcome.payload().cloned(),
                response,
                raw,
            }),
        }
    }
}
