//! Request configuration and structural merge
//!
//! A [`RequestConfig`] is a bag of recognized options: the base URL, lazily
//! computed headers, before/after hooks, request/response transform chains,
//! and response validators. Configs are never mutated once a client holds
//! one — deriving a specialized client goes through [`RequestConfig::merge`],
//! which produces a new config.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::outcome::ValidationOutcome;
use crate::transport::RawResponse;

/// Deferred header value, invoked at request time.
///
/// Headers are providers rather than fixed strings so values that change
/// between requests (fresh auth tokens, request ids) are picked up at
/// resolution time.
pub type HeaderProvider = Arc<dyn Fn() -> String + Send + Sync>;

/// Side-effecting hook run before or after a top-level request.
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// Payload transform applied in order along a pipeline.
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Response validator; records its verdict on the given outcome.
pub type Validation = Arc<dyn Fn(&RawResponse, &mut ValidationOutcome) + Send + Sync>;

/// Immutable-by-convention request configuration.
///
/// All list-valued fields are append-only via [`merge`](Self::merge); the
/// fluent setters below consume and return `self` so a config is built in
/// one expression and never touched afterwards.
#[derive(Clone, Default)]
pub struct RequestConfig {
    /// Base URL prepended by the transport when set
    pub base_url: Option<String>,
    /// Header name → deferred value provider
    pub headers: HashMap<String, HeaderProvider>,
    /// Hooks run once per top-level request, before anything else
    pub before: Vec<Hook>,
    /// Hooks run once per top-level request, after the terminal result
    pub after: Vec<Hook>,
    /// Outgoing payload transforms, applied in order
    pub transform_request: Vec<Transform>,
    /// Response payload transforms, applied in order
    pub transform_response: Vec<Transform>,
    /// Response validators, run in order with first-flag-wins short-circuit
    pub response_validations: Vec<Validation>,
}

impl RequestConfig {
    /// Empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a lazily computed header.
    #[must_use]
    pub fn with_header(
        mut self,
        name: impl Into<String>,
        provider: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.headers.insert(name.into(), Arc::new(provider));
        self
    }

    /// Append a before hook.
    #[must_use]
    pub fn on_before(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.before.push(Arc::new(hook));
        self
    }

    /// Append an after hook.
    #[must_use]
    pub fn on_after(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.after.push(Arc::new(hook));
        self
    }

    /// Append an outgoing payload transform.
    #[must_use]
    pub fn with_request_transform(
        mut self,
        transform: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.transform_request.push(Arc::new(transform));
        self
    }

    /// Append a response payload transform.
    #[must_use]
    pub fn with_response_transform(
        mut self,
        transform: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.transform_response.push(Arc::new(transform));
        self
    }

    /// Append a response validator.
    #[must_use]
    pub fn with_validation(
        mut self,
        validation: impl Fn(&RawResponse, &mut ValidationOutcome) + Send + Sync + 'static,
    ) -> Self {
        self.response_validations.push(Arc::new(validation));
        self
    }

    /// Structural merge: scalars from `other` win when set, list fields are
    /// `self` then `other` (order preserved), headers merge key-wise with
    /// `other` winning on collisions. Neither input is mutated.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut headers = self.headers.clone();
        headers.extend(
            other
                .headers
                .iter()
                .map(|(name, provider)| (name.clone(), Arc::clone(provider))),
        );

        Self {
            base_url: other.base_url.clone().or_else(|| self.base_url.clone()),
            headers,
            before: concat(&self.before, &other.before),
            after: concat(&self.after, &other.after),
            transform_request: concat(&self.transform_request, &other.transform_request),
            transform_response: concat(&self.transform_response, &other.transform_response),
            response_validations: concat(&self.response_validations, &other.response_validations),
        }
    }

    /// Resolve headers by invoking each provider now.
    ///
    /// Returns `None` when no headers are configured — absence, not an empty
    /// mapping — so the transport can skip header handling entirely.
    #[must_use]
    pub fn resolve_headers(&self) -> Option<HashMap<String, String>> {
        if self.headers.is_empty() {
            return None;
        }
        Some(
            self.headers
                .iter()
                .map(|(name, provider)| (name.clone(), provider()))
                .collect(),
        )
    }
}

fn concat<T: Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .field("transform_request", &self.transform_request.len())
            .field("transform_response", &self.transform_response.len())
            .field("response_validations", &self.response_validations.len())
            .finish()
    }
}
