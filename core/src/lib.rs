//! # Courier Core
//!
//! Configurable HTTP request executor: a transport-agnostic request
//! lifecycle with transform pipelines, validation-driven retry and
//! cancellation, and per-request cancellation handles.
//!
//! ## Core Concepts
//!
//! - **`RequestConfig`**: lazy headers, before/after hooks, ordered
//!   transform and validation pipelines; merged structurally, never mutated
//! - **`Client`**: drives the lifecycle (hooks → build → dispatch →
//!   validate → retry / cancel-all / reject / succeed)
//! - **`Transport`**: the network collaborator behind a trait seam; the
//!   core performs no I/O of its own
//! - **`ValidationOutcome`**: what a validator asked for — nothing, a
//!   retry with a budget, an application error, or cancel-everything
//! - **`CancellationRegistry`**: one cancellation handle per dispatch
//!   attempt, issued before the call and retired when it settles
//!
//! ## Example
//!
//! ```ignore
//! use courier_core::{Client, RequestConfig};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let config = RequestConfig::new()
//!     .with_base_url("https://api.example.com")
//!     .with_header("x-api-key", || std::env::var("API_KEY").unwrap_or_default())
//!     .with_validation(|raw, outcome| {
//!         if raw.status == 503 {
//!             outcome.retry(3);
//!         }
//!     });
//!
//! // `transport` is any `Arc<dyn Transport>`, e.g. courier-reqwest.
//! let client = Client::with_config(transport, config);
//! let result = client.get_with("/search", json!({"q": "rust"})).await?;
//! ```

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod request;
pub mod transport;

// Re-export main types for convenience
pub use cancel::{CancelSignal, CancellationHandle, CancellationRegistry};
pub use client::{Client, ClientResponse, RequestResult};
pub use config::{HeaderProvider, Hook, RequestConfig, Transform, Validation};
pub use error::RequestError;
pub use outcome::{ValidationKind, ValidationOutcome};
pub use request::{RequestDescriptor, READ_METHOD};
pub use transport::{RawResponse, Transport, TransportError};
