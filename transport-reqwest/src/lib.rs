//! # Courier reqwest transport
//!
//! [`ReqwestTransport`] implements the courier [`Transport`] trait on top of
//! [`reqwest`]: descriptor params become the query string, the body is sent
//! as JSON, resolved headers are applied verbatim, and the whole call races
//! the attempt's cancellation signal.
//!
//! ## Example
//!
//! ```no_run
//! use courier_core::{Client, RequestConfig};
//! use courier_reqwest::ReqwestTransport;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(ReqwestTransport::new());
//! let client = Client::with_config(
//!     transport,
//!     RequestConfig::new().with_base_url("https://api.example.com"),
//! );
//! let response = client.get("/health").await?;
//! println!("{:?}", response.data);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use courier_core::{RawResponse, RequestDescriptor, Transport, TransportError};
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// reqwest-backed [`Transport`].
///
/// Owns a connection-pooling [`reqwest::Client`]; cloning the transport
/// shares the pool. Per-call timeout is this layer's concern — the core
/// lifecycle has none.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Transport with a default client and no timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport using a preconfigured [`reqwest::Client`] (custom TLS,
    /// proxies, pool limits).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Set a per-call timeout. A timed-out call reports
    /// [`TransportError::Failed`], not a cancellation.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn dispatch(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| {
                TransportError::InvalidRequest(format!("unsupported method: {}", request.method))
            })?;
        let url = target_url(&request);

        let mut builder = self.client.request(method, &url);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(headers) = &request.headers {
            for (name, value) in headers {
                builder = builder.header(name, value);
            }
        }
        if let Some(params) = &request.params {
            builder = builder.query(params);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let signal = request.signal.clone();
        let call = async move {
            let response = builder.send().await.map_err(classify)?;
            let status = response.status().as_u16();
            let headers = collect_headers(response.headers());
            let bytes = response.bytes().await.map_err(classify)?;
            let data = decode_body(&bytes);

            tracing::debug!(url = %url, status, "dispatch settled");
            Ok(RawResponse {
                status,
                headers,
                data,
            })
        };

        tokio::select! {
            () = signal.canceled() => {
                tracing::debug!("dispatch canceled by signal");
                Err(TransportError::Canceled)
            }
            result = call => result,
        }
    }
}

fn target_url(request: &RequestDescriptor) -> String {
    match &request.base_url {
        Some(base) if !is_absolute(&request.url) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            request.url.trim_start_matches('/')
        ),
        _ => request.url.clone(),
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("<invalid>").to_string(),
            )
        })
        .collect()
}

/// Empty bodies become absent data; JSON bodies are parsed; anything else
/// is kept as a string.
fn decode_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    Some(serde_json::from_slice(bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(bytes).into_owned())
    }))
}

fn classify(err: reqwest::Error) -> TransportError {
    TransportError::Failed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{CancelSignal, RequestConfig};
    use serde_json::json;

    fn descriptor(url: &str, base_url: Option<&str>) -> RequestDescriptor {
        let mut config = RequestConfig::new();
        if let Some(base) = base_url {
            config = config.with_base_url(base);
        }
        courier_core::request::build("get", url, None, &config, CancelSignal::new())
    }

    #[test]
    fn relative_urls_join_onto_the_base() {
        let joined = target_url(&descriptor("/v1/ping", Some("https://api.example.com/")));
        assert_eq!(joined, "https://api.example.com/v1/ping");
    }

    #[test]
    fn absolute_urls_ignore_the_base() {
        let joined = target_url(&descriptor("https://other.example/x", Some("https://api.example.com")));
        assert_eq!(joined, "https://other.example/x");
    }

    #[test]
    fn missing_base_passes_the_url_through() {
        assert_eq!(target_url(&descriptor("/v1/ping", None)), "/v1/ping");
    }

    #[test]
    fn body_decoding_covers_empty_json_and_text() {
        assert_eq!(decode_body(b""), None);
        assert_eq!(decode_body(br#"{"ok":true}"#), Some(json!({"ok": true})));
        assert_eq!(decode_body(b"pong"), Some(Value::String("pong".to_string())));
    }

    #[test]
    fn unsupported_method_token_is_rejected() {
        assert!(Method::from_bytes("ge t".as_bytes()).is_err());
    }
}
