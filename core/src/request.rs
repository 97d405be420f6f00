//! Request descriptor assembly
//!
//! [`build`] turns method, URL, payload, and configuration into the
//! [`RequestDescriptor`] handed to the transport. The outgoing payload goes
//! through the request transform pipeline first, then lands in exactly one
//! of the params or body slots depending on the method.

use serde_json::Value;
use std::collections::HashMap;

use crate::cancel::CancelSignal;
use crate::config::RequestConfig;
use crate::pipeline::run_transforms;

/// The method token whose payload rides in the query string.
///
/// The match is case-sensitive: `"GET"` is not a read method here, it sends
/// a body like anything else.
pub const READ_METHOD: &str = "get";

/// Everything the transport needs to perform one network call.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    /// Target URL or path (joined onto `base_url` by the transport)
    pub url: String,
    /// Method token, passed through verbatim
    pub method: String,
    /// Base URL from the configuration, if set
    pub base_url: Option<String>,
    /// Resolved headers; `None` when no headers are configured
    pub headers: Option<HashMap<String, String>>,
    /// Query-parameter payload, populated only for [`READ_METHOD`]
    pub params: Option<Value>,
    /// Body payload, populated for every other method
    pub body: Option<Value>,
    /// Cancellation signal for this attempt
    pub signal: CancelSignal,
}

/// Build a transport descriptor for one dispatch attempt.
///
/// Runs the configured request transforms over `data`, resolves headers,
/// and routes the transformed payload into params (read method) or body
/// (anything else) — never both.
#[must_use]
pub fn build(
    method: &str,
    url: &str,
    data: Option<&Value>,
    config: &RequestConfig,
    signal: CancelSignal,
) -> RequestDescriptor {
    let payload = run_transforms(&config.transform_request, data);
    let (params, body) = if method == READ_METHOD {
        (payload, None)
    } else {
        (None, payload)
    };

    RequestDescriptor {
        url: url.to_owned(),
        method: method.to_owned(),
        base_url: config.base_url.clone(),
        headers: config.resolve_headers(),
        params,
        body,
        signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_routes_payload_into_params() {
        let config = RequestConfig::new();
        let data = json!({"q": 1});
        let descriptor = build("get", "/search", Some(&data), &config, CancelSignal::new());

        assert_eq!(descriptor.params, Some(json!({"q": 1})));
        assert_eq!(descriptor.body, None);
    }

    #[test]
    fn post_routes_payload_into_body() {
        let config = RequestConfig::new();
        let data = json!({"q": 1});
        let descriptor = build("post", "/search", Some(&data), &config, CancelSignal::new());

        assert_eq!(descriptor.params, None);
        assert_eq!(descriptor.body, Some(json!({"q": 1})));
    }

    #[test]
    fn read_method_match_is_case_sensitive() {
        let config = RequestConfig::new();
        let data = json!({"q": 1});
        let descriptor = build("GET", "/search", Some(&data), &config, CancelSignal::new());

        // Uppercase is not the read token, so the payload goes to the body slot.
        assert_eq!(descriptor.params, None);
        assert_eq!(descriptor.body, Some(json!({"q": 1})));
    }

    #[test]
    fn request_transforms_shape_the_outgoing_payload() {
        let config = RequestConfig::new().with_request_transform(|mut v| {
            v["signed"] = json!(true);
            v
        });
        let data = json!({"q": 1});
        let descriptor = build("post", "/submit", Some(&data), &config, CancelSignal::new());

        assert_eq!(descriptor.body, Some(json!({"q": 1, "signed": true})));
        assert_eq!(data, json!({"q": 1}));
    }

    #[test]
    fn descriptor_carries_base_url_and_resolved_headers() {
        let config = RequestConfig::new()
            .with_base_url("https://api.example")
            .with_header("x-app", || "courier".to_string());
        let descriptor = build("get", "/ping", None, &config, CancelSignal::new());

        assert_eq!(descriptor.base_url.as_deref(), Some("https://api.example"));
        let headers = descriptor.headers.unwrap_or_default();
        assert_eq!(headers.get("x-app").map(String::as_str), Some("courier"));
        assert_eq!(descriptor.params, None);
        assert_eq!(descriptor.body, None);
    }
}
