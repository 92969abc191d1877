//! HTTP transport implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::Client as HttpClient;
use serde_json::Value;

use super::{ApiRequest, Transport};
use crate::error::ApiError;

/// Default catalog endpoint
pub const DEFAULT_API_URL: &str = "http://localhost/api/index.php";

/// Default smart-search endpoint
pub const DEFAULT_SEARCH_URL: &str = "http://localhost/api/ai_search.php";

/// Resources served by the smart-search endpoint rather than the catalog
const SEARCH_RESOURCES: [&str; 3] = ["suggestions", "search", "popular_searches"];

/// Client-wide timeout when the caller does not pass one
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed [`Transport`].
///
/// Sends `GET {url}?action={resource}&k=v...` and interprets the status and
/// the `success` flag of the JSON body.
pub struct HttpTransport {
    http: HttpClient,
    api_url: String,
    search_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpTransport {
    /// Create a transport using the default timeout and pacing
    pub fn new(api_url: impl Into<String>, search_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_options(api_url, search_url, DEFAULT_TIMEOUT, 10)
    }

    /// Create a transport with an explicit client timeout and request rate
    pub fn with_options(
        api_url: impl Into<String>,
        search_url: impl Into<String>,
        timeout: Duration,
        requests_per_second: u32,
    ) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            http,
            api_url: api_url.into(),
            search_url: search_url.into(),
            rate_limiter,
        })
    }

    /// Endpoint URL serving `resource`
    fn url_for(&self, resource: &str) -> &str {
        if SEARCH_RESOURCES.contains(&resource) {
            &self.search_url
        } else {
            &self.api_url
        }
    }
}

/// Map a response status and body to the gateway's error taxonomy
pub(crate) fn interpret_response(status: u16, body: &str) -> Result<Value, ApiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| error_message(&v))
            .unwrap_or_else(|| body.trim().to_string());
        return Err(ApiError::HttpStatus { status, message });
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| ApiError::Decode(format!("Failed to parse response: {}", e)))?;

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = error_message(&value).unwrap_or_else(|| "request rejected".to_string());
        return Err(ApiError::HttpStatus { status, message });
    }

    Ok(value)
}

/// Pull a human-readable error out of a JSON error body
fn error_message(value: &Value) -> Option<String> {
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        timeout: Option<Duration>,
    ) -> Result<Value, ApiError> {
        self.rate_limiter.until_ready().await;

        let url = self.url_for(&request.resource);
        let mut query: Vec<(&str, &str)> = vec![("action", request.resource.as_str())];
        query.extend(request.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        debug!("GET {} action={}", url, request.resource);

        let mut builder = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .query(&query);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(ApiError::from)?;

        interpret_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = HttpTransport::new(DEFAULT_API_URL, DEFAULT_SEARCH_URL);
        assert!(transport.is_ok());
    }

    #[test]
    fn test_routes_search_resources() {
        let transport = HttpTransport::new("http://a/index.php", "http://a/search.php").unwrap();

        assert_eq!(transport.url_for("suggestions"), "http://a/search.php");
        assert_eq!(transport.url_for("search"), "http://a/search.php");
        assert_eq!(transport.url_for("categories"), "http://a/index.php");
        assert_eq!(transport.url_for("products"), "http://a/index.php");
    }

    #[test]
    fn test_interpret_ok() {
        let value = interpret_response(200, r#"{"success": true, "data": [1, 2]}"#).unwrap();
        assert_eq!(value["data"][1], 2);
    }

    #[test]
    fn test_interpret_non_2xx() {
        let err = interpret_response(500, r#"{"error": "Internal server error"}"#).unwrap_err();
        assert_eq!(
            err,
            ApiError::HttpStatus {
                status: 500,
                message: "Internal server error".to_string()
            }
        );
    }

    #[test]
    fn test_interpret_non_2xx_plain_body() {
        let err = interpret_response(404, "Not Found\n").unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn test_interpret_success_false() {
        let err =
            interpret_response(200, r#"{"success": false, "error": "search_error"}"#).unwrap_err();
        assert_eq!(err.status(), Some(200));
        assert!(err.to_string().contains("search_error"));
    }

    #[test]
    fn test_interpret_invalid_json() {
        let err = interpret_response(200, "<html>oops</html>").unwrap_err();
        match err {
            ApiError::Decode(_) => (),
            _ => panic!("Expected ApiError::Decode"),
        }
    }
}
