//! Storefront transport
//!
//! The [`Transport`] trait is the single seam through which the gateway talks
//! to the remote storefront. [`HttpTransport`] is the production
//! implementation; tests substitute a scripted mock.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;

pub mod http;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use http::HttpTransport;
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockTransport;

/// One logical read request against the storefront
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Resource name, sent as the `action` query parameter
    pub resource: String,
    /// Query parameters, kept sorted
    pub params: BTreeMap<String, String>,
}

impl ApiRequest {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter (builder style)
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Deterministic cache key for this request
    pub fn cache_key(&self) -> String {
        let params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        crate::cache::cache_key(&self.resource, &params)
    }
}

/// Outbound network call for a single request.
///
/// Implementations report transport failures as [`ApiError::Network`],
/// non-2xx or `success: false` responses as [`ApiError::HttpStatus`], and
/// unparseable bodies as [`ApiError::Decode`]. They never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest, timeout: Option<Duration>)
    -> Result<Value, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::new("products")
            .param("page", "2")
            .param("category_id", "7");

        assert_eq!(request.resource, "products");
        assert_eq!(request.params.get("page").map(String::as_str), Some("2"));
        assert_eq!(request.params.len(), 2);
    }

    #[test]
    fn test_request_cache_key_ignores_param_order() {
        let a = ApiRequest::new("products")
            .param("page", "2")
            .param("category_id", "7");
        let b = ApiRequest::new("products").with_params([("category_id", "7"), ("page", "2")]);

        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_request_cache_key_depends_on_resource() {
        let a = ApiRequest::new("brands");
        let b = ApiRequest::new("categories");
        assert_ne!(a.cache_key(), b.cache_key());
    }
}
