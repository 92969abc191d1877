//! Storefront response models

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Decode a raw response body into a typed model
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Accept ids sent either as JSON numbers or strings
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!("invalid id: {}", other))),
    }
}

/// Standard `{ success, data, error }` wrapper used by listing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,

    pub data: T,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `success: false` into an error
    pub fn into_data(self) -> Result<T, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::HttpStatus {
                status: 200,
                message: self.error.unwrap_or_else(|| "request rejected".to_string()),
            })
        }
    }
}

/// Taxonomy entry: category, brand, language or currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    pub name: String,

    /// Language or currency code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Product summary as returned by listings and search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    pub name: String,

    #[serde(default, alias = "brand_name", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, alias = "category_name", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, alias = "min_price", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, alias = "average_rating", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// Static content page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// What the search backend understood about a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    #[serde(default)]
    pub original: String,

    #[serde(default)]
    pub corrected: String,

    #[serde(default)]
    pub was_corrected: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,

    /// Detected intent, e.g. `price_comparison`, `general_search`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    #[serde(default)]
    pub entities: Value,
}

/// Response of the `suggestions` action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub suggestions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_info: Option<QueryInfo>,
}

/// Response of a full search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<Product>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_info: Option<QueryInfo>,

    #[serde(default)]
    pub suggestions: Vec<String>,

    #[serde(default)]
    pub total_results: usize,

    /// Backend processing time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

/// Response of the `popular_searches` action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopularSearches {
    #[serde(default)]
    pub searches: Vec<String>,
}
