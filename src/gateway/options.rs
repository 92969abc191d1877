//! Per-request gateway options

use std::time::Duration;

/// Resources whose data changes rarely within a session
const STATIC_RESOURCES: [&str; 6] = [
    "languages",
    "currencies",
    "categories",
    "brands",
    "page",
    "popular_searches",
];

/// Whether a resource may be served from the response cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Slow-changing data, read from and written to the cache
    Static,
    /// Always fetched fresh, never cached
    Dynamic,
}

impl Classification {
    /// Default classification for a storefront resource name
    pub fn for_resource(resource: &str) -> Self {
        if STATIC_RESOURCES.contains(&resource) {
            Classification::Static
        } else {
            Classification::Dynamic
        }
    }

    pub fn is_static(self) -> bool {
        self == Classification::Static
    }
}

/// Options for one [`RequestGateway::fetch`](super::RequestGateway::fetch) call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub classification: Classification,
    /// Skip the cache read; a successful static response still refreshes it
    pub bypass_cache: bool,
    /// Hard timeout handed to the transport
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn new(classification: Classification) -> Self {
        Self {
            classification,
            bypass_cache: false,
            timeout: None,
        }
    }

    pub fn cached() -> Self {
        Self::new(Classification::Static)
    }

    pub fn fresh() -> Self {
        Self::new(Classification::Dynamic)
    }

    pub fn for_resource(resource: &str) -> Self {
        Self::new(Classification::for_resource(resource))
    }

    pub fn bypass_cache(mut self, bypass: bool) -> Self {
        self.bypass_cache = bypass;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
