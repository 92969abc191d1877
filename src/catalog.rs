//! Typed storefront read API
//!
//! Thin layer over [`RequestGateway`] naming each storefront resource and
//! its cache classification. Taxonomies (languages, currencies, categories,
//! brands, pages, trending searches) are cached; listings and searches are
//! always fetched fresh.

use std::time::Duration;

use serde_json::Value;

use crate::client::ApiRequest;
use crate::client::models::{
    CatalogItem, Envelope, Page, PopularSearches, Product, SearchResults, SuggestionResponse,
};
use crate::error::ApiError;
use crate::gateway::{FetchOptions, RequestGateway};

/// Queries shorter than this (after trimming) are not searched
pub const MIN_QUERY_LEN: usize = 2;

/// Filters for product listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub sort: Option<String>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, id: impl Into<String>) -> Self {
        self.category_id = Some(id.into());
        self
    }

    pub fn brand(mut self, id: impl Into<String>) -> Self {
        self.brand_id = Some(id.into());
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Convert to request parameters
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![];
        if let Some(ref id) = self.category_id {
            params.push(("category_id", id.clone()));
        }
        if let Some(ref id) = self.brand_id {
            params.push(("brand_id", id.clone()));
        }
        if let Some(ref search) = self.search {
            params.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(ref sort) = self.sort {
            params.push(("sort", sort.clone()));
        }
        params
    }
}

/// Whether `query` is long enough to be sent to the search backend
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

#[derive(Clone)]
pub struct Catalog {
    gateway: RequestGateway,
    timeout: Option<Duration>,
}

impl Catalog {
    pub fn new(gateway: RequestGateway) -> Self {
        Self {
            gateway,
            timeout: None,
        }
    }

    /// Apply a hard timeout to every request issued through this catalog
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    fn options(&self, resource: &str) -> FetchOptions {
        let options = FetchOptions::for_resource(resource);
        match self.timeout {
            Some(timeout) => options.timeout(timeout),
            None => options,
        }
    }

    async fn fetch_list(&self, resource: &str) -> Result<Vec<CatalogItem>, ApiError> {
        let envelope: Envelope<Vec<CatalogItem>> = self
            .gateway
            .fetch_as(ApiRequest::new(resource), self.options(resource))
            .await?;
        envelope.into_data()
    }

    /// Ping the API, never served from cache
    pub async fn test_connection(&self) -> Result<Value, ApiError> {
        self.gateway
            .fetch(ApiRequest::new("test"), self.options("test").bypass_cache(true))
            .await
    }

    pub async fn languages(&self) -> Result<Vec<CatalogItem>, ApiError> {
        self.fetch_list("languages").await
    }

    pub async fn currencies(&self) -> Result<Vec<CatalogItem>, ApiError> {
        self.fetch_list("currencies").await
    }

    pub async fn categories(&self) -> Result<Vec<CatalogItem>, ApiError> {
        self.fetch_list("categories").await
    }

    pub async fn brands(&self) -> Result<Vec<CatalogItem>, ApiError> {
        self.fetch_list("brands").await
    }

    pub async fn page(&self, slug: &str) -> Result<Page, ApiError> {
        let envelope: Envelope<Page> = self
            .gateway
            .fetch_as(ApiRequest::new("page").param("slug", slug), self.options("page"))
            .await?;
        envelope.into_data()
    }

    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let request = ApiRequest::new("products").with_params(query.to_params());
        let envelope: Envelope<Vec<Product>> = self
            .gateway
            .fetch_as(request, self.options("products"))
            .await?;
        envelope.into_data()
    }

    pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
        let envelope: Envelope<Product> = self
            .gateway
            .fetch_as(ApiRequest::new("product").param("id", id), self.options("product"))
            .await?;
        envelope.into_data()
    }

    /// Product listing filtered by text; short queries list without a filter
    pub async fn search_products(
        &self,
        query: &str,
        filters: &ProductQuery,
    ) -> Result<Vec<Product>, ApiError> {
        if !is_searchable(query) {
            return self.products(filters).await;
        }

        let mut filters = filters.clone();
        filters.search = Some(query.trim().to_string());
        self.products(&filters).await
    }

    /// Type-ahead suggestions for a partial query
    pub async fn suggestions(&self, query: &str, lang: &str) -> Result<SuggestionResponse, ApiError> {
        let request = ApiRequest::new("suggestions")
            .param("q", query)
            .param("lang", lang);
        self.gateway
            .fetch_as(request, self.options("suggestions"))
            .await
    }

    /// Full smart search
    pub async fn search(&self, query: &str, lang: &str) -> Result<SearchResults, ApiError> {
        let request = ApiRequest::new("search").param("q", query).param("lang", lang);
        self.gateway.fetch_as(request, self.options("search")).await
    }

    /// Trending queries across all users
    pub async fn popular_searches(&self) -> Result<Vec<String>, ApiError> {
        let popular: PopularSearches = self
            .gateway
            .fetch_as(
                ApiRequest::new("popular_searches"),
                self.options("popular_searches"),
            )
            .await?;
        Ok(popular.searches)
    }
}
