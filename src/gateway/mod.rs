//! Cache-aware request gateway
//!
//! Wraps a [`Transport`] with the response cache and in-flight request
//! deduplication. Static requests are served from the cache while fresh;
//! concurrent identical requests of any classification share one network
//! call and observe the same outcome.

mod options;

pub use options::{Classification, FetchOptions};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::{CacheConfig, CacheStats, TtlCache};
use crate::client::models::decode;
use crate::client::{ApiRequest, Transport};
use crate::clock::{Clock, SystemClock};
use crate::error::ApiError;

type SharedResponse = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

/// An outstanding network call other callers can join
struct PendingRequest {
    id: u64,
    response: SharedResponse,
    /// Set when any caller of the call is Static, so a Dynamic issuer does
    /// not keep a joined Static caller's response out of the cache
    cacheable: Arc<AtomicBool>,
}

struct GatewayInner {
    transport: Arc<dyn Transport>,
    cache: Mutex<TtlCache<Value>>,
    pending: Mutex<HashMap<String, PendingRequest>>,
    next_id: AtomicU64,
}

impl GatewayInner {
    fn lock_cache(&self) -> MutexGuard<'_, TtlCache<Value>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<String, PendingRequest>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Shared request gateway.
///
/// Construct one explicitly and hand clones to every consumer; clones share
/// the same cache and pending-request registry. Lock order is always
/// pending registry first, then cache, and neither lock is held across an
/// `.await`.
#[derive(Clone)]
pub struct RequestGateway {
    inner: Arc<GatewayInner>,
}

impl RequestGateway {
    pub fn new(transport: Arc<dyn Transport>, config: CacheConfig) -> Self {
        Self::with_clock(transport, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        transport: Arc<dyn Transport>,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                transport,
                cache: Mutex::new(TtlCache::with_clock(config, clock)),
                pending: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Fetch a resource, consulting the cache and joining in-flight calls.
    ///
    /// Errors from the transport are propagated unchanged; nothing is retried
    /// and failed responses are never cached.
    pub async fn fetch(&self, request: ApiRequest, options: FetchOptions) -> Result<Value, ApiError> {
        let key = request.cache_key();
        let use_cache = options.classification.is_static() && !options.bypass_cache;

        let response = {
            let mut pending = self.inner.lock_pending();

            if use_cache && let Some(value) = self.inner.lock_cache().get(&key) {
                debug!("Cache hit: {}", request.resource);
                return Ok(value);
            }

            if let Some(existing) = pending.get(&key) {
                debug!("Joining in-flight request: {}", request.resource);
                if options.classification.is_static() {
                    existing.cacheable.store(true, Ordering::Relaxed);
                }
                existing.response.clone()
            } else {
                let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                let cacheable = Arc::new(AtomicBool::new(options.classification.is_static()));
                let response = self.issue(id, key.clone(), request, options);
                pending.insert(
                    key,
                    PendingRequest {
                        id,
                        response: response.clone(),
                        cacheable,
                    },
                );
                response
            }
        };

        response.await
    }

    /// Fetch and decode into a typed model
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        options: FetchOptions,
    ) -> Result<T, ApiError> {
        let value = self.fetch(request, options).await?;
        decode(value)
    }

    /// Fresh cached value for `request`, without touching the network
    pub fn cached(&self, request: &ApiRequest) -> Option<Value> {
        self.inner.lock_cache().get(&request.cache_key())
    }

    /// Start the network call on its own task so it completes even when every
    /// caller has gone away.
    fn issue(&self, id: u64, key: String, request: ApiRequest, options: FetchOptions) -> SharedResponse {
        let inner = Arc::clone(&self.inner);
        debug!("Issuing request: {}", request.resource);

        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let key = task_key;
            let result = inner.transport.send(&request, options.timeout).await;

            let mut pending = inner.lock_pending();
            // Only the registration we created may be completed; after a
            // dispose the slot may belong to a newer request.
            // The pending lock orders this read after any joiner's flag write.
            let registered = pending
                .get(&key)
                .filter(|p| p.id == id)
                .map(|p| p.cacheable.load(Ordering::Relaxed));
            if let Some(cacheable) = registered {
                if let Ok(value) = &result
                    && cacheable
                {
                    inner.lock_cache().set(key.clone(), value.clone());
                }
                pending.remove(&key);
            }

            if let Err(err) = &result {
                debug!("Request {} failed: {}", request.resource, err);
            }
            result
        });

        let registry = Arc::clone(&self.inner);
        async move {
            task.await.unwrap_or_else(|e| {
                warn!("Request task failed: {}", e);
                // The task never reached its own cleanup
                let mut pending = registry.lock_pending();
                if pending.get(&key).is_some_and(|p| p.id == id) {
                    pending.remove(&key);
                }
                Err(ApiError::Network(format!("request task failed: {}", e)))
            })
        }
        .boxed()
        .shared()
    }

    /// Drop one cached response
    pub fn invalidate(&self, request: &ApiRequest) -> bool {
        self.inner.lock_cache().remove(&request.cache_key())
    }

    /// Drop every cached response
    pub fn clear_cache(&self) {
        self.inner.lock_cache().clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.lock_cache().stats()
    }

    /// Number of network calls currently outstanding
    pub fn pending_count(&self) -> usize {
        self.inner.lock_pending().len()
    }

    /// Forget all cached and pending state.
    ///
    /// Outstanding calls still run to completion for their current waiters,
    /// but their responses are no longer cached or joinable.
    pub fn dispose(&self) {
        let mut pending = self.inner.lock_pending();
        pending.clear();
        self.inner.lock_cache().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;
    use crate::clock::ManualClock;
    use serde_json::json;
    use std::time::Duration;

    fn gateway_with(mock: Arc<MockTransport>) -> (RequestGateway, ManualClock) {
        let clock = ManualClock::new();
        let gateway = RequestGateway::with_clock(
            mock,
            CacheConfig::default(),
            Arc::new(clock.clone()),
        );
        (gateway, clock)
    }

    fn echo() -> Arc<MockTransport> {
        MockTransport::new(|req| Ok(json!({ "resource": req.resource, "params": req.params })))
            .into_arc()
    }

    #[tokio::test]
    async fn test_static_second_fetch_served_from_cache() {
        let mock = echo();
        let (gateway, _clock) = gateway_with(mock.clone());
        let request = ApiRequest::new("categories");

        let first = gateway
            .fetch(request.clone(), FetchOptions::cached())
            .await
            .unwrap();
        assert_eq!(mock.call_count(), 1);

        // Available synchronously, no transport involved
        assert_eq!(gateway.cached(&request), Some(first.clone()));

        let second = gateway.fetch(request, FetchOptions::cached()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_static_reads_make_no_calls() {
        let mock = echo();
        let (gateway, _clock) = gateway_with(mock.clone());

        for _ in 0..10 {
            gateway
                .fetch(ApiRequest::new("brands"), FetchOptions::cached())
                .await
                .unwrap();
        }
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_static_refetched_after_ttl() {
        let mock = echo();
        let (gateway, clock) = gateway_with(mock.clone());

        gateway
            .fetch(ApiRequest::new("languages"), FetchOptions::cached())
            .await
            .unwrap();
        clock.advance(Duration::from_secs(5 * 60));
        gateway
            .fetch(ApiRequest::new("languages"), FetchOptions::cached())
            .await
            .unwrap();

        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_dynamic_never_cached() {
        let mock = echo();
        let (gateway, _clock) = gateway_with(mock.clone());
        let request = ApiRequest::new("products").param("page", "1");

        gateway
            .fetch(request.clone(), FetchOptions::fresh())
            .await
            .unwrap();
        gateway
            .fetch(request.clone(), FetchOptions::fresh())
            .await
            .unwrap();

        assert_eq!(mock.call_count(), 2);
        assert!(gateway.cached(&request).is_none());
        assert_eq!(gateway.cache_stats().total_entries, 0);
    }

    #[tokio::test]
    async fn test_bypass_cache_refetches_and_refreshes() {
        let mock = echo();
        let (gateway, _clock) = gateway_with(mock.clone());
        let request = ApiRequest::new("categories");

        gateway
            .fetch(request.clone(), FetchOptions::cached())
            .await
            .unwrap();
        gateway
            .fetch(request.clone(), FetchOptions::cached().bypass_cache(true))
            .await
            .unwrap();

        assert_eq!(mock.call_count(), 2);
        assert!(gateway.cached(&request).is_some());
    }

    #[tokio::test]
    async fn test_concurrent_dynamic_requests_deduplicated() {
        let mock = MockTransport::new(|_| Ok(json!({"hits": 3}))).gated().into_arc();
        let (gateway, _clock) = gateway_with(mock.clone());
        let request = ApiRequest::new("search").param("q", "phone");

        let mut handles = Vec::new();
        for _ in 0..5 {
            let g = gateway.clone();
            let r = request.clone();
            handles.push(tokio::spawn(async move { g.fetch(r, FetchOptions::fresh()).await }));
        }

        mock.wait_for_parked(1).await;
        for _ in 0..100 {
            tokio::task::yield_now().await;
        }
        assert_eq!(gateway.pending_count(), 1);
        mock.release_all();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), json!({"hits": 3}));
        }
        assert_eq!(mock.call_count(), 1);
        assert_eq!(gateway.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_failure_shared_by_all_waiters() {
        let mock = MockTransport::new(|_| {
            Err(ApiError::HttpStatus {
                status: 502,
                message: "Bad Gateway".to_string(),
            })
        })
        .gated()
        .into_arc();
        let (gateway, _clock) = gateway_with(mock.clone());

        let mut handles = Vec::new();
        for _ in 0..5 {
            let g = gateway.clone();
            handles.push(tokio::spawn(async move {
                g.fetch(ApiRequest::new("categories"), FetchOptions::cached())
                    .await
            }));
        }

        mock.wait_for_parked(1).await;
        for _ in 0..100 {
            tokio::task::yield_now().await;
        }
        mock.release_all();

        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert_eq!(err.status(), Some(502));
        }
        assert_eq!(mock.call_count(), 1);
        // Failures are not cached
        assert!(gateway.cached(&ApiRequest::new("categories")).is_none());
    }

    #[tokio::test]
    async fn test_errors_propagate_without_retry() {
        let mock = MockTransport::new(|_| Err(ApiError::Network("refused".to_string()))).into_arc();
        let (gateway, _clock) = gateway_with(mock.clone());

        let err = gateway
            .fetch(ApiRequest::new("brands"), FetchOptions::cached())
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::Network("refused".to_string()));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_parameter_order_shares_cache_entry() {
        let mock = echo();
        let (gateway, _clock) = gateway_with(mock.clone());

        let a = ApiRequest::new("page").param("slug", "about").param("lang", "en");
        let b = ApiRequest::new("page").param("lang", "en").param("slug", "about");

        gateway.fetch(a, FetchOptions::cached()).await.unwrap();
        gateway.fetch(b, FetchOptions::cached()).await.unwrap();
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_as_decodes() {
        let mock = MockTransport::new(|_| Ok(json!({"searches": ["iphone", "laptop"]}))).into_arc();
        let (gateway, _clock) = gateway_with(mock);

        let popular: crate::client::models::PopularSearches = gateway
            .fetch_as(ApiRequest::new("popular_searches"), FetchOptions::cached())
            .await
            .unwrap();
        assert_eq!(popular.searches, vec!["iphone", "laptop"]);
    }

    #[tokio::test]
    async fn test_invalidate_and_dispose() {
        let mock = echo();
        let (gateway, _clock) = gateway_with(mock.clone());
        let request = ApiRequest::new("brands");

        gateway
            .fetch(request.clone(), FetchOptions::cached())
            .await
            .unwrap();
        assert!(gateway.invalidate(&request));
        assert!(gateway.cached(&request).is_none());

        gateway
            .fetch(request.clone(), FetchOptions::cached())
            .await
            .unwrap();
        gateway.dispose();
        assert_eq!(gateway.cache_stats().total_entries, 0);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_dispose_while_in_flight_skips_cache_population() {
        let mock = MockTransport::new(|_| Ok(json!(["a"]))).gated().into_arc();
        let (gateway, _clock) = gateway_with(mock.clone());

        let g = gateway.clone();
        let handle = tokio::spawn(async move {
            g.fetch(ApiRequest::new("categories"), FetchOptions::cached())
                .await
        });

        mock.wait_for_parked(1).await;
        gateway.dispose();
        mock.release_all();

        // The original waiter still gets its answer
        assert_eq!(handle.await.unwrap().unwrap(), json!(["a"]));
        assert!(gateway.cached(&ApiRequest::new("categories")).is_none());
    }

    #[tokio::test]
    async fn test_static_caller_joining_dynamic_call_populates_cache() {
        let mock = MockTransport::new(|_| Ok(json!({"title": "About"})))
            .gated()
            .into_arc();
        let (gateway, _clock) = gateway_with(mock.clone());
        let request = ApiRequest::new("page").param("slug", "about");

        let g = gateway.clone();
        let r = request.clone();
        let dynamic = tokio::spawn(async move { g.fetch(r, FetchOptions::fresh()).await });
        mock.wait_for_parked(1).await;

        let g = gateway.clone();
        let r = request.clone();
        let joined = tokio::spawn(async move { g.fetch(r, FetchOptions::cached()).await });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        mock.release_all();
        assert!(dynamic.await.unwrap().is_ok());
        assert!(joined.await.unwrap().is_ok());

        assert_eq!(mock.call_count(), 1);
        assert_eq!(gateway.cached(&request), Some(json!({"title": "About"})));
    }

    #[tokio::test]
    async fn test_panicking_transport_does_not_wedge_key() {
        let calls = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&calls);
        let mock = MockTransport::new(move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("transport blew up");
            }
            Ok(json!(["phones"]))
        })
        .into_arc();
        let (gateway, _clock) = gateway_with(mock.clone());
        let request = ApiRequest::new("categories");

        let err = gateway
            .fetch(request.clone(), FetchOptions::cached())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(ref m) if m.contains("request task failed")));
        assert_eq!(gateway.pending_count(), 0);

        let value = gateway
            .fetch(request, FetchOptions::cached())
            .await
            .unwrap();
        assert_eq!(value, json!(["phones"]));
        assert_eq!(mock.call_count(), 2);
    }
}
