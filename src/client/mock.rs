//! Scripted transport for testing
//!
//! Answers requests through a handler closure, records every call, and can
//! hold responses until the test releases them, so tests decide the order in
//! which concurrent requests resolve.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use super::{ApiRequest, Transport};
use crate::error::ApiError;

type Handler = dyn Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync;

/// A request parked until the test releases it
struct Parked {
    request: ApiRequest,
    release: oneshot::Sender<()>,
}

/// Mock transport for tests.
///
/// # Example
/// ```ignore
/// let mock = MockTransport::new(|req| Ok(json!({"resource": req.resource})));
/// let value = mock.send(&ApiRequest::new("brands"), None).await?;
/// assert_eq!(mock.call_count(), 1);
/// ```
pub struct MockTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<ApiRequest>>,
    parked: Mutex<Vec<Parked>>,
    gated: bool,
}

impl MockTransport {
    /// Respond immediately using `handler`
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            parked: Mutex::new(Vec::new()),
            gated: false,
        }
    }

    /// Hold every response until released with [`MockTransport::release_where`]
    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of calls that reached the transport
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of every request received, in arrival order
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made for one resource
    pub fn calls_for(&self, resource: &str) -> Vec<ApiRequest> {
        self.calls()
            .into_iter()
            .filter(|req| req.resource == resource)
            .collect()
    }

    /// Number of parked requests
    pub fn parked_count(&self) -> usize {
        self.parked.lock().unwrap().len()
    }

    /// Release the first parked request matching `predicate`
    pub fn release_where<P>(&self, predicate: P) -> bool
    where
        P: Fn(&ApiRequest) -> bool,
    {
        let parked = {
            let mut parked = self.parked.lock().unwrap();
            match parked.iter().position(|p| predicate(&p.request)) {
                Some(index) => parked.remove(index),
                None => return false,
            }
        };
        parked.release.send(()).is_ok()
    }

    /// Release the parked request whose `q` parameter equals `query`
    pub fn release_query(&self, query: &str) -> bool {
        self.release_where(|req| req.params.get("q").map(String::as_str) == Some(query))
    }

    /// Release every parked request
    pub fn release_all(&self) {
        let parked: Vec<Parked> = self.parked.lock().unwrap().drain(..).collect();
        for p in parked {
            let _ = p.release.send(());
        }
    }

    /// Yield to the runtime until `count` requests have been parked
    pub async fn wait_for_parked(&self, count: usize) {
        for _ in 0..1000 {
            if self.parked_count() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "expected {} parked requests, found {}",
            count,
            self.parked_count()
        );
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        _timeout: Option<Duration>,
    ) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(request.clone());

        if self.gated {
            let (tx, rx) = oneshot::channel();
            self.parked.lock().unwrap().push(Parked {
                request: request.clone(),
                release: tx,
            });
            rx.await
                .map_err(|_| ApiError::Network("mock request dropped".to_string()))?;
        }

        (self.handler)(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_counts_calls() {
        let mock = MockTransport::new(|req| Ok(json!({ "resource": req.resource })));

        let value = mock.send(&ApiRequest::new("brands"), None).await.unwrap();
        assert_eq!(value["resource"], "brands");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.calls_for("brands").len(), 1);
    }

    #[tokio::test]
    async fn test_mock_gated_release() {
        let mock = MockTransport::new(|_| Ok(json!(1))).gated().into_arc();

        let m = mock.clone();
        let handle =
            tokio::spawn(async move { m.send(&ApiRequest::new("search").param("q", "x"), None).await });

        mock.wait_for_parked(1).await;
        assert!(mock.release_query("x"));
        assert_eq!(handle.await.unwrap().unwrap(), json!(1));
    }
}
