//! Scripted transport double for unit tests.

use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, watch};
use turnpike_domain::{RequestSpec, ResponseSpec};

use crate::ports::{HttpTransport, TransportError};

/// The URL as the server would see it, query pairs included.
fn effective_url(request: &RequestSpec) -> String {
    if request.query.is_empty() {
        return request.url.clone();
    }
    let query: Vec<String> = request
        .query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    format!("{}?{}", request.url, query.join("&"))
}

struct MockRule {
    path: String,
    auth: Option<String>,
    status: u16,
    body: serde_json::Value,
}

/// An `HttpTransport` that serves canned responses and records requests.
///
/// Rules match on a URL path fragment and optionally on the exact
/// Authorization header, which makes 401-then-replay flows easy to
/// script: register a 401 for the stale token and a 200 for the fresh
/// one. Responses can be held in flight to exercise concurrency paths.
pub struct MockTransport {
    rules: StdMutex<Vec<MockRule>>,
    failing_paths: StdMutex<Vec<String>>,
    log: StdMutex<Vec<RequestSpec>>,
    calls: AtomicUsize,
    gate: StdMutex<Option<watch::Receiver<bool>>>,
    gate_tx: StdMutex<Option<watch::Sender<bool>>>,
    in_flight: AtomicUsize,
    in_flight_notify: Notify,
}

impl MockTransport {
    /// Creates a transport with no rules; unmatched requests get a 404.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: StdMutex::new(Vec::new()),
            failing_paths: StdMutex::new(Vec::new()),
            log: StdMutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: StdMutex::new(None),
            gate_tx: StdMutex::new(None),
            in_flight: AtomicUsize::new(0),
            in_flight_notify: Notify::new(),
        }
    }

    /// Registers a JSON response for any request whose URL contains `path`.
    pub fn respond_json(&self, path: &str, status: u16, body: serde_json::Value) {
        self.rules.lock().expect("rules lock").push(MockRule {
            path: path.to_string(),
            auth: None,
            status,
            body,
        });
    }

    /// Registers a response that also requires an exact Authorization header.
    pub fn respond_json_for_auth(
        &self,
        path: &str,
        auth: &str,
        status: u16,
        body: serde_json::Value,
    ) {
        self.rules.lock().expect("rules lock").push(MockRule {
            path: path.to_string(),
            auth: Some(auth.to_string()),
            status,
            body,
        });
    }

    /// Makes requests whose URL contains `path` fail at the network level.
    pub fn fail_requests_to(&self, path: &str) {
        self.failing_paths
            .lock()
            .expect("failing lock")
            .push(path.to_string());
    }

    /// Holds every subsequent response until [`Self::release_responses`].
    pub fn hold_responses(&self) {
        let (tx, rx) = watch::channel(false);
        *self.gate_tx.lock().expect("gate lock") = Some(tx);
        *self.gate.lock().expect("gate lock") = Some(rx);
    }

    /// Releases all held responses.
    pub fn release_responses(&self) {
        if let Some(tx) = self.gate_tx.lock().expect("gate lock").as_ref() {
            let _ = tx.send(true);
        }
    }

    /// Waits until at least `n` requests are blocked inside the transport.
    pub async fn wait_for_in_flight(&self, n: usize) {
        loop {
            let notified = self.in_flight_notify.notified();
            if self.in_flight.load(Ordering::SeqCst) >= n {
                return;
            }
            notified.await;
        }
    }

    /// Total number of executed requests.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of executed requests whose effective URL contains `path`.
    #[must_use]
    pub fn calls_to(&self, path: &str) -> usize {
        self.log
            .lock()
            .expect("log lock")
            .iter()
            .filter(|r| effective_url(r).contains(path))
            .count()
    }

    /// Snapshot of every executed request, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RequestSpec> {
        self.log.lock().expect("log lock").clone()
    }

    fn resolve(&self, request: &RequestSpec) -> ResponseSpec {
        let auth = request
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .map(|(_, v)| v.clone());

        let url = effective_url(request);
        let rules = self.rules.lock().expect("rules lock");
        let rule = rules.iter().find(|rule| {
            url.contains(&rule.path)
                && rule.auth.as_ref().is_none_or(|required| auth.as_deref() == Some(required))
        });

        match rule {
            Some(rule) => {
                let body = serde_json::to_vec(&rule.body).unwrap_or_default();
                let mut headers = HashMap::new();
                headers.insert("Content-Type".to_string(), "application/json".to_string());
                ResponseSpec::new(rule.status, headers, body, Duration::ZERO)
            }
            None => ResponseSpec::new(404, HashMap::new(), Vec::new(), Duration::ZERO),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, TransportError> {
        self.log.lock().expect("log lock").push(request.clone());
        self.calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().expect("gate lock").clone();
        if let Some(mut rx) = gate {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            self.in_flight_notify.notify_waiters();
            while !*rx.borrow() {
                if rx.changed().await.is_err() {
                    break;
                }
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        let fails = self
            .failing_paths
            .lock()
            .expect("failing lock")
            .iter()
            .any(|p| request.url.contains(p));
        if fails {
            return Err(TransportError::ConnectionFailed("mock network failure".to_string()));
        }

        Ok(self.resolve(request))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_rules_match_query_parameters() {
        let transport = MockTransport::new();
        transport.respond_json("cursor=c2", 200, json!({"page": 2}));
        transport.respond_json("/v1/items", 200, json!({"page": 1}));

        let with_cursor = transport
            .execute(&RequestSpec::get("/v1/items").with_query("cursor", "c2"))
            .await
            .expect("request");
        let without_cursor = transport
            .execute(&RequestSpec::get("/v1/items"))
            .await
            .expect("request");

        assert_eq!(
            with_cursor.body_as_json(),
            Some(json!({"page": 2}))
        );
        assert_eq!(
            without_cursor.body_as_json(),
            Some(json!({"page": 1}))
        );
        assert_eq!(transport.calls_to("cursor=c2"), 1);
        assert_eq!(transport.calls_to("/v1/items"), 2);
    }
}
