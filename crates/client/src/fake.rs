//! Scripted in-memory transport for tests.
//!
//! Responses are scripted per `(method, path)`. Queued replies are consumed
//! in order and the last one repeats. Unscripted routes answer 404, which
//! is what a backend without that endpoint returns.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use proto::ApiError;

use crate::transport::{ApiRequest, HttpMethod, RawResponse, Transport};

#[derive(Debug, Clone)]
enum Scripted {
    Respond(RawResponse),
    Fail(String),
}

type Route = (HttpMethod, String);

/// Recording transport with per-route scripted replies.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<Route, VecDeque<Scripted>>>,
    delays: Mutex<HashMap<Route, Duration>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for `method path`.
    pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        self.push(method, path, Scripted::Respond(RawResponse::new(status, body)));
    }

    /// Queues a transport-level failure for `method path`.
    pub fn fail(&self, method: HttpMethod, path: &str, reason: &str) {
        self.push(method, path, Scripted::Fail(reason.to_string()));
    }

    /// Delays every reply on `method path` by `delay`.
    pub fn delay(&self, method: HttpMethod, path: &str, delay: Duration) {
        self.delays
            .lock()
            .insert((method, path.to_string()), delay);
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    /// Number of requests received for `method path`.
    pub fn calls_to(&self, method: HttpMethod, path: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method && c.url.path() == path)
            .count()
    }

    /// `(method, path)` of every request, in order.
    pub fn call_log(&self) -> Vec<(HttpMethod, String)> {
        self.calls
            .lock()
            .iter()
            .map(|c| (c.method, c.url.path().to_string()))
            .collect()
    }

    fn push(&self, method: HttpMethod, path: &str, reply: Scripted) {
        self.routes
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    fn next_reply(&self, route: &Route) -> Option<Scripted> {
        let mut routes = self.routes.lock();
        let queue = routes.get_mut(route)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let route = (request.method, request.url.path().to_string());
        self.calls.lock().push(request);

        let delay = self.delays.lock().get(&route).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply(&route) {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(reason)) => Err(ApiError::Transport(reason)),
            None => Ok(RawResponse::new(404, r#"{"detail":"Not Found"}"#)),
        }
    }
}
