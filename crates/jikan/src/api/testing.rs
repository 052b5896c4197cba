//! In-memory transport for unit tests.

use super::error::TransportError;
use super::transport::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays queued responses in order and records every request it receives.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<State>>,
    delay: Option<Duration>,
}

#[derive(Default)]
struct State {
    responses: VecDeque<Result<HttpResponse, TransportError>>,
    requests: Vec<HttpRequest>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hold every response back for `delay`.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn push(&self, response: HttpResponse) {
        self.state.lock().unwrap().responses.push_back(Ok(response));
    }

    pub(crate) fn push_json(&self, status: u16, body: &str) {
        self.push(HttpResponse::new(status, body));
    }

    pub(crate) fn push_error(&self, error: TransportError) {
        self.state.lock().unwrap().responses.push_back(Err(error));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Query string of the most recent request, decoded into pairs.
    pub(crate) fn last_query(&self) -> Vec<(String, String)> {
        self.requests()
            .last()
            .map(|r| {
                r.url
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn last_path(&self) -> Option<String> {
        self.requests().last().map(|r| r.url.path().to_string())
    }

    pub(crate) fn shared(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let next = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            state.responses.pop_front()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        next.unwrap_or_else(|| Err(TransportError::network("no response queued")))
    }
}

/// Client wired to `fake` with a test base URL.
pub(crate) fn client(fake: &FakeTransport) -> crate::JikanClient {
    crate::JikanClient::builder()
        .base_url("https://example.test/v4")
        .shared_transport(fake.shared())
        .build()
        .unwrap()
}

/// Query pairs as owned strings, for comparing against [`FakeTransport::last_query`].
pub(crate) fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
