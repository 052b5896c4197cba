//! Jikan API client: configuration and the shared request dispatcher.

use super::context::RequestContext;
use super::error::{snippet, ApiError, JikanError, Result};
use super::rate_limiter::{RateLimiter, Throttled};
use super::request::Request;
use super::transport::{HttpRequest, ReqwestTransport, Transport};
use super::types::Envelope;
use crate::services::{
    AnimeService, CharacterService, ClubService, GenreService, MangaService, SearchService,
    UserService,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.jikan.moe/v4";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("jikan-rs/", env!("CARGO_PKG_VERSION"));

/// Client-side throttle settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    pub requests_per_second: f64,
    pub requests_per_minute: u32,
}

impl Default for RateLimit {
    /// The limits published for the public Jikan instance.
    fn default() -> Self {
        Self {
            requests_per_second: 3.0,
            requests_per_minute: 60,
        }
    }
}

/// Construction-time settings of a [`JikanClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Applied to every request in addition to the caller's context.
    /// `None` leaves the context as the only limit.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    /// Wrap the transport in a throttle when set.
    pub rate_limit: Option<RateLimit>,
    /// Replaces the default `reqwest` transport.
    pub transport: Option<Arc<dyn Transport>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            rate_limit: None,
            transport: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("headers", &self.headers)
            .field("rate_limit", &self.rate_limit)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

/// Jikan API v4 client
///
/// Cheap to clone and safe to share between tasks: each call owns its own
/// request/response lifecycle and the client keeps no per-call state.
#[derive(Clone)]
pub struct JikanClient {
    inner: Arc<Inner>,
}

struct Inner {
    base_url: Url,
    timeout: Option<Duration>,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for JikanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JikanClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl JikanClient {
    /// Client for the public API with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn builder() -> JikanClientBuilder {
        JikanClientBuilder::default()
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            JikanError::Config(format!("invalid base URL {:?}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(JikanError::Config(format!(
                "base URL cannot carry a path: {}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| JikanError::Config(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, user_agent);
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| JikanError::Config(format!("invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| JikanError::Config(format!("invalid value for header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let limiter = config.rate_limit.map(limiter).transpose()?;
        let transport: Arc<dyn Transport> = match (config.transport, limiter) {
            (Some(transport), None) => transport,
            (Some(transport), Some(limiter)) => Arc::new(Throttled::new(transport, limiter)),
            (None, limiter) => {
                let reqwest = ReqwestTransport::new().map_err(|e| {
                    JikanError::Config(format!("failed to create HTTP client: {}", e))
                })?;
                match limiter {
                    Some(limiter) => Arc::new(Throttled::new(reqwest, limiter)),
                    None => Arc::new(reqwest),
                }
            }
        };

        debug!(base_url = %base_url, timeout = ?config.timeout, "Jikan client created");

        Ok(Self {
            inner: Arc::new(Inner {
                base_url,
                timeout: config.timeout,
                headers,
                transport,
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn anime(&self) -> AnimeService<'_> {
        AnimeService::new(self)
    }

    pub fn characters(&self) -> CharacterService<'_> {
        CharacterService::new(self)
    }

    pub fn manga(&self) -> MangaService<'_> {
        MangaService::new(self)
    }

    pub fn genres(&self) -> GenreService<'_> {
        GenreService::new(self)
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(self)
    }

    pub fn clubs(&self) -> ClubService<'_> {
        ClubService::new(self)
    }

    pub fn search(&self) -> SearchService<'_> {
        SearchService::new(self)
    }

    /// Send `request` and decode the `{data, pagination?}` envelope around `T`.
    ///
    /// Never retries. Transport failures, non-success statuses and malformed
    /// bodies are returned as the matching [`JikanError`] variant.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: Request,
    ) -> Result<Envelope<T>> {
        let url = request.url(&self.inner.base_url)?;
        let http_request = HttpRequest {
            method: request.method().clone(),
            url: url.clone(),
            headers: self.inner.headers.clone(),
        };

        debug!(method = %http_request.method, url = %url, "Making API request");

        let fallback = self.inner.timeout.map(|timeout| Instant::now() + timeout);
        let response = match ctx
            .run(fallback, self.inner.transport.send(http_request))
            .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) | Err(e) => {
                warn!(url = %url, error = %e, "Request error");
                return Err(e.into());
            }
        };

        if !response.is_success() {
            let err = ApiError::from_response(response.status, &response.body);
            warn!(
                url = %url,
                status = err.status,
                kind = %err.kind,
                message = %err.message,
                "Request failed"
            );
            return Err(err.into());
        }

        match serde_json::from_slice::<Envelope<T>>(&response.body) {
            Ok(envelope) => {
                debug!(url = %url, status = response.status, "Request successful");
                Ok(envelope)
            }
            Err(source) => {
                warn!(url = %url, error = %source, "Failed to parse response");
                Err(JikanError::Decode {
                    source,
                    snippet: snippet(&response.body),
                })
            }
        }
    }
}

fn limiter(limit: RateLimit) -> Result<RateLimiter> {
    let rate = limit.requests_per_second;
    if !rate.is_finite() || (rate > 0.0 && Duration::try_from_secs_f64(1.0 / rate).is_err()) {
        return Err(JikanError::Config(format!(
            "invalid requests_per_second: {}",
            rate
        )));
    }
    Ok(RateLimiter::new(rate, limit.requests_per_minute))
}

/// Builder over [`ClientConfig`].
#[derive(Debug, Default)]
pub struct JikanClientBuilder {
    config: ClientConfig,
}

impl JikanClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.push((name.into(), value.into()));
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.config.rate_limit = Some(rate_limit);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.config.transport = Some(Arc::new(transport));
        self
    }

    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<JikanClient> {
        JikanClient::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{ErrorKind, TransportError};
    use crate::api::testing::FakeTransport;
    use crate::api::transport::HttpResponse;
    use reqwest::Method;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Item {
        mal_id: i64,
        title: String,
    }

    fn client(fake: &FakeTransport) -> JikanClient {
        JikanClient::builder()
            .base_url("https://example.test/v4")
            .shared_transport(fake.shared())
            .header("X-Trace", "abc")
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_creation() {
        assert!(JikanClient::new().is_ok());
        assert_eq!(JikanClient::new().unwrap().base_url().as_str(), "https://api.jikan.moe/v4");
    }

    #[test]
    fn test_invalid_config() {
        let err = JikanClient::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, JikanError::Config(_)));

        let err = JikanClient::builder().base_url("mailto:x@y").build().unwrap_err();
        assert!(matches!(err, JikanError::Config(_)));

        let err = JikanClient::builder().header("bad header", "v").build().unwrap_err();
        assert!(matches!(err, JikanError::Config(_)));
    }

    #[test]
    fn test_invalid_rate_limit_is_a_config_error() {
        for rate in [1e-20, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = JikanClient::builder()
                .rate_limit(RateLimit {
                    requests_per_second: rate,
                    requests_per_minute: 60,
                })
                .build()
                .unwrap_err();
            assert!(matches!(err, JikanError::Config(_)), "rate {}", rate);
        }

        for rate in [0.0, -1.0, 0.5, 3.0] {
            let built = JikanClient::builder()
                .rate_limit(RateLimit {
                    requests_per_second: rate,
                    requests_per_minute: 60,
                })
                .build();
            assert!(built.is_ok(), "rate {}", rate);
        }
    }

    #[tokio::test]
    async fn test_execute_success() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(200, r#"{"data":{"mal_id":1,"title":"X"}}"#));

        let envelope: Envelope<Item> = client(&fake)
            .execute(&RequestContext::background(), Request::get("/anime").segment(1))
            .await
            .unwrap();

        assert_eq!(envelope.data.mal_id, 1);
        assert_eq!(envelope.data.title, "X");
        assert!(envelope.pagination.is_none());

        let sent = fake.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(sent[0].url.as_str(), "https://example.test/v4/anime/1");
        assert_eq!(sent[0].headers["x-trace"], "abc");
        assert_eq!(sent[0].headers[USER_AGENT], DEFAULT_USER_AGENT);
    }

    #[tokio::test]
    async fn test_execute_forwards_other_methods() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(201, r#"{"data":null}"#));

        let envelope: Envelope<Option<Item>> = client(&fake)
            .execute(&RequestContext::background(), Request::new(Method::POST, "/anime"))
            .await
            .unwrap();

        assert!(envelope.data.is_none());
        assert_eq!(fake.requests()[0].method, Method::POST);
    }

    #[tokio::test]
    async fn test_execute_not_found() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(
            404,
            r#"{"status":404,"type":"NotFoundException","message":"Resource not found"}"#,
        ));

        let err = client(&fake)
            .execute::<Item>(&RequestContext::background(), Request::get("/anime/999999"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        let api = err.api_error().unwrap();
        assert_eq!(api.status, 404);
        assert_eq!(api.message, "Resource not found");
        assert_eq!(api.error_type, "NotFoundException");
    }

    #[tokio::test]
    async fn test_execute_status_classes() {
        for (status, kind) in [
            (400, ErrorKind::BadRequest),
            (429, ErrorKind::RateLimited),
            (500, ErrorKind::ServerError),
            (503, ErrorKind::ServerError),
        ] {
            let fake = FakeTransport::new();
            fake.push(HttpResponse::new(status, "oops"));

            let err = client(&fake)
                .execute::<Item>(&RequestContext::background(), Request::get("/anime/1"))
                .await
                .unwrap_err();

            assert_eq!(err.kind(), Some(kind), "status {}", status);
            assert_eq!(err.api_error().unwrap().message, "oops");
        }
    }

    #[tokio::test]
    async fn test_execute_malformed_body() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(200, "<html>definitely not json"));

        let err = client(&fake)
            .execute::<Item>(&RequestContext::background(), Request::get("/anime/1"))
            .await
            .unwrap_err();

        match err {
            JikanError::Decode { snippet, .. } => assert!(snippet.starts_with("<html>")),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_missing_data_is_decode_error() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(200, "{}"));

        let err = client(&fake)
            .execute::<Item>(&RequestContext::background(), Request::get("/anime/1"))
            .await
            .unwrap_err();

        assert!(matches!(err, JikanError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_execute_network_error() {
        let fake = FakeTransport::new();
        fake.push_error(TransportError::network("connection refused"));

        let err = client(&fake)
            .execute::<Item>(&RequestContext::background(), Request::get("/anime/1"))
            .await
            .unwrap_err();

        assert!(matches!(err, JikanError::Transport(TransportError::Network(_))));
        assert!(!err.is_cancelled());
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_cancel_is_distinct_from_deadline() {
        let fake = FakeTransport::new().with_delay(Duration::from_secs(5));
        fake.push(HttpResponse::new(200, r#"{"data":{"mal_id":1,"title":"X"}}"#));
        fake.push(HttpResponse::new(200, r#"{"data":{"mal_id":1,"title":"X"}}"#));
        let client = client(&fake);

        let (ctx, handle) = RequestContext::cancellable();
        let cancel = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });
        let cancelled = client
            .execute::<Item>(&ctx, Request::get("/anime/1"))
            .await
            .unwrap_err();
        cancel.await.unwrap();

        let ctx = RequestContext::timeout(Duration::from_millis(20));
        let timed_out = client
            .execute::<Item>(&ctx, Request::get("/anime/1"))
            .await
            .unwrap_err();

        assert!(cancelled.is_cancelled());
        assert!(!cancelled.is_timeout());
        assert!(timed_out.is_timeout());
        assert!(!timed_out.is_cancelled());
    }

    #[tokio::test]
    async fn test_default_timeout_applies() {
        let fake = FakeTransport::new().with_delay(Duration::from_secs(5));
        fake.push(HttpResponse::new(200, r#"{"data":{"mal_id":1,"title":"X"}}"#));

        let client = JikanClient::builder()
            .timeout(Duration::from_millis(20))
            .shared_transport(fake.shared())
            .build()
            .unwrap();

        let err = client
            .execute::<Item>(&RequestContext::background(), Request::get("/anime/1"))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_concurrent_use() {
        let fake = FakeTransport::new();
        for id in 1..=4 {
            fake.push(HttpResponse::new(
                200,
                format!(r#"{{"data":{{"mal_id":{},"title":"T"}}}}"#, id),
            ));
        }
        let client = client(&fake);
        let ctx = RequestContext::background();

        let (a, b, c, d) = tokio::join!(
            client.execute::<Item>(&ctx, Request::get("/anime/1")),
            client.execute::<Item>(&ctx, Request::get("/anime/2")),
            client.execute::<Item>(&ctx, Request::get("/anime/3")),
            client.execute::<Item>(&ctx, Request::get("/anime/4")),
        );

        let mut ids: Vec<i64> = [a, b, c, d]
            .into_iter()
            .map(|r| r.unwrap().data.mal_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(fake.requests().len(), 4);
    }
}
