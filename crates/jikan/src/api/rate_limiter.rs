//! Client-side throttling for the public API's published limits.
//!
//! [`RateLimiter`] enforces both a per-second and a per-minute budget.
//! [`Throttled`] wraps any [`Transport`] with one shared limiter. It only
//! waits before sending; it never retries a request.

use super::error::TransportError;
use super::transport::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter with dual constraints (per-second and per-minute)
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two requests
    min_interval: Duration,
    /// Maximum requests per rolling minute
    max_per_minute: usize,
    /// Last request timestamp
    last_request: Option<Instant>,
    /// Request timestamps in the last minute, oldest first
    recent_requests: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter. Non-positive rates disable the
    /// corresponding constraint; a rate too small to represent waits
    /// [`Duration::MAX`] between requests.
    pub fn new(max_per_second: f64, max_per_minute: u32) -> Self {
        let min_interval = if max_per_second > 0.0 {
            Duration::try_from_secs_f64(1.0 / max_per_second).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        let max_per_minute = if max_per_minute == 0 {
            usize::MAX
        } else {
            max_per_minute as usize
        };

        Self {
            min_interval,
            max_per_minute,
            last_request: None,
            recent_requests: VecDeque::new(),
        }
    }

    /// Wait until a request can be made, respecting both rate limits
    pub async fn acquire(&mut self) {
        let now = Instant::now();
        self.evict(now);

        if self.recent_requests.len() >= self.max_per_minute {
            if let Some(&oldest) = self.recent_requests.front() {
                let wait_time = WINDOW.saturating_sub(now.duration_since(oldest));
                if !wait_time.is_zero() {
                    debug!(
                        wait_ms = wait_time.as_millis() as u64,
                        "Rate limit: waiting for per-minute limit"
                    );
                    sleep(wait_time).await;
                }
            }
        }

        if let Some(last) = self.last_request {
            let wait_time = self
                .min_interval
                .saturating_sub(Instant::now().duration_since(last));
            if !wait_time.is_zero() {
                debug!(
                    wait_ms = wait_time.as_millis() as u64,
                    "Rate limit: waiting for per-second limit"
                );
                sleep(wait_time).await;
            }
        }

        let request_time = Instant::now();
        self.evict(request_time);
        self.last_request = Some(request_time);
        self.recent_requests.push_back(request_time);
    }

    /// Get the current number of requests in the last minute
    pub fn current_minute_count(&mut self) -> usize {
        self.evict(Instant::now());
        self.recent_requests.len()
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&oldest) = self.recent_requests.front() {
            if now.duration_since(oldest) >= WINDOW {
                self.recent_requests.pop_front();
            } else {
                break;
            }
        }
    }
}

/// A transport that passes every request through a shared [`RateLimiter`].
#[derive(Debug)]
pub struct Throttled<T> {
    inner: T,
    limiter: Mutex<RateLimiter>,
}

impl<T> Throttled<T> {
    pub fn new(inner: T, limiter: RateLimiter) -> Self {
        Self {
            inner,
            limiter: Mutex::new(limiter),
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for Throttled<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        // The lock is held across the wait so callers queue in order.
        self.limiter.lock().await.acquire().await;
        self.inner.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_rate_limiter_per_second() {
        let mut limiter = RateLimiter::new(10.0, 50);

        let start = Instant::now();

        // Three requests at 10/s need at least two 100ms gaps
        for _ in 0..3 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() >= Duration::from_millis(190));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_per_minute() {
        let mut limiter = RateLimiter::new(0.0, 3);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));

        // Fourth request has to wait for the first to leave the window
        limiter.acquire().await;
        assert!(start.elapsed() >= WINDOW);
    }

    #[test]
    fn test_tiny_rate_does_not_overflow() {
        let limiter = RateLimiter::new(1e-20, 60);
        assert_eq!(limiter.min_interval, Duration::MAX);

        let limiter = RateLimiter::new(0.0, 60);
        assert_eq!(limiter.min_interval, Duration::ZERO);
    }

    #[test]
    fn test_current_minute_count() {
        let mut limiter = RateLimiter::new(2.0, 50);
        assert_eq!(limiter.current_minute_count(), 0);
    }

    struct Counting(AtomicUsize);

    #[async_trait]
    impl Transport for Counting {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse::new(200, "{}"))
        }
    }

    #[tokio::test]
    async fn test_throttled_forwards_requests() {
        let transport = Throttled::new(Counting(AtomicUsize::new(0)), RateLimiter::new(100.0, 60));
        let request = HttpRequest {
            method: reqwest::Method::GET,
            url: "https://example.test/v4/anime/1".parse().unwrap(),
            headers: Default::default(),
        };

        let response = transport.send(request.clone()).await.unwrap();
        assert_eq!(response.status, 200);
        transport.send(request).await.unwrap();

        assert_eq!(transport.inner.0.load(Ordering::SeqCst), 2);
        assert_eq!(transport.limiter.lock().await.current_minute_count(), 2);
    }
}
