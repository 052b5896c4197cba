//! Jikan API v4 client implementation.
//!
//! This module provides the request dispatcher shared by every resource
//! facade, the transport seam it sends through, and the response and error
//! types common to all endpoints.

pub mod client;
pub mod context;
pub mod error;
pub mod rate_limiter;
pub mod request;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientConfig, JikanClient, JikanClientBuilder, RateLimit};
pub use context::{CancelHandle, RequestContext};
pub use error::{ApiError, ErrorKind, JikanError, Result, TransportError};
pub use rate_limiter::{RateLimiter, Throttled};
pub use request::Request;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::*;
