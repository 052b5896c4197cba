//! Typed async client for the Jikan v4 REST API (unofficial MyAnimeList API).
//!
//! Every resource facade ([`JikanClient::anime`], [`JikanClient::characters`],
//! ...) turns typed arguments into a single call through the shared
//! dispatcher, [`JikanClient::execute`], which builds the URL, sends it through
//! a [`Transport`], and decodes the `{data, pagination}` envelope or maps the
//! failure onto [`JikanError`].
//!
//! ```no_run
//! use jikan::{Id, JikanClient, RequestContext};
//! use std::time::Duration;
//!
//! # async fn run() -> jikan::Result<()> {
//! let client = JikanClient::new()?;
//! let ctx = RequestContext::timeout(Duration::from_secs(10));
//!
//! match client.anime().by_id(&ctx, Id(1)).await {
//!     Ok(anime) => println!("{}", anime.title),
//!     Err(e) if e.is_not_found() => println!("no such anime"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod services;

pub use api::{
    ApiError, CancelHandle, ClientConfig, ErrorKind, HttpRequest, HttpResponse, JikanClient,
    JikanClientBuilder, JikanError, RateLimit, RateLimiter, Request, RequestContext,
    ReqwestTransport, Result, Throttled, Transport, TransportError,
};
pub use api::types::*;
pub use services::*;
