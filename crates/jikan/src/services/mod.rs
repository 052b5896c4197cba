//! Resource facades.
//!
//! Each facade borrows the [`JikanClient`](crate::JikanClient) and turns typed
//! arguments into exactly one dispatcher call. Inputs are validated the same
//! way everywhere: identifiers must be positive, pages start at 1, and free
//! text (search queries, usernames) must not be blank. A failed check returns
//! [`JikanError::Validation`] without touching the network.

pub mod anime;
pub mod character;
pub mod club;
pub mod genre;
pub mod manga;
pub mod search;
pub mod user;

pub use anime::*;
pub use character::*;
pub use club::*;
pub use genre::*;
pub use manga::*;
pub use search::*;
pub use user::*;

use crate::api::{Id, JikanError, Result};

pub(crate) fn require_id(what: &str, id: Id) -> Result<()> {
    if id.is_valid() {
        Ok(())
    } else {
        Err(JikanError::validation(format!("invalid {} ID: {}", what, id)))
    }
}

pub(crate) fn require_page(page: u32) -> Result<()> {
    if page >= 1 {
        Ok(())
    } else {
        Err(JikanError::validation(format!("page must be >= 1, got {}", page)))
    }
}

/// Returns the trimmed text.
pub(crate) fn require_text<'a>(what: &str, text: &'a str) -> Result<&'a str> {
    let text = text.trim();
    if text.is_empty() {
        Err(JikanError::validation(format!("{} cannot be empty", what)))
    } else {
        Ok(text)
    }
}
