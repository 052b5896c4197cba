//! Filtered anime and manga search.

use super::{require_page, require_text};
use crate::api::{Id, JikanClient, JikanError, Page, Request, RequestContext, Result};
use crate::services::{Anime, Manga};
use std::fmt;
use tracing::debug;

/// Page size accepted by the search endpoints.
pub const MAX_SEARCH_LIMIT: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// Parameters shared by anime and manga search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub query: String,
    /// Media type, e.g. `tv`, `movie`, `manga`, `novel`.
    pub kind: Option<String>,
    pub status: Option<String>,
    pub genres: Vec<Id>,
    pub order_by: Option<String>,
    pub sort: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Anime search parameters (`/anime?q=...`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimeSearch {
    pub options: SearchOptions,
    /// Age rating, e.g. `pg13`.
    pub rating: Option<String>,
}

/// Manga search parameters (`/manga?q=...`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MangaSearch {
    pub options: SearchOptions,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Validated request for `path`, or the first failing precondition.
    fn request(&self, path: &str) -> Result<Request> {
        let query = require_text("search query", &self.query)?;
        if let Some(page) = self.page {
            require_page(page)?;
        }
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_SEARCH_LIMIT {
                return Err(JikanError::validation(format!(
                    "limit must be between 1 and {}, got {}",
                    MAX_SEARCH_LIMIT, limit
                )));
            }
        }
        if let Some(id) = self.genres.iter().find(|id| !id.is_valid()) {
            return Err(JikanError::validation(format!("invalid genre ID: {}", id)));
        }

        let genres = if self.genres.is_empty() {
            None
        } else {
            Some(
                self.genres
                    .iter()
                    .map(Id::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            )
        };

        Ok(Request::get(path)
            .query("q", query)
            .query_opt("type", self.kind.as_deref())
            .query_opt("status", self.status.as_deref())
            .query_opt("genres", genres)
            .query_opt("order_by", self.order_by.as_deref())
            .query_opt("sort", self.sort)
            .query_opt("page", self.page)
            .query_opt("limit", self.limit))
    }
}

macro_rules! search_builder {
    ($ty:ident) => {
        impl $ty {
            pub fn new(query: impl Into<String>) -> Self {
                Self {
                    options: SearchOptions::new(query),
                    ..Default::default()
                }
            }

            pub fn kind(mut self, kind: impl Into<String>) -> Self {
                self.options.kind = Some(kind.into());
                self
            }

            pub fn status(mut self, status: impl Into<String>) -> Self {
                self.options.status = Some(status.into());
                self
            }

            pub fn genre(mut self, id: Id) -> Self {
                self.options.genres.push(id);
                self
            }

            pub fn order_by(mut self, field: impl Into<String>, sort: SortOrder) -> Self {
                self.options.order_by = Some(field.into());
                self.options.sort = Some(sort);
                self
            }

            pub fn page(mut self, page: u32) -> Self {
                self.options.page = Some(page);
                self
            }

            pub fn limit(mut self, limit: u32) -> Self {
                self.options.limit = Some(limit);
                self
            }
        }
    };
}

search_builder!(AnimeSearch);
search_builder!(MangaSearch);

impl AnimeSearch {
    pub fn rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SearchService<'a> {
    client: &'a JikanClient,
}

impl<'a> SearchService<'a> {
    pub(crate) fn new(client: &'a JikanClient) -> Self {
        Self { client }
    }

    pub async fn anime(&self, ctx: &RequestContext, search: &AnimeSearch) -> Result<Page<Anime>> {
        let request = search
            .options
            .request("/anime")?
            .query_opt("rating", search.rating.as_deref());
        debug!(query = %search.options.query, "Searching anime");
        Ok(Page::from_envelope(self.client.execute(ctx, request).await?))
    }

    pub async fn manga(&self, ctx: &RequestContext, search: &MangaSearch) -> Result<Page<Manga>> {
        let request = search.options.request("/manga")?;
        debug!(query = %search.options.query, "Searching manga");
        Ok(Page::from_envelope(self.client.execute(ctx, request).await?))
    }
}
