//! Genre listings for anime and manga.

use crate::api::{Id, JikanClient, JikanError, Request, RequestContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Genre/Theme/Demographic item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genre {
    pub mal_id: Id,
    pub name: String,
    pub url: String,
    pub count: u32,
}

/// Category selector for the genre endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenreFilter {
    Genres,
    ExplicitGenres,
    Themes,
    Demographics,
}

impl GenreFilter {
    pub const ALL: [GenreFilter; 4] = [
        GenreFilter::Genres,
        GenreFilter::ExplicitGenres,
        GenreFilter::Themes,
        GenreFilter::Demographics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenreFilter::Genres => "genres",
            GenreFilter::ExplicitGenres => "explicit_genres",
            GenreFilter::Themes => "themes",
            GenreFilter::Demographics => "demographics",
        }
    }
}

impl fmt::Display for GenreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenreFilter {
    type Err = JikanError;

    /// Accepts the API names plus the short forms `explicit` and `demo`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "genres" => Ok(GenreFilter::Genres),
            "explicit_genres" | "explicit" => Ok(GenreFilter::ExplicitGenres),
            "themes" => Ok(GenreFilter::Themes),
            "demographics" | "demo" => Ok(GenreFilter::Demographics),
            other => Err(JikanError::validation(format!("invalid genre filter: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GenreService<'a> {
    client: &'a JikanClient,
}

impl<'a> GenreService<'a> {
    pub(crate) fn new(client: &'a JikanClient) -> Self {
        Self { client }
    }

    /// Anime genres; `None` lists every category.
    pub async fn anime(&self, ctx: &RequestContext, filter: Option<GenreFilter>) -> Result<Vec<Genre>> {
        self.list(ctx, "/genres/anime", filter).await
    }

    pub async fn manga(&self, ctx: &RequestContext, filter: Option<GenreFilter>) -> Result<Vec<Genre>> {
        self.list(ctx, "/genres/manga", filter).await
    }

    async fn list(&self, ctx: &RequestContext, path: &str, filter: Option<GenreFilter>) -> Result<Vec<Genre>> {
        debug!(path = path, filter = ?filter, "Fetching genres");
        let request = Request::get(path).query_opt("filter", filter);
        Ok(self.client.execute(ctx, request).await?.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{client, pairs, FakeTransport};

    #[test]
    fn test_filter_parse() {
        assert_eq!("genres".parse::<GenreFilter>().unwrap(), GenreFilter::Genres);
        assert_eq!("explicit".parse::<GenreFilter>().unwrap(), GenreFilter::ExplicitGenres);
        assert_eq!("Demo".parse::<GenreFilter>().unwrap(), GenreFilter::Demographics);
        assert!("bogus".parse::<GenreFilter>().unwrap_err().is_validation());

        for filter in GenreFilter::ALL {
            assert_eq!(filter.as_str().parse::<GenreFilter>().unwrap(), filter);
        }
    }

    #[tokio::test]
    async fn test_anime_genres_with_filter() {
        let fake = FakeTransport::new();
        fake.push_json(200, r#"{"data":[{"mal_id":1,"name":"Action","url":"u","count":5000}]}"#);

        let genres = client(&fake)
            .genres()
            .anime(&RequestContext::background(), Some(GenreFilter::Themes))
            .await
            .unwrap();

        assert_eq!(genres[0].name, "Action");
        assert_eq!(genres[0].count, 5000);
        assert_eq!(fake.last_path().as_deref(), Some("/v4/genres/anime"));
        assert_eq!(fake.last_query(), pairs(&[("filter", "themes")]));
    }

    #[tokio::test]
    async fn test_manga_genres_without_filter() {
        let fake = FakeTransport::new();
        fake.push_json(200, r#"{"data":[]}"#);

        let genres = client(&fake)
            .genres()
            .manga(&RequestContext::background(), None)
            .await
            .unwrap();

        assert!(genres.is_empty());
        assert_eq!(fake.last_path().as_deref(), Some("/v4/genres/manga"));
        assert!(fake.last_query().is_empty());
    }
}
