//! Character endpoints.

use super::{require_id, require_page, require_text};
use crate::api::{Id, ImageSet, Images, JikanClient, MediaRef, Page, PersonRef, Request, RequestContext, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    pub mal_id: Id,
    pub url: String,
    pub images: Images,
    pub name: String,
    pub name_kanji: Option<String>,
    pub nicknames: Vec<String>,
    pub favorites: u32,
    pub about: Option<String>,
}

/// An anime the character appears in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterAnime {
    pub role: String,
    pub anime: MediaRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterManga {
    pub role: String,
    pub manga: MediaRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterVoice {
    pub language: String,
    pub person: PersonRef,
}

/// Gallery picture. Both the flat and the nested image shapes are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Picture {
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
    pub jpg: ImageSet,
    pub webp: ImageSet,
}

impl Picture {
    pub fn best_url(&self) -> Option<&str> {
        [&self.large_image_url, &self.image_url]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|url| !url.is_empty())
            .or_else(|| self.jpg.best_url())
            .or_else(|| self.webp.best_url())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CharacterService<'a> {
    client: &'a JikanClient,
}

impl<'a> CharacterService<'a> {
    pub(crate) fn new(client: &'a JikanClient) -> Self {
        Self { client }
    }

    pub async fn by_id(&self, ctx: &RequestContext, id: Id) -> Result<Character> {
        require_id("character", id)?;
        debug!(mal_id = %id, "Fetching character");
        let request = Request::get("/characters").segment(id);
        Ok(self.client.execute(ctx, request).await?.data)
    }

    pub async fn anime(&self, ctx: &RequestContext, id: Id) -> Result<Vec<CharacterAnime>> {
        self.list(ctx, id, "anime").await
    }

    pub async fn manga(&self, ctx: &RequestContext, id: Id) -> Result<Vec<CharacterManga>> {
        self.list(ctx, id, "manga").await
    }

    pub async fn voices(&self, ctx: &RequestContext, id: Id) -> Result<Vec<CharacterVoice>> {
        self.list(ctx, id, "voices").await
    }

    pub async fn pictures(&self, ctx: &RequestContext, id: Id) -> Result<Vec<Picture>> {
        self.list(ctx, id, "pictures").await
    }

    /// Search characters by name.
    pub async fn search(&self, ctx: &RequestContext, query: &str, page: u32) -> Result<Page<Character>> {
        let query = require_text("search query", query)?;
        require_page(page)?;
        debug!(query = query, page = page, "Searching characters");
        let request = Request::get("/characters").query("q", query).query("page", page);
        Ok(Page::from_envelope(self.client.execute(ctx, request).await?))
    }

    async fn list<T: DeserializeOwned>(&self, ctx: &RequestContext, id: Id, sub: &str) -> Result<Vec<T>> {
        require_id("character", id)?;
        debug!(mal_id = %id, resource = sub, "Fetching character sub-resource");
        let request = Request::get("/characters").segment(id).segment(sub);
        Ok(self.client.execute(ctx, request).await?.data)
    }
}
