//! Manga endpoints.

use super::{require_id, require_page};
use crate::api::{
    CharacterRef, DateRange, ExternalLink, Id, Images, JikanClient, MediaRef, NewsItem, Page,
    Relation, Request, RequestContext, Resource, Result, ScoreBucket, UserRef,
};
use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manga {
    pub mal_id: Id,
    pub url: String,
    pub images: Images,

    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub title_synonyms: Vec<String>,

    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub chapters: Option<u32>,
    pub volumes: Option<u32>,
    pub status: Option<String>,
    pub publishing: bool,
    pub published: DateRange,

    pub score: Option<f64>,
    pub scored_by: Option<u32>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub members: Option<u32>,
    pub favorites: Option<u32>,

    pub synopsis: Option<String>,
    pub background: Option<String>,

    pub authors: Vec<Resource>,
    pub serializations: Vec<Resource>,
    pub genres: Vec<Resource>,
    pub explicit_genres: Vec<Resource>,
    pub themes: Vec<Resource>,
    pub demographics: Vec<Resource>,
}

/// Manga details plus relations and external links (`/manga/{id}/full`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaFull {
    #[serde(flatten)]
    pub manga: Manga,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub external: Vec<ExternalLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaCharacter {
    pub character: CharacterRef,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaStatistics {
    pub reading: u32,
    pub completed: u32,
    pub on_hold: u32,
    pub dropped: u32,
    pub plan_to_read: u32,
    pub total: u32,
    pub scores: Vec<ScoreBucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendation {
    pub entry: MediaRef,
    pub url: String,
    pub votes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub mal_id: Id,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub review: String,
    pub score: u8,
    pub tags: Vec<String>,
    pub is_spoiler: bool,
    pub is_preliminary: bool,
    pub chapters_read: Option<u32>,
    pub user: UserRef,
}

/// Which reviews to include besides regular ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub preliminary: bool,
    pub spoilers: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct MangaService<'a> {
    client: &'a JikanClient,
}

impl<'a> MangaService<'a> {
    pub(crate) fn new(client: &'a JikanClient) -> Self {
        Self { client }
    }

    pub async fn by_id(&self, ctx: &RequestContext, id: Id) -> Result<Manga> {
        require_id("manga", id)?;
        debug!(mal_id = %id, "Fetching manga details");
        let request = Request::get("/manga").segment(id);
        Ok(self.client.execute(ctx, request).await?.data)
    }

    pub async fn full(&self, ctx: &RequestContext, id: Id) -> Result<MangaFull> {
        self.single(ctx, id, "full").await
    }

    pub async fn characters(&self, ctx: &RequestContext, id: Id) -> Result<Vec<MangaCharacter>> {
        self.single(ctx, id, "characters").await
    }

    pub async fn statistics(&self, ctx: &RequestContext, id: Id) -> Result<MangaStatistics> {
        self.single(ctx, id, "statistics").await
    }

    pub async fn recommendations(&self, ctx: &RequestContext, id: Id) -> Result<Vec<Recommendation>> {
        self.single(ctx, id, "recommendations").await
    }

    pub async fn news(&self, ctx: &RequestContext, id: Id, page: u32) -> Result<Page<NewsItem>> {
        require_id("manga", id)?;
        require_page(page)?;
        debug!(mal_id = %id, page = page, "Fetching manga news");
        let request = Request::get("/manga")
            .segment(id)
            .segment("news")
            .query("page", page);
        Ok(Page::from_envelope(self.client.execute(ctx, request).await?))
    }

    pub async fn reviews(
        &self,
        ctx: &RequestContext,
        id: Id,
        page: u32,
        filter: ReviewFilter,
    ) -> Result<Page<Review>> {
        require_id("manga", id)?;
        require_page(page)?;
        debug!(mal_id = %id, page = page, ?filter, "Fetching manga reviews");
        let request = Request::get("/manga")
            .segment(id)
            .segment("reviews")
            .query("page", page)
            .query("preliminary", filter.preliminary)
            .query("spoilers", filter.spoilers);
        Ok(Page::from_envelope(self.client.execute(ctx, request).await?))
    }

    async fn single<T: DeserializeOwned>(&self, ctx: &RequestContext, id: Id, sub: &str) -> Result<T> {
        require_id("manga", id)?;
        debug!(mal_id = %id, resource = sub, "Fetching manga sub-resource");
        let request = Request::get("/manga").segment(id).segment(sub);
        Ok(self.client.execute(ctx, request).await?.data)
    }
}
