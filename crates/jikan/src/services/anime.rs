//! Anime endpoints.

use super::{require_id, require_page};
use crate::api::{
    CharacterRef, DateRange, ExternalLink, Id, Images, JikanClient, NewsItem, Page, PersonRef,
    Relation, Request, RequestContext, Resource, Result, ScoreBucket,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Full anime details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anime {
    pub mal_id: Id,
    pub url: String,
    pub images: Images,

    // Titles
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub title_synonyms: Vec<String>,

    // Type and status
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub source: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub airing: bool,

    // Dates
    pub aired: DateRange,
    pub duration: Option<String>,
    pub rating: Option<String>,

    // Scores and rankings
    pub score: Option<f64>,
    pub scored_by: Option<u32>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub members: Option<u32>,
    pub favorites: Option<u32>,

    pub synopsis: Option<String>,
    pub background: Option<String>,

    pub season: Option<String>,
    pub year: Option<u32>,
    pub broadcast: Broadcast,

    pub producers: Vec<Resource>,
    pub licensors: Vec<Resource>,
    pub studios: Vec<Resource>,

    pub genres: Vec<Resource>,
    pub explicit_genres: Vec<Resource>,
    pub themes: Vec<Resource>,
    pub demographics: Vec<Resource>,
}

/// Broadcast information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Broadcast {
    pub day: Option<String>,
    pub time: Option<String>,
    pub timezone: Option<String>,
    pub string: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeCharacter {
    pub character: CharacterRef,
    pub role: String,
    pub favorites: u32,
    pub voice_actors: Vec<VoiceActor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceActor {
    pub person: PersonRef,
    pub language: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffMember {
    pub person: PersonRef,
    pub positions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub mal_id: Id,
    pub url: Option<String>,
    pub title: String,
    pub title_japanese: Option<String>,
    pub title_romanji: Option<String>,
    pub aired: Option<DateTime<FixedOffset>>,
    pub score: Option<f64>,
    pub filler: bool,
    pub recap: bool,
    pub forum_url: Option<String>,
}

/// Watch-status counts and score histogram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeStatistics {
    pub watching: u32,
    pub completed: u32,
    pub on_hold: u32,
    pub dropped: u32,
    pub plan_to_watch: u32,
    pub total: u32,
    pub scores: Vec<ScoreBucket>,
}

/// Opening and ending theme songs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeThemes {
    pub openings: Vec<String>,
    pub endings: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct AnimeService<'a> {
    client: &'a JikanClient,
}

impl<'a> AnimeService<'a> {
    pub(crate) fn new(client: &'a JikanClient) -> Self {
        Self { client }
    }

    /// Fetch full anime details by MAL ID
    pub async fn by_id(&self, ctx: &RequestContext, id: Id) -> Result<Anime> {
        require_id("anime", id)?;
        debug!(mal_id = %id, "Fetching anime details");
        let envelope = self.client.execute(ctx, Request::get("/anime").segment(id)).await?;
        Ok(envelope.data)
    }

    pub async fn characters(&self, ctx: &RequestContext, id: Id) -> Result<Vec<AnimeCharacter>> {
        self.list(ctx, id, "characters").await
    }

    pub async fn staff(&self, ctx: &RequestContext, id: Id) -> Result<Vec<StaffMember>> {
        self.list(ctx, id, "staff").await
    }

    pub async fn episodes(&self, ctx: &RequestContext, id: Id, page: u32) -> Result<Page<Episode>> {
        self.paged(ctx, id, "episodes", page).await
    }

    pub async fn news(&self, ctx: &RequestContext, id: Id, page: u32) -> Result<Page<NewsItem>> {
        self.paged(ctx, id, "news", page).await
    }

    pub async fn statistics(&self, ctx: &RequestContext, id: Id) -> Result<AnimeStatistics> {
        require_id("anime", id)?;
        debug!(mal_id = %id, "Fetching anime statistics");
        let request = Request::get("/anime").segment(id).segment("statistics");
        Ok(self.client.execute(ctx, request).await?.data)
    }

    pub async fn relations(&self, ctx: &RequestContext, id: Id) -> Result<Vec<Relation>> {
        self.list(ctx, id, "relations").await
    }

    pub async fn themes(&self, ctx: &RequestContext, id: Id) -> Result<AnimeThemes> {
        require_id("anime", id)?;
        debug!(mal_id = %id, "Fetching anime themes");
        let request = Request::get("/anime").segment(id).segment("themes");
        Ok(self.client.execute(ctx, request).await?.data)
    }

    pub async fn external(&self, ctx: &RequestContext, id: Id) -> Result<Vec<ExternalLink>> {
        self.list(ctx, id, "external").await
    }

    async fn list<T>(&self, ctx: &RequestContext, id: Id, sub: &str) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        require_id("anime", id)?;
        debug!(mal_id = %id, resource = sub, "Fetching anime sub-resource");
        let request = Request::get("/anime").segment(id).segment(sub);
        Ok(self.client.execute(ctx, request).await?.data)
    }

    async fn paged<T>(&self, ctx: &RequestContext, id: Id, sub: &str, page: u32) -> Result<Page<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        require_id("anime", id)?;
        require_page(page)?;
        debug!(mal_id = %id, resource = sub, page = page, "Fetching anime sub-resource page");
        let request = Request::get("/anime")
            .segment(id)
            .segment(sub)
            .query("page", page);
        Ok(Page::from_envelope(self.client.execute(ctx, request).await?))
    }
}
