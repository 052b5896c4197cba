//! User profile endpoints.

use super::{require_page, require_text};
use crate::api::{ExternalLink, Id, Images, JikanClient, Page, Request, RequestContext, Resource, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Full user profile (`/users/{username}/full`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub mal_id: Option<Id>,
    pub username: String,
    pub url: String,
    pub images: Images,
    pub last_online: Option<DateTime<FixedOffset>>,
    pub gender: Option<String>,
    pub birthday: Option<DateTime<FixedOffset>>,
    pub location: Option<String>,
    pub joined: Option<DateTime<FixedOffset>>,
    pub about: Option<String>,
    pub statistics: UserStatistics,
    pub external: Vec<ExternalLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStatistics {
    pub anime: AnimeListStatistics,
    pub manga: MangaListStatistics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeListStatistics {
    pub days_watched: f64,
    pub mean_score: f64,
    pub watching: u32,
    pub completed: u32,
    pub on_hold: u32,
    pub dropped: u32,
    pub plan_to_watch: u32,
    pub total_entries: u32,
    pub rewatched: u32,
    pub episodes_watched: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaListStatistics {
    pub days_read: f64,
    pub mean_score: f64,
    pub reading: u32,
    pub completed: u32,
    pub on_hold: u32,
    pub dropped: u32,
    pub plan_to_read: u32,
    pub total_entries: u32,
    pub reread: u32,
    pub chapters_read: u32,
    pub volumes_read: u32,
}

/// One list update in a user's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    pub entry: Resource,
    pub increment: u32,
    pub date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Copy)]
pub struct UserService<'a> {
    client: &'a JikanClient,
}

impl<'a> UserService<'a> {
    pub(crate) fn new(client: &'a JikanClient) -> Self {
        Self { client }
    }

    pub async fn by_username(&self, ctx: &RequestContext, username: &str) -> Result<UserProfile> {
        let username = require_text("username", username)?;
        debug!(username = username, "Fetching user profile");
        let request = Request::get("/users").segment(username).segment("full");
        Ok(self.client.execute(ctx, request).await?.data)
    }

    pub async fn history(&self, ctx: &RequestContext, username: &str, page: u32) -> Result<Page<HistoryEntry>> {
        let username = require_text("username", username)?;
        require_page(page)?;
        debug!(username = username, page = page, "Fetching user history");
        let request = Request::get("/users")
            .segment(username)
            .segment("history")
            .query("page", page);
        Ok(Page::from_envelope(self.client.execute(ctx, request).await?))
    }
}
