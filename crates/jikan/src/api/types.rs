//! Jikan API v4 shared response types.
//!
//! Resource-specific entities live next to their facades in
//! [`crate::services`]; the types here are embedded by all of them.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// MyAnimeList identifier of an anime, manga, character, person or club.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id(pub i64);

impl Id {
    /// Identifiers used in request paths must be positive.
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<u32> for Id {
    fn from(value: u32) -> Self {
        Self(i64::from(value))
    }
}

/// Every successful response body: `{"data": ..., "pagination": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    #[serde(deserialize_with = "null_as_default")]
    pub last_visible_page: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub has_next_page: bool,
    /// Not reported by every list endpoint.
    pub current_page: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub items: PaginationItems,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationItems {
    #[serde(deserialize_with = "null_as_default")]
    pub count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub per_page: u32,
}

/// Treats an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Pagination {
    /// Whether pages exist beyond `page`.
    pub fn has_more_after(&self, page: u32) -> bool {
        page < self.last_visible_page
    }

    /// Whether pages exist beyond the one this pagination describes.
    pub fn has_more(&self) -> bool {
        match self.current_page {
            Some(page) => self.has_more_after(page),
            None => self.has_next_page,
        }
    }
}

/// One page of a paginated list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub(crate) fn from_envelope(envelope: Envelope<Vec<T>>) -> Self {
        Self {
            items: envelope.data,
            pagination: envelope.pagination.unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Minimal cross reference to another entity (genre, studio, person, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    pub mal_id: Id,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: String,
    pub url: String,
}

/// Image variants in both encodings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Images {
    pub jpg: ImageSet,
    pub webp: ImageSet,
}

impl Images {
    /// Largest JPG available, falling back to WebP.
    pub fn best_url(&self) -> Option<&str> {
        self.jpg.best_url().or_else(|| self.webp.best_url())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSet {
    pub image_url: Option<String>,
    pub small_image_url: Option<String>,
    pub large_image_url: Option<String>,
}

impl ImageSet {
    pub fn best_url(&self) -> Option<&str> {
        [&self.large_image_url, &self.image_url, &self.small_image_url]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|url| !url.is_empty())
    }
}

/// Aired/published period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub from: Option<DateTime<FixedOffset>>,
    pub to: Option<DateTime<FixedOffset>>,
    /// Human readable form, e.g. "Apr 3, 1998 to Apr 24, 1999".
    #[serde(rename = "string")]
    pub display: Option<String>,
}

/// Anime or manga stub embedded in appearance and recommendation lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaRef {
    pub mal_id: Id,
    pub url: String,
    pub images: Images,
    pub title: String,
}

/// Character stub embedded in cast lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterRef {
    pub mal_id: Id,
    pub url: String,
    pub images: Images,
    pub name: String,
}

/// Person stub (voice actor, staff member, author).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonRef {
    pub mal_id: Id,
    pub url: String,
    pub images: Images,
    pub name: String,
}

/// User stub (review author, club member).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRef {
    pub username: String,
    pub url: String,
    pub images: Images,
}

/// Related entries grouped by relation ("Sequel", "Adaptation", ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relation {
    pub relation: String,
    pub entry: Vec<Resource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalLink {
    pub name: String,
    pub url: String,
}

/// News article attached to an anime or manga.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsItem {
    pub mal_id: Id,
    pub url: String,
    pub title: String,
    pub date: Option<DateTime<FixedOffset>>,
    pub author_username: String,
    pub author_url: Option<String>,
    pub forum_url: Option<String>,
    pub images: Images,
    pub comments: u32,
    pub excerpt: Option<String>,
}

/// One bar of a score histogram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBucket {
    pub score: u8,
    pub votes: u32,
    pub percentage: f64,
}
