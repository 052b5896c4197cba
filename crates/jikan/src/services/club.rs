//! Club endpoints.

use super::{require_id, require_page, require_text};
use crate::api::{Id, Images, JikanClient, Page, Request, RequestContext, Result, UserRef};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Club {
    pub mal_id: Id,
    pub name: String,
    pub url: String,
    pub images: Images,
    pub members: u32,
    pub category: Option<String>,
    pub created: Option<DateTime<FixedOffset>>,
    pub access: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ClubService<'a> {
    client: &'a JikanClient,
}

impl<'a> ClubService<'a> {
    pub(crate) fn new(client: &'a JikanClient) -> Self {
        Self { client }
    }

    pub async fn by_id(&self, ctx: &RequestContext, id: Id) -> Result<Club> {
        require_id("club", id)?;
        debug!(mal_id = %id, "Fetching club");
        let request = Request::get("/clubs").segment(id);
        Ok(self.client.execute(ctx, request).await?.data)
    }

    pub async fn search(&self, ctx: &RequestContext, query: &str, page: u32) -> Result<Page<Club>> {
        let query = require_text("search query", query)?;
        require_page(page)?;
        debug!(query = query, page = page, "Searching clubs");
        let request = Request::get("/clubs").query("q", query).query("page", page);
        Ok(Page::from_envelope(self.client.execute(ctx, request).await?))
    }

    pub async fn members(&self, ctx: &RequestContext, id: Id, page: u32) -> Result<Page<UserRef>> {
        require_id("club", id)?;
        require_page(page)?;
        debug!(mal_id = %id, page = page, "Fetching club members");
        let request = Request::get("/clubs")
            .segment(id)
            .segment("members")
            .query("page", page);
        Ok(Page::from_envelope(self.client.execute(ctx, request).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{client, pairs, FakeTransport};

    #[tokio::test]
    async fn test_by_id() {
        let fake = FakeTransport::new();
        fake.push_json(
            200,
            r#"{"data":{"mal_id":1,"name":"Cowboy Bebop","url":"c","members":2500,"category":"anime",
                "created":"2007-03-12T00:00:00+00:00","access":"public"}}"#,
        );

        let club = client(&fake)
            .clubs()
            .by_id(&RequestContext::background(), Id(1))
            .await
            .unwrap();

        assert_eq!(club.name, "Cowboy Bebop");
        assert_eq!(club.members, 2500);
        assert_eq!(club.access.as_deref(), Some("public"));
        assert!(club.created.is_some());
    }

    #[tokio::test]
    async fn test_search_and_members() {
        let fake = FakeTransport::new();
        fake.push_json(
            200,
            r#"{"pagination":{"last_visible_page":2,"has_next_page":true},"data":[{"mal_id":3,"name":"Bebop Fans"}]}"#,
        );
        fake.push_json(
            200,
            r#"{"pagination":{"last_visible_page":1,"has_next_page":false},"data":[{"username":"spike","url":"u","images":{"jpg":{"image_url":"s.jpg"}}}]}"#,
        );

        let client = client(&fake);
        let ctx = RequestContext::background();

        let clubs = client.clubs().search(&ctx, "bebop fans", 1).await.unwrap();
        assert_eq!(clubs.items[0].mal_id, Id(3));
        assert!(clubs.pagination.has_more_after(1));
        assert_eq!(fake.last_query(), pairs(&[("q", "bebop fans"), ("page", "1")]));

        let members = client.clubs().members(&ctx, Id(3), 1).await.unwrap();
        assert_eq!(members.items[0].username, "spike");
        assert_eq!(members.items[0].images.best_url(), Some("s.jpg"));
        assert_eq!(fake.last_path().as_deref(), Some("/v4/clubs/3/members"));
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_request() {
        let fake = FakeTransport::new();
        let client = client(&fake);
        let ctx = RequestContext::background();

        assert!(client.clubs().by_id(&ctx, Id(0)).await.unwrap_err().is_validation());
        assert!(client.clubs().members(&ctx, Id(-3), 1).await.unwrap_err().is_validation());
        assert!(client.clubs().members(&ctx, Id(3), 0).await.unwrap_err().is_validation());
        assert!(client.clubs().search(&ctx, "", 1).await.unwrap_err().is_validation());
        assert!(fake.requests().is_empty());
    }
}
