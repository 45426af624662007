//! HTTP client for the linkrank API.

use anyhow::{Result, anyhow};
use reqwest::{Client, Response, Url};
use shared::api::{
    ArticleItem, CreateArticlePayload, CreateArticleResponse, GroupsPayload, ListQuery,
    VotePayload, VoteResponse,
};

pub struct Api {
    pub http: Client,
    pub base_url: String,
}

impl Api {
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Submits an article. The poster's own vote is counted by the server.
    pub async fn create_article(
        &self,
        payload: CreateArticlePayload,
    ) -> Result<CreateArticleResponse> {
        let response = Self::check_response(
            self.http
                .post(format!("{}/articles", self.base_url))
                .json(&payload)
                .send()
                .await?,
        )
        .await?;

        Ok(response.json().await?)
    }

    /// Votes on an article by numeric id.
    pub async fn vote(&self, id: u64, user: String) -> Result<VoteResponse> {
        let response = Self::check_response(
            self.http
                .post(format!("{}/articles/{}/vote", self.base_url, id))
                .json(&VotePayload { user })
                .send()
                .await?,
        )
        .await?;

        Ok(response.json().await?)
    }

    /// Fetches one page of a global ranking.
    pub async fn list_articles(&self, query: &ListQuery) -> Result<Vec<ArticleItem>> {
        let response = Self::check_response(
            self.http
                .get(format!("{}/articles", self.base_url))
                .query(query)
                .send()
                .await?,
        )
        .await?;

        Ok(response.json().await?)
    }

    /// Fetches one page of a group's ranking.
    pub async fn group_articles(&self, name: &str, query: &ListQuery) -> Result<Vec<ArticleItem>> {
        let response = Self::check_response(
            self.http
                .get(self.url(&["groups", name, "articles"])?)
                .query(query)
                .send()
                .await?,
        )
        .await?;

        Ok(response.json().await?)
    }

    pub async fn add_to_groups(&self, id: u64, groups: Vec<String>) -> Result<()> {
        Self::check_response(
            self.http
                .post(format!("{}/articles/{}/groups", self.base_url, id))
                .json(&GroupsPayload { groups })
                .send()
                .await?,
        )
        .await?;

        Ok(())
    }

    pub async fn remove_from_groups(&self, id: u64, groups: Vec<String>) -> Result<()> {
        Self::check_response(
            self.http
                .delete(format!("{}/articles/{}/groups", self.base_url, id))
                .json(&GroupsPayload { groups })
                .send()
                .await?,
        )
        .await?;

        Ok(())
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Invalid API URL: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check_response(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Try to extract error message from JSON response
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|json| {
                    json.get("error")
                        .or_else(|| json.get("message"))
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string())
                })
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("Request failed")
                            .to_string()
                    } else {
                        body
                    }
                });

            anyhow::bail!("{}", message);
        }

        Ok(response)
    }
}
