//! Shared API request/response types used by both CLI and API server.

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

/// Longest accepted article title.
const MAX_TITLE_LEN: usize = 300;
/// Longest accepted link.
const MAX_LINK_LEN: usize = 2048;
/// Max groups touched in one request.
const MAX_GROUPS: usize = 32;

/// Submit a new article. The poster's vote is counted implicitly.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateArticlePayload {
    #[garde(length(min = 1, max = 128))]
    pub poster: String,
    #[garde(length(min = 1, max = MAX_TITLE_LEN))]
    pub title: String,
    #[garde(url, length(max = MAX_LINK_LEN))]
    pub link: String,
}

/// Returned after creating an article.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateArticleResponse {
    pub id: u64,
    /// Store key of the article, e.g. `article:42`.
    pub key: String,
}

/// Cast a vote on an article.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct VotePayload {
    #[garde(length(min = 1, max = 128))]
    pub user: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteStatus {
    Applied,
}

/// Returned when a vote was counted. Rejected votes come back as errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    pub status: VoteStatus,
}

/// Add an article to (or remove it from) one or more groups.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct GroupsPayload {
    #[garde(length(min = 1, max = MAX_GROUPS), inner(length(min = 1, max = 64)))]
    pub groups: Vec<String>,
}

/// Which global ranking a listing is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Score,
    Time,
}

/// Query string for paginated listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub order: Order,
    #[serde(default = "first_page")]
    pub page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            order: Order::default(),
            page: first_page(),
        }
    }
}

fn first_page() -> u32 {
    1
}

/// An article as served in a ranked listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleItem {
    /// Store key of the article, e.g. `article:42`.
    pub id: String,
    pub title: String,
    pub link: String,
    pub poster: String,
    pub time: DateTime<Utc>,
    pub votes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_payload(link: &str) -> CreateArticlePayload {
        CreateArticlePayload {
            poster: "sky".to_string(),
            title: "This is sky".to_string(),
            link: link.to_string(),
        }
    }

    #[test]
    fn create_article_accepts_absolute_url() {
        assert!(article_payload("https://sky.com").validate().is_ok());
    }

    #[test]
    fn create_article_rejects_bare_host() {
        assert!(article_payload("sky.com").validate().is_err());
    }

    #[test]
    fn create_article_rejects_empty_title() {
        let mut payload = article_payload("https://sky.com");
        payload.title.clear();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn groups_payload_rejects_empty_list_and_empty_names() {
        let empty = GroupsPayload { groups: vec![] };
        let blank = GroupsPayload {
            groups: vec!["c++".to_string(), String::new()],
        };

        assert!(empty.validate().is_err());
        assert!(blank.validate().is_err());
    }

    #[test]
    fn list_query_defaults_to_first_score_page() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();

        assert_eq!(query.order, Order::Score);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn order_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Order::Time).unwrap(), r#""time""#);
    }

    #[test]
    fn vote_status_serializes_snake_case() {
        let body = serde_json::to_string(&VoteResponse {
            status: VoteStatus::Applied,
        })
        .unwrap();

        assert_eq!(body, r#"{"status":"applied"}"#);
    }
}
