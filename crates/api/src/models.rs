use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::api::ArticleItem;

use crate::engine::EngineError;

/// Hash field names of a stored article.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const LINK: &str = "link";
    pub const POSTER: &str = "poster";
    pub const TIME: &str = "time";
    pub const VOTES: &str = "votes";
}

/// Article stored as a hash under `article:{id}`.
///
/// The store only knows strings; conversion happens here and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Store key, e.g. `article:42`.
    pub key: String,
    pub title: String,
    pub link: String,
    /// User id of the submitter.
    pub poster: String,
    /// Creation time, epoch seconds.
    pub time: i64,
    /// Starts at 1, the poster's implicit vote.
    pub votes: i64,
}

impl Article {
    pub fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            (fields::TITLE.to_string(), self.title.clone()),
            (fields::LINK.to_string(), self.link.clone()),
            (fields::POSTER.to_string(), self.poster.clone()),
            (fields::TIME.to_string(), self.time.to_string()),
            (fields::VOTES.to_string(), self.votes.to_string()),
        ]
    }

    pub fn from_fields(key: &str, hash: &HashMap<String, String>) -> Result<Self, EngineError> {
        let text = |field: &str| {
            hash.get(field).cloned().ok_or_else(|| EngineError::Malformed {
                key: key.to_string(),
                reason: format!("missing field {field}"),
            })
        };
        let number = |field: &str| {
            text(field)?.parse::<i64>().map_err(|e| EngineError::Malformed {
                key: key.to_string(),
                reason: format!("field {field}: {e}"),
            })
        };

        Ok(Self {
            key: key.to_string(),
            title: text(fields::TITLE)?,
            link: text(fields::LINK)?,
            poster: text(fields::POSTER)?,
            time: number(fields::TIME)?,
            votes: number(fields::VOTES)?,
        })
    }

    pub fn posted_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.time, 0).unwrap_or_default()
    }
}

impl From<Article> for ArticleItem {
    fn from(article: Article) -> Self {
        let time = article.posted_at();
        Self {
            id: article.key,
            title: article.title,
            link: article.link,
            poster: article.poster,
            time,
            votes: article.votes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Article {
        Article {
            key: "article:1".to_string(),
            title: "This is sky".to_string(),
            link: "https://sky.com".to_string(),
            poster: "sky".to_string(),
            time: 1_700_000_000,
            votes: 1,
        }
    }

    #[test]
    fn fields_read_back_into_same_article() {
        let article = sample();
        let hash: HashMap<String, String> = article.to_fields().into_iter().collect();

        assert_eq!(Article::from_fields("article:1", &hash).unwrap(), article);
    }

    #[test]
    fn missing_field_is_malformed() {
        let mut hash: HashMap<String, String> = sample().to_fields().into_iter().collect();
        hash.remove(fields::LINK);

        let err = Article::from_fields("article:1", &hash).unwrap_err();

        assert!(matches!(err, EngineError::Malformed { ref key, .. } if key == "article:1"));
        assert!(err.to_string().contains("link"));
    }

    #[test]
    fn non_numeric_votes_is_malformed() {
        let mut hash: HashMap<String, String> = sample().to_fields().into_iter().collect();
        hash.insert(fields::VOTES.to_string(), "many".to_string());

        assert!(Article::from_fields("article:1", &hash).is_err());
    }

    #[test]
    fn converts_to_api_item_with_key_as_id() {
        let item = ArticleItem::from(sample());

        assert_eq!(item.id, "article:1");
        assert_eq!(item.time.timestamp(), 1_700_000_000);
        assert_eq!(item.votes, 1);
    }
}
