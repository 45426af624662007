//! Submit a new article.
//!
//! The poster's own vote is recorded by the server, so the article starts
//! with one vote.

use anyhow::Result;
use shared::api::CreateArticlePayload;

use crate::{api::Api, config::Config, ui};

pub async fn run(config: &Config, poster: &str, title: &str, link: &str) -> Result<()> {
    let api = Api::new(config.api_url.to_string());

    let payload = CreateArticlePayload {
        poster: poster.to_string(),
        title: title.to_string(),
        link: link.to_string(),
    };

    let created = ui::spin("Posting article...", api.create_article(payload)).await?;

    ui::success(&format!(
        "Posted {} (id {})",
        ui::bold(&created.key),
        created.id
    ));

    Ok(())
}
