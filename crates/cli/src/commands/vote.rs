use anyhow::Result;

use crate::{api::Api, config::Config, ui};

pub async fn run(config: &Config, id: u64, user: &str) -> Result<()> {
    let api = Api::new(config.api_url.to_string());

    ui::spin("Voting...", api.vote(id, user.to_string())).await?;

    ui::success(&format!(
        "{} voted on {}",
        ui::bold(user),
        ui::bold(&format!("article:{id}"))
    ));

    Ok(())
}
