//! Show one page of a ranking as a table.
//!
//! Rows come back in ascending score order, so the first row is the
//! oldest (or lowest-scored) article on the page.

use anyhow::Result;
use chrono_humanize::HumanTime;
use shared::api::{ArticleItem, ListQuery};
use tabled::{Table, Tabled, settings::Style};

use crate::{api::Api, config::Config, ui};

#[derive(Tabled)]
struct ArticleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Poster")]
    poster: String,
    #[tabled(rename = "Votes")]
    votes: i64,
    #[tabled(rename = "Posted")]
    posted: String,
}

impl From<ArticleItem> for ArticleRow {
    fn from(item: ArticleItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            link: item.link,
            poster: item.poster,
            votes: item.votes,
            posted: HumanTime::from(item.time).to_string(),
        }
    }
}

/// List a page of a global ranking.
pub async fn run(config: &Config, query: ListQuery) -> Result<()> {
    let api = Api::new(config.api_url.to_string());

    let articles = ui::spin("Fetching articles...", api.list_articles(&query)).await?;

    print_page(articles, query.page);

    Ok(())
}

pub(crate) fn print_page(articles: Vec<ArticleItem>, page: u32) {
    if articles.is_empty() {
        println!("No articles on page {page}");
        return;
    }

    let rows: Vec<ArticleRow> = articles.into_iter().map(ArticleRow::from).collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}
