//! Manage article groups and browse group rankings.
//!
//! Group rankings are computed on the server and cached for a minute, so
//! a freshly added article may take that long to appear.

use anyhow::Result;
use shared::api::ListQuery;

use crate::{api::Api, commands::list::print_page, config::Config, ui};

/// Add an article to one or more groups.
pub async fn add(config: &Config, id: u64, groups: Vec<String>) -> Result<()> {
    let api = Api::new(config.api_url.to_string());
    let names = groups.join(", ");

    ui::spin("Updating groups...", api.add_to_groups(id, groups)).await?;

    ui::success(&format!("Added article:{id} to {}", ui::bold(&names)));

    Ok(())
}

/// Remove an article from one or more groups.
pub async fn remove(config: &Config, id: u64, groups: Vec<String>) -> Result<()> {
    let api = Api::new(config.api_url.to_string());
    let names = groups.join(", ");

    ui::spin("Updating groups...", api.remove_from_groups(id, groups)).await?;

    ui::success(&format!("Removed article:{id} from {}", ui::bold(&names)));

    Ok(())
}

/// List a page of a group's ranking.
pub async fn list(config: &Config, name: &str, query: ListQuery) -> Result<()> {
    let api = Api::new(config.api_url.to_string());

    let articles = ui::spin(
        &format!("Fetching {name} articles..."),
        api.group_articles(name, &query),
    )
    .await?;

    if articles.is_empty() && query.page == 1 {
        println!("Group {} has no articles", ui::bold(name));
        ui::hint("Add one with: linkrank group add <id> <group>");
        return Ok(());
    }

    print_page(articles, query.page);

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::api::Api;
    use shared::api::{ArticleItem, ListQuery, Order};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path, query_param},
    };

    #[tokio::test]
    async fn add_to_groups_posts_group_names() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/articles/1/groups"))
            .and(body_json(serde_json::json!({ "groups": ["c++", "java"] })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = Api::new(mock_server.uri());

        api.add_to_groups(1, vec!["c++".to_string(), "java".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn add_to_groups_unknown_article() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/articles/99/groups"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Article not found"))
            .mount(&mock_server)
            .await;

        let api = Api::new(mock_server.uri());
        let err = api
            .add_to_groups(99, vec!["java".to_string()])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Article not found");
    }

    #[tokio::test]
    async fn group_articles_reads_group_ranking() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/groups/java/articles"))
            .and(query_param("order", "score"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<ArticleItem>::new()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = Api::new(mock_server.uri());
        let query = ListQuery {
            order: Order::Score,
            page: 1,
        };

        assert!(api.group_articles("java", &query).await.unwrap().is_empty());
    }
}
