//! Group-filtered rankings.
//!
//! Endpoints:
//! - GET /groups/{name}/articles?order=score|time&page=N - One page of a
//!   ranking restricted to the group's articles
//!
//! The filtered ranking is cached for a minute. Membership changes made in
//! that window are not reflected until it expires.

use axum::{
    Json, Router, debug_handler,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use shared::api::{ArticleItem, ListQuery};

use crate::{error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/{name}/articles", get(group_articles))
}

#[debug_handler]
async fn group_articles(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let articles = state
        .engine
        .group_articles(&name, query.order.into(), query.page)
        .await
        .map_err(AppError::engine)?;

    let items: Vec<ArticleItem> = articles.into_iter().map(ArticleItem::from).collect();

    Ok(Json(items))
}
