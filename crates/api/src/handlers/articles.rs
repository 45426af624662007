//! Article submission, ranked listings, voting and group membership.
//!
//! Endpoints:
//! - POST /articles - Submit an article (counts the poster's vote)
//! - GET /articles?order=score|time&page=N - One page of a global ranking
//! - POST /articles/{id}/vote - Vote on an article
//! - POST /articles/{id}/groups - Add the article to groups
//! - DELETE /articles/{id}/groups - Remove the article from groups
//!
//! Listings are ascending by score: the oldest or lowest-scored article
//! comes first.

use axum::{
    Json, Router, debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use garde::Validate;
use shared::api::{
    ArticleItem, CreateArticlePayload, CreateArticleResponse, GroupsPayload, ListQuery,
    VotePayload, VoteResponse, VoteStatus,
};

use crate::{
    engine::{VoteOutcome, article_key},
    error::AppError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_article).get(list_articles))
        .route("/{id}/vote", post(vote_article))
        .route("/{id}/groups", post(add_groups).delete(remove_groups))
}

#[debug_handler]
async fn create_article(
    State(state): State<AppState>,
    Json(payload): Json<CreateArticlePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state
        .engine
        .create_article(&payload.poster, &payload.title, &payload.link, Utc::now())
        .await
        .map_err(AppError::engine)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateArticleResponse {
            id,
            key: article_key(id),
        }),
    ))
}

#[debug_handler]
async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let articles = state
        .engine
        .articles(query.order.into(), query.page)
        .await
        .map_err(AppError::engine)?;

    let items: Vec<ArticleItem> = articles.into_iter().map(ArticleItem::from).collect();

    Ok(Json(items))
}

#[debug_handler]
async fn vote_article(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<VotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = state
        .engine
        .vote_article(&payload.user, &article_key(id), Utc::now())
        .await
        .map_err(AppError::engine)?;

    match outcome {
        VoteOutcome::Applied => Ok(Json(VoteResponse {
            status: VoteStatus::Applied,
        })),
        VoteOutcome::Rejected(reason) => Err(AppError::vote_rejected(reason)),
    }
}

#[debug_handler]
async fn add_groups(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<GroupsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .engine
        .add_to_groups(&article_key(id), &payload.groups)
        .await
        .map_err(AppError::engine)?;

    Ok(StatusCode::OK)
}

/// Returns 200 OK even if the article was in none of the groups (idempotent).
#[debug_handler]
async fn remove_groups(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<GroupsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .engine
        .remove_from_groups(&article_key(id), &payload.groups)
        .await
        .map_err(AppError::engine)?;

    Ok(StatusCode::OK)
}
