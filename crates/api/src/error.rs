use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::engine::{EngineError, VoteRejection};

#[derive(Debug)]
pub enum AppError {
    /// Internal errors - logged but return generic 500 to user
    Internal(anyhow::Error),
    /// User-facing errors - message is safe to show
    External(StatusCode, &'static str),
    /// Validation errors - safe to show
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Internal(err) => {
                tracing::error!("internal error: {:?}", err);

                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::External(status, msg) => (status, msg).into_response(),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

impl AppError {
    /// Map engine failures onto responses. Store trouble stays internal.
    pub fn engine(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { .. } => {
                AppError::External(StatusCode::NOT_FOUND, "Article not found")
            }
            EngineError::InvalidArticleKey(_)
            | EngineError::InvalidGroup(_)
            | EngineError::InvalidPage(_) => AppError::Validation(err.to_string()),
            EngineError::Malformed { .. }
            | EngineError::Store { .. }
            | EngineError::PartialCommit { .. } => AppError::Internal(err.into()),
        }
    }

    pub fn vote_rejected(reason: VoteRejection) -> Self {
        match reason {
            VoteRejection::UnknownArticle => {
                AppError::External(StatusCode::NOT_FOUND, "Article not found")
            }
            VoteRejection::WindowClosed => {
                AppError::External(StatusCode::FORBIDDEN, "Voting is closed for this article")
            }
            VoteRejection::Duplicate => {
                AppError::External(StatusCode::CONFLICT, "Already voted on this article")
            }
        }
    }
}
