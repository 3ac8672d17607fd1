use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use uuid::Uuid;

use crate::models::common::ApiResponse;

pub type BingoResult<T> = Result<T, BingoError>;

#[derive(Debug, thiserror::Error)]
pub enum BingoError {
    /// The non-duplication rule could not be satisfied from the templates and rosters available.
    #[error("catalog exhausted for category {category_id} after {attempts} attempts")]
    CatalogExhausted { category_id: Uuid, attempts: u32 },

    #[error("no rerolls left")]
    NoRerollsLeft,

    #[error("upstream fetch failed for game {api_identifier}: {message}")]
    UpstreamFetchFailed { api_identifier: String, message: String },

    #[error("persistence conflict: {0}")]
    PersistenceConflict(String),

    #[error("bingo evaluation failed for player {player_id} in game {game_id}: {message}")]
    PatternEvaluationFailed { player_id: Uuid, game_id: Uuid, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BingoError {
    pub fn upstream(api_identifier: impl Into<String>, message: impl ToString) -> Self {
        Self::UpstreamFetchFailed {
            api_identifier: api_identifier.into(),
            message: message.to_string(),
        }
    }

    /// Errors a single retry with a fresh read can recover from.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::PersistenceConflict(_))
    }
}

impl ResponseError for BingoError {
    fn status_code(&self) -> StatusCode {
        match self {
            BingoError::NotFound(_) => StatusCode::NOT_FOUND,
            BingoError::InvalidData(_) => StatusCode::BAD_REQUEST,
            BingoError::NoRerollsLeft | BingoError::PersistenceConflict(_) => StatusCode::CONFLICT,
            BingoError::CatalogExhausted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BingoError::UpstreamFetchFailed { .. } => StatusCode::BAD_GATEWAY,
            BingoError::PatternEvaluationFailed { .. } | BingoError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Never leak driver details to clients
            BingoError::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(message))
    }
}
