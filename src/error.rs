use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::types::Phase;

/// What kind of entity a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    Game,
    Player,
    Hint,
    Language,
}

impl std::fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Game => write!(f, "game"),
            Self::Player => write!(f, "player"),
            Self::Hint => write!(f, "hint"),
            Self::Language => write!(f, "language"),
        }
    }
}

/// Every way a game operation can be refused.
///
/// A failed operation never leaves partial state behind: the session store
/// discards the working copy and the previous snapshot stays published.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("cannot {action} while the game is in phase {phase}")]
    InvalidPhase { action: &'static str, phase: Phase },
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: NotFoundKind, id: String },
    #[error("capacity exceeded: {0}")]
    Capacity(String),
    #[error("not enough words for language '{language}': {needed} needed, {available} available")]
    InsufficientWords {
        language: String,
        needed: usize,
        available: usize,
    },
    #[error("not enough players: {required} required, {joined} joined")]
    NotEnoughPlayers { required: usize, joined: usize },
    #[error("game {0} stopped accepting commands")]
    Concurrency(String),
}

impl GameError {
    pub fn invalid_phase(action: &'static str, phase: Phase) -> Self {
        Self::InvalidPhase { action, phase }
    }

    pub fn not_authorized(detail: impl Into<String>) -> Self {
        Self::NotAuthorized(detail.into())
    }

    pub fn not_found(kind: NotFoundKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn capacity(detail: impl Into<String>) -> Self {
        Self::Capacity(detail.into())
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPhase { .. } => "INVALID_PHASE",
            Self::NotAuthorized(_) => "NOT_AUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Capacity(_) => "CAPACITY",
            Self::InsufficientWords { .. } => "INSUFFICIENT_WORDS",
            Self::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            Self::Concurrency(_) => "CONCURRENCY",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPhase { .. } => StatusCode::CONFLICT,
            Self::NotAuthorized(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Capacity(_) | Self::InsufficientWords { .. } | Self::NotEnoughPlayers { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Concurrency(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Failures while reading the config directory at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no word lists found in {0}")]
    NoWordLists(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            GameError::invalid_phase("submit a guess", Phase::HintWriting).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(GameError::not_authorized("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(
            GameError::not_found(NotFoundKind::Game, "g1").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GameError::NotEnoughPlayers { required: 3, joined: 2 }.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            GameError::Concurrency("g1".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn messages_name_the_phase_and_entity() {
        let err = GameError::invalid_phase("submit a hint", Phase::End);
        assert_eq!(err.to_string(), "cannot submit a hint while the game is in phase END");

        let err = GameError::not_found(NotFoundKind::Hint, "h-42");
        assert_eq!(err.to_string(), "hint not found: h-42");
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
