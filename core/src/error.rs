use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown game '{id}'")]
    UnknownGame { id: String },

    #[error("Game '{id}' is disabled")]
    GameDisabled { id: String },

    #[error("No game loaded")]
    NoActiveGame,

    #[error("Selection for '{game}' is incomplete")]
    SelectionIncomplete { game: String },

    #[error("Selection for '{got}' passed to the '{expected}' engine")]
    SelectionMismatch { expected: String, got: String },

    #[error("Invalid config for '{game}': {reason}")]
    InvalidConfig { game: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
