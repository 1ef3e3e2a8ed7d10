//! Error types raised by repository implementations.

use thiserror::Error;

use battle_core::IntegrityError;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("log already exists: {0}")]
    LogAlreadyExists(String),

    #[error("replay has no initial battle")]
    MissingInitialBattle,

    #[error("replay diverged at diff {index}")]
    Replay {
        index: usize,
        #[source]
        source: IntegrityError,
    },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
