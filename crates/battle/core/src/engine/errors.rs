//! Error types for the action execution pipeline.

use crate::action::ActionRejection;
use crate::diff::IntegrityError;
use crate::error::{BattleError, ErrorContext, ErrorSeverity};

/// Identifies which stage of the action pipeline turned a request down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionPhase {
    Availability,
    Targeting,
    Resolution,
}

impl ActionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionPhase::Availability => "availability",
            ActionPhase::Targeting => "targeting",
            ActionPhase::Resolution => "resolution",
        }
    }
}

/// Associates a pipeline phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseError<E> {
    pub phase: ActionPhase,
    pub error: E,
}

impl<E> PhaseError<E> {
    pub fn new(phase: ActionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for PhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for PhaseError<E> {}

/// Errors surfaced while executing an action through the battle engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecuteError {
    /// The request was turned down; the battle is unchanged.
    #[error("action rejected: {error}")]
    Rejected {
        error: PhaseError<ActionRejection>,
        context: ErrorContext,
    },

    /// A diff could not be applied; the battle can no longer be trusted.
    #[error("integrity violation: {0}")]
    Integrity(#[from] IntegrityError),
}

impl ExecuteError {
    /// The rejection, if the battle was left untouched.
    pub fn rejection(&self) -> Option<&ActionRejection> {
        match self {
            Self::Rejected { error, .. } => Some(&error.error),
            Self::Integrity(_) => None,
        }
    }
}

impl BattleError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Rejected { error, .. } => error.error.severity(),
            Self::Integrity(error) => error.severity(),
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Rejected { context, .. } => Some(context),
            Self::Integrity(_) => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected { error, .. } => error.error.error_code(),
            Self::Integrity(error) => error.error_code(),
        }
    }
}
