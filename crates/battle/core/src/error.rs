//! Common error infrastructure for battle-core.
//!
//! This module provides shared types and traits used across all error types in battle-core.
//! Domain-specific errors (e.g., [`ActionRejection`](crate::action::ActionRejection),
//! [`IntegrityError`](crate::diff::IntegrityError)) are defined in their respective
//! modules alongside the operations that raise them.
//!
//! # Design Principles
//!
//! - **Two classes**: rejected input is recoverable and never fatal; integrity
//!   violations mean a diff was replayed against the wrong battle or a bug broke
//!   the inverse law, and are fatal
//! - **Rich Context**: Errors can carry the ship and cycle for diagnostics
//! - **Severity Classification**: Errors are categorized for recovery strategies

use crate::state::ShipId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// Errors are classified by their recoverability and expected handling:
/// - **Recoverable**: Temporary conditions that may succeed with another action or later
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Battle state can no longer be trusted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with an alternative action.
    ///
    /// Examples: not enough power, equipment overheated
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: target out of range, self-targeted weapon
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: battle checks did not settle
    Internal,

    /// Fatal error - battle state corrupted, cannot continue.
    ///
    /// Examples: diff references an unknown ship, revert of a diff never applied
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }

    /// Returns true if this error indicates a bug or a desynchronized battle.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Ship involved in the failure (if applicable).
    pub ship: Option<ShipId>,

    /// Battle cycle at the time of error.
    pub cycle: u32,

    /// Optional static message providing additional context.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub message: Option<&'static str>,
}

impl ErrorContext {
    /// Creates a new error context for the given cycle.
    #[must_use]
    pub const fn new(cycle: u32) -> Self {
        Self {
            ship: None,
            cycle,
            message: None,
        }
    }

    /// Attaches a ship to this context (builder pattern).
    #[must_use]
    pub const fn with_ship(mut self, ship: ShipId) -> Self {
        self.ship = Some(ship);
        self
    }

    /// Attaches a static message to this context (builder pattern).
    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all battle-core errors.
///
/// This trait provides a uniform interface for error classification and context
/// retrieval across all error types in the crate.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
