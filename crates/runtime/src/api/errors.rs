//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, the planner and the
//! battle engine so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use battle_core::{BattleSetupError, ExecuteError, FleetId, SnapshotError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("battle worker command channel closed")]
    CommandChannelClosed,

    #[error("battle worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("battle setup failed")]
    Setup(#[from] BattleSetupError),

    #[error("snapshot encoding failed")]
    Snapshot(#[from] SnapshotError),

    #[error("battle already ended")]
    BattleEnded,

    #[error("no ship is playing")]
    NoPlayingShip,

    #[error("planner worker unavailable")]
    PlannerUnavailable,

    #[error("no action provider for fleet {fleet}")]
    ProviderNotSet { fleet: FleetId },

    #[error("runtime requires a battle before building")]
    MissingBattle,
}
