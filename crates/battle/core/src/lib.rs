//! Deterministic tactical space battle rules.
//!
//! `battle-core` defines the canonical battle state, the actions ships can
//! take and the effects those actions apply. A started battle only changes
//! through [`diff::BattleDiff`]s, produced and applied by
//! [`engine::BattleEngine`] and recorded in a [`diff::DiffLog`], so any
//! sequence of actions can be replayed or undone exactly.
//!
//! The crate is synchronous and free of I/O; randomness is injected through
//! [`rng::RandomSource`].
pub mod action;
pub mod config;
pub mod diff;
pub mod effect;
pub mod engine;
pub mod error;
pub mod rng;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{
    Action, ActionContext, ActionFilter, ActionKind, ActionRejection, ActionSource,
    ActionTransition, DeployDroneAction, EndTurnAction, MoveAction, ResolutionStep, ToggleAction,
    TriggerAction, VigilanceAction,
};
pub use config::BattleConfig;
pub use diff::{BattleDiff, DiffLog, DiffLogClient, IntegrityError};
pub use effect::{ActiveEffect, EffectContext, EffectKey, EffectKind, EffectSource};
pub use engine::{
    ActionOutcome, ActionPhase, BattleEngine, CheckedAction, ExecuteError, PhaseError,
};
pub use error::{BattleError, ErrorContext, ErrorSeverity};
#[cfg(feature = "serde")]
pub use state::SnapshotError;
pub use rng::{PcgRng, RandomSource, SkewedRandom, compute_seed};
pub use state::{
    ArenaCircleArea, ArenaLocation, ArenaLocationAngle, AttributeKind, Battle, BattleOutcome,
    BattleSetupError, BattleStatus, Drone, DroneId, Equipment, EquipmentId, Fleet, FleetId,
    PlayerKind, Ship, ShipId, SlotKind, Target, ValueKind,
};
