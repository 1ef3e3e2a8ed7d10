//! Runtime orchestration for deterministic space battles.
//!
//! This crate wires the battle core, the AI planner, the event bus and the
//! replay repositories into worker tasks. Consumers embed [`BattleRuntime`]
//! to run a battle, subscribe to its diff stream, and act on it through
//! [`BattleHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus (diff stream sink)
//! - [`planner`] is the greedy tactical AI
//! - [`repository`] persists replays
//! - [`blueprints`] builds ready-made ships for skirmishes
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod blueprints;
pub mod events;
pub mod planner;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{
    ActionProvider, BattleHandle, EndTurnProvider, PlannerProvider, Result, RuntimeError,
};
pub use blueprints::{Blueprint, BlueprintError, skirmish};
pub use events::{DiffEvent, Event, EventBus, PlannerEvent, Topic, TurnEvent};
pub use planner::{Maneuver, Personality, PlannerConfig, ScoredManeuver, TacticalPlanner};
pub use repository::{
    FileReplayLog, InMemoryReplayLog, ReplayRepository, RepositoryError, load_replay, replay_into,
};
pub use runtime::{BattleRuntime, BattleRuntimeBuilder, RunSummary, RuntimeConfig};
pub use workers::{BattleSnapshot, ManeuverOutcome, PlanResponse};
