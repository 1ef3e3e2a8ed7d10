//! Worker tasks that back the runtime orchestration.
//!
//! The battle worker owns the live battle and executes commands, while the
//! planner worker answers AI planning requests off the battle's task.

mod battle;
mod planner;

pub use battle::{BattleSnapshot, BattleWorker, Command, ManeuverOutcome};
pub use planner::{PlanRequest, PlanResponse, PlannerWorker};
