//! Topic-based event bus for runtime events.
//!
//! The battle worker publishes every applied diff on [`Topic::Diff`], making
//! the bus the diff stream sink for renderers, replay writers and peers.
//! Consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{DiffEvent, PlannerEvent, TurnEvent};
