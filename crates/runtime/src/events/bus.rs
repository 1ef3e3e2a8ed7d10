//! Topic-based event bus implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{DiffEvent, PlannerEvent, TurnEvent};

/// Topics for event routing
#[derive(
    Debug,
    Clone,
    Copy,
    Hash,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    /// Every diff applied to (or reverted from) the live battle
    Diff,
    /// Turn changes, rejected actions and battle end
    Turn,
    /// Planner decisions
    Planner,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Diff(DiffEvent),
    Turn(TurnEvent),
    Planner(PlannerEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Diff(_) => Topic::Diff,
            Event::Turn(_) => Topic::Turn,
            Event::Planner(_) => Topic::Planner,
        }
    }
}

impl From<DiffEvent> for Event {
    fn from(event: DiffEvent) -> Self {
        Event::Diff(event)
    }
}

impl From<TurnEvent> for Event {
    fn from(event: TurnEvent) -> Self {
        Event::Turn(event)
    }
}

impl From<PlannerEvent> for Event {
    fn from(event: PlannerEvent) -> Self {
        Event::Planner(event)
    }
}

struct Channels {
    diff: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
    planner: broadcast::Sender<Event>,
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels are created up front, one per topic,
/// so publishing never waits.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 100;

    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                diff: broadcast::channel(capacity).0,
                turn: broadcast::channel(capacity).0,
                planner: broadcast::channel(capacity).0,
            }),
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Diff => &self.channels.diff,
            Topic::Turn => &self.channels.turn,
            Topic::Planner => &self.channels.planner,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", %topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
