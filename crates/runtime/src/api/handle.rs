//! Cloneable façade for issuing commands to the battle worker.
//!
//! [`BattleHandle`] hides channel plumbing and offers async helpers for
//! acting on the live battle or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use battle_core::{Action, ActionOutcome, Battle, BattleDiff};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::planner::Maneuver;
use crate::workers::{BattleSnapshot, Command, ManeuverOutcome};

/// Client-facing handle to the live battle
#[derive(Clone)]
pub struct BattleHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl BattleHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Apply an action of the playing ship
    pub async fn apply_action(&self, action: Action) -> Result<ActionOutcome> {
        self.request(|reply| Command::ApplyAction { action, reply })
            .await?
    }

    /// Apply a planned maneuver, unless the battle moved on since it was planned
    pub async fn apply_maneuver(&self, maneuver: Maneuver) -> Result<ManeuverOutcome> {
        self.request(|reply| Command::ApplyManeuver { maneuver, reply })
            .await?
    }

    /// Undo the last action; returns the number of reverted diffs
    pub async fn revert_one_action(&self) -> Result<usize> {
        self.request(|reply| Command::RevertOneAction { reply })
            .await?
    }

    /// Query the live battle (read-only clone)
    pub async fn query_battle(&self) -> Result<Battle> {
        self.request(|reply| Command::QueryBattle { reply }).await
    }

    /// Diffs logged from `index` on
    ///
    /// A subscriber that lagged behind the [`Topic::Diff`] stream uses this
    /// to catch up from the last index it saw.
    pub async fn diffs_since(&self, index: usize) -> Result<Vec<BattleDiff>> {
        self.request(|reply| Command::DiffsSince { index, reply })
            .await
    }

    /// Encoded battle and generator state, as sent to the planner
    pub async fn snapshot(&self) -> Result<BattleSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut diffs = handle.subscribe(Topic::Diff);
    /// while let Ok(Event::Diff(event)) = diffs.recv().await {
    ///     // mirror the battle
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
