//! Repository contract for persisted battle replays.

use battle_core::{Battle, BattleDiff};

use super::Result;

/// Append-only replay of one battle: the started battle, then every diff
/// applied to it, in log order.
///
/// Undone actions are recorded as their reversed diffs rather than erased,
/// so the stream replays forward from the initial battle at any point.
pub trait ReplayRepository: Send {
    /// Store the battle the diffs apply to. Called once, before any append.
    fn save_initial(&mut self, battle: &Battle) -> Result<()>;

    /// Battle stored by [`save_initial`](Self::save_initial), if any.
    fn load_initial(&self) -> Result<Option<Battle>>;

    /// Append a diff; returns its position in the stream.
    fn append(&mut self, diff: &BattleDiff) -> Result<u64>;

    /// Every diff recorded so far.
    fn read_all(&self) -> Result<Vec<BattleDiff>>;

    /// Flush buffered writes to durable storage.
    fn flush(&mut self) -> Result<()>;

    /// Number of diffs recorded.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifier of the replay (directory or session name).
    fn session_id(&self) -> &str;
}
