//! Replay persistence.
//!
//! A replay is the started battle plus the append-only stream of diffs
//! applied to it. Replaying the stream on the initial battle rebuilds the
//! live state bit for bit.

mod error;
mod file;
mod memory;
mod replay;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::{FileDiffLog, FileReplayLog, FrameLog};
pub use memory::InMemoryReplayLog;
pub use replay::{load_replay, replay_into};
pub use traits::ReplayRepository;
