//! File-backed replay storage.

mod log;
mod replay;

pub use log::FrameLog;
pub use replay::FileReplayLog;

use battle_core::BattleDiff;

/// Append-only log of battle diffs
pub type FileDiffLog = FrameLog<BattleDiff>;
