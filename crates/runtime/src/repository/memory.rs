//! In-memory replay log.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use battle_core::{Battle, BattleDiff};

use super::{ReplayRepository, RepositoryError, Result};

#[derive(Default)]
struct Recorded {
    initial: Option<Battle>,
    diffs: Vec<BattleDiff>,
}

/// Replay log kept in memory, for tests and short-lived battles.
///
/// Clones share the same storage, so a caller can keep a clone to inspect
/// what a worker recorded.
#[derive(Clone)]
pub struct InMemoryReplayLog {
    session_id: String,
    recorded: Arc<Mutex<Recorded>>,
}

impl InMemoryReplayLog {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            recorded: Arc::default(),
        }
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReplayRepository for InMemoryReplayLog {
    fn save_initial(&mut self, battle: &Battle) -> Result<()> {
        let mut recorded = self.recorded();
        if recorded.initial.is_some() {
            return Err(RepositoryError::LogAlreadyExists(self.session_id.clone()));
        }
        recorded.initial = Some(battle.clone());
        Ok(())
    }

    fn load_initial(&self) -> Result<Option<Battle>> {
        Ok(self.recorded().initial.clone())
    }

    fn append(&mut self, diff: &BattleDiff) -> Result<u64> {
        let mut recorded = self.recorded();
        recorded.diffs.push(diff.clone());
        Ok(recorded.diffs.len() as u64 - 1)
    }

    fn read_all(&self) -> Result<Vec<BattleDiff>> {
        Ok(self.recorded().diffs.clone())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn len(&self) -> u64 {
        self.recorded().diffs.len() as u64
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BattleConfig, ShipId, ValueKind};

    #[test]
    fn clones_share_the_recording() {
        let mut log = InMemoryReplayLog::new("mem");
        let observer = log.clone();

        log.save_initial(&Battle::new(BattleConfig::default()))
            .unwrap();
        let diff = BattleDiff::ShipValue {
            ship: ShipId(1),
            value: ValueKind::Hull,
            delta: -5,
        };
        assert_eq!(log.append(&diff).unwrap(), 0);

        assert!(observer.load_initial().unwrap().is_some());
        assert_eq!(observer.read_all().unwrap(), vec![diff]);
        assert_eq!(observer.len(), 1);
    }

    #[test]
    fn initial_battle_is_saved_once() {
        let mut log = InMemoryReplayLog::new("mem");
        let battle = Battle::new(BattleConfig::default());
        log.save_initial(&battle).unwrap();
        assert!(matches!(
            log.save_initial(&battle),
            Err(RepositoryError::LogAlreadyExists(_))
        ));
    }
}
