//! Rebuilding a battle from a recorded diff stream.

use battle_core::{Battle, BattleDiff};

use super::{ReplayRepository, RepositoryError, Result};

/// Applies `diffs` in order to `battle`.
///
/// A peer holding the initial battle catches up with the live one this way.
/// Stops at the first diff the battle refuses.
pub fn replay_into(battle: &mut Battle, diffs: &[BattleDiff]) -> Result<()> {
    for (index, diff) in diffs.iter().enumerate() {
        diff.apply(battle)
            .map_err(|source| RepositoryError::Replay { index, source })?;
    }
    tracing::debug!(target: "runtime::repository", diffs = diffs.len(), "diffs replayed");
    Ok(())
}

/// Initial battle of `repository` with every recorded diff applied.
pub fn load_replay(repository: &dyn ReplayRepository) -> Result<Battle> {
    let mut battle = repository
        .load_initial()?
        .ok_or(RepositoryError::MissingInitialBattle)?;
    replay_into(&mut battle, &repository.read_all()?)?;
    Ok(battle)
}

#[cfg(test)]
mod tests {
    use battle_core::{Action, BattleConfig, BattleEngine, DiffLog, PcgRng, ShipId};

    use super::*;
    use crate::blueprints::{Blueprint, skirmish};
    use crate::repository::InMemoryReplayLog;

    fn started() -> (Battle, PcgRng) {
        let mut rng = PcgRng::from_seed(7);
        let mut battle = skirmish(
            BattleConfig::default(),
            2,
            &[Blueprint::Frigate, Blueprint::Destroyer],
        )
        .unwrap();
        battle.start(&mut rng).unwrap();
        (battle, rng)
    }

    #[test]
    fn replayed_battle_matches_the_live_one() {
        let (mut live, mut rng) = started();
        let mut log = InMemoryReplayLog::new("replay");
        log.save_initial(&live).unwrap();

        let mut diffs = DiffLog::new();
        for _ in 0..6 {
            let ship = live.playing_ship_id().unwrap();
            BattleEngine::new(&mut live, &mut diffs, &mut rng)
                .apply_action(&Action::end_turn(ship))
                .unwrap();
        }
        for diff in diffs.as_slice() {
            log.append(diff).unwrap();
        }

        let replayed = load_replay(&log).unwrap();
        assert_eq!(replayed, live);
        assert_eq!(
            replayed.state_digest().unwrap(),
            live.state_digest().unwrap()
        );
    }

    #[test]
    fn diverging_stream_reports_its_index() {
        let (mut battle, _) = started();
        let diffs = vec![BattleDiff::ShipValue {
            ship: ShipId(99),
            value: battle_core::ValueKind::Hull,
            delta: -1,
        }];
        assert!(matches!(
            replay_into(&mut battle, &diffs),
            Err(RepositoryError::Replay { index: 0, .. })
        ));
    }

    #[test]
    fn replay_without_initial_battle_fails() {
        let log = InMemoryReplayLog::new("empty");
        assert!(matches!(
            load_replay(&log),
            Err(RepositoryError::MissingInitialBattle)
        ));
    }
}
