//! Randomized reversibility laws over whole action sequences.

use proptest::prelude::*;

use super::BattleEngine;
use crate::action::{
    Action, ActionFilter, DeployDroneAction, ToggleAction, TriggerAction, VigilanceAction,
};
use crate::diff::{DiffLog, DiffLogClient, IntegrityError};
use crate::effect::{
    AttributeEffect, DamageEffect, RepelEffect, StickyEffect, ValueEffect, ValueTransferEffect,
};
use crate::rng::PcgRng;
use crate::state::{AttributeKind, Battle, EquipmentId, ShipId, Target, ValueKind};
use crate::testing::{SHIP_A, SHIP_B, add_action, add_engine, add_ship, add_weapon, started_battle};

#[derive(Clone, Debug)]
enum Step {
    EndTurn,
    /// Shots pick the n-th alive enemy, modulo their count.
    Fire(usize),
    Sticky(usize),
    Drain(usize),
    Move(f64, f64),
    Toggle,
    Watch,
    Deploy(f64, f64),
    RepelDrone(f64, f64),
}

fn arb_step() -> impl Strategy<Value = Step> {
    let coord = || (50.0f64..900.0).prop_map(|value| value.round());
    prop_oneof![
        3 => Just(Step::EndTurn),
        3 => (0usize..4).prop_map(Step::Fire),
        1 => (0usize..4).prop_map(Step::Sticky),
        1 => (0usize..4).prop_map(Step::Drain),
        2 => (coord(), coord()).prop_map(|(x, y)| Step::Move(x, y)),
        1 => Just(Step::Toggle),
        1 => Just(Step::Watch),
        1 => (coord(), coord()).prop_map(|(x, y)| Step::Deploy(x, y)),
        1 => (coord(), coord()).prop_map(|(x, y)| Step::RepelDrone(x, y)),
    ]
}

/// Every ship gets the same loadout, so equipment ids match.
struct Loadout {
    weapon: EquipmentId,
    engine: EquipmentId,
    field: EquipmentId,
    bay: EquipmentId,
    sticky: EquipmentId,
    drain: EquipmentId,
    watch: EquipmentId,
    pusher_bay: EquipmentId,
}

/// A and B, plus a wingman in each fleet when `wingmen` is set, so that a
/// ship can die while its fleet keeps playing.
fn armed_battle(wingmen: bool) -> (Battle, Loadout) {
    let mut battle = started_battle();
    let mut ships = vec![SHIP_A, SHIP_B];
    if wingmen {
        add_ship(&mut battle, ShipId(3), 1, 100.0, 500.0);
        add_ship(&mut battle, ShipId(4), 2, 500.0, 500.0);
        battle.play_order.extend([ShipId(3), ShipId(4)]);
        ships.extend([ShipId(3), ShipId(4)]);
    }

    let mut loadout = None;
    for ship in ships {
        let weapon = add_weapon(&mut battle, ship, 30, 1000.0);
        let engine = add_engine(&mut battle, ship, 40.0);
        let field = add_action(
            &mut battle,
            ship,
            ToggleAction::new(2, 600.0)
                .with_effect(AttributeEffect::new(AttributeKind::Precision, 1)),
        );
        let bay = add_action(
            &mut battle,
            ship,
            DeployDroneAction::new(3, 300.0, 150.0, 2).with_effect(DamageEffect::new(4, 2)),
        );
        let sticky = add_action(
            &mut battle,
            ship,
            TriggerAction::new(2, 1000.0).with_effect(StickyEffect::new(
                ValueEffect::on_turn_start(ValueKind::Hull, -15),
                2,
            )),
        );
        let drain = add_action(
            &mut battle,
            ship,
            TriggerAction::new(1, 1000.0)
                .with_effect(ValueTransferEffect::new(ValueKind::Power, -2)),
        );
        let watch = add_action(
            &mut battle,
            ship,
            VigilanceAction::new(
                ToggleAction::new(2, 250.0).with_filter(ActionFilter::Enemies),
                2,
                vec![DamageEffect::new(8, 0).into()],
            ),
        );
        let pusher_bay = add_action(
            &mut battle,
            ship,
            DeployDroneAction::new(2, 300.0, 120.0, 2).with_effect(RepelEffect::new(60.0)),
        );
        loadout = Some(Loadout {
            weapon,
            engine,
            field,
            bay,
            sticky,
            drain,
            watch,
            pusher_bay,
        });
    }
    (battle, loadout.expect("loadout"))
}

fn action_for(battle: &Battle, loadout: &Loadout, step: &Step) -> Option<Action> {
    let ship = battle.playing_ship_id()?;
    let fleet = battle.ship(ship)?.fleet;
    let enemy = |pick: usize| {
        let enemies: Vec<ShipId> = battle.enemies_of(fleet).map(|enemy| enemy.id).collect();
        enemies.get(pick % enemies.len().max(1)).copied()
    };
    Some(match *step {
        Step::EndTurn => Action::end_turn(ship),
        Step::Fire(pick) => Action::equipment(ship, loadout.weapon, Target::Ship(enemy(pick)?)),
        Step::Sticky(pick) => Action::equipment(ship, loadout.sticky, Target::Ship(enemy(pick)?)),
        Step::Drain(pick) => Action::equipment(ship, loadout.drain, Target::Ship(enemy(pick)?)),
        Step::Move(x, y) => Action::equipment(ship, loadout.engine, Target::location(x, y)),
        Step::Toggle => Action::equipment(ship, loadout.field, Target::Ship(ship)),
        Step::Watch => Action::equipment(ship, loadout.watch, Target::Ship(ship)),
        Step::Deploy(x, y) => Action::equipment(ship, loadout.bay, Target::location(x, y)),
        Step::RepelDrone(x, y) => {
            Action::equipment(ship, loadout.pusher_bay, Target::location(x, y))
        }
    })
}

/// Plays the steps, skipping rejected ones. Returns the number of actions
/// actually applied.
fn play(
    battle: &mut Battle,
    log: &mut DiffLog,
    seed: u64,
    steps: &[Step],
    loadout: &Loadout,
) -> usize {
    let mut rng = PcgRng::from_seed(seed);
    let mut applied = 0;
    for step in steps {
        let Some(action) = action_for(battle, loadout, step) else {
            break;
        };
        let mut engine = BattleEngine::new(battle, log, &mut rng);
        match engine.apply_action(&action) {
            Ok(outcome) => {
                applied += 1;
                if outcome.battle_ended {
                    break;
                }
            }
            Err(err) => assert!(err.rejection().is_some(), "integrity failure: {err}"),
        }
    }
    applied
}

/// Plays the steps then undoes every applied action, one at a time.
fn assert_undo_restores_start(seed: u64, steps: &[Step], wingmen: bool) {
    let (mut battle, loadout) = armed_battle(wingmen);
    let initial = battle.clone();
    let mut log = DiffLog::new();
    let applied = play(&mut battle, &mut log, seed, steps, &loadout);

    let mut rng = PcgRng::from_seed(seed);
    let mut engine = BattleEngine::new(&mut battle, &mut log, &mut rng);
    for _ in 0..applied {
        engine.revert_one_action().expect("revert");
    }
    assert_eq!(engine.revert_one_action(), Err(IntegrityError::NothingToRevert));
    assert!(log.is_empty());
    assert_eq!(battle, initial);
}

#[test]
fn lethal_move_into_own_drone_is_undone_at_once() {
    let steps = [
        Step::Deploy(393.0, 50.0),
        Step::EndTurn,
        Step::EndTurn,
        Step::Fire(0),
        Step::Fire(0),
        Step::Fire(0),
        Step::Move(753.0, 50.0),
        Step::EndTurn,
        Step::Deploy(50.0, 720.0),
        Step::Move(50.0, 888.0),
    ];
    assert_undo_restores_start(649_779_242_667_275_989, &steps, false);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reverting_every_action_restores_the_start(
        seed in any::<u64>(),
        wingmen in any::<bool>(),
        steps in proptest::collection::vec(arb_step(), 0..40),
    ) {
        assert_undo_restores_start(seed, &steps, wingmen);
    }

    #[test]
    fn the_log_replays_and_rewinds(
        seed in any::<u64>(),
        wingmen in any::<bool>(),
        steps in proptest::collection::vec(arb_step(), 0..40),
    ) {
        let (mut battle, loadout) = armed_battle(wingmen);
        let initial = battle.clone();
        let mut log = DiffLog::new();
        play(&mut battle, &mut log, seed, &steps, &loadout);

        let mut replayed = battle.clone();
        let mut cursor = DiffLogClient::new(&mut replayed, &mut log);
        cursor.jump_to_start().expect("rewind");
        prop_assert_eq!(cursor.battle(), &initial);
        cursor.jump_to_end().expect("replay");
        prop_assert_eq!(cursor.battle(), &battle);
    }

    #[test]
    fn same_seed_same_battle(
        seed in any::<u64>(),
        steps in proptest::collection::vec(arb_step(), 0..30),
    ) {
        let (mut first, loadout) = armed_battle(true);
        let mut second = first.clone();
        let (mut first_log, mut second_log) = (DiffLog::new(), DiffLog::new());
        play(&mut first, &mut first_log, seed, &steps, &loadout);
        play(&mut second, &mut second_log, seed, &steps, &loadout);
        prop_assert_eq!(first_log.as_slice(), second_log.as_slice());
        prop_assert_eq!(first, second);
    }
}
