//! Shared battle fixtures for unit tests.
//!
//! Two single-ship fleets facing each other on a horizontal line:
//! A (fleet 1) at (100, 100), B (fleet 2) at (500, 100). Every ship has
//! 100 hull, no shield and 10 power.
use crate::action::{ActionKind, MoveAction, TriggerAction};
use crate::effect::{AttributeEffect, DamageEffect};
use crate::state::{
    AttributeKind, Battle, BattleStatus, Equipment, EquipmentId, FleetId, PlayerKind, Ship,
    ShipId, SlotKind,
};

pub const SHIP_A: ShipId = ShipId(1);
pub const SHIP_B: ShipId = ShipId(2);

fn base_ship(id: ShipId, fleet: FleetId, x: f64, y: f64, maneuvrability: i64) -> Ship {
    let mut ship = Ship::new(id, fleet, format!("ship-{}", id.0)).at(x, y, 0.0);
    ship.equipment = vec![
        Equipment::new(EquipmentId(1), "hull", SlotKind::Hull)
            .with_effect(AttributeEffect::new(AttributeKind::HullCapacity, 100)),
        Equipment::new(EquipmentId(2), "core", SlotKind::Power)
            .with_effect(AttributeEffect::new(AttributeKind::PowerCapacity, 10)),
        Equipment::new(EquipmentId(3), "gyro", SlotKind::Engine).with_effect(
            AttributeEffect::new(AttributeKind::Maneuvrability, maneuvrability),
        ),
    ];
    ship.restore_initial_state();
    ship
}

pub fn add_fleets(battle: &mut Battle) {
    battle
        .add_fleet(FleetId(1), "blue", PlayerKind::Human)
        .expect("fleet 1");
    battle
        .add_fleet(FleetId(2), "red", PlayerKind::Ai)
        .expect("fleet 2");
}

/// Fleets and ships assembled, not started. A has maneuvrability 5, B 10.
pub fn unstarted_battle() -> Battle {
    let mut battle = Battle::default();
    add_fleets(&mut battle);
    battle
        .add_ship(base_ship(SHIP_A, FleetId(1), 100.0, 100.0, 5))
        .expect("ship A");
    battle
        .add_ship(base_ship(SHIP_B, FleetId(2), 500.0, 100.0, 10))
        .expect("ship B");
    battle
}

/// A battle in progress with A playing, without placement nor initiative.
pub fn started_battle() -> Battle {
    let mut battle = unstarted_battle();
    start_in_fleet_order(&mut battle);
    battle
}

/// Starts the battle keeping ship locations, playing in fleet order.
pub fn start_in_fleet_order(battle: &mut Battle) {
    for ship in &mut battle.ships {
        ship.restore_initial_state();
    }
    battle.play_order = battle
        .fleets
        .iter()
        .flat_map(|fleet| fleet.ships.iter().copied())
        .collect();
    battle.playing_index = 0;
    battle.cycle = 1;
    battle.status = BattleStatus::InProgress;
    battle.outcome = None;
}

/// Adds a ship to a fleet, whatever the battle status.
///
/// The ship is not inserted in the play order.
pub fn add_ship(battle: &mut Battle, id: ShipId, fleet: u32, x: f64, y: f64) {
    let fleet = FleetId(fleet);
    battle
        .fleets
        .iter_mut()
        .find(|candidate| candidate.id == fleet)
        .expect("fleet")
        .ships
        .push(id);
    battle.ships.push(base_ship(id, fleet, x, y, 5));
}

/// Mounts equipment carrying `action`, bypassing slot checks.
pub fn add_action(battle: &mut Battle, ship: ShipId, action: impl Into<ActionKind>) -> EquipmentId {
    let ship = battle.ship_mut(ship).expect("ship");
    let id = EquipmentId(
        ship.equipment
            .iter()
            .map(|equipment| equipment.id.0)
            .max()
            .unwrap_or(0)
            + 1,
    );
    ship.equipment
        .push(Equipment::new(id, format!("device-{}", id.0), SlotKind::Weapon).with_action(action));
    id
}

pub fn add_trigger(battle: &mut Battle, ship: ShipId, trigger: TriggerAction) -> EquipmentId {
    add_action(battle, ship, trigger)
}

/// A single target weapon costing 1 power.
pub fn add_weapon(battle: &mut Battle, ship: ShipId, damage: i64, range: f64) -> EquipmentId {
    add_action(
        battle,
        ship,
        TriggerAction::new(1, range).with_effect(DamageEffect::new(damage, 0)),
    )
}

pub fn add_engine(battle: &mut Battle, ship: ShipId, distance_per_power: f64) -> EquipmentId {
    add_action(battle, ship, MoveAction::new(distance_per_power))
}
