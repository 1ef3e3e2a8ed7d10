//! Planner fixtures.
use battle_core::action::{MoveAction, ToggleAction, TriggerAction};
use battle_core::effect::{AttributeEffect, DamageEffect, DamageModifierEffect};
use battle_core::{
    ActionFilter, AttributeKind, Battle, BattleConfig, Equipment, EquipmentId, FleetId, PcgRng,
    PlayerKind, Ship, ShipId, SlotKind,
};

pub const SHIP_A: ShipId = ShipId(1);
pub const SHIP_B: ShipId = ShipId(2);

pub const ENGINE: EquipmentId = EquipmentId(4);
pub const WEAPON: EquipmentId = EquipmentId(5);
pub const SHIELD_FIELD: EquipmentId = EquipmentId(6);

pub const SEED: u64 = 42;

/// 100 hull, no shield, 10 power, an engine and a 2-power gun reaching
/// across the arena.
pub fn gunship(id: ShipId, fleet: FleetId, maneuvrability: i64) -> Ship {
    let mut ship = Ship::new(id, fleet, format!("gunship-{}", id.0));
    let parts = [
        Equipment::new(EquipmentId(1), "hull", SlotKind::Hull)
            .with_effect(AttributeEffect::new(AttributeKind::HullCapacity, 100)),
        Equipment::new(EquipmentId(3), "core", SlotKind::Power)
            .with_effect(AttributeEffect::new(AttributeKind::PowerCapacity, 10)),
        Equipment::new(ENGINE, "engine", SlotKind::Engine)
            .with_effect(AttributeEffect::new(
                AttributeKind::Maneuvrability,
                maneuvrability,
            ))
            .with_action(MoveAction::new(40.0)),
        Equipment::new(WEAPON, "gun", SlotKind::Weapon)
            .with_action(TriggerAction::new(2, 2000.0).with_effect(DamageEffect::new(20, 0))),
        Equipment::new(SHIELD_FIELD, "field", SlotKind::Weapon).with_action(
            ToggleAction::new(3, 200.0)
                .with_filter(ActionFilter::Allies)
                .with_effect(DamageModifierEffect::new(-30)),
        ),
    ];
    for part in parts {
        ship.equip(part).expect("equip");
    }
    ship.restore_initial_state();
    ship
}

/// Two gunships, A (fleet 1) playing first, started with [`SEED`].
pub fn duel() -> (Battle, PcgRng) {
    let mut battle = Battle::new(BattleConfig::default());
    battle
        .add_fleet(FleetId(1), "blue", PlayerKind::Ai)
        .expect("fleet 1");
    battle
        .add_fleet(FleetId(2), "red", PlayerKind::Ai)
        .expect("fleet 2");
    battle
        .add_ship(gunship(SHIP_A, FleetId(1), 1_000))
        .expect("ship A");
    battle
        .add_ship(gunship(SHIP_B, FleetId(2), 1))
        .expect("ship B");

    let mut rng = PcgRng::from_seed(SEED);
    battle.start(&mut rng).expect("start");
    (battle, rng)
}
