//! Built-in ship designs and skirmish assembly.
//!
//! Content generation is out of scope; these fixed blueprints are enough for
//! headless AI-vs-AI battles and for tests.
use battle_core::action::{
    ActionFilter, DeployDroneAction, MoveAction, ToggleAction, TriggerAction, VigilanceAction,
};
use battle_core::effect::{
    AttributeEffect, DamageEffect, DamageModifierEffect, PinnedEffect, RepelEffect, StickyEffect,
    ValueEffect,
};
use battle_core::state::EquipError;
use battle_core::{
    AttributeKind, Battle, BattleConfig, BattleSetupError, Equipment, EquipmentId, FleetId,
    PlayerKind, Ship, ShipId, SlotKind, ValueKind,
};

/// Equipment ids shared by every blueprint.
pub const HULL: EquipmentId = EquipmentId(1);
pub const SHIELD: EquipmentId = EquipmentId(2);
pub const POWER: EquipmentId = EquipmentId(3);
pub const ENGINE: EquipmentId = EquipmentId(4);
pub const WEAPON: EquipmentId = EquipmentId(5);
pub const SUPPORT: EquipmentId = EquipmentId(6);

#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    #[error(transparent)]
    Equip(#[from] EquipError),

    #[error(transparent)]
    Setup(#[from] BattleSetupError),
}

/// Fixed ship designs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Blueprint {
    /// Fast, light gun, pinning shots.
    Scout,
    /// Balanced laser ship with a protective field.
    Frigate,
    /// Slow missile boat with a repair drone bay.
    Destroyer,
    /// Heavy brawler guarding its surroundings.
    Sentinel,
}

struct Frame {
    hull: i64,
    shield: i64,
    power: i64,
    maneuvrability: i64,
    precision: i64,
    distance_per_power: f64,
}

impl Blueprint {
    fn frame(self) -> Frame {
        match self {
            Self::Scout => Frame {
                hull: 60,
                shield: 20,
                power: 8,
                maneuvrability: 8,
                precision: 4,
                distance_per_power: 60.0,
            },
            Self::Frigate => Frame {
                hull: 100,
                shield: 40,
                power: 10,
                maneuvrability: 5,
                precision: 5,
                distance_per_power: 40.0,
            },
            Self::Destroyer => Frame {
                hull: 150,
                shield: 50,
                power: 12,
                maneuvrability: 3,
                precision: 6,
                distance_per_power: 30.0,
            },
            Self::Sentinel => Frame {
                hull: 180,
                shield: 30,
                power: 10,
                maneuvrability: 2,
                precision: 3,
                distance_per_power: 25.0,
            },
        }
    }

    fn weapon(self) -> Equipment {
        let equipment = match self {
            Self::Scout => Equipment::new(WEAPON, "gatling", SlotKind::Weapon).with_action(
                TriggerAction::new(2, 400.0)
                    .with_effect(DamageEffect::new(8, 4))
                    .with_effect(StickyEffect::new(PinnedEffect::new(false), 1)),
            ),
            Self::Frigate => Equipment::new(WEAPON, "laser", SlotKind::Weapon)
                .with_action(TriggerAction::new(3, 500.0).with_effect(DamageEffect::new(15, 5)))
                .with_cooldown(2, 1),
            Self::Destroyer => Equipment::new(WEAPON, "missile-launcher", SlotKind::Weapon)
                .with_action(
                    TriggerAction::new(4, 450.0)
                        .with_blast(100.0)
                        .with_effect(DamageEffect::new(20, 10)),
                )
                .with_cooldown(1, 2),
            Self::Sentinel => Equipment::new(WEAPON, "shockwave", SlotKind::Weapon)
                .with_action(
                    TriggerAction::new(3, 250.0)
                        .with_angle(60.0)
                        .with_filter(ActionFilter::Enemies)
                        .with_effect(DamageEffect::new(12, 6))
                        .with_effect(RepelEffect::new(80.0)),
                )
                .with_cooldown(2, 2),
        };
        equipment.with_effect(AttributeEffect::new(
            AttributeKind::Precision,
            self.frame().precision,
        ))
    }

    fn support(self) -> Equipment {
        match self {
            Self::Scout => Equipment::new(SUPPORT, "jammer", SlotKind::Weapon).with_action(
                TriggerAction::new(2, 300.0).with_effect(StickyEffect::new(
                    ValueEffect::on_turn_start(ValueKind::Power, -2),
                    2,
                )),
            ),
            Self::Frigate => Equipment::new(SUPPORT, "deflector-field", SlotKind::Weapon)
                .with_action(
                    ToggleAction::new(3, 250.0)
                        .with_filter(ActionFilter::Allies)
                        .with_effect(DamageModifierEffect::new(-25)),
                ),
            Self::Destroyer => Equipment::new(SUPPORT, "repair-bay", SlotKind::Weapon)
                .with_action(
                    DeployDroneAction::new(3, 300.0, 150.0, 2)
                        .with_filter(ActionFilter::Allies)
                        .with_effect(ValueEffect::on_turn_start(ValueKind::Hull, 10)),
                )
                .with_cooldown(1, 3),
            Self::Sentinel => Equipment::new(SUPPORT, "perimeter-watch", SlotKind::Weapon)
                .with_action(VigilanceAction::new(
                    ToggleAction::new(2, 200.0).with_filter(ActionFilter::Enemies),
                    2,
                    vec![DamageEffect::new(10, 0).into()],
                )),
        }
    }

    /// Builds a ship of this design, unplaced and at full values.
    pub fn build(self, id: ShipId, fleet: FleetId) -> Result<Ship, BlueprintError> {
        let frame = self.frame();
        let mut ship = Ship::new(id, fleet, format!("{self}-{}", id.0));
        ship.equip(
            Equipment::new(HULL, "hull-plating", SlotKind::Hull)
                .with_effect(AttributeEffect::new(AttributeKind::HullCapacity, frame.hull)),
        )?;
        ship.equip(
            Equipment::new(SHIELD, "shield-generator", SlotKind::Shield)
                .with_effect(AttributeEffect::new(AttributeKind::ShieldCapacity, frame.shield)),
        )?;
        ship.equip(
            Equipment::new(POWER, "power-core", SlotKind::Power)
                .with_effect(AttributeEffect::new(AttributeKind::PowerCapacity, frame.power)),
        )?;
        ship.equip(
            Equipment::new(ENGINE, "engine", SlotKind::Engine)
                .with_effect(AttributeEffect::new(
                    AttributeKind::Maneuvrability,
                    frame.maneuvrability,
                ))
                .with_action(MoveAction::new(frame.distance_per_power)),
        )?;
        ship.equip(self.weapon())?;
        ship.equip(self.support())?;
        ship.restore_initial_state();
        Ok(ship)
    }
}

/// Two AI fleets of `fleet_size` ships, cycling through `designs`.
///
/// The battle is assembled but not started.
pub fn skirmish(
    config: BattleConfig,
    fleet_size: usize,
    designs: &[Blueprint],
) -> Result<Battle, BlueprintError> {
    let mut battle = Battle::new(config);
    let mut next_id = 1;
    for (fleet, name) in [(FleetId(1), "blue"), (FleetId(2), "red")] {
        battle.add_fleet(fleet, name, PlayerKind::Ai)?;
        for index in 0..fleet_size {
            let design = designs
                .get(index % designs.len().max(1))
                .copied()
                .unwrap_or(Blueprint::Frigate);
            battle.add_ship(design.build(ShipId(next_id), fleet)?)?;
            next_id += 1;
        }
    }
    Ok(battle)
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_blueprint_fits_default_slots() {
        for design in Blueprint::iter() {
            let ship = design.build(ShipId(1), FleetId(1)).expect("build");
            assert_eq!(ship.equipment.len(), 6, "{design}");
            assert!(ship.value(ValueKind::Hull) > 0);
            assert_eq!(ship.value(ValueKind::Power), ship.capacity(ValueKind::Power));
        }
    }

    #[test]
    fn skirmish_cycles_designs() {
        let battle = skirmish(
            BattleConfig::default(),
            3,
            &[Blueprint::Scout, Blueprint::Destroyer],
        )
        .expect("skirmish");
        assert_eq!(battle.fleets.len(), 2);
        assert_eq!(battle.ships.len(), 6);
        assert_eq!(battle.ships[0].name, "scout-1");
        assert_eq!(battle.ships[1].name, "destroyer-2");
        assert_eq!(battle.ships[2].name, "scout-3");
        assert_eq!(battle.ships[3].fleet, FleetId(2));
    }
}
