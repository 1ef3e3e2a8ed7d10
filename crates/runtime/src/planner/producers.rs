//! Candidate maneuver generation.
//!
//! Each producer proposes maneuvers of one family; the planner simulates
//! and scores every one of them. Producers only look at actions the ship can
//! currently afford and that are not overheated, so most candidates survive
//! the simulation.
use tracing::trace;

use battle_core::{
    ActionContext, ActionKind, Battle, BattleConfig, Equipment, RandomSource, Ship, Target,
    TriggerAction, ValueKind,
};

use super::config::PlannerConfig;
use super::maneuver::Maneuver;

/// Produces every candidate maneuver for the playing ship.
pub struct ManeuverGenerator;

impl ManeuverGenerator {
    /// Candidates in producer order: end turn, direct shots, blast shots,
    /// toggles, random moves, drone deployments.
    ///
    /// The random source only jitters the arena scan.
    pub fn generate(
        battle: &Battle,
        ship: &Ship,
        config: &PlannerConfig,
        rng: &mut dyn RandomSource,
    ) -> Vec<Maneuver> {
        let mut candidates = vec![Maneuver::end_turn(ship.id)];
        candidates.extend(direct_shots(battle, ship));
        candidates.extend(blast_shots(battle, ship, config.scan_cells, rng));
        candidates.extend(toggles(battle, ship));
        candidates.extend(random_moves(battle, ship, config.scan_cells, rng));
        candidates.extend(drone_deployments(battle, ship));

        trace!(
            target: "runtime::planner",
            ship = %ship.id,
            candidates = candidates.len(),
            "maneuvers produced"
        );
        candidates
    }
}

/// Jittered grid over the arena, one location per cell, row by row.
pub fn scan_arena(config: &BattleConfig, cells: u32, rng: &mut dyn RandomSource) -> Vec<Target> {
    let cells = cells.max(1);
    let (cell_width, cell_height) = (
        config.width / f64::from(cells),
        config.height / f64::from(cells),
    );
    (0..cells * cells)
        .map(|position| {
            let (x, y) = (f64::from(position % cells), f64::from(position / cells));
            Target::location(
                (x + rng.random()) * cell_width,
                (y + rng.random()) * cell_height,
            )
        })
        .collect()
}

/// Equipment actions the ship may start right now.
fn playable<'b>(
    battle: &'b Battle,
    ship: &'b Ship,
) -> impl Iterator<Item = (&'b Equipment, &'b ActionKind)> {
    let power = ship.value(ValueKind::Power);
    ship.equipment.iter().filter_map(move |equipment| {
        let action = equipment.action.as_ref()?;
        let ctx = ActionContext::new(battle, ship, Some(equipment));
        let transition = action.transition();
        let ready = equipment.cooldown.can_use()
            && transition.check_availability(&ctx).is_ok()
            && transition.minimal_cost(&ctx) <= power;
        ready.then_some((equipment, action))
    })
}

fn triggers<'b>(
    battle: &'b Battle,
    ship: &'b Ship,
) -> impl Iterator<Item = (&'b Equipment, &'b TriggerAction)> {
    playable(battle, ship).filter_map(|(equipment, action)| match action {
        ActionKind::Trigger(trigger) => Some((equipment, trigger)),
        _ => None,
    })
}

/// Single-target and arc shots on each enemy; helpful shots on each other ally.
fn direct_shots(battle: &Battle, ship: &Ship) -> Vec<Maneuver> {
    let mut maneuvers = Vec::new();
    for (equipment, trigger) in triggers(battle, ship) {
        if trigger.range <= 0.0 || trigger.blast > 0.0 {
            continue;
        }
        let targets: Vec<_> = if trigger.is_harmful() {
            battle.enemies_of(ship.fleet).collect()
        } else {
            battle
                .allies_of(ship.fleet)
                .filter(|ally| ally.id != ship.id)
                .collect()
        };
        maneuvers.extend(
            targets
                .into_iter()
                .map(|target| Maneuver::new(ship.id, equipment.id, Target::Ship(target.id))),
        );
    }
    maneuvers
}

/// Midpoints of close enemy pairs, then grid locations hitting someone.
fn blast_shots(
    battle: &Battle,
    ship: &Ship,
    cells: u32,
    rng: &mut dyn RandomSource,
) -> Vec<Maneuver> {
    let weapons: Vec<_> = triggers(battle, ship)
        .filter(|(_, trigger)| trigger.blast > 0.0)
        .collect();
    if weapons.is_empty() {
        return Vec::new();
    }

    let enemies: Vec<_> = battle.enemies_of(ship.fleet).collect();
    let mut maneuvers = Vec::new();
    for &(equipment, trigger) in &weapons {
        for (index, first) in enemies.iter().enumerate() {
            for second in &enemies[index + 1..] {
                let (a, b) = (first.location.location(), second.location.location());
                if a.distance_to(&b) < trigger.blast * 2.0 {
                    maneuvers.push(Maneuver::new(
                        ship.id,
                        equipment.id,
                        Target::location((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
                    ));
                }
            }
        }
    }

    let source = ship.location.location();
    for location in scan_arena(&battle.config, cells, rng) {
        for &(equipment, trigger) in &weapons {
            let ctx = ActionContext::new(battle, ship, Some(equipment));
            if !trigger.impacted_ships(&ctx, source, &location).is_empty() {
                maneuvers.push(Maneuver::new(ship.id, equipment.id, location));
            }
        }
    }
    maneuvers
}

/// Toggles, vigilance and self-triggered devices, on the ship itself.
fn toggles(battle: &Battle, ship: &Ship) -> Vec<Maneuver> {
    playable(battle, ship)
        .filter(|(_, action)| match action {
            ActionKind::Toggle(_) | ActionKind::Vigilance(_) => true,
            ActionKind::Trigger(trigger) => trigger.range <= 0.0,
            _ => false,
        })
        .map(|(equipment, _)| Maneuver::new(ship.id, equipment.id, Target::Ship(ship.id)))
        .collect()
}

/// Every engine toward a jittered location of each arena cell.
fn random_moves(
    battle: &Battle,
    ship: &Ship,
    cells: u32,
    rng: &mut dyn RandomSource,
) -> Vec<Maneuver> {
    let engines: Vec<_> = playable(battle, ship)
        .filter(|(_, action)| matches!(action, ActionKind::Move(_)))
        .map(|(equipment, _)| equipment.id)
        .collect();
    if engines.is_empty() {
        return Vec::new();
    }
    scan_arena(&battle.config, cells, rng)
        .into_iter()
        .flat_map(|location| {
            engines
                .iter()
                .map(move |engine| Maneuver::new(ship.id, *engine, location))
        })
        .collect()
}

/// Drones dropped on enemies (harmful payload) or on allies (helpful payload).
fn drone_deployments(battle: &Battle, ship: &Ship) -> Vec<Maneuver> {
    let mut maneuvers = Vec::new();
    for (equipment, action) in playable(battle, ship) {
        let ActionKind::DeployDrone(drone) = action else {
            continue;
        };
        let harmful = drone.effects.iter().any(|effect| !effect.is_beneficial());
        let targets: Vec<_> = if harmful {
            battle.enemies_of(ship.fleet).collect()
        } else {
            battle.allies_of(ship.fleet).collect()
        };
        maneuvers.extend(targets.into_iter().map(|target| {
            let location = target.location.location();
            Maneuver::new(ship.id, equipment.id, Target::Location(location))
        }));
    }
    maneuvers
}

#[cfg(test)]
mod tests {
    use battle_core::effect::DamageEffect;
    use battle_core::{EquipmentId, PcgRng, ShipId, SkewedRandom, SlotKind};

    use super::*;
    use crate::planner::testing::{ENGINE, SHIELD_FIELD, SHIP_A, SHIP_B, WEAPON, duel};

    #[test]
    fn scan_covers_every_cell() {
        let config = BattleConfig::with_arena(100.0, 50.0);
        let grid = scan_arena(&config, 2, &mut SkewedRandom::constant(0.5));
        let points: Vec<_> = grid
            .iter()
            .map(|target| match target {
                Target::Location(location) => (location.x, location.y),
                Target::Ship(_) => panic!("grid yields locations"),
            })
            .collect();
        assert_eq!(
            points,
            vec![(25.0, 12.5), (75.0, 12.5), (25.0, 37.5), (75.0, 37.5)]
        );
    }

    #[test]
    fn duel_candidates_cover_every_family() {
        let (battle, rng) = duel();
        let ship = battle.playing_ship().expect("playing");
        assert_eq!(ship.id, SHIP_A);
        let mut rng = rng;
        let candidates =
            ManeuverGenerator::generate(&battle, ship, &PlannerConfig::default(), &mut rng);

        assert!(candidates[0].is_end_turn());
        assert!(candidates.contains(&Maneuver::new(SHIP_A, WEAPON, Target::Ship(SHIP_B))));
        assert!(candidates.contains(&Maneuver::new(SHIP_A, SHIELD_FIELD, Target::Ship(SHIP_A))));
        let moves = candidates
            .iter()
            .filter(|maneuver| maneuver.equipment == Some(ENGINE))
            .count();
        assert_eq!(moves, 100);
    }

    #[test]
    fn unaffordable_actions_are_not_produced() {
        let (mut battle, mut rng) = duel();
        let index = battle
            .ships
            .iter()
            .position(|ship| ship.id == SHIP_A)
            .expect("ship A");
        battle.ships[index].values.power = 1;
        let ship = &battle.ships[index];

        let candidates =
            ManeuverGenerator::generate(&battle, ship, &PlannerConfig::default(), &mut rng);
        assert!(candidates.iter().all(|maneuver| maneuver.equipment != Some(WEAPON)));
        assert!(candidates.iter().any(|maneuver| maneuver.equipment == Some(ENGINE)));
    }

    #[test]
    fn blast_shots_aim_between_close_enemies() {
        let (mut battle, _) = duel();
        let mut wingman = battle.ships[1].clone();
        wingman.id = ShipId(3);
        wingman.location.y += 60.0;
        let enemy_fleet = wingman.fleet;
        battle.ships.push(wingman);
        if let Some(fleet) = battle.fleets.iter_mut().find(|fleet| fleet.id == enemy_fleet) {
            fleet.ships.push(ShipId(3));
        }
        let index = battle
            .ships
            .iter()
            .position(|ship| ship.id == SHIP_A)
            .expect("ship A");
        battle.ships[index].equipment.push(
            Equipment::new(EquipmentId(9), "mortar", SlotKind::Weapon).with_action(
                TriggerAction::new(3, 2000.0)
                    .with_blast(50.0)
                    .with_effect(DamageEffect::new(5, 0)),
            ),
        );

        let ship = &battle.ships[index];
        let enemy = battle.ship(SHIP_B).expect("enemy").location;
        let midpoint = Target::location(enemy.x, enemy.y + 30.0);
        let shots = blast_shots(&battle, ship, 4, &mut PcgRng::from_seed(1));
        assert_eq!(shots[0], Maneuver::new(SHIP_A, EquipmentId(9), midpoint));
        assert!(shots.iter().all(|shot| shot.equipment == Some(EquipmentId(9))));
    }
}
