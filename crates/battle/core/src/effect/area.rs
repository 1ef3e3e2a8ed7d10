use crate::state::{Battle, Ship};

use super::{EffectKey, EffectKind, EffectSource};

/// Area effects `ship` should carry given the current positions.
///
/// Sources are the activated toggles of alive ships within their radius, and
/// deployed drones within theirs, each filtered by its ally/enemy filter.
/// The result is sorted by key.
pub fn expected_area_effects<'b>(
    battle: &'b Battle,
    ship: &Ship,
) -> Vec<(EffectKey, &'b EffectKind)> {
    let location = ship.location.location();
    let mut expected = Vec::new();

    for drone in &battle.drones {
        let Some(owner) = battle.ship(drone.owner) else {
            continue;
        };
        if !drone.is_in_range(&location) || !drone.filter.accepts(owner.fleet, ship.fleet) {
            continue;
        }
        for (index, effect) in drone.effects.iter().enumerate() {
            expected.push((
                EffectKey::Area {
                    source: EffectSource::Drone(drone.id),
                    index: index as u16,
                },
                effect,
            ));
        }
    }

    for provider in battle.iter_alive_ships() {
        let distance = provider.location.location().distance_to(&location);
        for (equipment, toggle) in provider.active_toggles() {
            if distance > toggle.radius || !toggle.filter.accepts(provider.fleet, ship.fleet) {
                continue;
            }
            for (index, effect) in toggle.effects.iter().enumerate() {
                expected.push((
                    EffectKey::Area {
                        source: EffectSource::Equipment {
                            ship: provider.id,
                            equipment: equipment.id,
                        },
                        index: index as u16,
                    },
                    effect,
                ));
            }
        }
    }

    expected.sort_by(|a, b| a.0.cmp(&b.0));
    expected
}
