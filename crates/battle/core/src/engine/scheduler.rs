//! Battle start: placement, initiative and initial state.

use core::f64::consts::PI;

use tracing::info;

use crate::rng::RandomSource;
use crate::state::{AttributeKind, Battle, BattleSetupError, BattleStatus, FleetId, ShipId};

impl Battle {
    /// Starts the battle: places the fleets face to face, restores every
    /// ship to its pre-battle state, then draws the play order.
    ///
    /// Nothing here is logged; the diff log starts with the battle.
    pub fn start(&mut self, rng: &mut dyn RandomSource) -> Result<(), BattleSetupError> {
        if self.status != BattleStatus::NotStarted {
            return Err(BattleSetupError::AlreadyStarted);
        }
        if self.fleets.len() < 2 {
            return Err(BattleSetupError::NotEnoughFleets(self.fleets.len()));
        }
        if let Some(empty) = self.fleets.iter().find(|fleet| fleet.ships.is_empty()) {
            return Err(BattleSetupError::EmptyFleet(empty.id));
        }

        self.outcome = None;
        self.cycle = 1;
        self.drones.clear();
        self.place_ships();
        for ship in &mut self.ships {
            ship.restore_initial_state();
        }
        self.throw_initiative(rng);
        self.playing_index = 0;
        self.status = BattleStatus::InProgress;

        info!(
            target: "battle::engine",
            fleets = self.fleets.len(),
            ships = self.ships.len(),
            first = ?self.playing_ship_id(),
            "battle started"
        );
        Ok(())
    }

    /// Draws each ship's initiative and sorts the play order by it.
    ///
    /// Ties keep fleet then in-fleet order.
    pub fn throw_initiative(&mut self, rng: &mut dyn RandomSource) {
        let order: Vec<ShipId> = self.iter_ships().map(|ship| ship.id).collect();
        let mut drawn = Vec::with_capacity(order.len());
        for id in order {
            if let Some(ship) = self.ship_mut(id) {
                ship.play_priority =
                    rng.random() * ship.attribute(AttributeKind::Maneuvrability) as f64;
                drawn.push((id, ship.play_priority, ship.alive));
            }
        }
        drawn.sort_by(|a, b| b.1.total_cmp(&a.1));
        self.play_order = drawn
            .into_iter()
            .filter(|(_, _, alive)| *alive)
            .map(|(id, _, _)| id)
            .collect();
    }

    /// Lines up the first two fleets on each side of the arena, facing
    /// each other.
    pub fn place_ships(&mut self) {
        let (width, height) = (self.config.width, self.config.height);
        let formations = [
            (width * 0.25, height * 0.5, 0.0),
            (width * 0.75, height * 0.5, PI),
        ];
        let fleets: Vec<FleetId> = self.fleets.iter().map(|fleet| fleet.id).collect();
        for (fleet, (x, y, facing)) in fleets.into_iter().zip(formations) {
            self.place_fleet(fleet, x, y, facing, height * 0.2);
        }
    }

    /// Spreads a fleet along a line through `(x, y)`, perpendicular to its
    /// facing angle.
    fn place_fleet(&mut self, fleet: FleetId, x: f64, y: f64, facing: f64, spacing: f64) {
        let Some(ships) = self.fleet(fleet).map(|fleet| fleet.ships.clone()) else {
            return;
        };
        let side = facing + PI * 0.5;
        let total = spacing * ships.len().saturating_sub(1) as f64;
        let (dx, dy) = (side.cos(), side.sin());
        let (x0, y0) = (x - dx * total * 0.5, y - dy * total * 0.5);
        for (index, id) in ships.into_iter().enumerate() {
            if let Some(ship) = self.ship_mut(id) {
                let offset = index as f64 * spacing;
                ship.location.x = x0 + dx * offset;
                ship.location.y = y0 + dy * offset;
                ship.location.angle = facing;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::rng::SkewedRandom;
    use crate::state::{
        Battle, BattleSetupError, BattleStatus, FleetId, PlayerKind, ShipId, ValueKind,
    };
    use crate::testing::{SHIP_A, SHIP_B, unstarted_battle};

    #[test]
    fn start_orders_by_initiative() {
        let mut battle = unstarted_battle();
        // maneuvrability: A 5, B 10; draws 0.9 then 0.6 => A 4.5, B 6.0
        let mut rng = SkewedRandom::new(vec![0.9, 0.6]);
        battle.start(&mut rng).expect("start");

        assert_eq!(battle.status, BattleStatus::InProgress);
        assert_eq!(battle.cycle, 1);
        assert_eq!(battle.play_order, vec![SHIP_B, SHIP_A]);
        assert_eq!(battle.playing_ship_id(), Some(SHIP_B));
        let ship = battle.ship(SHIP_A).expect("ship");
        assert_eq!(ship.value(ValueKind::Hull), 100);
        assert_eq!(ship.value(ValueKind::Power), 10);
    }

    #[test]
    fn ties_keep_fleet_order() {
        let mut battle = unstarted_battle();
        let mut rng = SkewedRandom::constant(0.0);
        battle.start(&mut rng).expect("start");
        assert_eq!(battle.play_order, vec![SHIP_A, SHIP_B]);
    }

    #[test]
    fn fleets_face_each_other() {
        let mut battle = unstarted_battle();
        battle.start(&mut SkewedRandom::constant(0.5)).expect("start");
        let a = battle.ship(SHIP_A).expect("ship").location;
        let b = battle.ship(SHIP_B).expect("ship").location;
        assert!((a.x - battle.config.width * 0.25).abs() < 1e-9);
        assert!((b.x - battle.config.width * 0.75).abs() < 1e-9);
        assert!((a.y - b.y).abs() < 1e-9);
        assert!((b.angle - core::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn start_requires_two_populated_fleets() {
        let mut rng = SkewedRandom::constant(0.5);
        let mut lonely = Battle::default();
        lonely
            .add_fleet(FleetId(1), "solo", PlayerKind::Ai)
            .expect("fleet");
        assert_eq!(lonely.start(&mut rng), Err(BattleSetupError::NotEnoughFleets(1)));

        lonely
            .add_fleet(FleetId(2), "empty", PlayerKind::Ai)
            .expect("fleet");
        assert_eq!(lonely.start(&mut rng), Err(BattleSetupError::EmptyFleet(FleetId(1))));

        let mut battle = unstarted_battle();
        battle.start(&mut rng).expect("start");
        assert_eq!(battle.start(&mut rng), Err(BattleSetupError::AlreadyStarted));
        assert!(battle.ship(ShipId(99)).is_none());
    }
}
