//! Exclusion areas: places a ship cannot go.
//!
//! Three kinds of exclusion apply:
//! - a hard border along the arena edges,
//! - a hard obstacle around every other ship (ship separation),
//! - an optional soft obstacle, usually from an engine safety distance, that
//!   widens the obstacle around other ships.

use super::{ArenaLocation, Battle, ShipId};

#[derive(Clone, Debug, PartialEq)]
pub struct ExclusionAreas {
    min: ArenaLocation,
    max: ArenaLocation,
    active: bool,
    hard_border: f64,
    hard_obstacle: f64,
    effective_obstacle: f64,
    obstacles: Vec<ArenaLocation>,
}

impl ExclusionAreas {
    /// Creates exclusion areas for an empty arena.
    pub fn new(width: f64, height: f64, hard_border: f64, hard_obstacle: f64) -> Self {
        Self {
            min: ArenaLocation::new(0.0, 0.0),
            max: ArenaLocation::new(width - 1.0, height - 1.0),
            active: width > 0.0 && height > 0.0,
            hard_border,
            hard_obstacle,
            effective_obstacle: hard_obstacle,
            obstacles: Vec::new(),
        }
    }

    /// Builds the areas from the ships of a battle, skipping `ignored` ones.
    pub fn from_battle(battle: &Battle, ignored: &[ShipId], soft_distance: f64) -> Self {
        let config = &battle.config;
        let mut areas = Self::new(
            config.width,
            config.height,
            config.border,
            config.ship_separation,
        );
        let obstacles = battle
            .ships
            .iter()
            .filter(|ship| ship.alive && !ignored.contains(&ship.id))
            .map(|ship| ship.location.location())
            .collect();
        areas.configure(obstacles, soft_distance);
        areas
    }

    /// Replaces the obstacles for the next checks.
    pub fn configure(&mut self, obstacles: Vec<ArenaLocation>, soft_distance: f64) {
        self.obstacles = obstacles;
        self.effective_obstacle = self.hard_obstacle.max(soft_distance);
    }

    pub fn effective_obstacle(&self) -> f64 {
        self.effective_obstacle
    }

    pub fn obstacles(&self) -> &[ArenaLocation] {
        &self.obstacles
    }

    /// Furthest location of the `[source, location]` segment outside every
    /// exclusion area.
    ///
    /// A source already inside the nearest obstacle zone stays where it is.
    pub fn stop_before(&self, location: ArenaLocation, source: ArenaLocation) -> ArenaLocation {
        if !self.active {
            return location;
        }

        let mut target = location.kept_inside_rectangle(
            ArenaLocation::new(self.min.x + self.hard_border, self.min.y + self.hard_border),
            ArenaLocation::new(self.max.x - self.hard_border, self.max.y - self.hard_border),
            &source,
        );

        let mut obstacles = self.obstacles.clone();
        obstacles.sort_by(|a, b| a.distance_to(&source).total_cmp(&b.distance_to(&source)));
        for obstacle in &obstacles {
            if let Some(moved) =
                target.moved_out_of_circle(obstacle, self.effective_obstacle, &source)
            {
                target = if obstacle.distance_to(&source) < self.effective_obstacle {
                    source
                } else {
                    moved
                };
            }
        }
        target
    }
}
