use crate::rng::RandomSource;
use crate::state::{ArenaLocation, Battle, FleetId};

use super::EffectSource;

/// Read-only view handed to effects while they compute their diffs.
pub struct EffectContext<'a> {
    pub battle: &'a Battle,
    pub rng: &'a mut dyn RandomSource,
    pub source: EffectSource,
    /// Position of the effect in its provider's effect list.
    pub index: u16,
}

impl<'a> EffectContext<'a> {
    pub fn new(
        battle: &'a Battle,
        rng: &'a mut dyn RandomSource,
        source: EffectSource,
        index: u16,
    ) -> Self {
        Self {
            battle,
            rng,
            source,
            index,
        }
    }

    /// Current location of the source ship or drone.
    pub fn source_location(&self) -> Option<ArenaLocation> {
        match self.source {
            EffectSource::Equipment { ship, .. } => self
                .battle
                .ship(ship)
                .map(|ship| ship.location.location()),
            EffectSource::Drone(id) => self.battle.drone(id).map(|drone| drone.location),
        }
    }

    /// Fleet behind the source (a drone belongs to its owner's fleet).
    pub fn source_fleet(&self) -> Option<FleetId> {
        let owner = match self.source {
            EffectSource::Equipment { ship, .. } => ship,
            EffectSource::Drone(id) => self.battle.drone(id)?.owner,
        };
        self.battle.ship(owner).map(|ship| ship.fleet)
    }
}
