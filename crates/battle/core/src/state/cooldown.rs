/// Overheat and cooling state of a usable piece of equipment.
///
/// `max_uses` uses within a turn overheat the equipment, which then needs
/// `overheat_turns` cooling steps (one per owner turn end) before being usable
/// again. `max_uses == 0` means unlimited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cooldown {
    pub max_uses: u32,
    pub overheat_turns: u32,
    /// Uses in the current heat window.
    pub uses: u32,
    /// Remaining cooling steps; the equipment is unusable while nonzero.
    pub heat: u32,
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl Cooldown {
    pub fn new(max_uses: u32, overheat_turns: u32) -> Self {
        Self {
            max_uses,
            overheat_turns: overheat_turns.max(1),
            uses: 0,
            heat: 0,
        }
    }

    /// Changes the parameters, keeping accumulated uses and heat.
    ///
    /// Uses already at or over a lowered `max_uses` overheat the equipment.
    pub fn configure(&mut self, max_uses: u32, overheat_turns: u32) {
        self.max_uses = max_uses;
        self.overheat_turns = overheat_turns.max(1);
        if self.max_uses > 0 && self.uses >= self.max_uses && self.heat == 0 {
            self.heat = self.overheat_turns;
        }
    }

    pub const fn can_use(&self) -> bool {
        self.heat == 0
    }

    /// Returns true if one more use would overheat the equipment.
    pub const fn will_overheat(&self) -> bool {
        self.max_uses > 0 && self.uses + 1 >= self.max_uses
    }

    /// Uses left before overheating, `None` when unlimited.
    pub const fn remaining_uses(&self) -> Option<u32> {
        if self.max_uses == 0 {
            None
        } else if self.heat > 0 {
            Some(0)
        } else {
            Some(self.max_uses.saturating_sub(self.uses))
        }
    }

    /// Records one use; returns the heat it added.
    pub fn use_once(&mut self) -> u32 {
        self.uses += 1;
        if self.max_uses > 0 && self.uses >= self.max_uses {
            let added = self.overheat_turns.saturating_sub(self.heat);
            self.heat = self.overheat_turns;
            added
        } else {
            0
        }
    }

    /// One cooling step; uses are cleared once heat is gone.
    pub fn cool(&mut self) {
        self.heat = self.heat.saturating_sub(1);
        if self.heat == 0 {
            self.uses = 0;
        }
    }

    pub fn reset(&mut self) {
        self.uses = 0;
        self.heat = 0;
    }

    /// Heat and uses one end-of-turn cooling step would remove.
    pub(crate) fn cooling_step(&self) -> (u32, u32) {
        let heat = u32::from(self.heat > 0);
        let uses = if self.heat <= 1 { self.uses } else { 0 };
        (heat, uses)
    }
}
