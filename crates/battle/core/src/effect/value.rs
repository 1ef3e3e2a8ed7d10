use crate::diff::BattleDiff;
use crate::state::{Ship, ValueKind};

use super::{EffectContext, EffectSource};

fn signed(value: i64) -> String {
    format!("{}{}", if value > 0 { "+" } else { "-" }, value.abs())
}

/// Add (or subtract) an amount to a ship value at each lifecycle hook.
///
/// Results are clamped into `[0, capacity]`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueEffect {
    pub value: ValueKind,
    pub on: i64,
    pub off: i64,
    pub start: i64,
    pub end: i64,
}

impl ValueEffect {
    /// Immediate, one-shot change.
    pub fn new(value: ValueKind, on: i64) -> Self {
        Self {
            value,
            on,
            off: 0,
            start: 0,
            end: 0,
        }
    }

    /// Change lasting while the effect is active.
    pub fn while_active(value: ValueKind, amount: i64) -> Self {
        Self {
            off: -amount,
            ..Self::new(value, amount)
        }
    }

    /// Change applied at each turn start of the carrying ship.
    pub fn on_turn_start(value: ValueKind, amount: i64) -> Self {
        Self {
            start: amount,
            ..Self::new(value, 0)
        }
    }

    fn diffs(&self, target: &Ship, delta: i64) -> Vec<BattleDiff> {
        if delta == 0 {
            Vec::new()
        } else {
            target.value_diffs(self.value, delta)
        }
    }

    pub(super) fn on_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        self.diffs(target, self.on)
    }

    pub(super) fn off_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        self.diffs(target, self.off)
    }

    pub(super) fn turn_start_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        self.diffs(target, self.start)
    }

    pub(super) fn turn_end_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        self.diffs(target, self.end)
    }

    /// A net loss is harmful; paired changes are judged by their first half.
    pub fn is_beneficial(&self) -> bool {
        if self.off < -self.on || self.end < -self.start {
            false
        } else if (self.off != 0 && self.off == -self.on)
            || (self.end != 0 && self.end == -self.start)
        {
            self.on > 0 || self.start > 0
        } else {
            self.on > 0 || self.off > 0 || self.start > 0 || self.end > 0
        }
    }

    pub fn description(&self) -> String {
        let mut parts = Vec::new();
        if self.on != 0 {
            if self.off == -self.on {
                parts.push(format!("{} while active", signed(self.on)));
            } else if self.off != 0 {
                parts.push(format!("{} on", signed(self.on)));
                parts.push(format!("{} off", signed(self.off)));
            } else {
                parts.push(signed(self.on));
            }
        }
        if self.start != 0 {
            if self.end == -self.start {
                parts.push(format!("{} during turn", signed(self.start)));
            } else {
                parts.push(format!("{} on turn start", signed(self.start)));
                if self.end != 0 {
                    parts.push(format!("{} on turn end", signed(self.end)));
                }
            }
        } else if self.end != 0 {
            parts.push(format!("{} on turn end", signed(self.end)));
        }
        if self.off != 0 && self.on == 0 {
            parts.push(format!("{} when removed", signed(self.off)));
        }
        if parts.is_empty() {
            "no effect".to_owned()
        } else {
            format!("{} {}", self.value, parts.join(", "))
        }
    }
}

/// Move an amount of a value between the source ship and the target.
///
/// A positive amount gives to the target, a negative one steals from it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueTransferEffect {
    pub value: ValueKind,
    pub amount: i64,
}

impl ValueTransferEffect {
    pub fn new(value: ValueKind, amount: i64) -> Self {
        Self { value, amount }
    }

    pub(super) fn on_diffs(&self, ctx: &mut EffectContext<'_>, target: &Ship) -> Vec<BattleDiff> {
        let EffectSource::Equipment { ship: source, .. } = ctx.source else {
            return Vec::new();
        };
        if source == target.id || self.amount == 0 {
            return Vec::new();
        }
        let Some(source) = ctx.battle.ship(source) else {
            return Vec::new();
        };

        let (giver, receiver) = if self.amount > 0 {
            (source, target)
        } else {
            (target, source)
        };
        let room = (receiver.capacity(self.value) - receiver.value(self.value)).max(0);
        let amount = self
            .amount
            .abs()
            .min(giver.value(self.value).max(0))
            .min(room);
        if amount == 0 {
            return Vec::new();
        }
        vec![
            BattleDiff::ShipValue {
                ship: giver.id,
                value: self.value,
                delta: -amount,
            },
            BattleDiff::ShipValue {
                ship: receiver.id,
                value: self.value,
                delta: amount,
            },
        ]
    }

    pub fn description(&self) -> String {
        let verb = if self.amount < 0 { "steal" } else { "give" };
        format!("{verb} {} {}", self.amount.abs(), self.value)
    }
}
