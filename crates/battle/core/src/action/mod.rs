//! Action domain.
//!
//! An [`Action`] is a request from the playing ship: use the end-turn action
//! or one of its equipment actions on a [`Target`]. Every variant implements
//! [`ActionTransition`], which the engine drives through three phases:
//!
//! 1. availability: the ship may use the action at all (turn, power, cooldown)
//! 2. targeting: the requested target is legal, possibly adjusted (range, obstacles)
//! 3. resolution: the ordered [`ResolutionStep`]s realizing the action
//!
//! Rejections at any phase are [`ActionRejection`]s; nothing is applied.
mod drone;
mod end_turn;
mod errors;
mod movement;
mod toggle;
mod trigger;

pub use drone::DeployDroneAction;
pub use end_turn::EndTurnAction;
pub use errors::ActionRejection;
pub use movement::MoveAction;
pub use toggle::{ToggleAction, VigilanceAction};
pub use trigger::TriggerAction;

use crate::diff::BattleDiff;
use crate::effect::{EffectKind, EffectSource};
use crate::state::{Battle, Equipment, EquipmentId, FleetId, Ship, ShipId, Target};

// ============================================================================
// Requests
// ============================================================================

/// What a ship uses to act.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionSource {
    EndTurn,
    Equipment(EquipmentId),
}

impl core::fmt::Display for ActionSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EndTurn => f.write_str("end_turn"),
            Self::Equipment(id) => write!(f, "{id}"),
        }
    }
}

/// A ship action request.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub ship: ShipId,
    pub source: ActionSource,
    pub target: Target,
}

impl Action {
    pub fn end_turn(ship: ShipId) -> Self {
        Self {
            ship,
            source: ActionSource::EndTurn,
            target: Target::Ship(ship),
        }
    }

    pub fn equipment(ship: ShipId, equipment: EquipmentId, target: Target) -> Self {
        Self {
            ship,
            source: ActionSource::Equipment(equipment),
            target,
        }
    }

    pub const fn is_end_turn(&self) -> bool {
        matches!(self.source, ActionSource::EndTurn)
    }
}

/// Which ships an action or area affects, relative to its owner.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionFilter {
    #[default]
    All,
    Allies,
    Enemies,
}

impl ActionFilter {
    pub fn accepts(self, source_fleet: FleetId, target_fleet: FleetId) -> bool {
        match self {
            Self::All => true,
            Self::Allies => source_fleet == target_fleet,
            Self::Enemies => source_fleet != target_fleet,
        }
    }
}

// ============================================================================
// Action kinds
// ============================================================================

/// Action exposed by a piece of equipment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    Move(MoveAction),
    Trigger(TriggerAction),
    Toggle(ToggleAction),
    Vigilance(VigilanceAction),
    DeployDrone(DeployDroneAction),
}

impl ActionKind {
    pub const fn is_toggle(&self) -> bool {
        matches!(self, Self::Toggle(_) | Self::Vigilance(_))
    }

    /// Action code, e.g. `fire` or `deploy`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::Trigger(trigger) if trigger.range > 0.0 => "fire",
            Self::Trigger(_) => "trigger",
            Self::Toggle(_) => "toggle",
            Self::Vigilance(_) => "vigilance",
            Self::DeployDrone(_) => "deploy",
        }
    }

    /// Transition implementing this kind.
    pub fn transition(&self) -> &dyn ActionTransition {
        match self {
            Self::Move(action) => action,
            Self::Trigger(action) => action,
            Self::Toggle(action) => action,
            Self::Vigilance(action) => action,
            Self::DeployDrone(action) => action,
        }
    }
}

macro_rules! action_from {
    ($($variant:ident($action:ty)),* $(,)?) => {
        $(
            impl From<$action> for ActionKind {
                fn from(action: $action) -> Self {
                    Self::$variant(action)
                }
            }
        )*
    };
}

action_from!(
    Move(MoveAction),
    Trigger(TriggerAction),
    Toggle(ToggleAction),
    Vigilance(VigilanceAction),
    DeployDrone(DeployDroneAction),
);

// ============================================================================
// Transition
// ============================================================================

/// Read-only view of the acting ship.
#[derive(Clone, Copy)]
pub struct ActionContext<'b> {
    pub battle: &'b Battle,
    pub ship: &'b Ship,
    /// Equipment providing the action, `None` for the end-turn action.
    pub equipment: Option<&'b Equipment>,
}

impl<'b> ActionContext<'b> {
    pub fn new(battle: &'b Battle, ship: &'b Ship, equipment: Option<&'b Equipment>) -> Self {
        Self {
            battle,
            ship,
            equipment,
        }
    }

    /// Source to attach to the effects this action applies.
    pub fn effect_source(&self) -> Option<EffectSource> {
        self.equipment.map(|equipment| EffectSource::Equipment {
            ship: self.ship.id,
            equipment: equipment.id,
        })
    }
}

/// One step of an action resolution.
///
/// Effects are resolved lazily, against the state left by the previous
/// steps, so chained effects see each other's results.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolutionStep {
    Diff(BattleDiff),
    Effect {
        effect: EffectKind,
        target: ShipId,
        source: EffectSource,
        index: u16,
    },
}

impl From<BattleDiff> for ResolutionStep {
    fn from(diff: BattleDiff) -> Self {
        Self::Diff(diff)
    }
}

/// Defines how a concrete action variant validates and resolves.
pub trait ActionTransition {
    /// Target-independent checks, on top of turn, cooldown and power.
    fn check_availability(&self, _ctx: &ActionContext<'_>) -> Result<(), ActionRejection> {
        Ok(())
    }

    /// Power needed before any target is known.
    fn minimal_cost(&self, ctx: &ActionContext<'_>) -> i64;

    /// Validates the requested target, returning the one actually used.
    fn check_target(&self, ctx: &ActionContext<'_>, target: Target)
    -> Result<Target, ActionRejection>;

    /// Power consumed on a checked target (negative values restore power).
    fn cost(&self, ctx: &ActionContext<'_>, target: &Target) -> i64;

    /// Steps realizing the action, after its use and power diffs.
    fn resolution(&self, ctx: &ActionContext<'_>, target: &Target) -> Vec<ResolutionStep>;
}

/// Steps applying `effects` on each ship, in order.
pub(crate) fn effect_steps(
    effects: &[EffectKind],
    ships: &[ShipId],
    source: EffectSource,
) -> Vec<ResolutionStep> {
    ships
        .iter()
        .flat_map(|ship| {
            effects
                .iter()
                .enumerate()
                .map(move |(index, effect)| ResolutionStep::Effect {
                    effect: effect.clone(),
                    target: *ship,
                    source,
                    index: index as u16,
                })
        })
        .collect()
}
