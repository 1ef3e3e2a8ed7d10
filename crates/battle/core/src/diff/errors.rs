//! Integrity violations raised while applying diffs.

use crate::effect::EffectKey;
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{AttributeKind, BattleStatus, DroneId, EquipmentId, ShipId, ValueKind};

/// A diff could not be applied to the battle it was given.
///
/// Either the diff stream was replayed against the wrong battle, or a diff
/// producer broke the inverse law. The battle state can no longer be trusted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntegrityError {
    #[error("ship {0} not found")]
    ShipNotFound(ShipId),

    #[error("equipment {equipment} not found on ship {ship}")]
    EquipmentNotFound { ship: ShipId, equipment: EquipmentId },

    #[error("drone {0} not found")]
    DroneNotFound(DroneId),

    #[error("effect {key:?} not found on ship {ship}")]
    EffectNotFound { ship: ShipId, key: EffectKey },

    #[error("drone {0} already deployed")]
    DuplicateDrone(DroneId),

    #[error("effect {key:?} already active on ship {ship}")]
    DuplicateEffect { ship: ShipId, key: EffectKey },

    #[error("battle is {status}")]
    BattleNotInProgress { status: BattleStatus },

    #[error("ship {ship} is not playing")]
    NotPlayingShip { ship: ShipId },

    #[error("play order mismatch for ship {ship} at index {index}")]
    PlayOrderMismatch { ship: ShipId, index: usize },

    #[error("{value} of ship {ship} out of range")]
    ValueOverflow { ship: ShipId, value: ValueKind },

    #[error("cooldown mismatch on equipment {equipment} of ship {ship}")]
    CooldownMismatch { ship: ShipId, equipment: EquipmentId },

    #[error("toggle mismatch on equipment {equipment} of ship {ship}")]
    ToggleMismatch { ship: ShipId, equipment: EquipmentId },

    #[error("{attribute} modifier not found on ship {ship}")]
    ModifierNotFound { ship: ShipId, attribute: AttributeKind },

    #[error("cursor {index} out of range (log has {len} diffs)")]
    CursorOutOfRange { index: usize, len: usize },

    #[error("no action to revert")]
    NothingToRevert,

    #[error("battle checks did not settle after {loops} loops")]
    ChecksDidNotSettle { loops: u32 },
}

impl BattleError for IntegrityError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NothingToRevert | Self::CursorOutOfRange { .. } => ErrorSeverity::Validation,
            Self::ChecksDidNotSettle { .. } => ErrorSeverity::Internal,
            _ => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ShipNotFound(_) => "DIFF_SHIP_NOT_FOUND",
            Self::EquipmentNotFound { .. } => "DIFF_EQUIPMENT_NOT_FOUND",
            Self::DroneNotFound(_) => "DIFF_DRONE_NOT_FOUND",
            Self::EffectNotFound { .. } => "DIFF_EFFECT_NOT_FOUND",
            Self::DuplicateDrone(_) => "DIFF_DUPLICATE_DRONE",
            Self::DuplicateEffect { .. } => "DIFF_DUPLICATE_EFFECT",
            Self::BattleNotInProgress { .. } => "DIFF_BATTLE_NOT_IN_PROGRESS",
            Self::NotPlayingShip { .. } => "DIFF_NOT_PLAYING_SHIP",
            Self::PlayOrderMismatch { .. } => "DIFF_PLAY_ORDER_MISMATCH",
            Self::ValueOverflow { .. } => "DIFF_VALUE_OVERFLOW",
            Self::CooldownMismatch { .. } => "DIFF_COOLDOWN_MISMATCH",
            Self::ToggleMismatch { .. } => "DIFF_TOGGLE_MISMATCH",
            Self::ModifierNotFound { .. } => "DIFF_MODIFIER_NOT_FOUND",
            Self::CursorOutOfRange { .. } => "DIFF_CURSOR_OUT_OF_RANGE",
            Self::NothingToRevert => "DIFF_NOTHING_TO_REVERT",
            Self::ChecksDidNotSettle { .. } => "DIFF_CHECKS_DID_NOT_SETTLE",
        }
    }
}
