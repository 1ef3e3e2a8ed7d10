use crate::error::{BattleError, ErrorSeverity};

/// Reasons an action request is turned down.
///
/// Rejections are normal gameplay input errors: nothing was applied and the
/// battle is unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionRejection {
    #[error("ship not playing")]
    ShipNotPlaying,

    #[error("not enough power ({available}/{required})")]
    NotEnoughPower { required: i64, available: i64 },

    #[error("overheated for {turns} turn(s)")]
    Overheated { turns: u32 },

    #[error("ship is pinned")]
    Pinned,

    #[error("vigilance is active")]
    Vigilance,

    #[error("invalid target")]
    InvalidTarget,

    #[error("target out of range")]
    OutOfRange,

    #[error("cannot target self")]
    SelfTarget,

    #[error("no movement")]
    NoMovement,

    #[error("equipment not found or without action")]
    EquipmentNotFound,

    #[error("battle not in progress")]
    BattleNotInProgress,

    #[error("no diff produced")]
    NoDiffProduced,
}

impl BattleError for ActionRejection {
    fn severity(&self) -> ErrorSeverity {
        use ActionRejection::*;
        match self {
            ShipNotPlaying | NotEnoughPower { .. } | Overheated { .. } => {
                ErrorSeverity::Recoverable
            }
            Pinned | Vigilance | BattleNotInProgress => ErrorSeverity::Recoverable,
            InvalidTarget | OutOfRange | SelfTarget | NoMovement => ErrorSeverity::Validation,
            EquipmentNotFound | NoDiffProduced => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionRejection::*;
        match self {
            ShipNotPlaying => "ACTION_SHIP_NOT_PLAYING",
            NotEnoughPower { .. } => "ACTION_NOT_ENOUGH_POWER",
            Overheated { .. } => "ACTION_OVERHEATED",
            Pinned => "ACTION_PINNED",
            Vigilance => "ACTION_VIGILANCE",
            InvalidTarget => "ACTION_INVALID_TARGET",
            OutOfRange => "ACTION_OUT_OF_RANGE",
            SelfTarget => "ACTION_SELF_TARGET",
            NoMovement => "ACTION_NO_MOVEMENT",
            EquipmentNotFound => "ACTION_EQUIPMENT_NOT_FOUND",
            BattleNotInProgress => "ACTION_BATTLE_NOT_IN_PROGRESS",
            NoDiffProduced => "ACTION_NO_DIFF_PRODUCED",
        }
    }
}
