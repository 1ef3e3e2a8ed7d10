use tracing::error;

use crate::state::Battle;

use super::{BattleDiff, IntegrityError};

/// Append-only record of every diff applied to a battle since it started.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffLog {
    diffs: Vec<BattleDiff>,
}

impl DiffLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diff: BattleDiff) {
        self.diffs.push(diff);
    }

    pub fn get(&self, index: usize) -> Option<&BattleDiff> {
        self.diffs.get(index)
    }

    pub fn len(&self) -> usize {
        self.diffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn last(&self) -> Option<&BattleDiff> {
        self.diffs.last()
    }

    /// Drops every diff from `start` on.
    pub fn truncate(&mut self, start: usize) {
        self.diffs.truncate(start);
    }

    /// Diffs from `index` on, for a peer catching up.
    pub fn iter_from(&self, index: usize) -> impl Iterator<Item = &BattleDiff> {
        self.diffs.iter().skip(index)
    }

    pub fn as_slice(&self) -> &[BattleDiff] {
        &self.diffs
    }
}

impl From<Vec<BattleDiff>> for DiffLog {
    fn from(diffs: Vec<BattleDiff>) -> Self {
        Self { diffs }
    }
}

/// Cursor moving a battle back and forth along its log.
///
/// The cursor counts applied diffs: 0 is the battle as started, `log.len()`
/// is the live state. The battle only changes through apply and revert.
pub struct DiffLogClient<'a> {
    battle: &'a mut Battle,
    log: &'a mut DiffLog,
    cursor: usize,
}

impl<'a> DiffLogClient<'a> {
    /// Client over a battle holding every diff of its log.
    pub fn new(battle: &'a mut Battle, log: &'a mut DiffLog) -> Self {
        let cursor = log.len();
        Self {
            battle,
            log,
            cursor,
        }
    }

    pub fn battle(&self) -> &Battle {
        self.battle
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn at_start(&self) -> bool {
        self.cursor == 0
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.log.len()
    }

    /// Applies the next diff; returns false at the end of the log.
    pub fn forward(&mut self) -> Result<bool, IntegrityError> {
        let Some(diff) = self.log.get(self.cursor) else {
            return Ok(false);
        };
        diff.apply(self.battle).inspect_err(|err| {
            error!(
                target: "battle::diff",
                cursor = self.cursor,
                kind = diff.as_ref(),
                %err,
                "forward failed"
            );
        })?;
        self.cursor += 1;
        Ok(true)
    }

    /// Reverts the last applied diff; returns false at the start of the log.
    pub fn backward(&mut self) -> Result<bool, IntegrityError> {
        if self.cursor == 0 {
            return Ok(false);
        }
        let index = self.cursor - 1;
        let diff = self.log.get(index).ok_or(IntegrityError::CursorOutOfRange {
            index,
            len: self.log.len(),
        })?;
        diff.revert(self.battle).inspect_err(|err| {
            error!(
                target: "battle::diff",
                cursor = index,
                kind = diff.as_ref(),
                %err,
                "backward failed"
            );
        })?;
        self.cursor = index;
        Ok(true)
    }

    /// Moves the cursor to `index`, applying or reverting on the way.
    pub fn jump_to(&mut self, index: usize) -> Result<(), IntegrityError> {
        if index > self.log.len() {
            return Err(IntegrityError::CursorOutOfRange {
                index,
                len: self.log.len(),
            });
        }
        while self.cursor < index {
            self.forward()?;
        }
        while self.cursor > index {
            self.backward()?;
        }
        Ok(())
    }

    pub fn jump_to_start(&mut self) -> Result<(), IntegrityError> {
        self.jump_to(0)
    }

    pub fn jump_to_end(&mut self) -> Result<(), IntegrityError> {
        self.jump_to(self.log.len())
    }

    /// Forgets the diffs after the cursor, so that the battle can diverge
    /// from an earlier point.
    pub fn truncate(&mut self) {
        self.log.truncate(self.cursor);
    }
}
