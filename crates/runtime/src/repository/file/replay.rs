//! Replay stored in a directory: the initial battle snapshot and the diff
//! frame log.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use battle_core::{Battle, BattleDiff};

use super::FileDiffLog;
use crate::repository::{ReplayRepository, RepositoryError, Result};

const INITIAL_FILE: &str = "battle.bin";
const DIFFS_FILE: &str = "diffs.log";

/// Replay log backed by a directory.
///
/// ```text
/// <dir>/battle.bin   bincode snapshot of the started battle
/// <dir>/diffs.log    [u32 length][bincode BattleDiff] frames
/// ```
pub struct FileReplayLog {
    dir: PathBuf,
    session_id: String,
    diffs: FileDiffLog,
}

impl FileReplayLog {
    /// Create a new replay directory.
    ///
    /// Fails with [`RepositoryError::LogAlreadyExists`] if `dir` already holds
    /// a replay.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let diffs = FileDiffLog::create(dir.join(DIFFS_FILE))?;
        let session_id = session_name(&dir);

        tracing::info!(
            target: "runtime::repository",
            session = %session_id,
            dir = %dir.display(),
            "replay log created"
        );
        Ok(Self {
            dir,
            session_id,
            diffs,
        })
    }

    /// Open an existing replay directory; new diffs are appended.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let diffs = FileDiffLog::open(dir.join(DIFFS_FILE))?;
        let session_id = session_name(&dir);
        Ok(Self {
            dir,
            session_id,
            diffs,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReplayRepository for FileReplayLog {
    fn save_initial(&mut self, battle: &Battle) -> Result<()> {
        let bytes = battle
            .to_snapshot()
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let path = self.dir.join(INITIAL_FILE);
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => {
                    RepositoryError::LogAlreadyExists(path.display().to_string())
                }
                _ => RepositoryError::Io(err),
            })?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        Ok(())
    }

    fn load_initial(&self) -> Result<Option<Battle>> {
        let bytes = match fs::read(self.dir.join(INITIAL_FILE)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Battle::from_snapshot(&bytes)
            .map(Some)
            .map_err(|e| RepositoryError::CorruptedData(e.to_string()))
    }

    fn append(&mut self, diff: &BattleDiff) -> Result<u64> {
        self.diffs.append(diff)
    }

    fn read_all(&self) -> Result<Vec<BattleDiff>> {
        self.diffs.read_all()
    }

    fn flush(&mut self) -> Result<()> {
        self.diffs.flush()
    }

    fn len(&self) -> u64 {
        self.diffs.len()
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

fn session_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}
