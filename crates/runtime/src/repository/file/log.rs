//! Append-only frame file.
//!
//! `FrameLog<T>` stores any serializable type as length-prefixed bincode
//! frames. The replay log uses it for its diff stream.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::repository::{RepositoryError, Result};

const WRITE_BUFFER: usize = 1024 * 1024;
const LENGTH_PREFIX: u64 = 4;

/// Append-only log of `T` frames.
///
/// File format:
/// ```text
/// [u32 length][bincode serialized T]
/// [u32 length][bincode serialized T]
/// ...
/// ```
pub struct FrameLog<T> {
    path: PathBuf,
    writer: BufWriter<File>,
    /// Byte offset of the next frame
    end_offset: u64,
    frames: u64,
    _phantom: PhantomData<T>,
}

impl<T> FrameLog<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a new log file.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::LogAlreadyExists`] if the file exists:
    /// logs are never overwritten.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => {
                    RepositoryError::LogAlreadyExists(path.display().to_string())
                }
                _ => RepositoryError::Io(err),
            })?;

        tracing::debug!(target: "runtime::repository", path = %path.display(), "frame log created");
        Ok(Self {
            path,
            writer: BufWriter::with_capacity(WRITE_BUFFER, file),
            end_offset: 0,
            frames: 0,
            _phantom: PhantomData,
        })
    }

    /// Open an existing log for appending, after checking every frame.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let frames = scan_frames(&path)?;
        let file = OpenOptions::new().append(true).open(&path)?;
        let end_offset = file.metadata()?.len();

        tracing::debug!(
            target: "runtime::repository",
            path = %path.display(),
            end_offset,
            frames,
            "frame log opened"
        );
        Ok(Self {
            path,
            writer: BufWriter::with_capacity(WRITE_BUFFER, file),
            end_offset,
            frames,
            _phantom: PhantomData,
        })
    }

    /// Append an item; returns its frame index.
    pub fn append(&mut self, item: &T) -> Result<u64> {
        let bytes =
            bincode::serialize(item).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| {
                RepositoryError::Serialization(format!("frame of {} bytes", bytes.len()))
            })?;

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&bytes)?;

        self.end_offset += LENGTH_PREFIX + u64::from(len);
        let index = self.frames;
        self.frames += 1;
        Ok(index)
    }

    /// Read the frame starting at `byte_offset`.
    ///
    /// Returns `None` at the end of the file, otherwise the item and the
    /// offset of the next frame. Buffered writes are not visible until
    /// [`flush`](Self::flush).
    pub fn read_at_offset(&self, byte_offset: u64) -> Result<Option<(T, u64)>> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        reader.seek(SeekFrom::Start(byte_offset))?;
        read_frame(&mut reader, byte_offset)
    }

    /// Every flushed item, in order.
    pub fn read_all(&self) -> Result<Vec<T>> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut items = Vec::new();
        let mut offset = 0;
        while let Some((item, next)) = read_frame(&mut reader, offset)? {
            items.push(item);
            offset = next;
        }
        Ok(items)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of frames, including unflushed ones.
    pub fn len(&self) -> u64 {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Size of the log in bytes, including unflushed frames.
    pub fn size(&self) -> u64 {
        self.end_offset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> Drop for FrameLog<T> {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            tracing::warn!(
                target: "runtime::repository",
                path = %self.path.display(),
                %err,
                "failed to flush frame log on drop"
            );
        }
    }
}

/// Reads one frame from the reader's current position (`offset`).
fn read_frame<T: DeserializeOwned>(
    reader: &mut impl Read,
    offset: u64,
) -> Result<Option<(T, u64)>> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    }
    let len = u32::from_le_bytes(len_bytes);

    let mut data = vec![0u8; len as usize];
    reader.read_exact(&mut data).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof => {
            RepositoryError::CorruptedData(format!("truncated frame at offset {offset}"))
        }
        _ => RepositoryError::Io(err),
    })?;
    let item = bincode::deserialize(&data)
        .map_err(|e| RepositoryError::CorruptedData(format!("frame at offset {offset}: {e}")))?;

    Ok(Some((item, offset + LENGTH_PREFIX + u64::from(len))))
}

/// Counts the frames of a log, failing on a truncated tail.
fn scan_frames(path: &Path) -> Result<u64> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut offset = 0;
    let mut frames = 0;
    loop {
        let mut len_bytes = [0u8; 4];
        match reader.read_exact(&mut len_bytes) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(frames),
            Err(err) => return Err(err.into()),
        }
        let len = u32::from_le_bytes(len_bytes);
        let skipped = std::io::copy(&mut (&mut reader).take(u64::from(len)), &mut std::io::sink())?;
        if skipped != u64::from(len) {
            return Err(RepositoryError::CorruptedData(format!(
                "truncated frame at offset {offset}"
            )));
        }
        offset += LENGTH_PREFIX + u64::from(len);
        frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: u64,
        name: String,
    }

    fn entry(id: u64, name: &str) -> Entry {
        Entry {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn frames_read_back_in_order() {
        let dir = TempDir::new().unwrap();
        let mut log = FrameLog::<Entry>::create(dir.path().join("test.log")).unwrap();

        assert_eq!(log.append(&entry(1, "first")).unwrap(), 0);
        assert_eq!(log.append(&entry(2, "second")).unwrap(), 1);
        log.flush().unwrap();

        let (first, next) = log.read_at_offset(0).unwrap().unwrap();
        assert_eq!(first, entry(1, "first"));
        let (second, end) = log.read_at_offset(next).unwrap().unwrap();
        assert_eq!(second, entry(2, "second"));
        assert_eq!(end, log.size());
        assert!(log.read_at_offset(end).unwrap().is_none());

        assert_eq!(log.read_all().unwrap(), vec![first, second]);
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");
        drop(FrameLog::<Entry>::create(&path).unwrap());

        assert!(matches!(
            FrameLog::<Entry>::create(&path),
            Err(RepositoryError::LogAlreadyExists(_))
        ));
    }

    #[test]
    fn reopened_log_keeps_appending() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");
        {
            let mut log = FrameLog::<Entry>::create(&path).unwrap();
            log.append(&entry(1, "first")).unwrap();
        }

        let mut log = FrameLog::<Entry>::open(&path).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.append(&entry(2, "second")).unwrap(), 1);
        log.flush().unwrap();
        assert_eq!(log.read_all().unwrap().len(), 2);
    }

    #[test]
    fn truncated_tail_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");
        {
            let mut log = FrameLog::<Entry>::create(&path).unwrap();
            log.append(&entry(1, "first")).unwrap();
        }
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 2);
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            FrameLog::<Entry>::open(&path),
            Err(RepositoryError::CorruptedData(_))
        ));
    }
}
