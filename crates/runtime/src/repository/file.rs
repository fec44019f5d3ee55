//! Append-only log file repository.
//!
//! Items are framed as:
//! ```text
//! [u32 length][bincode serialized T]
//! [u32 length][bincode serialized T]
//! ...
//! ```
//! Offsets are byte positions of a frame's length prefix.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use super::{EventRepository, RepositoryError, Result};
use crate::events::Event;

const WRITE_BUFFER: usize = 64 * 1024;

/// Event log backed by a [`FileRepository`].
pub type FileEventLog = FileRepository<Event>;

/// Generic file-based repository for append-only logs.
pub struct FileRepository<T> {
    /// Log identifier (filename without path)
    session_id: String,
    path: PathBuf,
    writer: BufWriter<File>,
    /// Byte offset the next frame is written at
    end: u64,
    _item: PhantomData<fn() -> T>,
}

impl<T> FileRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a new log file.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::LogAlreadyExists`] if the file is already there.
    pub fn create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let path = Self::prepare(base_dir.as_ref(), filename.as_ref())?;
        if path.exists() {
            return Err(RepositoryError::LogAlreadyExists(path.display().to_string()));
        }
        let file = OpenOptions::new().create_new(true).append(true).open(&path)?;
        tracing::debug!(path = %path.display(), "created log");
        Ok(Self::from_file(filename.as_ref(), path, file, 0))
    }

    /// Open an existing log for appending.
    pub fn open(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let path = base_dir.as_ref().join(filename.as_ref());
        let file = OpenOptions::new().append(true).open(&path)?;
        let end = file.metadata()?.len();
        tracing::debug!(path = %path.display(), end, "opened log");
        Ok(Self::from_file(filename.as_ref(), path, file, end))
    }

    /// Open the log, creating it and its directory when missing.
    pub fn open_or_create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let path = Self::prepare(base_dir.as_ref(), filename.as_ref())?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let end = file.metadata()?.len();
        tracing::debug!(path = %path.display(), end, "opened log");
        Ok(Self::from_file(filename.as_ref(), path, file, end))
    }

    fn prepare(base_dir: &Path, filename: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(base_dir)?;
        Ok(base_dir.join(filename))
    }

    fn from_file(filename: &str, path: PathBuf, file: File, end: u64) -> Self {
        Self {
            session_id: filename.to_string(),
            path,
            writer: BufWriter::with_capacity(WRITE_BUFFER, file),
            end,
            _item: PhantomData,
        }
    }

    /// Append an item; returns the offset of its frame.
    pub fn append(&mut self, item: &T) -> Result<u64> {
        let bytes =
            bincode::serialize(item).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| RepositoryError::Serialization(format!("{} byte item", bytes.len())))?;

        let offset = self.end;
        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&bytes)?;
        self.end += 4 + u64::from(len);
        Ok(offset)
    }

    /// Read the item framed at `offset`.
    ///
    /// Only flushed frames are visible. Returns `None` at or past the end of
    /// the file.
    pub fn read_at_offset(&self, offset: u64) -> Result<Option<(T, u64)>> {
        let file = File::open(&self.path)?;
        if offset >= file.metadata()?.len() {
            return Ok(None);
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;

        let mut len = [0u8; 4];
        read_frame_part(&mut reader, &mut len, offset)?;
        let len = u32::from_le_bytes(len);
        let mut data = vec![0u8; len as usize];
        read_frame_part(&mut reader, &mut data, offset)?;

        let item = bincode::deserialize(&data)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Ok(Some((item, offset + 4 + u64::from(len))))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Offset the next frame will be written at.
    pub fn size(&self) -> u64 {
        self.end
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_frame_part(reader: &mut impl Read, buf: &mut [u8], offset: u64) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            RepositoryError::CorruptedData(format!("truncated frame at offset {offset}"))
        }
        _ => RepositoryError::Io(e),
    })
}

impl<T> Drop for FileRepository<T> {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(log = %self.session_id, error = %e, "failed to flush log on drop");
        }
    }
}

impl EventRepository for FileRepository<Event> {
    fn append(&mut self, event: &Event) -> Result<u64> {
        FileRepository::append(self, event)
    }

    fn read_at_offset(&self, offset: u64) -> Result<Option<(Event, u64)>> {
        FileRepository::read_at_offset(self, offset)
    }

    fn flush(&mut self) -> Result<()> {
        FileRepository::flush(self)
    }

    fn size(&self) -> Result<u64> {
        Ok(FileRepository::size(self))
    }

    fn session_id(&self) -> &str {
        FileRepository::session_id(self)
    }
}

#[cfg(test)]
mod tests {
    use game_core::{SessionCommand, SlotId, TransitionPhase};
    use tempfile::TempDir;

    use super::*;
    use crate::events::{ClaimEvent, SessionEvent};

    fn rejected(at: u64) -> Event {
        Event::Claim(ClaimEvent::Rejected {
            slot: SlotId(0),
            error: "future tick".into(),
            at,
        })
    }

    #[test]
    fn frames_are_read_back_in_order() {
        let dir = TempDir::new().unwrap();
        let mut log = FileEventLog::create(dir.path(), "events.log").unwrap();
        let first = log.append(&rejected(1)).unwrap();
        let second = log.append(&rejected(2)).unwrap();
        log.flush().unwrap();

        assert_eq!(first, 0);
        let (event, next) = log.read_at_offset(first).unwrap().unwrap();
        assert_eq!(event, rejected(1));
        assert_eq!(next, second);
        assert!(log.read_at_offset(log.size()).unwrap().is_none());
        assert_eq!(log.read_all().unwrap(), vec![rejected(1), rejected(2)]);
    }

    #[test]
    fn create_refuses_existing_log() {
        let dir = TempDir::new().unwrap();
        drop(FileEventLog::create(dir.path(), "events.log").unwrap());
        let err = FileEventLog::create(dir.path(), "events.log").err().unwrap();
        assert!(matches!(err, RepositoryError::LogAlreadyExists(_)));
    }

    #[test]
    fn reopened_log_appends_after_existing_frames() {
        let dir = TempDir::new().unwrap();
        {
            let mut log = FileEventLog::open_or_create(dir.path().join("s1"), "events.log").unwrap();
            log.append(&rejected(1)).unwrap();
        }

        let mut log = FileEventLog::open(dir.path().join("s1"), "events.log").unwrap();
        assert!(log.size() > 0);
        let command = SessionCommand::Leave(game_core::LeaveAction {
            seeker: game_core::SeekerId(1),
            slot: SlotId(0),
        });
        let event = Event::Session(SessionEvent::CommandRejected {
            command,
            phase: TransitionPhase::PreValidate,
            error: "slot is empty".into(),
            at: 3,
        });
        log.append(&event).unwrap();
        log.flush().unwrap();

        assert_eq!(log.read_all().unwrap(), vec![rejected(1), event]);
    }

    #[test]
    fn truncated_frame_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = {
            let mut log = FileEventLog::create(dir.path(), "events.log").unwrap();
            log.append(&rejected(1)).unwrap();
            log.flush().unwrap();
            log.path().to_path_buf()
        };
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

        let log = FileEventLog::open(dir.path(), "events.log").unwrap();
        let err = log.read_at_offset(0).unwrap_err();
        assert!(matches!(err, RepositoryError::CorruptedData(_)));
    }
}
