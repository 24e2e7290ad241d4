//! Append-only record log.
//!
//! Records are stored back to back as:
//! ```text
//! [u32 length][bincode serialized T]
//! [u32 length][bincode serialized T]
//! ...
//! ```
//! A record cut short by a crash is dropped when the log is reopened.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::repository::{RepositoryError, Result};

const WRITE_BUFFER: usize = 64 * 1024;

/// Generic append-only log of `T` records.
pub struct RecordLog<T> {
    path: PathBuf,
    writer: BufWriter<File>,
    /// Byte offset of the next record.
    end_offset: u64,
    _phantom: PhantomData<T>,
}

impl<T> RecordLog<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Opens the log, creating the directory and file if needed.
    ///
    /// A truncated trailing record is cut off so later appends stay readable.
    pub fn open_or_create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        std::fs::create_dir_all(base_dir)?;
        let path = base_dir.join(filename.as_ref());

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let file_size = file.metadata()?.len();

        let valid_len = Self::valid_prefix(&path, file_size)?;
        if valid_len < file_size {
            tracing::warn!(
                target: "runtime::repository",
                path = %path.display(),
                dropped = file_size - valid_len,
                "Discarding truncated record at end of log"
            );
            file.set_len(valid_len)?;
        }

        tracing::debug!(
            target: "runtime::repository",
            path = %path.display(),
            offset = valid_len,
            "Opened record log"
        );

        Ok(Self {
            path,
            writer: BufWriter::with_capacity(WRITE_BUFFER, file),
            end_offset: valid_len,
            _phantom: PhantomData,
        })
    }

    /// Appends a record and returns the offset it was written at.
    ///
    /// The record is buffered; call [`flush`](Self::flush) to make it durable.
    pub fn append(&mut self, item: &T) -> Result<u64> {
        let offset = self.end_offset;
        let bytes =
            bincode::serialize(item).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| RepositoryError::Serialization("record exceeds u32 length".into()))?;

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&bytes)?;
        self.end_offset += 4 + u64::from(len);

        Ok(offset)
    }

    /// Reads the record at `offset`.
    ///
    /// Returns `None` at end of log, or the record and the offset after it.
    pub fn read_at_offset(&self, offset: u64) -> Result<Option<(T, u64)>> {
        if offset >= self.end_offset {
            return Ok(None);
        }
        let mut reader = BufReader::new(File::open(&self.path)?);
        reader.seek(SeekFrom::Start(offset))?;
        let (bytes, next) = read_record(&mut reader, offset)?;
        let item = bincode::deserialize(&bytes)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Ok(Some((item, next)))
    }

    /// Reads every record from the start of the log.
    pub fn read_all(&self) -> Result<Vec<(u64, T)>> {
        let mut items = Vec::new();
        let mut offset = 0;
        while let Some((item, next)) = self.read_at_offset(offset)? {
            items.push((offset, item));
            offset = next;
        }
        Ok(items)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Size of the log in bytes, including buffered records.
    pub fn size(&self) -> u64 {
        self.end_offset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the longest prefix made of complete records.
    fn valid_prefix(path: &Path, file_size: u64) -> Result<u64> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut offset = 0;
        while offset < file_size {
            match read_record(&mut reader, offset) {
                Ok((_, next)) => offset = next,
                Err(RepositoryError::PartialWrite { .. }) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(offset)
    }
}

impl<T> Drop for RecordLog<T> {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(
                target: "runtime::repository",
                path = %self.path.display(),
                "Failed to flush record log on drop: {}",
                e
            );
        }
    }
}

/// Reads one length-prefixed frame starting at `offset`.
fn read_record(reader: &mut impl Read, offset: u64) -> Result<(Vec<u8>, u64)> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            return Err(RepositoryError::PartialWrite {
                offset,
                expected: 4,
                actual: 0,
            });
        }
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_le_bytes(len_bytes) as usize;

    let mut data = Vec::with_capacity(len);
    let read = reader.by_ref().take(len as u64).read_to_end(&mut data)?;
    if read < len {
        return Err(RepositoryError::PartialWrite {
            offset,
            expected: len,
            actual: read,
        });
    }

    Ok((data, offset + 4 + len as u64))
}
