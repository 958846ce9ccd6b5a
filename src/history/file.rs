//! JSON Lines history store.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::{HistoryStore, ObservationRecord, StoreError};

/// File-backed [`HistoryStore`].
///
/// Each record is one JSON object per line, appended and fsynced before it
/// becomes visible to readers. The whole history is mirrored in memory, in
/// insertion order, so `latest(n)` touches only the `n` newest entries.
///
/// # Recovery
///
/// Lines that fail to parse are skipped with a warning. Every append checks
/// the file's last byte; if an earlier write was torn (a crash or a failed
/// short write), the new record starts on a fresh line so the fragment
/// cannot swallow it.
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
    records: RwLock<Vec<ObservationRecord>>,
}

impl FileHistoryStore {
    /// Opens the history file at `path`, loading existing records.
    ///
    /// A missing file is an empty history; the file and its parent directory
    /// are created on the first append.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(source) => return Err(StoreError::Open { path, source }),
        };

        let records = parse_records(&path, &content);

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Returns the path to the history file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Performs the blocking write.
    ///
    /// Separated out so it can be wrapped in `spawn_blocking`.
    fn append_blocking(path: &Path, record: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(StoreError::Write)?;

        let mut line = Vec::with_capacity(record.len() + 1);
        if !ends_with_newline(&mut file).map_err(StoreError::Write)? {
            line.push(b'\n');
        }
        line.extend_from_slice(record);

        file.write_all(&line).map_err(StoreError::Write)?;
        file.sync_data().map_err(StoreError::Write)?;

        Ok(())
    }
}

/// `true` for an empty file or one whose last byte is a newline.
fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Parses JSON Lines content, skipping unreadable lines, ordered by time.
fn parse_records(path: &Path, content: &str) -> Vec<ObservationRecord> {
    let mut records = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ObservationRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(
                "Skipping unreadable line {} in {}: {e}",
                index + 1,
                path.display()
            ),
        }
    }

    // Stable: equal timestamps keep file order.
    records.sort_by_key(|record| record.observed_at);
    records
}

impl HistoryStore for FileHistoryStore {
    fn latest(&self, n: usize) -> Vec<ObservationRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.iter().rev().take(n).cloned().collect()
    }

    fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn append(
        &self,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<ObservationRecord, StoreError> {
        let record = ObservationRecord::new(value, observed_at);

        let mut line = Vec::new();
        serde_json::to_writer(&mut line, &record).map_err(StoreError::Serialize)?;
        line.push(b'\n');

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::append_blocking(&path, &line))
            .await
            .map_err(|e| StoreError::Unavailable(format!("write task failed: {e}")))??;

        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());

        Ok(record)
    }
}
