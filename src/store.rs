//! The override file and its single backup slot.
//!
//! The override file is provisioned outside this crate; a missing file is a
//! fault, never an empty record set. There is no locking: each call assumes
//! it is the only writer.

use crate::config::OverrideConfig;
use crate::error::{OverrideError, Result};
use crate::record::{Line, Record, parse_line, parse_records};
use crate::util::is_read_write;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads and mutates the override file.
///
/// # Lifecycle
///
/// 1. [`add_record`](Self::add_record) copies the file into the backup slot,
///    then appends one line.
/// 2. [`delete_record`](Self::delete_record) rewrites the file without the
///    matching lines. It does not touch the backup slot.
/// 3. [`restore_from_backup`](Self::restore_from_backup) copies the slot back
///    over the file, leaving the slot in place.
///
/// Duplicate checks are the caller's job; see
/// [`record_exists`](Self::record_exists).
///
/// # Example
///
/// ```rust,ignore
/// use dns_overrides::RecordStore;
///
/// let store = RecordStore::new("/etc/pihole/custom.list", "/etc/pihole/custom.list.old");
/// if !store.record_exists("192.168.1.2", "nas.home.lab") {
///     store.add_record("192.168.1.2", "nas.home.lab")?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RecordStore {
    records_path: PathBuf,
    backup_path: PathBuf,
}

impl RecordStore {
    /// Creates a store over an explicit file pair.
    #[must_use]
    pub fn new(records_path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            records_path: records_path.into(),
            backup_path: backup_path.into(),
        }
    }

    /// Creates a store from the configured paths.
    #[must_use]
    pub fn from_config(config: &OverrideConfig) -> Self {
        Self::new(&config.records_path, &config.backup_path)
    }

    /// Returns the override file path.
    #[must_use]
    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    /// Returns the backup slot path.
    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Returns every record in file order.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::FileAccess`] if the file cannot be read.
    pub fn read_records(&self) -> Result<Vec<Record>> {
        Ok(parse_records(&self.read_content()?))
    }

    /// Returns `true` if `(address, name)` is present.
    ///
    /// An unreadable file counts as "not present".
    #[must_use]
    pub fn record_exists(&self, address: &str, name: &str) -> bool {
        match self.read_records() {
            Ok(records) => records.iter().any(|r| r.matches(address, name)),
            Err(e) => {
                tracing::debug!(error = %e, "Override file unreadable during existence check");
                false
            }
        }
    }

    /// Snapshots the file into the backup slot, then appends `address name`.
    ///
    /// Nothing is appended if the snapshot fails, and the previous snapshot
    /// is kept if the file cannot be read.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::FileAccess`] if the read, the backup write or
    /// the append fails.
    pub fn add_record(&self, address: &str, name: &str) -> Result<()> {
        let record = Record::new(address, name);
        let bytes = self.read_bytes()?;
        self.backup(&bytes)?;

        let separator = if bytes.is_empty() || bytes.last() == Some(&b'\n') {
            ""
        } else {
            "\n"
        };
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.records_path)
            .map_err(|e| OverrideError::file_access(&self.records_path, e))?;
        file.write_all(format!("{separator}{record}\n").as_bytes())
            .map_err(|e| OverrideError::file_access(&self.records_path, e))?;

        tracing::info!(
            address = %record.address(),
            name = %record.name(),
            path = %self.records_path.display(),
            "Added override record"
        );
        Ok(())
    }

    /// Removes every line equal to `(address, name)` in a single rewrite.
    ///
    /// Other lines, including malformed or non-UTF-8 ones, are kept byte for
    /// byte. Returns the number of lines removed.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::FileAccess`] on read or write failure.
    pub fn delete_record(&self, address: &str, name: &str) -> Result<usize> {
        let bytes = self.read_bytes()?;
        let mut removed = 0;
        let mut kept = Vec::with_capacity(bytes.len());
        for line in raw_lines(&bytes) {
            let text = String::from_utf8_lossy(line);
            if matches!(parse_line(&text), Line::Record(r) if r.matches(address, name)) {
                removed += 1;
                continue;
            }
            kept.extend_from_slice(line);
            kept.push(b'\n');
        }

        std::fs::write(&self.records_path, kept)
            .map_err(|e| OverrideError::file_access(&self.records_path, e))?;

        tracing::info!(
            address = %address,
            name = %name,
            removed,
            path = %self.records_path.display(),
            "Deleted override record"
        );
        Ok(removed)
    }

    /// Copies the backup slot over the override file.
    ///
    /// The slot is left in place, so repeated restores are idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::NoBackup`] if the slot is empty, or
    /// [`OverrideError::FileAccess`] naming the backup if it cannot be read
    /// and the override file if it cannot be written.
    pub fn restore_from_backup(&self) -> Result<()> {
        if !self.backup_path.exists() {
            tracing::warn!(path = %self.backup_path.display(), "No backup to restore");
            return Err(OverrideError::NoBackup {
                path: self.backup_path.clone(),
            });
        }
        let snapshot = std::fs::read(&self.backup_path)
            .map_err(|e| OverrideError::file_access(&self.backup_path, e))?;
        std::fs::write(&self.records_path, snapshot)
            .map_err(|e| OverrideError::file_access(&self.records_path, e))?;

        tracing::info!(
            from = %self.backup_path.display(),
            to = %self.records_path.display(),
            "Restored override file from backup"
        );
        Ok(())
    }

    /// Returns `true` if the override file is readable and writable.
    #[must_use]
    pub fn is_file_accessible(&self) -> bool {
        is_read_write(&self.records_path)
    }

    /// Returns the number of records, or 0 if the file is unreadable.
    ///
    /// For health reporting only; 0 does not imply an empty file.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.read_records().map_or(0, |r| r.len())
    }

    fn backup(&self, snapshot: &[u8]) -> Result<()> {
        std::fs::write(&self.backup_path, snapshot)
            .map_err(|e| OverrideError::file_access(&self.backup_path, e))?;
        tracing::debug!(
            from = %self.records_path.display(),
            to = %self.backup_path.display(),
            "Snapshotted override file"
        );
        Ok(())
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.records_path)
            .map_err(|e| OverrideError::file_access(&self.records_path, e))
    }

    /// Reads the file, replacing invalid UTF-8 with U+FFFD.
    fn read_content(&self) -> Result<String> {
        let bytes = self.read_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Splits on `\n`, without a trailing empty line after a final newline.
fn raw_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    (!bytes.is_empty())
        .then(|| body.split(|b| *b == b'\n'))
        .into_iter()
        .flatten()
}
