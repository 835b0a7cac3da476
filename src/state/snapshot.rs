// Whole-collection backup file
// A versioned JSON document carrying a SHA256 checksum of the complaint list
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::models::{is_valid_tracking_id, Complaint};
use super::storage::{calculate_sha256, ensure_parent_dir};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("Tracking ID {0} is out of range")]
    InvalidTrackingId(u32),

    #[error("Tracking ID {0} appears more than once")]
    DuplicateTrackingId(u32),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    checksum: String,
    complaints: &'a [Complaint],
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    checksum: String,
    complaints: Vec<Complaint>,
}

/// Backup file holding the entire complaint collection
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the snapshot with the given collection.
    /// Writes to a sibling temp file first, then renames it into place.
    pub fn write(&self, complaints: &[Complaint]) -> SnapshotResult<()> {
        let payload = serde_json::to_vec(complaints)?;
        let snapshot = SnapshotOut {
            version: SNAPSHOT_VERSION,
            checksum: calculate_sha256(&payload),
            complaints,
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        ensure_parent_dir(&self.path)?;
        let tmp_path = self.tmp_path();
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        log::debug!(
            "Wrote snapshot of {} complaints to {}",
            complaints.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read the whole collection back.
    /// Returns `Ok(None)` when no snapshot file exists.
    pub fn read(&self) -> SnapshotResult<Option<Vec<Complaint>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot: SnapshotIn = serde_json::from_slice(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }

        let actual = calculate_sha256(&serde_json::to_vec(&snapshot.complaints)?);
        if actual != snapshot.checksum {
            return Err(SnapshotError::ChecksumMismatch {
                expected: snapshot.checksum,
                actual,
            });
        }

        check_tracking_ids(&snapshot.complaints)?;
        Ok(Some(snapshot.complaints))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn check_tracking_ids(complaints: &[Complaint]) -> SnapshotResult<()> {
    let mut seen = HashSet::with_capacity(complaints.len());
    for complaint in complaints {
        let id = complaint.tracking_id();
        if !is_valid_tracking_id(id) {
            return Err(SnapshotError::InvalidTrackingId(id));
        }
        if !seen.insert(id) {
            return Err(SnapshotError::DuplicateTrackingId(id));
        }
    }
    Ok(())
}
