//! Store Snapshot Creation/Loading
//!
//! Atomic snapshot creation with COMPLETE marker and checksum verification.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::audit::AuditEntry;
use crate::models::{RateEntry, Transaction};

const FORMAT_VERSION: u32 = 1;
const DATA_FILE: &str = "store.json";
const METADATA_FILE: &str = "metadata.json";
const COMPLETE_MARKER: &str = "COMPLETE";
const LATEST_FILE: &str = "LATEST";

/// Number of completed snapshots kept on disk
const KEEP_SNAPSHOTS: usize = 2;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Snapshot incomplete: {0}")]
    Incomplete(PathBuf),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Unsupported snapshot format version: {0}")]
    UnsupportedVersion(u32),
}

// ============================================================
// Snapshot Payload & Metadata
// ============================================================

/// Everything the store holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub rates: Vec<RateEntry>,
    pub transactions: Vec<Transaction>,
    pub audit: Vec<AuditEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub format_version: u32,
    pub rate_count: usize,
    pub transaction_count: usize,
    pub audit_count: usize,
    pub data_checksum: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================
// Store Snapshotter
// ============================================================

pub struct StoreSnapshotter {
    snapshot_dir: PathBuf,
}

impl StoreSnapshotter {
    pub fn new(snapshot_dir: impl AsRef<Path>) -> Self {
        Self {
            snapshot_dir: snapshot_dir.as_ref().to_path_buf(),
        }
    }

    /// Create an atomic snapshot
    ///
    /// Protocol:
    /// 1. Create .tmp-{timestamp}/
    /// 2. Write store.json and fsync
    /// 3. Write metadata.json with CRC32 of store.json
    /// 4. Write COMPLETE marker
    /// 5. Atomic rename to snapshot-{timestamp}/
    /// 6. Point LATEST at it (write-then-rename)
    /// 7. Prune older snapshots
    pub fn save(&self, snapshot: &StoreSnapshot) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(&self.snapshot_dir)?;

        let created_at = Utc::now();
        let stamp = created_at.timestamp_millis();
        let tmp_dir = self.snapshot_dir.join(format!(".tmp-{}", stamp));
        fs::create_dir_all(&tmp_dir)?;

        let data = serde_json::to_vec(snapshot)?;
        write_synced(&tmp_dir.join(DATA_FILE), &data)?;

        let metadata = SnapshotMetadata {
            format_version: FORMAT_VERSION,
            rate_count: snapshot.rates.len(),
            transaction_count: snapshot.transactions.len(),
            audit_count: snapshot.audit.len(),
            data_checksum: checksum(&data),
            created_at,
        };
        write_synced(
            &tmp_dir.join(METADATA_FILE),
            &serde_json::to_vec_pretty(&metadata)?,
        )?;
        write_synced(&tmp_dir.join(COMPLETE_MARKER), b"")?;

        let name = format!("snapshot-{}", stamp);
        let final_dir = self.snapshot_dir.join(&name);
        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&tmp_dir, &final_dir)?;

        let latest_tmp = self.snapshot_dir.join(format!("{}.tmp", LATEST_FILE));
        write_synced(&latest_tmp, name.as_bytes())?;
        fs::rename(&latest_tmp, self.snapshot_dir.join(LATEST_FILE))?;

        info!(
            path = %final_dir.display(),
            transactions = metadata.transaction_count,
            rates = metadata.rate_count,
            "Store snapshot written"
        );

        self.prune(&name)?;
        Ok(final_dir)
    }

    /// Load the latest snapshot, if any
    ///
    /// Returns `Ok(None)` when no snapshot has been written yet.
    pub fn load_latest(&self) -> Result<Option<StoreSnapshot>, SnapshotError> {
        let latest_path = self.snapshot_dir.join(LATEST_FILE);
        let name = match fs::read_to_string(&latest_path) {
            Ok(name) => name.trim().to_string(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        self.load(&self.snapshot_dir.join(name)).map(Some)
    }

    /// Load and verify one snapshot directory
    pub fn load(&self, dir: &Path) -> Result<StoreSnapshot, SnapshotError> {
        if !dir.join(COMPLETE_MARKER).exists() {
            return Err(SnapshotError::Incomplete(dir.to_path_buf()));
        }

        let metadata: SnapshotMetadata =
            serde_json::from_slice(&fs::read(dir.join(METADATA_FILE))?)?;
        if metadata.format_version != FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(metadata.format_version));
        }

        let data = fs::read(dir.join(DATA_FILE))?;
        let actual = checksum(&data);
        if actual != metadata.data_checksum {
            return Err(SnapshotError::ChecksumMismatch {
                expected: metadata.data_checksum,
                actual,
            });
        }

        Ok(serde_json::from_slice(&data)?)
    }

    fn prune(&self, keep_latest: &str) -> Result<(), SnapshotError> {
        let mut names: Vec<String> = fs::read_dir(&self.snapshot_dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.starts_with("snapshot-"))
            .collect();
        // snapshot-{millis}: same digit count for the foreseeable future
        names.sort();

        let excess = names.len().saturating_sub(KEEP_SNAPSHOTS);
        for name in names.into_iter().take(excess) {
            if name == keep_latest {
                continue;
            }
            if let Err(e) = fs::remove_dir_all(self.snapshot_dir.join(&name)) {
                warn!(snapshot = %name, error = %e, "Failed to prune old snapshot");
            }
        }
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

fn checksum(data: &[u8]) -> String {
    format!("{:08x}", crc32fast::hash(data))
}
