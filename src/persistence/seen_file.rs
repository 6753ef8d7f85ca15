//! On-disk format of the seen-PR file.
//!
//! # File Format
//!
//! ```text
//! {
//!   "version": "1.0",
//!   "last_updated": "2024-01-15T12:00:00Z",
//!   "prs": [
//!     { "id": 1234, "timestamp": "2024-01-15T11:58:03Z" },
//!     987
//!   ]
//! }
//! ```
//!
//! A bare integer in `prs` is a record written before timestamps existed. It
//! has no age and is never expired.
//!
//! # Atomic Writes
//!
//! The file is published with write-to-temp-then-rename:
//! 1. Write to `<path>.tmp`
//! 2. fsync the temp file
//! 3. Rename to `<path>`
//! 4. fsync the parent directory
//!
//! Readers see either the old or the new file, never a partial write.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::fsync::{fsync_dir, fsync_file, parent_dir};
use crate::types::PrId;

/// Format version written to every file.
pub const FORMAT_VERSION: &str = "1.0";

/// Errors that can occur while reading or writing the seen-PR file.
#[derive(Debug, Error)]
pub enum SeenFileError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for seen-file operations.
pub type Result<T> = std::result::Result<T, SeenFileError>;

/// One element of the `prs` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeenRecord {
    /// A record with the time it was first seen.
    Timestamped {
        id: PrId,
        #[serde(deserialize_with = "deserialize_timestamp")]
        timestamp: DateTime<Utc>,
    },

    /// A bare identifier with no known timestamp.
    Legacy(PrId),
}

impl SeenRecord {
    pub fn id(&self) -> PrId {
        match self {
            SeenRecord::Timestamped { id, .. } | SeenRecord::Legacy(id) => *id,
        }
    }

    /// Returns the time the record was first seen, or `None` for legacy records.
    pub fn seen_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SeenRecord::Timestamped { timestamp, .. } => Some(*timestamp),
            SeenRecord::Legacy(_) => None,
        }
    }

    /// Builds the record for an identifier with an optional timestamp.
    pub fn new(id: PrId, seen_at: Option<DateTime<Utc>>) -> Self {
        match seen_at {
            Some(timestamp) => SeenRecord::Timestamped { id, timestamp },
            None => SeenRecord::Legacy(id),
        }
    }
}

/// Parses an ISO-8601 timestamp. Offsets (including `Z`) are honoured; a
/// timestamp without an offset is taken to be UTC.
pub fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(serde::de::Error::custom)
}

/// The file as written to disk.
#[derive(Debug, Serialize)]
struct SeenFileOut<'a> {
    version: &'a str,
    last_updated: DateTime<Utc>,
    prs: &'a [SeenRecord],
}

/// The top level of the file as read from disk. Records and the version stay
/// raw so that a single bad field can be skipped without rejecting the whole
/// file.
#[derive(Debug, Deserialize)]
struct SeenFileIn {
    #[serde(default)]
    version: Option<serde_json::Value>,
    #[serde(default)]
    prs: Vec<serde_json::Value>,
}

/// A record that could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Position in the `prs` array.
    pub index: usize,
    /// The raw JSON element.
    pub raw: serde_json::Value,
    pub reason: String,
}

/// A decoded seen-PR file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSeenFile {
    pub version: Option<String>,
    pub records: Vec<SeenRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl DecodedSeenFile {
    /// Number of elements in the file's `prs` array, decodable or not.
    pub fn total_records(&self) -> usize {
        self.records.len() + self.rejected.len()
    }
}

/// Decodes file contents. Fails only if the top level is not a JSON object
/// with an array-valued `prs`; individual bad records are reported in
/// `rejected`.
pub fn decode(bytes: &[u8]) -> Result<DecodedSeenFile> {
    let file: SeenFileIn = serde_json::from_slice(bytes)?;
    let mut records = Vec::with_capacity(file.prs.len());
    let mut rejected = Vec::new();

    for (index, raw) in file.prs.into_iter().enumerate() {
        match SeenRecord::deserialize(&raw) {
            Ok(record) => records.push(record),
            Err(e) => rejected.push(RejectedRecord {
                index,
                raw,
                reason: e.to_string(),
            }),
        }
    }

    let version = match file.version {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(version)) => Some(version),
        Some(other) => Some(other.to_string()),
    };

    Ok(DecodedSeenFile {
        version,
        records,
        rejected,
    })
}

/// Reads and decodes the file, returning `None` if it does not exist.
pub fn read_seen_file(path: &Path) -> Result<Option<DecodedSeenFile>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    decode(&bytes).map(Some)
}

/// Returns the sibling temp path used while publishing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serializes the records and writes them, fully synced, to the temp path.
///
/// The file at `path` is untouched until [`publish`] is called.
pub fn write_temp(
    path: &Path,
    records: &[SeenRecord],
    last_updated: DateTime<Utc>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(parent_dir(path))?;

    let tmp_path = temp_path(path);
    let bytes = serde_json::to_vec_pretty(&SeenFileOut {
        version: FORMAT_VERSION,
        last_updated,
        prs: records,
    })?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;
    file.write_all(&bytes)?;
    fsync_file(&file)?;

    Ok(tmp_path)
}

/// Atomically replaces `path` with `tmp_path` and makes the rename durable.
pub fn publish(tmp_path: &Path, path: &Path) -> Result<()> {
    std::fs::rename(tmp_path, path)?;
    fsync_dir(parent_dir(path))?;
    Ok(())
}

/// Writes the records to `path` atomically.
///
/// On error a temp file may be left behind; the caller decides whether to
/// remove it.
pub fn save_atomic(path: &Path, records: &[SeenRecord], last_updated: DateTime<Utc>) -> Result<()> {
    let tmp_path = write_temp(path, records, last_updated)?;
    publish(&tmp_path, path)
}
