//! Content fingerprint persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StateError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt state file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupState {
    pub content_hash: String,
    pub recorded_at: DateTime<Utc>,
}

/// Hex MD5 of the trimmed body.
pub fn content_digest(body: &str) -> String {
    format!("{:x}", md5::compute(body.trim().as_bytes()))
}

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<DedupState>, StateError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Like [`load`](Self::load), but an unreadable file counts as no state.
    pub fn load_or_empty(&self) -> Option<DedupState> {
        match self.load() {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable dedup state");
                None
            }
        }
    }

    /// Replace the stored hash via temp file and rename.
    pub fn save(&self, content_hash: &str) -> Result<DedupState, StateError> {
        let state = DedupState {
            content_hash: content_hash.to_string(),
            recorded_at: Utc::now(),
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(serde_json::to_string_pretty(&state)?.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StateError::Io(e.error))?;

        debug!(path = %self.path.display(), hash = %state.content_hash, "dedup state saved");
        Ok(state)
    }
}
