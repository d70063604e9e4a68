//! Durable storage for the mirror snapshot
//!
//! One serialized snapshot under one well-known key, overwritten wholesale.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::MirrorError;

/// Storage key of the mirror snapshot
pub const DEFAULT_STATE_KEY: &str = "surf_school_state";

/// Where the serialized mirror lives between runs
pub trait SnapshotStore: Send + Sync {
    /// Previously saved snapshot, if any
    fn load(&self) -> Result<Option<String>, MirrorError>;

    /// Replace the saved snapshot
    fn save(&self, contents: &str) -> Result<(), MirrorError>;
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for Arc<T> {
    fn load(&self) -> Result<Option<String>, MirrorError> {
        (**self).load()
    }

    fn save(&self, contents: &str) -> Result<(), MirrorError> {
        (**self).save(contents)
    }
}

/// Snapshot file: `{data_dir}/{key}.json`
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(data_dir: &Path, key: &str) -> Self {
        Self {
            path: data_dir.join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<String>, MirrorError> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }

    fn save(&self, contents: &str) -> Result<(), MirrorError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash never leaves a truncated snapshot
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Snapshot held in memory (tests, ephemeral sessions)
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    contents: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing serialized snapshot
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// Last saved snapshot
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<String>, MirrorError> {
        Ok(self.contents.lock().clone())
    }

    fn save(&self, contents: &str) -> Result<(), MirrorError> {
        *self.contents.lock() = Some(contents.to_string());
        Ok(())
    }
}
