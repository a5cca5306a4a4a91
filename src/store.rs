//! Durable flags — the two booleans the tour remembers across sessions.
//!
//! Read once at mount, written only when the tour is dismissed, restarted or
//! the welcome is acknowledged. Concurrent writers are not coordinated; the
//! last write wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;

/// Keys of the persisted flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    #[serde(rename = "onboardingCompleted")]
    OnboardingCompleted,
    #[serde(rename = "hasSeenWelcome")]
    HasSeenWelcome,
}

impl Flag {
    pub fn key(&self) -> &'static str {
        match self {
            Self::OnboardingCompleted => "onboardingCompleted",
            Self::HasSeenWelcome => "hasSeenWelcome",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Durable boolean key-value store. Absent flags read as `false`.
pub trait FlagStore: Send + Sync {
    fn get(&self, flag: Flag) -> Result<bool, StoreError>;

    fn set(&self, flag: Flag, value: bool) -> Result<(), StoreError>;
}

/// Process-lifetime store, for tests and hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: RwLock<HashMap<Flag, bool>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with initial values.
    pub fn with_flags(flags: &[(Flag, bool)]) -> Self {
        Self {
            flags: RwLock::new(flags.iter().copied().collect()),
        }
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, flag: Flag) -> Result<bool, StoreError> {
        let flags = self.flags.read().unwrap_or_else(|e| e.into_inner());
        Ok(flags.get(&flag).copied().unwrap_or(false))
    }

    fn set(&self, flag: Flag, value: bool) -> Result<(), StoreError> {
        let mut flags = self.flags.write().unwrap_or_else(|e| e.into_inner());
        flags.insert(flag, value);
        Ok(())
    }
}

/// On-disk document written by [`JsonFileFlagStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct FlagDocument {
    #[serde(default)]
    flags: HashMap<Flag, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Flags persisted as a small JSON file.
#[derive(Debug)]
pub struct JsonFileFlagStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<FlagDocument, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) if json.trim().is_empty() => Ok(FlagDocument::default()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FlagDocument::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl FlagStore for JsonFileFlagStore {
    fn get(&self, flag: Flag) -> Result<bool, StoreError> {
        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        let document = self.read_document()?;
        Ok(document.flags.get(&flag).copied().unwrap_or(false))
    }

    fn set(&self, flag: Flag, value: bool) -> Result<(), StoreError> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let mut document = self.read_document()?;
        document.flags.insert(flag, value);
        document.updated_at = Some(Utc::now());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&document)?)?;
        debug!(flag = %flag, value, path = %self.path.display(), "Persisted tour flag");
        Ok(())
    }
}
