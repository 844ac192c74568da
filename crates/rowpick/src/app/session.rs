//! Session persistence utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const SESSION_DIR: &str = ".rowpick";
const SESSION_FILE: &str = "session.json";

/// Snapshot of interactive UI state persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Name of the dataset the snapshot belongs to; snapshots from another
    /// dataset are ignored on restore.
    pub dataset: String,
    /// Previously selected row ids.
    pub selected: Vec<String>,
    /// Anchor row id for range gestures.
    pub anchor: Option<String>,
    /// Active row filter.
    pub filter: Option<String>,
    /// Zero-based page the view was on.
    pub page: usize,
}

/// Persists UI state to a session file under `.rowpick/`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
    path: PathBuf,
}

impl SessionStore {
    /// Create a new store rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let path = root.join(SESSION_DIR).join(SESSION_FILE);
        Self { root, path }
    }

    /// Location of the persisted session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the most recently persisted session snapshot.
    pub fn load(&self) -> Result<Option<SessionSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session file at {}", self.path.display()))?;
        let snapshot = serde_json::from_str(&data)
            .with_context(|| format!("invalid session data in {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    /// Persist the provided snapshot to disk, creating parent directories as
    /// needed.
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let dir = self.path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create session directory {}", dir.display()))?;

        let data = serde_json::to_string_pretty(snapshot)
            .context("failed to serialize session snapshot")?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write session file to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let store = SessionStore::new(temp.path());

        let snapshot = SessionSnapshot {
            dataset: "deployments".into(),
            selected: vec!["web".into(), "api".into()],
            anchor: Some("api".into()),
            filter: Some("prod".into()),
            page: 2,
        };
        store.save(&snapshot)?;

        let loaded = store.load()?.expect("snapshot present");
        assert_eq!(loaded, snapshot);
        Ok(())
    }

    #[test]
    fn missing_file_loads_none() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let store = SessionStore::new(temp.path());
        assert!(store.load()?.is_none());
        Ok(())
    }

    #[test]
    fn corrupt_file_is_an_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let store = SessionStore::new(temp.path());
        fs::create_dir_all(store.path().parent().unwrap())?;
        fs::write(store.path(), "not json")?;
        assert!(store.load().is_err());
        Ok(())
    }
}
