//! Persisted browser session (opaque credential blob).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::storage::write_atomic;

/// Authentication progress of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    /// Waiting for the operator to log in by hand.
    AwaitingManualAuth,
    /// Exported after manual login and written to disk.
    SessionPersisted,
    /// Imported from disk at startup.
    SessionRestored,
}

impl SessionState {
    pub fn is_authenticated(self) -> bool {
        matches!(self, SessionState::SessionPersisted | SessionState::SessionRestored)
    }
}

/// Default path for the session blob: `~/.local/state/spamirror/session.bin`.
pub fn default_session_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("spamirror")?;
    Ok(xdg_dirs.get_state_home().join("spamirror").join("session.bin"))
}

/// File-backed session store. A missing file means "no session".
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Vec<u8>>> {
        match std::fs::read(&self.path) {
            Ok(b) => Ok(Some(b)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read session: {}", self.path.display())),
        }
    }

    pub fn save(&self, blob: &[u8]) -> Result<()> {
        write_atomic(&self.path, blob)
            .with_context(|| format!("write session: {}", self.path.display()))
    }

    /// Deletes the stored blob. Returns false if there was none.
    pub fn forget(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("remove session: {}", self.path.display())),
        }
    }
}
