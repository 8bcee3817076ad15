//! Durable storage for the session credential.
//!
//! The file store keeps the access credential in `<base>/credentials.json`
//! with restricted permissions (0600). The credential is never logged.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Single-slot store for the opaque access credential. Absence means the
/// session is anonymous.
pub trait CredentialStore: Send + Sync {
    /// Replaces the stored credential.
    ///
    /// # Errors
    /// Returns an error if the credential cannot be persisted.
    fn save(&self, credential: &str) -> Result<()>;

    /// Returns the stored credential, if any.
    ///
    /// # Errors
    /// Returns an error if the slot exists but cannot be read.
    fn load(&self) -> Result<Option<String>>;

    /// Removes the stored credential. Returns whether one was present.
    ///
    /// # Errors
    /// Returns an error if the slot cannot be removed.
    fn clear(&self) -> Result<bool>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CredentialFile {
    access: String,
}

/// File-backed store that survives restarts.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store at the default location under the sweets home.
    pub fn new() -> Self {
        Self::at(paths::credentials_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, credential: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(&CredentialFile {
            access: credential.to_string(),
        })
        .context("Failed to serialize credential")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credential from {}", self.path.display()))?;
        let file: CredentialFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credential from {}", self.path.display()))?;

        Ok(Some(file.access).filter(|access| !access.is_empty()))
    }

    fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        Ok(true)
    }
}

/// In-process store, used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(credential.into())),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, credential: &str) -> Result<()> {
        let mut slot = self.slot();
        *slot = Some(credential.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        let slot = self.slot();
        Ok(slot.clone())
    }

    fn clear(&self) -> Result<bool> {
        let mut slot = self.slot();
        Ok(slot.take().is_some())
    }
}

/// Returns a masked version of a credential for display.
pub fn mask_credential(credential: &str) -> String {
    if credential.len() <= 16 {
        return "***".to_string();
    }
    let head: String = credential.chars().take(8).collect();
    format!("{head}...")
}
