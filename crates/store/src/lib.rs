//! `minigen-store` -- file-backed session state.
//!
//! [`SessionStore`] is the persistence layer the web client kept in
//! browser `localStorage`: a handful of string values under fixed keys
//! that must survive a restart.  It is a single JSON object on disk,
//! loaded once at startup and rewritten on every mutation.
//! Last-writer-wins is acceptable -- one user, one process.

pub mod keys;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use minigen_core::JobResultPayload;

/// Errors from reading or writing the session file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem read/write failed.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be serialized.
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistent key-value store for session state.
///
/// All reads are served from memory; every mutation rewrites the
/// backing file.  A missing or corrupt file loads as an empty store --
/// cached state is best-effort and never authoritative.
pub struct SessionStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl SessionStore {
    /// Open the store at `path`, loading existing values if the file
    /// is present and parseable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Session file corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value by key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().expect("store mutex poisoned").get(key).cloned()
    }

    /// Write a value and persist the store.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().expect("store mutex poisoned");
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }

    /// Remove a key and persist the store.  Removing an absent key is
    /// a no-op.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().expect("store mutex poisoned");
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }

    // ---- typed accessors for the fixed keys ----

    /// Id of the most recently submitted job, if any.
    pub fn last_job_id(&self) -> Option<String> {
        self.get(keys::LAST_JOB_ID)
    }

    /// Record the most recently submitted job id.
    pub fn set_last_job_id(&self, id: &str) -> Result<(), StoreError> {
        self.set(keys::LAST_JOB_ID, id)
    }

    /// Last observed job result, if one was stored and still parses.
    pub fn last_job_result(&self) -> Option<JobResultPayload> {
        let text = self.get(keys::LAST_JOB_RESULT)?;
        match serde_json::from_str(&text) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!(error = %e, "Stored job result corrupt, ignoring");
                None
            }
        }
    }

    /// Record the last observed job result.
    pub fn set_last_job_result(&self, result: &JobResultPayload) -> Result<(), StoreError> {
        self.set(keys::LAST_JOB_RESULT, &serde_json::to_string(result)?)
    }

    /// Drop both the cached job id and result.  Called when the
    /// service reports the job as unknown.
    pub fn clear_last_job(&self) -> Result<(), StoreError> {
        let mut values = self.values.lock().expect("store mutex poisoned");
        let removed_id = values.remove(keys::LAST_JOB_ID).is_some();
        let removed_result = values.remove(keys::LAST_JOB_RESULT).is_some();
        if removed_id || removed_result {
            self.flush(&values)?;
        }
        Ok(())
    }

    /// Stored bearer token, if any.
    pub fn auth_token(&self) -> Option<String> {
        self.get(keys::AUTH_TOKEN)
    }

    /// Persist the bearer token obtained from an auth exchange.
    pub fn set_auth_token(&self, token: &str) -> Result<(), StoreError> {
        self.set(keys::AUTH_TOKEN, token)
    }

    /// Whether the dev-mode flag is set.
    pub fn dev_mode(&self) -> bool {
        self.get(keys::DEV_MODE).as_deref() == Some("true")
    }

    /// Set or clear the dev-mode flag.
    pub fn set_dev_mode(&self, enabled: bool) -> Result<(), StoreError> {
        if enabled {
            self.set(keys::DEV_MODE, "true")
        } else {
            self.remove(keys::DEV_MODE)
        }
    }

    // ---- private helpers ----

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}
