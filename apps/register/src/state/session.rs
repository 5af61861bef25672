//! # Session State
//!
//! The logged-in operator, as an explicit context object.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   start(cpf) ──────► Session { id, cpf, started_at }                    │
//! │        │             store: isAuthenticated = "true"                    │
//! │        │                    userCPF         = "123.456.789-09"          │
//! │        ▼                                                                │
//! │   require() ───────► Ok(Session) │ Err(Unauthenticated)                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   end() ───────────► both keys removed, session dropped                 │
//! │                                                                         │
//! │   restore() rebuilds the session from the store after a restart.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store only ever holds the flag and the formatted CPF. There is no
//! credential check behind it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use adega_core::Cpf;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiError;

pub const AUTH_FLAG_KEY: &str = "isAuthenticated";
pub const USER_CPF_KEY: &str = "userCPF";

// =============================================================================
// Key/Value Store
// =============================================================================

/// Flat string storage that survives between screens.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}

/// Failure reading or writing the session file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Store backed by a small JSON object on disk, so a login survives a
/// restart of the register.
///
/// Write failures are logged and otherwise ignored; the in-memory copy
/// stays authoritative for the running process.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Opens (or lazily creates) the store at `path`. An unreadable or
    /// corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read(&path).unwrap_or_else(|e| {
            debug!(?path, error = %e, "Starting with an empty session store");
            HashMap::new()
        });
        JsonFileStore {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// `<data dir>/session.json`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br", "adegas", "pdv")
            .map(|dirs| dirs.data_dir().join("session.json"))
    }

    fn read(path: &Path) -> Result<HashMap<String, String>, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        if let Err(e) = self.write(entries) {
            warn!(path = ?self.path, error = %e, "Failed to persist session store");
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.flush(&entries);
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// An authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub cpf: Cpf,
    pub started_at: DateTime<Utc>,
}

impl Session {
    fn new(cpf: Cpf) -> Self {
        Session {
            id: Uuid::new_v4().to_string(),
            cpf,
            started_at: Utc::now(),
        }
    }
}

/// Shared session context.
#[derive(Clone)]
pub struct SessionState {
    store: Arc<dyn KeyValueStore>,
    current: Arc<Mutex<Option<Session>>>,
}

impl SessionState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        SessionState {
            store,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// In-memory session, nothing persisted.
    pub fn in_memory() -> Self {
        SessionState::new(Arc::new(MemoryStore::new()))
    }

    /// Opens a session for an already validated CPF, replacing any previous
    /// one.
    pub fn start(&self, cpf: Cpf) -> Session {
        let session = Session::new(cpf);

        self.store.set(AUTH_FLAG_KEY, "true");
        self.store.set(USER_CPF_KEY, &session.cpf.formatted());

        info!(session_id = %session.id, cpf = %session.cpf.masked(), "Session started");

        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = Some(session.clone());
        session
    }

    /// Rebuilds the session from the store. A missing flag or an invalid
    /// stored CPF leaves the register logged out.
    pub fn restore(&self) -> Option<Session> {
        if self.store.get(AUTH_FLAG_KEY).as_deref() != Some("true") {
            return None;
        }

        let cpf = match self.store.get(USER_CPF_KEY).map(|raw| Cpf::parse(&raw)) {
            Some(Ok(cpf)) => cpf,
            _ => {
                warn!("Discarding stored session with a missing or invalid CPF");
                self.clear_store();
                return None;
            }
        };

        let session = Session::new(cpf);
        debug!(session_id = %session.id, cpf = %session.cpf.masked(), "Session restored");

        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = Some(session.clone());
        Some(session)
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Guard for screens behind the login.
    pub fn require(&self) -> Result<Session, ApiError> {
        self.current().ok_or_else(ApiError::unauthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Ends the session. Safe to call when nobody is logged in.
    pub fn end(&self) {
        let ended = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        self.clear_store();

        if let Some(session) = ended {
            info!(session_id = %session.id, "Session ended");
        }
    }

    fn clear_store(&self) {
        self.store.remove(AUTH_FLAG_KEY);
        self.store.remove(USER_CPF_KEY);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpf() -> Cpf {
        Cpf::parse("12345678909").unwrap()
    }

    #[test]
    fn test_start_writes_flag_and_formatted_cpf() {
        let store = Arc::new(MemoryStore::new());
        let state = SessionState::new(store.clone());

        let session = state.start(cpf());
        assert_eq!(store.get(AUTH_FLAG_KEY).as_deref(), Some("true"));
        assert_eq!(store.get(USER_CPF_KEY).as_deref(), Some("123.456.789-09"));
        assert_eq!(state.require().unwrap().id, session.id);
    }

    #[test]
    fn test_require_without_login() {
        let state = SessionState::in_memory();
        assert!(!state.is_authenticated());
        assert_eq!(
            state.require().unwrap_err().code,
            crate::error::ErrorCode::Unauthenticated
        );
    }

    #[test]
    fn test_end_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let state = SessionState::new(store.clone());

        state.start(cpf());
        state.end();
        state.end();

        assert!(state.current().is_none());
        assert!(store.get(AUTH_FLAG_KEY).is_none());
        assert!(store.get(USER_CPF_KEY).is_none());
    }

    #[test]
    fn test_restore_from_store() {
        let store = Arc::new(MemoryStore::new());
        store.set(AUTH_FLAG_KEY, "true");
        store.set(USER_CPF_KEY, "123.456.789-09");

        let state = SessionState::new(store);
        let session = state.restore().unwrap();
        assert_eq!(session.cpf, cpf());
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_restore_rejects_tampered_cpf() {
        let store = Arc::new(MemoryStore::new());
        store.set(AUTH_FLAG_KEY, "true");
        store.set(USER_CPF_KEY, "111.111.111-11");

        let state = SessionState::new(store.clone());
        assert!(state.restore().is_none());
        assert!(store.get(AUTH_FLAG_KEY).is_none());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdv").join("session.json");

        let state = SessionState::new(Arc::new(JsonFileStore::open(&path)));
        state.start(cpf());

        let reopened = SessionState::new(Arc::new(JsonFileStore::open(&path)));
        assert_eq!(reopened.restore().map(|s| s.cpf), Some(cpf()));

        reopened.end();
        let after_logout = SessionState::new(Arc::new(JsonFileStore::open(&path)));
        assert!(after_logout.restore().is_none());
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(store.get(AUTH_FLAG_KEY).is_none());
        assert!(matches!(JsonFileStore::read(&path), Err(StoreError::Json(_))));
        assert!(matches!(
            JsonFileStore::read(&dir.path().join("absent.json")),
            Err(StoreError::Io(_))
        ));
    }
}
