//! Session persistence.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::SessionError;
use crate::session::SessionRecord;

/// Per-session storage for tokens and pending sign-ins.
pub trait SessionStore: Send + Sync {
    /// Load the stored record. A missing record is an empty one.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if the record exists but cannot be read.
    fn load(&self) -> Result<SessionRecord, SessionError>;

    /// # Errors
    /// Returns [`SessionError::Storage`] if the record cannot be written.
    fn save(&self, record: &SessionRecord) -> Result<(), SessionError>;

    /// # Errors
    /// Returns [`SessionError::Storage`] if the record cannot be removed.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Keeps the record in process memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<SessionRecord>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(record: SessionRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionRecord, SessionError> {
        Ok(self.record.lock().clone())
    }

    fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        *self.record.lock() = record.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.record.lock() = SessionRecord::default();
        Ok(())
    }
}

/// JSON file store. On unix the file is created with mode `0600`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, action: &str, err: &impl std::fmt::Display) -> SessionError {
        SessionError::Storage(format!("{action} {}: {err}", self.path.display()))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<SessionRecord, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SessionRecord::default()),
            Err(e) => return Err(self.storage_error("read", &e)),
        };
        serde_json::from_str(&raw).map_err(|e| self.storage_error("parse", &e))
    }

    fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.storage_error("create dir for", &e))?;
        }

        let json = serde_json::to_vec_pretty(record).map_err(|e| self.storage_error("encode", &e))?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .map_err(|e| self.storage_error("open", &e))?;
        file.write_all(&json)
            .map_err(|e| self.storage_error("write", &e))?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error("remove", &e)),
        }
    }
}
