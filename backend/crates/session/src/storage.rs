//! Session Storage Backends
//!
//! The record is written and removed as a single unit. The file
//! backend writes to a sibling temp file and renames over the target,
//! so a crash mid-write leaves either the old record or the new one,
//! never a torn half.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::SessionError;
use crate::state::StoredSession;

/// Where the session record lives between runs
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>, SessionError>;
    fn save(&self, session: &StoredSession) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

// ============================================================================
// Memory backend
// ============================================================================

/// In-memory storage (tests and ephemeral sessions)
#[derive(Default)]
pub struct MemoryStorage {
    record: Mutex<Option<StoredSession>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        Ok(self.record.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

// ============================================================================
// File backend
// ============================================================================

/// JSON file storage
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Storage(e.to_string())),
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt record is treated as absent; the next save
                // replaces it.
                tracing::warn!(error = %e, "Discarding unreadable session record");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        let tmp = self.temp_path();
        fs::write(&tmp, &json).map_err(|e| SessionError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| SessionError::Storage(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Profile;

    fn session(token: &str) -> StoredSession {
        StoredSession {
            access_token: token.to_string(),
            refresh_token: Some("refresh".to_string()),
            access_expires_at: None,
            profile: Profile {
                account_id: "7e3f".to_string(),
                user_name: "karim_h".to_string(),
                email: "karim@example.com".to_string(),
                role: "author".to_string(),
            },
        }
    }

    #[test]
    fn test_memory_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_none());

        storage.save(&session("t1")).unwrap();
        assert_eq!(storage.load().unwrap().unwrap().access_token, "t1");

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        assert!(storage.load().unwrap().is_none());
        storage.save(&session("t1")).unwrap();
        assert_eq!(storage.load().unwrap().unwrap().access_token, "t1");

        // Overwrite replaces the whole record
        storage.save(&session("t2")).unwrap();
        assert_eq!(storage.load().unwrap().unwrap().access_token, "t2");

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        // Clearing twice is fine
        storage.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(storage.load().unwrap().is_none());
    }
}
