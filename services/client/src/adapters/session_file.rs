//! services/client/src/adapters/session_file.rs
//!
//! Durable session storage: a small JSON file holding the token and user
//! under fixed keys, cleared wholesale on logout. This is the concrete
//! implementation of the `SessionPersistence` port.

use chrono::{DateTime, Utc};
use readr_core::domain::{Session, User};
use readr_core::ports::{PortError, PortResult, SessionPersistence};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// File-backed session store.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// On-disk layout. Kept separate from the domain type so the persisted
/// format does not leak into the core.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user_id: String,
    user_email: String,
    logged_in_at: DateTime<Utc>,
}

impl StoredSession {
    fn from_domain(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            user_id: session.user.id.clone(),
            user_email: session.user.email.clone(),
            logged_in_at: session.logged_in_at,
        }
    }

    fn to_domain(self) -> Session {
        Session {
            token: self.token,
            user: User {
                id: self.user_id,
                email: self.user_email,
            },
            logged_in_at: self.logged_in_at,
        }
    }
}

impl SessionPersistence for FileSessionStore {
    fn load(&self) -> PortResult<Option<Session>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };

        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) => Ok(Some(stored.to_domain())),
            Err(e) => {
                // A corrupt store is treated as logged-out rather than fatal.
                warn!("Discarding unreadable session file: {e}");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&StoredSession::from_domain(session))
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| PortError::Unexpected(e.to_string()))
    }

    fn clear(&self) -> PortResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_at(name: &str) -> FileSessionStore {
        let mut path = std::env::temp_dir();
        path.push(format!("readr-session-test-{}-{}", name, std::process::id()));
        path.push("session.json");
        let _ = fs::remove_file(&path);
        FileSessionStore::new(path)
    }

    fn sample() -> Session {
        Session {
            token: "tok".to_string(),
            user: User {
                id: "u1".to_string(),
                email: "reader@example.com".to_string(),
            },
            logged_in_at: Utc::now(),
        }
    }

    #[test]
    fn round_trips_across_load_and_save() {
        let store = store_at("roundtrip");
        assert!(store.load().unwrap().is_none());

        store.save(&sample()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token, "tok");
        assert_eq!(loaded.user.email, "reader@example.com");
    }

    #[test]
    fn clear_removes_the_file_and_is_idempotent() {
        let store = store_at("clear");
        store.save(&sample()).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_reads_as_logged_out() {
        let store = store_at("corrupt");
        fs::create_dir_all(store.path.parent().unwrap()).unwrap();
        fs::write(&store.path, "{not json").unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
