//! services/client/src/session.rs
//!
//! The session store: the one piece of shared mutable authentication state.
//!
//! Modeled as an explicit context object with a narrow read/write interface
//! (`current`, `login`, `logout`) that is injected into consumers rather
//! than reached for as ambient global state. Initialized at process start
//! from persisted storage, torn down only at logout.

use readr_core::domain::Session;
use readr_core::ports::{PortError, PortResult, SessionPersistence};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Shared handle to the current authentication state.
///
/// Read by many (every authenticated request), written only by `login` and
/// `logout`; the inner lock is held only for the duration of a clone.
#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    store: Arc<dyn SessionPersistence>,
}

impl SessionContext {
    /// Builds the context, restoring any persisted session so it survives
    /// restarts. A corrupt or unreadable store is treated as logged-out,
    /// not as a fatal error.
    pub fn restore(store: Arc<dyn SessionPersistence>) -> Self {
        let restored = match store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not restore persisted session: {e}");
                None
            }
        };
        if let Some(session) = &restored {
            info!("Restored session for {}", session.user.email);
        }
        Self {
            current: Arc::new(RwLock::new(restored)),
            store,
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// `token` present is what authenticated means; there is no separate flag.
    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// The bearer token for authorizing backend requests.
    pub fn bearer_token(&self) -> PortResult<String> {
        self.current()
            .map(|s| s.token)
            .ok_or(PortError::Unauthorized)
    }

    pub fn user_email(&self) -> PortResult<String> {
        self.current()
            .map(|s| s.user.email)
            .ok_or(PortError::Unauthorized)
    }

    /// Stores the session in memory and in durable storage.
    pub fn login(&self, session: Session) -> PortResult<()> {
        self.store.save(&session)?;
        info!("Logged in as {}", session.user.email);
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        Ok(())
    }

    /// Clears both the in-memory state and the durable storage, returning
    /// the client to the unauthenticated landing view.
    pub fn logout(&self) -> PortResult<()> {
        self.store.clear()?;
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
        info!("Logged out");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{sample_session, MemoryPersistence};
    use super::*;

    #[test]
    fn token_present_iff_authenticated() {
        let ctx = SessionContext::restore(Arc::new(MemoryPersistence::default()));
        assert!(!ctx.is_authenticated());
        assert!(matches!(ctx.bearer_token(), Err(PortError::Unauthorized)));

        ctx.login(sample_session()).unwrap();
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.bearer_token().unwrap(), "token-123");
    }

    #[test]
    fn login_persists_and_logout_clears_wholesale() {
        let store = Arc::new(MemoryPersistence::default());
        let ctx = SessionContext::restore(store.clone());
        ctx.login(sample_session()).unwrap();
        assert!(store.saved.lock().unwrap().is_some());

        ctx.logout().unwrap();
        assert!(store.saved.lock().unwrap().is_none());
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn restore_picks_up_a_persisted_session() {
        let store = Arc::new(MemoryPersistence::default());
        store.save(&sample_session()).unwrap();

        let ctx = SessionContext::restore(store);
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.user_email().unwrap(), "reader@example.com");
    }
}
