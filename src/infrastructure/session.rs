//! Session management for client workspaces
//!
//! Each client session owns one workspace: its object registry and its
//! active model. The manager hands out per-session handles; the mutex on
//! each handle serializes request handling within a session while leaving
//! sessions fully independent of each other. Idle sessions are dropped by
//! a periodic sweep.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::application::workspace::SessionWorkspace;
use crate::domain::value_objects::SessionId;

/// One session's state plus its idle-expiry bookkeeping.
#[derive(Debug)]
pub struct SessionEntry {
    pub workspace: SessionWorkspace,
    pub last_activity: DateTime<Utc>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            workspace: SessionWorkspace::new(),
            last_activity: Utc::now(),
        }
    }

    /// Record activity; called by handlers while holding the lock.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// Shared handle to one session's serialized state.
pub type SessionHandle = Arc<Mutex<SessionEntry>>;

/// Tracks all live sessions.
pub struct SessionManager {
    sessions: HashMap<SessionId, SessionHandle>,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(idle_minutes: i64) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_timeout: Duration::minutes(idle_minutes),
        }
    }

    /// The handle for a session, creating a fresh workspace on first use.
    pub fn get_or_create(&mut self, id: SessionId) -> SessionHandle {
        self.sessions
            .entry(id)
            .or_insert_with(|| {
                tracing::debug!(session = %id, "created session workspace");
                Arc::new(Mutex::new(SessionEntry::new()))
            })
            .clone()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle past the timeout. Entries currently locked by a
    /// request are active and left alone. Returns the number removed.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|id, entry| match entry.try_lock() {
            Ok(guard) => {
                let keep = guard.last_activity >= cutoff;
                if !keep {
                    tracing::info!(session = %id, "expired idle session");
                }
                keep
            }
            Err(_) => true,
        });
        before - self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_reuses_workspace() {
        let mut manager = SessionManager::new(30);
        let id = SessionId::new();

        let first = manager.get_or_create(id);
        let second = manager.get_or_create(id);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.session_count(), 1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut manager = SessionManager::new(30);
        let first = manager.get_or_create(SessionId::new());
        let second = manager.get_or_create(SessionId::new());

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(manager.session_count(), 2);
    }

    #[tokio::test]
    async fn test_sweep_drops_only_idle_sessions() {
        let mut manager = SessionManager::new(30);
        let idle_id = SessionId::new();
        let fresh_id = SessionId::new();

        let idle = manager.get_or_create(idle_id);
        manager.get_or_create(fresh_id);

        idle.lock().await.last_activity = Utc::now() - Duration::minutes(90);

        let removed = manager.sweep(Utc::now());
        assert_eq!(removed, 1);
        assert_eq!(manager.session_count(), 1);

        // the idle session comes back empty if the client returns
        let revived = manager.get_or_create(idle_id);
        assert!(revived.lock().await.workspace.registry.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_skips_sessions_in_use() {
        let mut manager = SessionManager::new(30);
        let id = SessionId::new();
        let handle = manager.get_or_create(id);

        let mut guard = handle.lock().await;
        guard.last_activity = Utc::now() - Duration::minutes(90);

        // locked by a request in flight: not collected
        assert_eq!(manager.sweep(Utc::now()), 0);
        drop(guard);
        assert_eq!(manager.sweep(Utc::now()), 1);
    }
}
