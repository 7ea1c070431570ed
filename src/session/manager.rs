// Session manager for the HTTP API
//
// Concurrent map of session id -> session, bounded by `max_sessions`, with
// idle sessions purged after `timeout_minutes`. Each session sits behind its
// own async mutex so turns within a session are serialized while different
// sessions proceed independently.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};

use super::Session;
use crate::errors::{AssistantError, AssistantResult};
use crate::locale::Language;

/// Shared reference to one live session
#[derive(Clone)]
pub struct SessionHandle {
    pub id: String,
    session: Arc<Mutex<Session>>,
}

impl SessionHandle {
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }
}

struct Slot {
    handle: SessionHandle,
    last_seen: Instant,
}

pub struct SessionManager {
    sessions: DashMap<String, Slot>,
    max_sessions: usize,
    timeout: Duration,
}

impl SessionManager {
    pub fn new(max_sessions: usize, timeout_minutes: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions,
            timeout: Duration::from_secs(timeout_minutes * 60),
        }
    }

    /// Create a fresh session with the given language
    pub fn create(&self, language: Language) -> AssistantResult<SessionHandle> {
        if self.sessions.len() >= self.max_sessions {
            self.purge_expired();
            if self.sessions.len() >= self.max_sessions {
                tracing::warn!(max = self.max_sessions, "session limit reached");
                return Err(AssistantError::SessionLimit(self.max_sessions));
            }
        }

        let session = Session::new(language);
        let handle = SessionHandle {
            id: session.id().to_string(),
            session: Arc::new(Mutex::new(session)),
        };
        self.sessions.insert(
            handle.id.clone(),
            Slot {
                handle: handle.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::info!(session = %handle.id, "session created");
        Ok(handle)
    }

    /// Look up a live session, refreshing its idle timer
    pub fn get(&self, id: &str) -> AssistantResult<SessionHandle> {
        match self.sessions.get_mut(id) {
            Some(mut slot) if slot.last_seen.elapsed() < self.timeout => {
                slot.last_seen = Instant::now();
                Ok(slot.handle.clone())
            }
            Some(slot) => {
                drop(slot);
                self.sessions.remove(id);
                tracing::info!(session = %id, "session expired");
                Err(AssistantError::SessionNotFound(id.to_string()))
            }
            None => Err(AssistantError::SessionNotFound(id.to_string())),
        }
    }

    pub fn delete(&self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "session deleted");
        }
        removed
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Remove idle sessions; returns how many were dropped
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, slot| slot.last_seen.elapsed() < self.timeout);
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            tracing::info!(purged, "expired sessions removed");
        }
        purged
    }
}
