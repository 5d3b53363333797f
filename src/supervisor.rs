//! The session supervisor: the only process-wide mutable table this crate
//! keeps.
//!
//! It holds [`SessionHandle`]s, never engine state — each session's actual
//! book, portfolios, and privileges live inside its own actor task, reached
//! only through its handle. The supervisor's job is purely bookkeeping: hand
//! out a fresh [`SessionId`] for a new lesson, and look one back up later.

use rustc_hash::FxHashMap;
use tokio::sync::Mutex;

use crate::lesson::LessonPlan;
use crate::session::actor::SessionHandle;
use crate::SessionId;

/// Creates and tracks every session running in this process.
pub struct SessionSupervisor {
    sessions: Mutex<FxHashMap<SessionId, SessionHandle>>,
}

impl SessionSupervisor {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(FxHashMap::default()),
        }
    }

    /// Spawn a new session actor for `lesson` and register its handle.
    pub async fn create_session(&self, lesson: LessonPlan) -> SessionHandle {
        let session_id = SessionId::new();
        let handle = SessionHandle::spawn(session_id, lesson);
        self.sessions.lock().await.insert(session_id, handle.clone());
        handle
    }

    pub async fn get(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.sessions.lock().await.get(&session_id).cloned()
    }

    /// Drop a session's handle from the table. The actor task itself keeps
    /// running until every remaining clone of its handle is also dropped, so
    /// callers that called `end()` on the handle first get a clean shutdown.
    pub async fn remove(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.sessions.lock().await.remove(&session_id)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

impl Default for SessionSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
