//! Session repository — get/put keyed by session id.
//!
//! Sessions live in process memory only; there is no durable persistence and
//! no eviction. Each session sits behind its own `Mutex`, and handlers hold
//! that lock for the whole submit-answer operation (including the follow-up
//! LLM call), so concurrent submits against one session id are serialized.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::interview::models::InterviewSession;

pub type SessionHandle = Arc<Mutex<InterviewSession>>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a new session and returns its handle.
    async fn insert(&self, session: InterviewSession) -> SessionHandle;

    /// Looks up a session by id.
    async fn get(&self, session_id: Uuid) -> Option<SessionHandle>;

    /// Snapshot of all session handles, unordered.
    async fn list(&self) -> Vec<SessionHandle>;
}

/// Default store: a process-wide map guarded by an `RwLock`.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: InterviewSession) -> SessionHandle {
        let session_id = session.session_id;
        let handle = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .await
            .insert(session_id, Arc::clone(&handle));
        handle
    }

    async fn get(&self, session_id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&session_id).cloned()
    }

    async fn list(&self) -> Vec<SessionHandle> {
        self.sessions.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::{fixtures, SessionStatus};

    fn sample_session() -> InterviewSession {
        InterviewSession::new(fixtures::resume(), fixtures::jd(), vec!["Q1?".to_string()])
    }

    #[tokio::test]
    async fn test_insert_then_get_returns_same_session() {
        let store = InMemorySessionStore::default();
        let session = sample_session();
        let id = session.session_id;
        store.insert(session).await;

        let handle = store.get(id).await.expect("session should exist");
        assert_eq!(handle.lock().await.session_id, id);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let store = InMemorySessionStore::default();
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_list_returns_all_sessions() {
        let store = InMemorySessionStore::default();
        store.insert(sample_session()).await;
        store.insert(sample_session()).await;
        assert_eq!(store.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_mutation_through_handle_is_visible_on_next_get() {
        let store = InMemorySessionStore::default();
        let session = sample_session();
        let id = session.session_id;
        let handle = store.insert(session).await;

        handle.lock().await.status = SessionStatus::Ended;

        let again = store.get(id).await.unwrap();
        assert_eq!(again.lock().await.status, SessionStatus::Ended);
    }
}
