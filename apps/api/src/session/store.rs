use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::session::SessionState;

/// In-memory sessions keyed by id. Lost on restart.
///
/// Analysis runs happen outside the lock; only the final swap takes the write lock, so a
/// reader sees either the previous state or the new one.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, SessionState::default());
        debug!("Created session {id}");
        id
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionState> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Swaps in a new state. Returns `false` if the session no longer exists.
    pub async fn replace(&self, id: Uuid, state: SessionState) -> bool {
        match self.sessions.write().await.get_mut(&id) {
            Some(slot) => {
                *slot = state;
                true
            }
            None => false,
        }
    }

    /// Applies `f` to the session in place and returns its result.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        self.sessions.write().await.get_mut(&id).map(f)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }
}
