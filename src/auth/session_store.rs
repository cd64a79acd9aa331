//! Storage seam for completed sessions.
//!
//! The handshake never keeps a session in process-wide state. It returns the
//! value to the caller, and [`complete_callback`] hands it to whatever
//! [`SessionStore`] the application injects.
//!
//! [`complete_callback`]: crate::auth::oauth::complete_callback

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::auth::Session;

/// Errors reported by a [`SessionStore`] backend.
#[derive(Debug, Error)]
pub enum SessionStorageError {
    /// The backend rejected or failed the operation.
    #[error("Session storage backend error: {message}")]
    Backend {
        /// Backend-specific description.
        message: String,
    },
}

/// Durable storage for sessions, owned by the application.
///
/// Implementations must be safe to share across concurrent handshakes.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `session` under `session.id`, replacing any previous value.
    async fn save(&self, session: Session) -> Result<(), SessionStorageError>;

    /// Loads the session stored under `id`.
    async fn load(&self, id: &str) -> Result<Option<Session>, SessionStorageError>;
}

/// A process-local [`SessionStore`] backed by a `HashMap`.
///
/// Suitable for tests and single-instance development servers.
///
/// ```rust
/// use shopify_oauth::{MemorySessionStore, Session, SessionStore, ShopDomain};
///
/// # tokio_test::block_on(async {
/// let store = MemorySessionStore::new();
/// let shop = ShopDomain::new("test").unwrap();
/// let session = Session::new(Session::generate_offline_id(&shop), shop, "abc".into(), Default::default(), false);
///
/// store.save(session.clone()).await.unwrap();
/// assert_eq!(store.load("offline_test.myshopify.com").await.unwrap(), Some(session));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no session is stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: Session) -> Result<(), SessionStorageError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Session>, SessionStorageError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }
}
