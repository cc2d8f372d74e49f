//! Process-wide session: bearer token and signed-in email.
//!
//! The session has one writer at a time (the auth flows, or the HTTP adapter
//! tearing it down on a 401) and is read by every outbound request. It is
//! durably persisted as exactly two strings through a [`SessionStore`].

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::ClientResult;
use crate::events::EventBus;
use crate::routes::Route;

/// An authenticated session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Email the user signed in with.
    pub user_email: String,
}

impl Session {
    /// Create a session.
    #[must_use]
    pub fn new(token: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self { token: token.into(), user_email: user_email.into() }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("user_email", &self.user_email).finish()
    }
}

/// Durable storage for the session.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session, if any.
    async fn load(&self) -> ClientResult<Option<Session>>;

    /// Persist a session, replacing any previous one.
    async fn save(&self, session: &Session) -> ClientResult<()>;

    /// Remove the stored session.
    async fn clear(&self) -> ClientResult<()>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the session at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File backing this store.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> ClientResult<Option<Session>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) if !session.token.is_empty() => Ok(Some(session)),
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store, for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<Session>>,
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> ClientResult<Option<Session>> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, session: &Session) -> ClientResult<()> {
        *self.slot.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        *self.slot.write().await = None;
        Ok(())
    }
}

/// Shared session handle injected into the HTTP adapter and auth flows.
#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    store: Arc<dyn SessionStore>,
    events: EventBus,
}

impl SessionContext {
    /// Create an empty context. Call [`Self::init`] to restore a stored session.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, events: EventBus) -> Self {
        Self { current: Arc::new(RwLock::new(None)), store, events }
    }

    /// Context with an in-memory store.
    #[must_use]
    pub fn in_memory(events: EventBus) -> Self {
        Self::new(Arc::new(MemorySessionStore::default()), events)
    }

    /// Restore the stored session on startup. Returns whether one was found.
    pub async fn init(&self) -> ClientResult<bool> {
        let restored = self.store.load().await?;
        let found = restored.is_some();
        if let Some(session) = &restored {
            tracing::info!(user = %session.user_email, "Restored session");
        }
        *self.current.write().await = restored;
        Ok(found)
    }

    /// Bearer token of the current session.
    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    /// Current session.
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Whether a session is active.
    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Start a session after a successful login.
    pub async fn begin(&self, session: Session) -> ClientResult<()> {
        self.store.save(&session).await?;
        tracing::info!(user = %session.user_email, "Session started");
        *self.current.write().await = Some(session);
        Ok(())
    }

    /// End the session on explicit logout.
    pub async fn end(&self) -> ClientResult<()> {
        *self.current.write().await = None;
        self.store.clear().await?;
        tracing::info!("Session ended");
        Ok(())
    }

    /// Tear the session down after the backend rejected it, and send the
    /// user to the login screen.
    pub async fn expire(&self) {
        let had_session = self.current.write().await.take().is_some();
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
        tracing::warn!(had_session, "Session rejected by backend");
        self.events.navigate(Route::Login);
    }

    /// Event bus this context reports to.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").finish_non_exhaustive()
    }
}
