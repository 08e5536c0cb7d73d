//! Registry of live sessions keyed by id.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::channel::SessionChannel;

/// Opaque session identifier, a random UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One connected client.
pub struct Session {
    id: SessionId,
    channel: SessionChannel,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn channel(&self) -> &SessionChannel {
        &self.channel
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("closed", &self.channel.is_closed())
            .finish()
    }
}

/// Shared map of sessions. Safe to use from any number of handlers.
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel under a fresh id.
    pub fn create(&self, channel: SessionChannel) -> SessionId {
        let mut sessions = self.write();
        let id = loop {
            let id = SessionId::new_v4();
            if !sessions.contains_key(&id) {
                break id;
            }
        };

        let session = Arc::new(Session {
            id,
            channel,
            created_at: Utc::now(),
        });
        sessions.insert(id, session);
        tracing::info!(session_id = %id, active = sessions.len(), "Session opened");
        id
    }

    /// Look up a live session. Closed channels are never returned.
    pub fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.read()
            .get(id)
            .filter(|session| !session.channel.is_closed())
            .cloned()
    }

    /// Remove a session and close its channel.
    ///
    /// Returns the removed session; a second call is a no-op returning `None`.
    pub fn remove(&self, id: &SessionId) -> Option<Arc<Session>> {
        let mut sessions = self.write();
        let session = sessions.remove(id)?;
        session.channel.close();
        tracing::info!(session_id = %id, active = sessions.len(), "Session closed");
        Some(session)
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    // A panic while holding the lock cannot leave the map half-updated.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionId, Arc<Session>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, Arc<Session>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes its session when dropped.
///
/// Owned by the SSE stream, so the session goes away however the stream
/// ends: client disconnect, server shutdown or an internal close.
pub struct SessionGuard {
    manager: Arc<SessionManager>,
    id: SessionId,
}

impl SessionGuard {
    pub fn new(manager: Arc<SessionManager>, id: SessionId) -> Self {
        Self { manager, id }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.manager.remove(&self.id);
    }
}
