//! Per-session portfolio stores.
//!
//! Each session owns exactly one [`PortfolioStore`]. Closing a session drops its store; nothing
//! outlives the process.

use crate::portfolio::PortfolioStore;
use crate::{ScenarioError, ScenarioResult};
use parking_lot::RwLock;
use scenario_uuid::SessionId;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, PortfolioStore>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session with an empty portfolio.
    pub fn open(&self) -> SessionId {
        let mut sessions = self.sessions.write();
        let mut id = SessionId::new();
        while sessions.contains_key(&id) {
            id = SessionId::new();
        }
        sessions.insert(id, PortfolioStore::new());
        tracing::info!(session_id = %id, "session opened");
        id
    }

    /// Returns a handle to the session's store.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::SessionNotFound`] for unknown or closed sessions.
    pub fn store(&self, id: SessionId) -> ScenarioResult<PortfolioStore> {
        self.sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or(ScenarioError::SessionNotFound(id))
    }

    /// Ends a session and discards its portfolio.
    pub fn close(&self, id: SessionId) -> ScenarioResult<()> {
        let store = self
            .sessions
            .write()
            .remove(&id)
            .ok_or(ScenarioError::SessionNotFound(id))?;
        tracing::info!(session_id = %id, scenarios = store.len(), "session closed");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
