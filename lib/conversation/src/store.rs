//! Per-owner storage of suspended conversations.
//!
//! A conversation may stay suspended across many turns while waiting for
//! user input. Suspension is scoped per owner, never global, and bounded
//! by an idle TTL: an abandoned flow is discarded on next access, and
//! hosts may call `sweep_expired` to drop abandoned flows eagerly.
//! Expiry drops only in-memory state; nothing is persisted before the
//! workflow is created, and a created workflow legitimately outlives its
//! conversation.

use crate::error::SessionError;
use crate::flow::CreationFlow;
use crate::prompt::Prompt;
use chrono::{DateTime, Duration, Utc};
use linklet_core::OwnerId;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

struct SuspendedFlow {
    flow: CreationFlow,
    last_active: DateTime<Utc>,
}

/// Holds at most one suspended creation flow per owner.
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<OwnerId, SuspendedFlow>>,
}

impl SessionStore {
    /// Creates a store with the given idle TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Starts a fresh flow for the owner, replacing any previous one,
    /// and returns the opening prompt.
    pub fn begin(&self, owner_id: OwnerId) -> Prompt {
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(
            owner_id,
            SuspendedFlow {
                flow: CreationFlow::new(owner_id),
                last_active: Utc::now(),
            },
        );
        debug!(%owner_id, "conversation started");
        CreationFlow::initial_prompt()
    }

    /// Removes and returns the owner's suspended flow.
    ///
    /// The flow is taken out of the store so it can be advanced without
    /// holding the lock across an await point; callers put it back with
    /// [`suspend`](Self::suspend) when the outcome is another prompt.
    ///
    /// # Errors
    ///
    /// `NoActiveSession` if the owner has no flow, `Expired` if it sat
    /// idle past the TTL (the stale flow is discarded).
    pub fn take(&self, owner_id: OwnerId) -> Result<CreationFlow, SessionError> {
        self.take_at(owner_id, Utc::now())
    }

    fn take_at(&self, owner_id: OwnerId, now: DateTime<Utc>) -> Result<CreationFlow, SessionError> {
        let mut sessions = self.sessions.write().unwrap();
        let suspended = sessions
            .remove(&owner_id)
            .ok_or(SessionError::NoActiveSession)?;

        if now - suspended.last_active > self.ttl {
            debug!(%owner_id, "conversation expired");
            return Err(SessionError::Expired);
        }
        Ok(suspended.flow)
    }

    /// Suspends a flow again, refreshing its idle timestamp.
    pub fn suspend(&self, flow: CreationFlow) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(
            flow.owner_id(),
            SuspendedFlow {
                flow,
                last_active: Utc::now(),
            },
        );
    }

    /// Drops every flow idle past the TTL. Returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, suspended| now - suspended.last_active <= self.ttl);
        before - sessions.len()
    }

    /// Number of currently suspended flows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Returns true if no flow is suspended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Duration::minutes(30))
    }

    fn owner() -> OwnerId {
        OwnerId::from_i64(7)
    }

    #[test]
    fn begin_then_take() {
        let store = store();
        store.begin(owner());

        let flow = store.take(owner()).expect("flow");
        assert_eq!(flow.owner_id(), owner());

        // Taking removed it.
        assert_eq!(store.take(owner()), Err(SessionError::NoActiveSession));
    }

    #[test]
    fn take_without_begin_fails() {
        let store = store();
        assert_eq!(store.take(owner()), Err(SessionError::NoActiveSession));
    }

    #[test]
    fn suspend_puts_flow_back() {
        let store = store();
        store.begin(owner());

        let flow = store.take(owner()).expect("flow");
        store.suspend(flow);
        assert!(store.take(owner()).is_ok());
    }

    #[test]
    fn begin_replaces_existing_flow() {
        let store = store();
        store.begin(owner());
        store.begin(owner());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn idle_flow_expires_on_access() {
        let store = store();
        store.begin(owner());

        let later = Utc::now() + Duration::minutes(31);
        assert_eq!(store.take_at(owner(), later), Err(SessionError::Expired));
        // The stale entry was discarded.
        assert!(store.is_empty());
    }

    #[test]
    fn sweep_drops_only_expired_flows() {
        let store = store();
        store.begin(OwnerId::from_i64(1));
        store.begin(OwnerId::from_i64(2));

        assert_eq!(store.sweep_expired_at(Utc::now()), 0);
        assert_eq!(store.len(), 2);

        let later = Utc::now() + Duration::minutes(31);
        assert_eq!(store.sweep_expired_at(later), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn sessions_are_scoped_per_owner() {
        let store = store();
        store.begin(OwnerId::from_i64(1));

        assert_eq!(
            store.take(OwnerId::from_i64(2)),
            Err(SessionError::NoActiveSession)
        );
        assert!(store.take(OwnerId::from_i64(1)).is_ok());
    }
}
