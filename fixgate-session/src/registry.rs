/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session lifecycle registry.
//!
//! This module tracks the lifecycle state of every session surfaced by the
//! transport. Transitions are applied unconditionally from transport
//! callbacks; the transport is trusted to order create before logon and
//! logon before logout for any given key. Rejecting a logon is the
//! authentication gate's job and happens before the registry records
//! `LoggedOn`.
//!
//! Callbacks for the same key are serialized through a per-entry mutex;
//! callbacks for different keys never contend on it.

use fixgate_core::types::{SessionKey, Timestamp};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionLifecycle {
    /// Session object exists; no logon seen yet.
    Created,
    /// Logon received; authentication decision pending.
    Authenticating,
    /// Session is established and may carry application traffic.
    LoggedOn,
    /// Session was logged out; static sessions stay registered.
    LoggedOut,
}

impl SessionLifecycle {
    /// Returns true if the session may carry logon-gated traffic.
    #[must_use]
    pub const fn is_logged_on(self) -> bool {
        matches!(self, Self::LoggedOn)
    }
}

impl fmt::Display for SessionLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "Created",
            Self::Authenticating => "Authenticating",
            Self::LoggedOn => "LoggedOn",
            Self::LoggedOut => "LoggedOut",
        };
        write!(f, "{}", name)
    }
}

/// Mutable per-session state, guarded by the entry mutex.
#[derive(Debug)]
struct EntryState {
    lifecycle: SessionLifecycle,
    dynamic: bool,
    logon_count: u64,
    last_transition: Timestamp,
}

/// One registered session slot.
#[derive(Debug)]
struct SessionEntry {
    state: Mutex<EntryState>,
}

impl SessionEntry {
    fn new(dynamic: bool) -> Self {
        Self {
            state: Mutex::new(EntryState {
                lifecycle: SessionLifecycle::Created,
                dynamic,
                logon_count: 0,
                last_transition: Timestamp::now(),
            }),
        }
    }
}

/// Registry of session lifecycle states keyed by [`SessionKey`].
///
/// The registry exclusively owns lifecycle state. A key maps to at most one
/// state at any time. Static sessions persist across logout/logon cycles;
/// sessions materialized from an acceptor template are marked dynamic and
/// can be evicted.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    entries: RwLock<HashMap<SessionKey, Arc<SessionEntry>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_or_insert(&self, key: &SessionKey, dynamic: bool) -> Arc<SessionEntry> {
        if let Some(entry) = self.entries.read().get(key) {
            return Arc::clone(entry);
        }
        let mut entries = self.entries.write();
        Arc::clone(
            entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(SessionEntry::new(dynamic))),
        )
    }

    fn entry(&self, key: &SessionKey) -> Option<Arc<SessionEntry>> {
        self.entries.read().get(key).map(Arc::clone)
    }

    /// Records creation of a statically configured session.
    ///
    /// A session re-created after a logout returns to `Created`; the slot
    /// itself is reused.
    pub fn on_session_created(&self, key: &SessionKey) {
        self.created(key, false);
    }

    /// Records creation of a session materialized from an acceptor template.
    pub fn on_template_session_created(&self, key: &SessionKey) {
        self.created(key, true);
    }

    fn created(&self, key: &SessionKey, dynamic: bool) {
        let entry = self.entry_or_insert(key, dynamic);
        let mut state = entry.state.lock();
        state.lifecycle = SessionLifecycle::Created;
        state.last_transition = Timestamp::now();
        info!(session = %key, dynamic, "session created");
    }

    /// Marks a session as awaiting an authentication decision.
    ///
    /// Called from the logon-handling path before the gate is consulted.
    pub fn mark_authenticating(&self, key: &SessionKey) {
        let entry = self.entry_or_insert(key, false);
        let mut state = entry.state.lock();
        state.lifecycle = SessionLifecycle::Authenticating;
        state.last_transition = Timestamp::now();
    }

    /// Records an authentication rejection.
    ///
    /// The session returns to `Created`; it is never advanced to `LoggedOn`
    /// and no other state is recorded for the aborted handshake.
    pub fn on_logon_rejected(&self, key: &SessionKey) {
        if let Some(entry) = self.entry(key) {
            let mut state = entry.state.lock();
            state.lifecycle = SessionLifecycle::Created;
            state.last_transition = Timestamp::now();
            warn!(session = %key, "logon rejected");
        }
    }

    /// Records a successful logon.
    pub fn on_session_logged_on(&self, key: &SessionKey) {
        let entry = self.entry_or_insert(key, false);
        let mut state = entry.state.lock();
        state.lifecycle = SessionLifecycle::LoggedOn;
        state.logon_count += 1;
        state.last_transition = Timestamp::now();
        info!(session = %key, logons = state.logon_count, "session logged on");
    }

    /// Records a logout.
    pub fn on_session_logged_out(&self, key: &SessionKey) {
        match self.entry(key) {
            Some(entry) => {
                let mut state = entry.state.lock();
                state.lifecycle = SessionLifecycle::LoggedOut;
                state.last_transition = Timestamp::now();
                info!(session = %key, "session logged out");
            }
            None => warn!(session = %key, "logout for unknown session"),
        }
    }

    /// Returns the current lifecycle state for a key, if registered.
    #[must_use]
    pub fn current_state(&self, key: &SessionKey) -> Option<SessionLifecycle> {
        self.entry(key).map(|entry| entry.state.lock().lifecycle)
    }

    /// Returns true if the session is currently logged on.
    #[must_use]
    pub fn is_logged_on(&self, key: &SessionKey) -> bool {
        self.current_state(key)
            .is_some_and(SessionLifecycle::is_logged_on)
    }

    /// Returns the keys of all sessions currently logged on.
    #[must_use]
    pub fn active_sessions(&self) -> Vec<SessionKey> {
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| entry.state.lock().lifecycle.is_logged_on())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Returns the keys of all registered sessions regardless of state.
    #[must_use]
    pub fn known_sessions(&self) -> Vec<SessionKey> {
        self.entries.read().keys().cloned().collect()
    }

    /// Returns the number of times the session has logged on.
    #[must_use]
    pub fn logon_count(&self, key: &SessionKey) -> u64 {
        self.entry(key)
            .map_or(0, |entry| entry.state.lock().logon_count)
    }

    /// Returns the time of the session's last lifecycle transition.
    #[must_use]
    pub fn last_transition(&self, key: &SessionKey) -> Option<Timestamp> {
        self.entry(key)
            .map(|entry| entry.state.lock().last_transition)
    }

    /// Removes a dynamically provisioned session from the registry.
    ///
    /// Static sessions are never removed; they survive logout/logon cycles.
    ///
    /// # Returns
    /// `true` if the session was dynamic and has been removed.
    pub fn evict(&self, key: &SessionKey) -> bool {
        let mut entries = self.entries.write();
        let dynamic = entries
            .get(key)
            .is_some_and(|entry| entry.state.lock().dynamic);
        if dynamic {
            entries.remove(key);
            info!(session = %key, "dynamic session evicted");
        }
        dynamic
    }

    /// Returns the number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no sessions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
