/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Logon authentication gate.
//!
//! The gate is a pluggable predicate evaluated synchronously inside the
//! logon-handling path, before a session is allowed to reach `LoggedOn` and
//! before any logon acknowledgement is sent. On reject the transport aborts
//! the handshake; no partial state is recorded.
//!
//! The shipped [`AllowListAuthenticator`] is a placeholder policy, not a
//! security boundary: it accepts a session iff its target CompID is in a
//! configured allow list. Hosts needing real credentials implement
//! [`LogonAuthenticator`] themselves.

use fixgate_core::types::SessionKey;
use std::collections::HashSet;
use tracing::warn;

/// Outcome of an authentication check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// The session may proceed to logon.
    Accept,
    /// The session must be refused.
    Reject {
        /// Reason supplied by the policy.
        reason: String,
    },
}

impl AuthDecision {
    /// Creates a rejection with the given reason.
    #[must_use]
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject {
            reason: reason.into(),
        }
    }

    /// Returns true if the decision is `Accept`.
    #[must_use]
    pub const fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Predicate deciding whether a session may log on.
pub trait LogonAuthenticator: Send + Sync {
    /// Evaluates the logon attempt for `key`.
    ///
    /// Invoked synchronously during the logon handshake; must not block on
    /// I/O. A `Reject` aborts session establishment for this key only.
    fn authorize(&self, key: &SessionKey) -> AuthDecision;
}

/// Accepts a session iff its target CompID is allow-listed.
#[derive(Debug, Default)]
pub struct AllowListAuthenticator {
    allowed: HashSet<String>,
}

impl AllowListAuthenticator {
    /// Creates an authenticator from an iterator of allowed CompIDs.
    #[must_use]
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds a CompID to the allow list.
    #[must_use]
    pub fn allow(mut self, comp_id: impl Into<String>) -> Self {
        self.allowed.insert(comp_id.into());
        self
    }

    /// Returns the number of allow-listed identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    /// Returns true if the allow list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

impl LogonAuthenticator for AllowListAuthenticator {
    fn authorize(&self, key: &SessionKey) -> AuthDecision {
        if self.allowed.contains(key.target_comp_id.as_str()) {
            AuthDecision::Accept
        } else {
            warn!(session = %key, "logon refused: counterparty not allow-listed");
            AuthDecision::reject("counterparty not allow-listed")
        }
    }
}

/// Accepts every logon. Suitable for initiator-side gateways and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl LogonAuthenticator for AcceptAll {
    fn authorize(&self, _key: &SessionKey) -> AuthDecision {
        AuthDecision::Accept
    }
}
