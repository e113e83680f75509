/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application callback interface.
//!
//! This module defines the callback surface the transport engine invokes on
//! session lifecycle events and on decoded inbound messages, following the
//! QuickFIX pattern with async support. The gateway ships its own
//! implementation ([`crate::gateway::GatewayApplication`]); hosts embedding
//! the gateway in a larger system can layer their own.

use async_trait::async_trait;
use fixgate_core::message::{AdminMessage, AppMessage};
use fixgate_core::types::SessionKey;

/// Reason for rejecting an inbound message or logon.
#[derive(Debug, Clone)]
pub struct RejectReason {
    /// Rejection reason code.
    pub code: u32,
    /// Human-readable rejection text.
    pub text: String,
}

impl RejectReason {
    /// Session-level reject code for refused logons.
    pub const LOGON_REFUSED: u32 = 1;

    /// Creates a new rejection reason.
    #[must_use]
    pub fn new(code: u32, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    /// Creates a logon-refused rejection.
    #[must_use]
    pub fn logon_refused(text: impl Into<String>) -> Self {
        Self::new(Self::LOGON_REFUSED, text)
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.text, self.code)
    }
}

/// Application callback interface for session events and inbound messages.
///
/// The transport invokes these callbacks from its per-connection workers.
/// Callbacks for the same session key are serialized by the transport;
/// callbacks for different keys may run concurrently.
#[async_trait]
pub trait Application: Send + Sync {
    /// Called when a session is created.
    async fn on_create(&self, key: &SessionKey);

    /// Called on successful logon, after the handshake completed.
    async fn on_logon(&self, key: &SessionKey);

    /// Called on logout or disconnect.
    async fn on_logout(&self, key: &SessionKey);

    /// Called before sending an admin message.
    ///
    /// Allows modification of outgoing admin messages (Logon, Heartbeat).
    async fn to_admin(&self, message: &mut AdminMessage, key: &SessionKey);

    /// Called when an admin message is received.
    ///
    /// Invoked synchronously inside the transport's handshake path: a
    /// `Logon` that returns an error aborts session establishment before
    /// any acknowledgement is sent.
    ///
    /// # Returns
    /// `Ok(())` to accept, `Err(RejectReason)` to reject.
    #[allow(clippy::wrong_self_convention)]
    async fn from_admin(
        &self,
        message: &AdminMessage,
        key: &SessionKey,
    ) -> Result<(), RejectReason>;

    /// Called before sending an application message.
    async fn to_app(&self, message: &mut AppMessage, key: &SessionKey);

    /// Called when an application message is received.
    ///
    /// # Returns
    /// `Ok(())` to accept, `Err(RejectReason)` to reject.
    #[allow(clippy::wrong_self_convention)]
    async fn from_app(&self, message: &AppMessage, key: &SessionKey) -> Result<(), RejectReason>;
}

/// Default no-op application implementation.
#[derive(Debug, Default)]
pub struct NoOpApplication;

#[async_trait]
impl Application for NoOpApplication {
    async fn on_create(&self, _key: &SessionKey) {}

    async fn on_logon(&self, _key: &SessionKey) {}

    async fn on_logout(&self, _key: &SessionKey) {}

    async fn to_admin(&self, _message: &mut AdminMessage, _key: &SessionKey) {}

    async fn from_admin(
        &self,
        _message: &AdminMessage,
        _key: &SessionKey,
    ) -> Result<(), RejectReason> {
        Ok(())
    }

    async fn to_app(&self, _message: &mut AppMessage, _key: &SessionKey) {}

    async fn from_app(&self, _message: &AppMessage, _key: &SessionKey) -> Result<(), RejectReason> {
        Ok(())
    }
}
