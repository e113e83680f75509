/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the FixGate trading-session gateway.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across all gateway operations. Startup errors are
//! fatal; per-session and per-command errors are isolated to their session or
//! caller and never propagate across threads.

use crate::types::{ClOrdId, OrdStatus, SessionKey};
use thiserror::Error;

/// Result type alias using [`GatewayError`] as the error type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Top-level error type for all gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Fatal configuration error at startup.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Per-session authentication failure.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Per-command submission failure.
    #[error("submit error: {0}")]
    Submit(#[from] SubmitError),

    /// Error reported by the transport engine.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Gateway startup failure.
    #[error("start error: {0}")]
    Start(#[from] StartError),
}

/// Fatal configuration errors, raised only during startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An acceptor or template section has no listening port.
    #[error("missing accept port for session {session}")]
    MissingAcceptPort {
        /// The session the port is missing for.
        session: String,
    },

    /// The configured accept address cannot be parsed.
    #[error("invalid accept address for session {session}: {address}")]
    InvalidAcceptAddress {
        /// The session the address belongs to.
        session: String,
        /// The unparsable address value.
        address: String,
    },

    /// The configuration defines no sessions at all.
    #[error("no sessions configured")]
    NoSessions,

    /// Two sections resolve to the same session key.
    #[error("duplicate session: {session}")]
    DuplicateSession {
        /// The duplicated session key.
        session: String,
    },

    /// A CompID value is empty or exceeds the permitted length.
    #[error("invalid comp id: {value}")]
    InvalidCompId {
        /// The offending value.
        value: String,
    },
}

/// Per-session authentication failures.
///
/// Isolated to the rejected session; other sessions are unaffected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Logon refused by the configured authentication policy.
    #[error("logon rejected for {session}: {reason}")]
    LogonRejected {
        /// The session whose logon was refused.
        session: SessionKey,
        /// Reason supplied by the policy.
        reason: String,
    },
}

/// Per-command submission failures.
///
/// Returned synchronously to the `submit_*` caller. Never retried
/// automatically and never thrown across threads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The client order id is already present in the correlation table.
    #[error("duplicate order id: {cl_ord_id}")]
    DuplicateOrderId {
        /// The duplicated client order id.
        cl_ord_id: ClOrdId,
    },

    /// No record exists for the referenced client order id.
    #[error("unknown order: {cl_ord_id}")]
    UnknownOrder {
        /// The unknown client order id.
        cl_ord_id: ClOrdId,
    },

    /// The referenced order is in a state that forbids the command.
    #[error("invalid state for {cl_ord_id}: {status}")]
    InvalidState {
        /// The referenced client order id.
        cl_ord_id: ClOrdId,
        /// The order's current status.
        status: OrdStatus,
    },

    /// The target session is not currently logged on.
    #[error("session not logged on: {session}")]
    SessionNotLoggedOn {
        /// The session the command targeted.
        session: SessionKey,
    },
}

/// Errors reported by the transport engine collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// A listening address could not be bound.
    #[error("bind failed for {addr}: {reason}")]
    BindFailed {
        /// The address that failed to bind.
        addr: String,
        /// Reason reported by the transport.
        reason: String,
    },

    /// The transport refused to start.
    #[error("transport start failed: {reason}")]
    StartFailed {
        /// Reason reported by the transport.
        reason: String,
    },

    /// An operation requiring a started transport was invoked before start.
    #[error("transport not started")]
    NotStarted,
}

/// Gateway startup failures.
///
/// The one error path reported upward: a gateway that silently fails to
/// start is worse than a crash.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartError {
    /// Configuration could not be validated.
    #[error("configuration invalid: {0}")]
    Config(#[from] ConfigError),

    /// The transport failed to bind or start.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
}
