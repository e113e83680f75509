/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixGate
//!
//! A trading-session gateway core for Rust, built atop an external FIX
//! transport engine.
//!
//! FixGate owns session orchestration and order correlation: it resolves
//! inbound connections to session templates when several counterparties
//! share one listening address, gates session establishment behind a
//! pluggable authentication decision, tracks session lifecycle transitions
//! surfaced by the transport, and correlates outbound order commands with
//! their asynchronous execution reports, including idempotent re-send after
//! a reconnect.
//!
//! The wire grammar, framing, sequencing, heartbeats, and sockets belong to
//! the transport engine; FixGate consumes it through the
//! [`engine::TransportHandle`] contract and is driven through the
//! [`engine::Application`] callbacks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fixgate::prelude::*;
//!
//! let gateway = GatewayBuilder::new()
//!     .with_config(
//!         GatewayConfig::new()
//!             .add_session(
//!                 SessionSection::acceptor("FIX.4.4", "GATEWAY", "CLIENT")
//!                     .as_template()
//!                     .with_accept_port(9880),
//!             )
//!             .allow_counterparty("CLIENT"),
//!     )
//!     .with_transport(my_transport)
//!     .with_order_acknowledgement(true)
//!     .build();
//!
//! gateway.start()?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Identity types, message model, and error definitions
//! - [`session`]: Lifecycle registry, template resolution, authentication,
//!   and configuration
//! - [`engine`]: Order correlation, command dispatch, and the gateway facade

pub mod core {
    //! Identity types, message model, and error definitions.
    pub use fixgate_core::*;
}

pub mod session {
    //! Lifecycle registry, template resolution, authentication, and
    //! configuration.
    pub use fixgate_session::*;
}

pub mod engine {
    //! Order correlation, command dispatch, and the gateway facade.
    pub use fixgate_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use fixgate_core::{
        AdminMessage, AppMessage, AuthError, ClOrdId, CompId, ConfigError, ExecType,
        ExecutionReport, GatewayError, MessageKind, NewOrderSingle, OrdStatus, OrdType,
        OrderCancelRequest, Px, Qty, Result, SessionKey, Side, StartError, SubmitError,
        TimeInForce, Timestamp, TransportError,
    };

    // Session
    pub use fixgate_session::{
        AcceptAll, AllowListAuthenticator, AuthDecision, GatewayConfig, LogonAuthenticator,
        SessionLifecycle, SessionRegistry, SessionRole, SessionSection, TemplateMapping,
        TemplateResolver,
    };

    // Engine
    pub use fixgate_engine::{
        Application, CancelCommand, CommandDispatcher, ExecResponder, Gateway, GatewayBuilder,
        NewOrderCommand, NoOpApplication, OrderCorrelationTable, OrderRecord, OutboundMessage,
        RejectReason, StartupPhase, TransportHandle,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        // Verify that prelude imports work
        let key = SessionKey::new(
            "FIX.4.4",
            CompId::new("SENDER").unwrap(),
            CompId::new("TARGET").unwrap(),
        );
        assert_eq!(key.to_string(), "FIX.4.4:SENDER->TARGET");
        let _side = Side::Buy;
        let _phase = StartupPhase::NotStarted;
    }

    #[test]
    fn test_status_relation_exposed() {
        assert!(OrdStatus::New.can_transition_to(OrdStatus::Filled));
        assert!(!OrdStatus::Filled.can_transition_to(OrdStatus::New));
    }
}
