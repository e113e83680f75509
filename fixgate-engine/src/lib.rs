/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixGate Engine
//!
//! Order correlation, command dispatch, and the gateway facade for the
//! FixGate trading-session gateway.
//!
//! This crate provides:
//! - **Application trait**: Callback interface the transport engine drives
//! - **Transport boundary**: The contract the gateway consumes from the
//!   external transport engine
//! - **Order correlation**: Client-order-id keyed tracking of submitted
//!   orders against their execution reports
//! - **Command dispatch**: Building, gating, and submitting order and
//!   cancel commands
//! - **Gateway facade**: Process-wide wiring with start/stop lifecycle

pub mod application;
pub mod builder;
pub mod dispatcher;
pub mod gateway;
pub mod orders;
pub mod responder;
pub mod transport;

#[cfg(test)]
pub(crate) mod testsupport;

pub use application::{Application, NoOpApplication, RejectReason};
pub use builder::GatewayBuilder;
pub use dispatcher::{CancelCommand, CommandDispatcher, NewOrderCommand};
pub use gateway::{Gateway, GatewayApplication, StartupPhase};
pub use orders::{OrderCorrelationTable, OrderRecord};
pub use responder::ExecResponder;
pub use transport::{OutboundMessage, TransportHandle};
