/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixGate Core
//!
//! Core types, message model, and error definitions for the FixGate
//! trading-session gateway.
//!
//! This crate provides the fundamental building blocks used across all
//! FixGate crates:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Identity types**: `SessionKey`, `CompId`, `ClOrdId`
//! - **Order types**: `Side`, `OrdStatus` with the monotonic transition
//!   relation, decimal quantity and price aliases
//! - **Message model**: decoded application and admin messages crossing the
//!   transport boundary, dispatched by explicit kind tags
//!
//! The wire grammar itself lives in the transport engine; everything here is
//! already decoded.

pub mod error;
pub mod message;
pub mod types;

pub use error::{
    AuthError, ConfigError, GatewayError, Result, StartError, SubmitError, TransportError,
};
pub use message::{
    AdminMessage, AppMessage, ExecType, ExecutionReport, MessageKind, NewOrderSingle, OrdType,
    OrderCancelRequest, TimeInForce,
};
pub use types::{ClOrdId, CompId, OrdStatus, Px, Qty, SessionKey, Side, Timestamp};
