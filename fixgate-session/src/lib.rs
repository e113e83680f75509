/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixGate Session
//!
//! Session orchestration for the FixGate trading-session gateway.
//!
//! This crate provides:
//! - **Lifecycle registry**: per-key session state driven by transport
//!   callbacks, serialized per session
//! - **Template resolution**: listen-address to template-set binding for
//!   acceptors where many counterparties share one port
//! - **Authentication gate**: pluggable logon predicate evaluated before a
//!   session may reach `LoggedOn`
//! - **Configuration**: session sections and gateway settings, loaded once
//!   at startup

pub mod auth;
pub mod config;
pub mod registry;
pub mod resolver;

pub use auth::{AcceptAll, AllowListAuthenticator, AuthDecision, LogonAuthenticator};
pub use config::{GatewayConfig, SessionRole, SessionSection};
pub use registry::{SessionLifecycle, SessionRegistry};
pub use resolver::{DEFAULT_ACCEPT_ADDRESS, TemplateMapping, TemplateResolver};
