/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Gateway builder for fluent configuration.
//!
//! This module provides a builder API assembling a [`Gateway`] from its
//! configuration, authentication policy, and transport handle.

use crate::dispatcher::CommandDispatcher;
use crate::gateway::{Gateway, GatewayApplication};
use crate::orders::OrderCorrelationTable;
use crate::responder::ExecResponder;
use crate::transport::TransportHandle;
use fixgate_session::auth::{AcceptAll, AllowListAuthenticator, LogonAuthenticator};
use fixgate_session::config::{GatewayConfig, SessionSection};
use fixgate_session::registry::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring a gateway.
pub struct GatewayBuilder {
    /// Gateway configuration.
    config: GatewayConfig,
    /// Authentication policy; defaults to the config allow list.
    authenticator: Option<Arc<dyn LogonAuthenticator>>,
    /// Transport engine handle.
    transport: Option<Arc<dyn TransportHandle>>,
    /// Whether inbound new orders are acknowledged (acceptor side).
    acknowledge_orders: bool,
    /// Connection timeout.
    connect_timeout: Duration,
    /// Reconnect interval.
    reconnect_interval: Duration,
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::new(),
            authenticator: None,
            transport: None,
            acknowledge_orders: false,
            connect_timeout: Duration::from_secs(30),
            reconnect_interval: Duration::from_secs(5),
        }
    }

    /// Sets the gateway configuration.
    #[must_use]
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends a session section to the configuration.
    #[must_use]
    pub fn add_session(mut self, section: SessionSection) -> Self {
        self.config.sessions.push(section);
        self
    }

    /// Sets the authentication policy.
    ///
    /// When no policy is supplied, the builder derives one from the
    /// configuration: an allow list over `allowed_counterparties`, or
    /// accept-all when that list is empty.
    #[must_use]
    pub fn with_authenticator<A: LogonAuthenticator + 'static>(mut self, authenticator: A) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    /// Sets the transport engine handle.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn TransportHandle>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Enables acceptor-side acknowledgement of inbound new orders.
    #[must_use]
    pub const fn with_order_acknowledgement(mut self, enabled: bool) -> Self {
        self.acknowledge_orders = enabled;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the reconnect interval.
    #[must_use]
    pub const fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Returns the configured sessions.
    #[must_use]
    pub fn sessions(&self) -> &[SessionSection] {
        &self.config.sessions
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the reconnect interval.
    #[must_use]
    pub const fn reconnect_interval(&self) -> Duration {
        self.reconnect_interval
    }

    /// Builds the gateway.
    ///
    /// # Panics
    /// Panics if no transport handle was supplied.
    #[must_use]
    pub fn build(self) -> Gateway {
        let transport = self.transport.expect("transport is required");
        let registry = Arc::new(SessionRegistry::new());
        let table = Arc::new(OrderCorrelationTable::new());
        let dispatcher = CommandDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&table),
            Arc::clone(&transport),
        );

        let authenticator = self.authenticator.unwrap_or_else(|| {
            if self.config.allowed_counterparties.is_empty() {
                Arc::new(AcceptAll)
            } else {
                Arc::new(AllowListAuthenticator::new(
                    self.config.allowed_counterparties.iter().cloned(),
                ))
            }
        });

        let responder = self
            .acknowledge_orders
            .then(|| ExecResponder::new(Arc::clone(&transport)));

        let application = Arc::new(GatewayApplication::new(
            Arc::clone(&registry),
            authenticator,
            Arc::clone(&table),
            dispatcher.clone(),
            responder,
        ));

        Gateway::new(
            self.config,
            registry,
            table,
            dispatcher,
            transport,
            application,
            self.connect_timeout,
            self.reconnect_interval,
        )
    }
}
