/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Gateway facade.
//!
//! The facade wires the session registry, authentication gate, order
//! correlation table, and command dispatcher together, exposes start/stop
//! to the host process, and ships the [`Application`] implementation the
//! transport engine drives.
//!
//! Startup is the one path where failure propagates upward: a gateway that
//! silently fails to start is worse than a crash. Everything after startup
//! is isolated per session or per command.

use crate::application::{Application, RejectReason};
use crate::dispatcher::{CancelCommand, CommandDispatcher, NewOrderCommand};
use crate::orders::OrderCorrelationTable;
use crate::responder::ExecResponder;
use crate::transport::TransportHandle;
use async_trait::async_trait;
use fixgate_core::error::{StartError, SubmitError};
use fixgate_core::message::{AdminMessage, AppMessage};
use fixgate_core::types::{ClOrdId, SessionKey};
use fixgate_session::auth::{AuthDecision, LogonAuthenticator};
use fixgate_session::config::GatewayConfig;
use fixgate_session::registry::SessionRegistry;
use fixgate_session::resolver::TemplateResolver;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Startup latch for the facade.
///
/// An explicit two-state enum rather than a bare flag: the latch is read
/// and flipped only under its mutex, with the same serialization discipline
/// as other session mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    /// The transport has not been started yet.
    NotStarted,
    /// The transport is running.
    Started,
}

/// The [`Application`] implementation the transport engine drives.
///
/// Routes lifecycle callbacks into the session registry, gates logons
/// through the configured authenticator, answers acceptor-side order
/// traffic, and feeds execution reports into the correlation table.
pub struct GatewayApplication {
    registry: Arc<SessionRegistry>,
    authenticator: Arc<dyn LogonAuthenticator>,
    table: Arc<OrderCorrelationTable>,
    dispatcher: CommandDispatcher,
    responder: Option<ExecResponder>,
}

impl GatewayApplication {
    pub(crate) fn new(
        registry: Arc<SessionRegistry>,
        authenticator: Arc<dyn LogonAuthenticator>,
        table: Arc<OrderCorrelationTable>,
        dispatcher: CommandDispatcher,
        responder: Option<ExecResponder>,
    ) -> Self {
        Self {
            registry,
            authenticator,
            table,
            dispatcher,
            responder,
        }
    }
}

#[async_trait]
impl Application for GatewayApplication {
    async fn on_create(&self, key: &SessionKey) {
        self.registry.on_session_created(key);
    }

    async fn on_logon(&self, key: &SessionKey) {
        self.registry.on_session_logged_on(key);
        let resent = self.dispatcher.resend_pending(key);
        if resent > 0 {
            info!(session = %key, resent, "pending orders re-sent after logon");
        }
    }

    async fn on_logout(&self, key: &SessionKey) {
        self.registry.on_session_logged_out(key);
    }

    async fn to_admin(&self, message: &mut AdminMessage, key: &SessionKey) {
        debug!(session = %key, ?message, "sending admin message");
    }

    async fn from_admin(
        &self,
        message: &AdminMessage,
        key: &SessionKey,
    ) -> Result<(), RejectReason> {
        match message {
            AdminMessage::Logon { .. } => {
                self.registry.mark_authenticating(key);
                match self.authenticator.authorize(key) {
                    AuthDecision::Accept => Ok(()),
                    AuthDecision::Reject { reason } => {
                        self.registry.on_logon_rejected(key);
                        Err(RejectReason::logon_refused(reason))
                    }
                }
            }
            AdminMessage::Logout { .. } | AdminMessage::Heartbeat { .. } => {
                debug!(session = %key, ?message, "admin message received");
                Ok(())
            }
        }
    }

    async fn to_app(&self, message: &mut AppMessage, key: &SessionKey) {
        debug!(session = %key, kind = %message.kind(), "sending application message");
    }

    async fn from_app(&self, message: &AppMessage, key: &SessionKey) -> Result<(), RejectReason> {
        match message {
            AppMessage::NewOrderSingle(order) => {
                info!(session = %key, cl_ord_id = %order.cl_ord_id, "new order received");
                if let Some(responder) = &self.responder {
                    responder.acknowledge_new_order(order, key);
                }
                Ok(())
            }
            AppMessage::OrderCancelRequest(request) => {
                match &self.responder {
                    Some(responder) => responder.on_cancel_request(request, key),
                    None => warn!(
                        session = %key,
                        cl_ord_id = %request.cl_ord_id,
                        "cancel request received on a session without a responder"
                    ),
                }
                Ok(())
            }
            AppMessage::ExecutionReport(report) => {
                // Anomalies are advisory; the callback path never fails.
                self.table.apply_report(report);
                Ok(())
            }
        }
    }
}

/// Process-wide gateway entry point.
pub struct Gateway {
    config: GatewayConfig,
    registry: Arc<SessionRegistry>,
    table: Arc<OrderCorrelationTable>,
    dispatcher: CommandDispatcher,
    transport: Arc<dyn TransportHandle>,
    application: Arc<GatewayApplication>,
    phase: Mutex<StartupPhase>,
    connect_timeout: Duration,
    reconnect_interval: Duration,
}

impl Gateway {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: GatewayConfig,
        registry: Arc<SessionRegistry>,
        table: Arc<OrderCorrelationTable>,
        dispatcher: CommandDispatcher,
        transport: Arc<dyn TransportHandle>,
        application: Arc<GatewayApplication>,
        connect_timeout: Duration,
        reconnect_interval: Duration,
    ) -> Self {
        Self {
            config,
            registry,
            table,
            dispatcher,
            transport,
            application,
            phase: Mutex::new(StartupPhase::NotStarted),
            connect_timeout,
            reconnect_interval,
        }
    }

    /// Starts the gateway: validates configuration, resolves and binds the
    /// session templates, and starts the transport.
    ///
    /// # Errors
    /// Returns `StartError` if configuration is invalid or the transport
    /// fails to bind or start. Startup failures are fatal to the gateway.
    pub fn start(&self) -> Result<(), StartError> {
        let mut phase = self.phase.lock();
        self.start_locked(&mut phase)
            .inspect_err(|e| error!(error = %e, "gateway start failed"))
    }

    fn start_locked(&self, phase: &mut StartupPhase) -> Result<(), StartError> {
        self.config.validate()?;
        let resolver = TemplateResolver::from_config(&self.config)?;
        self.transport.bind_templates(resolver.providers())?;
        self.transport.start()?;
        *phase = StartupPhase::Started;
        info!(
            sessions = self.config.sessions.len(),
            listen_addresses = resolver.len(),
            "gateway started"
        );
        Ok(())
    }

    /// Ensures the gateway is running.
    ///
    /// Idempotent: performs a first-time start when the transport has not
    /// been started, otherwise re-drives the logon handshake for every
    /// session the transport knows.
    ///
    /// # Errors
    /// Returns `StartError` only on a failed first-time start.
    pub fn ensure_active(&self) -> Result<(), StartError> {
        let mut phase = self.phase.lock();
        match *phase {
            StartupPhase::NotStarted => self.start_locked(&mut phase),
            StartupPhase::Started => {
                let sessions = self.transport.sessions();
                for key in &sessions {
                    self.transport.request_logon(key);
                }
                info!(sessions = sessions.len(), "re-driving logon");
                Ok(())
            }
        }
    }

    /// Stops the transport and resets the startup latch.
    pub fn stop(&self) {
        let mut phase = self.phase.lock();
        self.transport.stop();
        *phase = StartupPhase::NotStarted;
        info!("gateway stopped");
    }

    /// Submits a new order through the dispatcher.
    ///
    /// # Errors
    /// See [`CommandDispatcher::submit_new_order`].
    pub fn submit_new_order(&self, command: NewOrderCommand) -> Result<ClOrdId, SubmitError> {
        self.dispatcher.submit_new_order(command)
    }

    /// Submits a cancel through the dispatcher.
    ///
    /// # Errors
    /// See [`CommandDispatcher::submit_cancel`].
    pub fn submit_cancel(&self, command: CancelCommand) -> Result<(), SubmitError> {
        self.dispatcher.submit_cancel(command)
    }

    /// Returns the session registry.
    #[must_use]
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Returns the order correlation table.
    #[must_use]
    pub fn orders(&self) -> Arc<OrderCorrelationTable> {
        Arc::clone(&self.table)
    }

    /// Returns the application handle to register with the transport.
    #[must_use]
    pub fn application(&self) -> Arc<GatewayApplication> {
        Arc::clone(&self.application)
    }

    /// Returns the gateway configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the current startup phase.
    #[must_use]
    pub fn phase(&self) -> StartupPhase {
        *self.phase.lock()
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GatewayBuilder;
    use crate::testsupport::{RecordingTransport, report};
    use fixgate_core::types::{CompId, OrdStatus, Side};
    use fixgate_session::config::SessionSection;
    use fixgate_session::registry::SessionLifecycle;
    use rust_decimal::Decimal;

    fn client_session() -> SessionKey {
        SessionKey::new(
            "FIX.4.4",
            CompId::new("CLIENT").unwrap(),
            CompId::new("GATEWAY").unwrap(),
        )
    }

    fn id(s: &str) -> ClOrdId {
        ClOrdId::new(s).unwrap()
    }

    fn acceptor_config() -> GatewayConfig {
        GatewayConfig::new()
            .add_session(
                SessionSection::acceptor("FIX.4.4", "GATEWAY", "ALPHA")
                    .as_template()
                    .with_accept_port(9880),
            )
            .add_session(
                SessionSection::acceptor("FIX.4.4", "GATEWAY", "BRAVO")
                    .as_template()
                    .with_accept_port(9880),
            )
            .allow_counterparty("ALPHA")
            .allow_counterparty("BRAVO")
    }

    fn initiator_gateway(transport: Arc<RecordingTransport>) -> Gateway {
        GatewayBuilder::new()
            .with_config(
                GatewayConfig::new()
                    .add_session(SessionSection::initiator("FIX.4.4", "CLIENT", "GATEWAY")),
            )
            .with_transport(transport)
            .build()
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let transport = Arc::new(RecordingTransport::new());
        let gateway = GatewayBuilder::new()
            .with_config(GatewayConfig::new())
            .with_transport(transport.clone())
            .build();

        assert!(matches!(gateway.start(), Err(StartError::Config(_))));
        assert!(!transport.is_started());
        assert_eq!(gateway.phase(), StartupPhase::NotStarted);
    }

    #[test]
    fn test_start_binds_templates() {
        let transport = Arc::new(RecordingTransport::new());
        let gateway = GatewayBuilder::new()
            .with_config(acceptor_config())
            .with_transport(transport.clone())
            .build();

        gateway.start().unwrap();
        assert!(transport.is_started());
        assert_eq!(gateway.phase(), StartupPhase::Started);
        let expected: std::net::SocketAddr = "0.0.0.0:9880".parse().unwrap();
        assert_eq!(transport.bound_addresses(), vec![expected]);
    }

    #[test]
    fn test_start_surfaces_transport_failure() {
        let transport = Arc::new(RecordingTransport::new());
        transport.fail_next_start();
        let gateway = GatewayBuilder::new()
            .with_config(acceptor_config())
            .with_transport(transport.clone())
            .build();

        assert!(matches!(gateway.start(), Err(StartError::Transport(_))));
        assert_eq!(gateway.phase(), StartupPhase::NotStarted);
    }

    #[test]
    fn test_ensure_active_starts_then_redrives_logon() {
        let transport = Arc::new(RecordingTransport::new());
        let gateway = initiator_gateway(Arc::clone(&transport));

        gateway.ensure_active().unwrap();
        assert!(transport.is_started());
        assert!(transport.logon_requests().is_empty());

        transport.set_sessions(vec![client_session()]);
        gateway.ensure_active().unwrap();
        assert_eq!(transport.logon_requests(), vec![client_session()]);
    }

    #[test]
    fn test_stop_resets_latch() {
        let transport = Arc::new(RecordingTransport::new());
        let gateway = initiator_gateway(Arc::clone(&transport));

        gateway.start().unwrap();
        gateway.stop();
        assert!(!transport.is_started());
        assert_eq!(gateway.phase(), StartupPhase::NotStarted);
    }

    #[tokio::test]
    async fn test_logon_gate_blocks_unlisted_counterparty() {
        let transport = Arc::new(RecordingTransport::new());
        let gateway = GatewayBuilder::new()
            .with_config(acceptor_config())
            .with_transport(transport)
            .build();
        let app = gateway.application();

        let intruder = SessionKey::new(
            "FIX.4.4",
            CompId::new("GATEWAY").unwrap(),
            CompId::new("INTRUDER").unwrap(),
        );
        app.on_create(&intruder).await;
        let logon = AdminMessage::Logon {
            heartbeat_interval: 30,
        };
        assert!(app.from_admin(&logon, &intruder).await.is_err());
        assert_eq!(
            gateway.registry().current_state(&intruder),
            Some(SessionLifecycle::Created)
        );

        // A listed counterparty on the same gateway is unaffected.
        let listed = SessionKey::new(
            "FIX.4.4",
            CompId::new("GATEWAY").unwrap(),
            CompId::new("ALPHA").unwrap(),
        );
        app.on_create(&listed).await;
        assert!(app.from_admin(&logon, &listed).await.is_ok());
        app.on_logon(&listed).await;
        assert!(gateway.registry().is_logged_on(&listed));
    }

    #[tokio::test]
    async fn test_acceptor_acknowledges_inbound_order() {
        let transport = Arc::new(RecordingTransport::new());
        let gateway = GatewayBuilder::new()
            .with_config(acceptor_config())
            .with_transport(transport.clone())
            .with_order_acknowledgement(true)
            .build();
        let app = gateway.application();

        let session = SessionKey::new(
            "FIX.4.4",
            CompId::new("GATEWAY").unwrap(),
            CompId::new("ALPHA").unwrap(),
        );
        let inbound = AppMessage::NewOrderSingle(fixgate_core::message::NewOrderSingle {
            cl_ord_id: id("IT001"),
            symbol: "BTC".to_string(),
            side: Side::Buy,
            order_qty: Decimal::ZERO,
            price: None,
            ord_type: fixgate_core::message::OrdType::Market,
            time_in_force: fixgate_core::message::TimeInForce::Day,
            currency: Some("CNY".to_string()),
            transact_time: fixgate_core::types::Timestamp::from_millis(0),
        });
        app.from_app(&inbound, &session).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(
            sent[0].0,
            crate::transport::OutboundMessage::ExecutionReport(_)
        ));
    }

    #[tokio::test]
    async fn test_order_lifecycle_end_to_end() {
        let transport = Arc::new(RecordingTransport::new());
        let gateway = initiator_gateway(Arc::clone(&transport));
        let app = gateway.application();
        let session = client_session();

        gateway.start().unwrap();
        app.on_create(&session).await;
        app.on_logon(&session).await;

        let submitted = gateway
            .submit_new_order(NewOrderCommand::market(
                session.clone(),
                id("IT001"),
                "BTC",
                Side::Buy,
                Decimal::ZERO,
            ))
            .unwrap();
        assert_eq!(submitted, id("IT001"));
        assert_eq!(
            gateway.orders().status_of(&id("IT001")),
            Some(OrdStatus::Pending)
        );

        app.from_app(
            &AppMessage::ExecutionReport(report("IT001", OrdStatus::New)),
            &session,
        )
        .await
        .unwrap();
        assert_eq!(
            gateway.orders().status_of(&id("IT001")),
            Some(OrdStatus::New)
        );

        app.from_app(
            &AppMessage::ExecutionReport(report("IT001", OrdStatus::Filled)),
            &session,
        )
        .await
        .unwrap();
        assert_eq!(
            gateway.orders().status_of(&id("IT001")),
            Some(OrdStatus::Filled)
        );

        let err = gateway
            .submit_cancel(CancelCommand::new(session.clone(), id("IT001"), id("C1")))
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::InvalidState {
                status: OrdStatus::Filled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_submit_after_logout_fails_fast() {
        let transport = Arc::new(RecordingTransport::new());
        let gateway = initiator_gateway(Arc::clone(&transport));
        let app = gateway.application();
        let session = client_session();

        app.on_create(&session).await;
        app.on_logon(&session).await;
        app.on_logout(&session).await;

        let sent_before = transport.sent_count();
        let err = gateway
            .submit_new_order(NewOrderCommand::market(
                session.clone(),
                id("IT001"),
                "BTC",
                Side::Buy,
                Decimal::ZERO,
            ))
            .unwrap_err();
        assert!(matches!(err, SubmitError::SessionNotLoggedOn { .. }));
        assert_eq!(transport.sent_count(), sent_before);
    }
}
