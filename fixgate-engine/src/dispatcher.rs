/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Command dispatch.
//!
//! The dispatcher builds outbound order and cancel messages from caller
//! commands, gates them on session liveness, submits them through the
//! transport's synchronous send primitive, and records them in the order
//! correlation table. All failures are synchronous, typed, and leave no
//! partial state behind; nothing is retried automatically.

use crate::orders::{OrderCorrelationTable, OrderRecord};
use crate::transport::{OutboundMessage, TransportHandle};
use fixgate_core::error::SubmitError;
use fixgate_core::message::{NewOrderSingle, OrdType, OrderCancelRequest, TimeInForce};
use fixgate_core::types::{ClOrdId, Px, Qty, SessionKey, Side, Timestamp};
use fixgate_session::registry::SessionRegistry;
use std::sync::Arc;
use tracing::{info, warn};

/// Caller-facing new-order command.
#[derive(Debug, Clone)]
pub struct NewOrderCommand {
    /// Session to submit on.
    pub session: SessionKey,
    /// Client-assigned order identifier.
    pub cl_ord_id: ClOrdId,
    /// Instrument symbol.
    pub symbol: String,
    /// Order side.
    pub side: Side,
    /// Requested quantity.
    pub order_qty: Qty,
    /// Limit price; absent for market orders.
    pub price: Option<Px>,
    /// Order type.
    pub ord_type: OrdType,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Settlement currency.
    pub currency: Option<String>,
}

impl NewOrderCommand {
    /// Creates a market-order command.
    #[must_use]
    pub fn market(
        session: SessionKey,
        cl_ord_id: ClOrdId,
        symbol: impl Into<String>,
        side: Side,
        order_qty: Qty,
    ) -> Self {
        Self {
            session,
            cl_ord_id,
            symbol: symbol.into(),
            side,
            order_qty,
            price: None,
            ord_type: OrdType::Market,
            time_in_force: TimeInForce::Day,
            currency: None,
        }
    }

    /// Creates a limit-order command.
    #[must_use]
    pub fn limit(
        session: SessionKey,
        cl_ord_id: ClOrdId,
        symbol: impl Into<String>,
        side: Side,
        order_qty: Qty,
        price: Px,
    ) -> Self {
        Self {
            price: Some(price),
            ord_type: OrdType::Limit,
            ..Self::market(session, cl_ord_id, symbol, side, order_qty)
        }
    }

    /// Sets the settlement currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Builds the wire message, stamping the transaction time.
    fn into_message(self) -> NewOrderSingle {
        NewOrderSingle {
            cl_ord_id: self.cl_ord_id,
            symbol: self.symbol,
            side: self.side,
            order_qty: self.order_qty,
            price: self.price,
            ord_type: self.ord_type,
            time_in_force: self.time_in_force,
            currency: self.currency,
            transact_time: Timestamp::now(),
        }
    }
}

/// Caller-facing cancel command.
#[derive(Debug, Clone)]
pub struct CancelCommand {
    /// Session to submit on.
    pub session: SessionKey,
    /// Identifier of the order being canceled.
    pub orig_cl_ord_id: ClOrdId,
    /// Client-assigned identifier of the cancel request itself.
    pub cancel_cl_ord_id: ClOrdId,
    /// Free text forwarded to the counterparty.
    pub text: Option<String>,
}

impl CancelCommand {
    /// Creates a cancel command.
    #[must_use]
    pub const fn new(session: SessionKey, orig_cl_ord_id: ClOrdId, cancel_cl_ord_id: ClOrdId) -> Self {
        Self {
            session,
            orig_cl_ord_id,
            cancel_cl_ord_id,
            text: None,
        }
    }

    /// Sets the free text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Builds, gates, and submits outbound order commands.
#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<SessionRegistry>,
    table: Arc<OrderCorrelationTable>,
    transport: Arc<dyn TransportHandle>,
}

impl CommandDispatcher {
    /// Creates a dispatcher over the shared registry, table, and transport.
    #[must_use]
    pub fn new(
        registry: Arc<SessionRegistry>,
        table: Arc<OrderCorrelationTable>,
        transport: Arc<dyn TransportHandle>,
    ) -> Self {
        Self {
            registry,
            table,
            transport,
        }
    }

    /// Submits a new order.
    ///
    /// On success the order is tracked as `Pending`; the first execution
    /// report advances it. A transport-refused send rolls the reservation
    /// back, leaving the table untouched.
    ///
    /// # Errors
    /// - `SubmitError::DuplicateOrderId` if the id was used before
    /// - `SubmitError::SessionNotLoggedOn` if the session is not live or
    ///   the transport refuses the send
    pub fn submit_new_order(&self, command: NewOrderCommand) -> Result<ClOrdId, SubmitError> {
        let cl_ord_id = command.cl_ord_id.clone();
        if self.table.contains(&cl_ord_id) {
            return Err(SubmitError::DuplicateOrderId { cl_ord_id });
        }
        let session = command.session.clone();
        if !self.registry.is_logged_on(&session) {
            return Err(SubmitError::SessionNotLoggedOn { session });
        }

        let message = command.into_message();
        self.table
            .reserve(OrderRecord::pending(session.clone(), message.clone()))?;

        if self
            .transport
            .send(OutboundMessage::NewOrderSingle(message), &session)
        {
            self.table.confirm_transmitted(&cl_ord_id);
            info!(session = %session, cl_ord_id = %cl_ord_id, "new order submitted");
            Ok(cl_ord_id)
        } else {
            self.table.release(&cl_ord_id);
            warn!(session = %session, cl_ord_id = %cl_ord_id, "transport refused new order send");
            Err(SubmitError::SessionNotLoggedOn { session })
        }
    }

    /// Submits a cancel for a previously submitted order.
    ///
    /// # Errors
    /// - `SubmitError::UnknownOrder` if the original id was never submitted
    /// - `SubmitError::InvalidState` if the order is already terminal
    /// - `SubmitError::SessionNotLoggedOn` if the session is not live or
    ///   the transport refuses the send
    pub fn submit_cancel(&self, command: CancelCommand) -> Result<(), SubmitError> {
        let orig = command.orig_cl_ord_id.clone();
        let record = self
            .table
            .record(&orig)
            .ok_or_else(|| SubmitError::UnknownOrder {
                cl_ord_id: orig.clone(),
            })?;
        if record.status.is_terminal() {
            return Err(SubmitError::InvalidState {
                cl_ord_id: orig,
                status: record.status,
            });
        }
        let session = command.session.clone();
        if !self.registry.is_logged_on(&session) {
            return Err(SubmitError::SessionNotLoggedOn { session });
        }

        let previous = self.table.begin_cancel(&orig)?;
        let message = OrderCancelRequest {
            cl_ord_id: command.cancel_cl_ord_id,
            orig_cl_ord_id: orig.clone(),
            symbol: record.symbol,
            side: record.side,
            order_qty: record.requested_qty,
            text: command.text,
            transact_time: Timestamp::now(),
        };

        if self
            .transport
            .send(OutboundMessage::OrderCancelRequest(message), &session)
        {
            info!(session = %session, cl_ord_id = %orig, "cancel submitted");
            Ok(())
        } else {
            self.table.rollback_cancel(&orig, previous);
            warn!(session = %session, cl_ord_id = %orig, "transport refused cancel send");
            Err(SubmitError::SessionNotLoggedOn { session })
        }
    }

    /// Re-sends every order on `session` whose transport send never
    /// succeeded.
    ///
    /// Safe to call after every reconnect: records already transmitted or
    /// already advanced by a report are untouched, so the operation is
    /// idempotent.
    ///
    /// # Returns
    /// The number of orders re-sent successfully.
    pub fn resend_pending(&self, session: &SessionKey) -> usize {
        if !self.registry.is_logged_on(session) {
            return 0;
        }
        let mut resent = 0;
        for cl_ord_id in self.table.pending_transmits(session) {
            let Some(record) = self.table.record(&cl_ord_id) else {
                continue;
            };
            let Some(message) = record.pending_send else {
                continue;
            };
            if self
                .transport
                .send(OutboundMessage::NewOrderSingle(message), session)
            {
                self.table.confirm_transmitted(&cl_ord_id);
                resent += 1;
                info!(session = %session, cl_ord_id = %cl_ord_id, "pending order re-sent");
            }
        }
        resent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::RecordingTransport;
    use fixgate_core::types::{CompId, OrdStatus};
    use rust_decimal::Decimal;

    fn session() -> SessionKey {
        SessionKey::new(
            "FIX.4.4",
            CompId::new("CLIENT").unwrap(),
            CompId::new("GATEWAY").unwrap(),
        )
    }

    fn id(s: &str) -> ClOrdId {
        ClOrdId::new(s).unwrap()
    }

    fn dispatcher(
        transport: Arc<RecordingTransport>,
    ) -> (CommandDispatcher, Arc<SessionRegistry>, Arc<OrderCorrelationTable>) {
        let registry = Arc::new(SessionRegistry::new());
        let table = Arc::new(OrderCorrelationTable::new());
        let dispatcher =
            CommandDispatcher::new(Arc::clone(&registry), Arc::clone(&table), transport);
        (dispatcher, registry, table)
    }

    fn logged_on(registry: &SessionRegistry) {
        registry.on_session_created(&session());
        registry.on_session_logged_on(&session());
    }

    #[test]
    fn test_submit_requires_logged_on_session() {
        let transport = Arc::new(RecordingTransport::new());
        let (dispatcher, _registry, table) = dispatcher(Arc::clone(&transport));

        let command =
            NewOrderCommand::market(session(), id("IT001"), "BTC", Side::Buy, Decimal::ZERO);
        let err = dispatcher.submit_new_order(command).unwrap_err();
        assert!(matches!(err, SubmitError::SessionNotLoggedOn { .. }));
        assert_eq!(transport.sent_count(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_submit_tracks_pending_order() {
        let transport = Arc::new(RecordingTransport::new());
        let (dispatcher, registry, table) = dispatcher(Arc::clone(&transport));
        logged_on(&registry);

        let command =
            NewOrderCommand::market(session(), id("IT001"), "BTC", Side::Buy, Decimal::ZERO);
        let submitted = dispatcher.submit_new_order(command).unwrap();
        assert_eq!(submitted, id("IT001"));
        assert_eq!(table.status_of(&id("IT001")), Some(OrdStatus::Pending));
        assert_eq!(transport.sent_count(), 1);
        assert!(!table.record(&id("IT001")).unwrap().awaiting_transmit());
    }

    #[test]
    fn test_duplicate_submit_rejected_without_send() {
        let transport = Arc::new(RecordingTransport::new());
        let (dispatcher, registry, _table) = dispatcher(Arc::clone(&transport));
        logged_on(&registry);

        let command =
            NewOrderCommand::market(session(), id("IT001"), "BTC", Side::Buy, Decimal::ZERO);
        dispatcher.submit_new_order(command.clone()).unwrap();
        let err = dispatcher.submit_new_order(command).unwrap_err();
        assert!(matches!(err, SubmitError::DuplicateOrderId { .. }));
        assert_eq!(transport.sent_count(), 1);
    }

    #[test]
    fn test_transport_refusal_rolls_back_reservation() {
        let transport = Arc::new(RecordingTransport::new());
        transport.script_send_results([false]);
        let (dispatcher, registry, table) = dispatcher(Arc::clone(&transport));
        logged_on(&registry);

        let command =
            NewOrderCommand::market(session(), id("IT001"), "BTC", Side::Buy, Decimal::ZERO);
        let err = dispatcher.submit_new_order(command).unwrap_err();
        assert!(matches!(err, SubmitError::SessionNotLoggedOn { .. }));
        assert!(table.is_empty());
    }

    #[test]
    fn test_cancel_unknown_and_terminal_orders() {
        let transport = Arc::new(RecordingTransport::new());
        let (dispatcher, registry, table) = dispatcher(Arc::clone(&transport));
        logged_on(&registry);

        let err = dispatcher
            .submit_cancel(CancelCommand::new(session(), id("GHOST"), id("C1")))
            .unwrap_err();
        assert!(matches!(err, SubmitError::UnknownOrder { .. }));

        let command =
            NewOrderCommand::market(session(), id("IT001"), "BTC", Side::Buy, Decimal::ZERO);
        dispatcher.submit_new_order(command).unwrap();
        table.apply_report(&crate::testsupport::report("IT001", OrdStatus::Filled));

        let err = dispatcher
            .submit_cancel(CancelCommand::new(session(), id("IT001"), id("C2")))
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::InvalidState {
                status: OrdStatus::Filled,
                ..
            }
        ));
    }

    #[test]
    fn test_cancel_moves_to_pending_cancel() {
        let transport = Arc::new(RecordingTransport::new());
        let (dispatcher, registry, table) = dispatcher(Arc::clone(&transport));
        logged_on(&registry);

        dispatcher
            .submit_new_order(NewOrderCommand::market(
                session(),
                id("IT001"),
                "BTC",
                Side::Buy,
                Decimal::ZERO,
            ))
            .unwrap();
        table.apply_report(&crate::testsupport::report("IT001", OrdStatus::New));

        dispatcher
            .submit_cancel(CancelCommand::new(session(), id("IT001"), id("C1")).with_text("bail"))
            .unwrap();
        assert_eq!(
            table.status_of(&id("IT001")),
            Some(OrdStatus::PendingCancel)
        );
        assert_eq!(transport.sent_count(), 2);
    }

    #[test]
    fn test_cancel_send_refusal_restores_status() {
        let transport = Arc::new(RecordingTransport::new());
        let (dispatcher, registry, table) = dispatcher(Arc::clone(&transport));
        logged_on(&registry);

        dispatcher
            .submit_new_order(NewOrderCommand::market(
                session(),
                id("IT001"),
                "BTC",
                Side::Buy,
                Decimal::ZERO,
            ))
            .unwrap();
        table.apply_report(&crate::testsupport::report("IT001", OrdStatus::New));

        transport.script_send_results([false]);
        let err = dispatcher
            .submit_cancel(CancelCommand::new(session(), id("IT001"), id("C1")))
            .unwrap_err();
        assert!(matches!(err, SubmitError::SessionNotLoggedOn { .. }));
        assert_eq!(table.status_of(&id("IT001")), Some(OrdStatus::New));
    }

    #[test]
    fn test_resend_pending_after_reconnect() {
        let transport = Arc::new(RecordingTransport::new());
        transport.script_send_results([false]);
        let (dispatcher, registry, table) = dispatcher(Arc::clone(&transport));
        logged_on(&registry);

        // First attempt is refused; the reservation rolls back, so the
        // caller resubmits and this time the send is queued but the record
        // keeps its pending message until the transport accepts it.
        let command =
            NewOrderCommand::market(session(), id("IT001"), "BTC", Side::Buy, Decimal::ZERO);
        assert!(dispatcher.submit_new_order(command.clone()).is_err());
        dispatcher.submit_new_order(command).unwrap();

        // Simulate a lost transmit: the record still awaits a send.
        transport.script_send_results([true]);
        table
            .reserve(crate::testsupport::pending_record(session(), "IT002"))
            .unwrap();
        assert_eq!(dispatcher.resend_pending(&session()), 1);
        assert!(!table.record(&id("IT002")).unwrap().awaiting_transmit());

        // Nothing left awaiting transmit; resend is a no-op.
        assert_eq!(dispatcher.resend_pending(&session()), 0);
    }
}
