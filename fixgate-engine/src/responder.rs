/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Acceptor-side order acknowledgement.
//!
//! When the gateway runs as an acceptor, every inbound new-order request is
//! answered with an execution report echoing the client order id and
//! carrying a freshly assigned exchange order id. Cancel requests are
//! logged; their disposition belongs to the venue behind the gateway.

use crate::transport::{OutboundMessage, TransportHandle};
use fixgate_core::message::{ExecType, ExecutionReport, NewOrderSingle, OrderCancelRequest};
use fixgate_core::types::{OrdStatus, SessionKey, Timestamp};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// Answers inbound order traffic on acceptor sessions.
pub struct ExecResponder {
    transport: Arc<dyn TransportHandle>,
    exec_seq: AtomicU64,
}

impl ExecResponder {
    /// Creates a responder sending through the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn TransportHandle>) -> Self {
        Self {
            transport,
            exec_seq: AtomicU64::new(1),
        }
    }

    /// Acknowledges an inbound new-order request with a `New` execution
    /// report sent back on the session it arrived on.
    ///
    /// # Returns
    /// `true` if the transport accepted the report.
    pub fn acknowledge_new_order(&self, order: &NewOrderSingle, key: &SessionKey) -> bool {
        let seq = self.exec_seq.fetch_add(1, Ordering::SeqCst);
        let report = ExecutionReport {
            cl_ord_id: Some(order.cl_ord_id.clone()),
            order_id: Some(format!("ORD-{seq:06}")),
            exec_id: format!("EXEC-{seq:06}"),
            exec_type: ExecType::New,
            ord_status: OrdStatus::New,
            symbol: order.symbol.clone(),
            side: order.side,
            leaves_qty: order.order_qty,
            cum_qty: Decimal::ZERO,
            avg_px: Decimal::ZERO,
            text: Some("accepted".to_string()),
            transact_time: Timestamp::now(),
        };

        let sent = self
            .transport
            .send(OutboundMessage::ExecutionReport(report), key);
        if sent {
            info!(
                session = %key,
                cl_ord_id = %order.cl_ord_id,
                symbol = %order.symbol,
                "new order acknowledged"
            );
        } else {
            warn!(
                session = %key,
                cl_ord_id = %order.cl_ord_id,
                "order acknowledgement send refused"
            );
        }
        sent
    }

    /// Records an inbound cancel request.
    pub fn on_cancel_request(&self, request: &OrderCancelRequest, key: &SessionKey) {
        warn!(
            session = %key,
            cl_ord_id = %request.cl_ord_id,
            orig_cl_ord_id = %request.orig_cl_ord_id,
            "cancel request received"
        );
    }
}
