/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Test doubles shared by the engine unit tests.

use crate::orders::OrderRecord;
use crate::transport::{OutboundMessage, TransportHandle};
use fixgate_core::error::TransportError;
use fixgate_core::message::{ExecType, ExecutionReport, NewOrderSingle, OrdType, TimeInForce};
use fixgate_core::types::{ClOrdId, OrdStatus, SessionKey, Side, Timestamp};
use fixgate_session::resolver::TemplateMapping;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

/// Scripted transport double recording everything the gateway hands it.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    send_results: Mutex<VecDeque<bool>>,
    sent: Mutex<Vec<(OutboundMessage, SessionKey)>>,
    session_list: Mutex<Vec<SessionKey>>,
    logon_requests: Mutex<Vec<SessionKey>>,
    bound_addresses: Mutex<Vec<SocketAddr>>,
    started: AtomicBool,
    fail_start: AtomicBool,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues scripted results for upcoming sends; the queue drained, sends
    /// succeed.
    pub(crate) fn script_send_results(&self, results: impl IntoIterator<Item = bool>) {
        self.send_results.lock().extend(results);
    }

    pub(crate) fn set_sessions(&self, sessions: Vec<SessionKey>) {
        *self.session_list.lock() = sessions;
    }

    pub(crate) fn fail_next_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    pub(crate) fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub(crate) fn sent(&self) -> Vec<(OutboundMessage, SessionKey)> {
        self.sent.lock().clone()
    }

    pub(crate) fn logon_requests(&self) -> Vec<SessionKey> {
        self.logon_requests.lock().clone()
    }

    pub(crate) fn bound_addresses(&self) -> Vec<SocketAddr> {
        self.bound_addresses.lock().clone()
    }

    pub(crate) fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

impl TransportHandle for RecordingTransport {
    fn bind_templates(
        &self,
        providers: &HashMap<SocketAddr, Vec<TemplateMapping>>,
    ) -> Result<(), TransportError> {
        self.bound_addresses.lock().extend(providers.keys().copied());
        Ok(())
    }

    fn start(&self) -> Result<(), TransportError> {
        if self.fail_start.swap(false, Ordering::SeqCst) {
            return Err(TransportError::StartFailed {
                reason: "scripted failure".to_string(),
            });
        }
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.started.store(false, Ordering::SeqCst);
    }

    fn send(&self, message: OutboundMessage, key: &SessionKey) -> bool {
        let result = self.send_results.lock().pop_front().unwrap_or(true);
        if result {
            self.sent.lock().push((message, key.clone()));
        }
        result
    }

    fn sessions(&self) -> Vec<SessionKey> {
        self.session_list.lock().clone()
    }

    fn request_logon(&self, key: &SessionKey) {
        self.logon_requests.lock().push(key.clone());
    }
}

/// Builds an execution report echoing `cl_ord_id` with the given status.
pub(crate) fn report(cl_ord_id: &str, status: OrdStatus) -> ExecutionReport {
    ExecutionReport {
        cl_ord_id: Some(ClOrdId::new(cl_ord_id).unwrap()),
        order_id: Some(format!("EX-{cl_ord_id}")),
        exec_id: format!("EXEC-{cl_ord_id}"),
        exec_type: ExecType::New,
        ord_status: status,
        symbol: "BTC".to_string(),
        side: Side::Buy,
        leaves_qty: Decimal::ONE,
        cum_qty: Decimal::ZERO,
        avg_px: Decimal::ZERO,
        text: None,
        transact_time: Timestamp::from_millis(0),
    }
}

/// Builds a pending order record that still awaits its transport send.
pub(crate) fn pending_record(session: SessionKey, cl_ord_id: &str) -> OrderRecord {
    let message = NewOrderSingle {
        cl_ord_id: ClOrdId::new(cl_ord_id).unwrap(),
        symbol: "BTC".to_string(),
        side: Side::Buy,
        order_qty: Decimal::ONE,
        price: None,
        ord_type: OrdType::Market,
        time_in_force: TimeInForce::Day,
        currency: None,
        transact_time: Timestamp::from_millis(0),
    };
    OrderRecord::pending(session, message)
}
