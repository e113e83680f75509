/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Order correlation table.
//!
//! Maps client-assigned order identifiers to their current status and
//! pending-send state. Records are created when a new-order command is
//! built, mutated only by inbound execution-report processing, and retained
//! for the life of the process.
//!
//! Concurrency: the duplicate-check-then-insert sequence holds the map
//! write lock; all per-record mutation holds only that record's mutex, so
//! independent orders proceed in parallel. Reports for the same client
//! order id are applied in delivery order; backward transitions are
//! refused, logged, and dropped.

use fixgate_core::error::SubmitError;
use fixgate_core::message::{ExecutionReport, NewOrderSingle};
use fixgate_core::types::{ClOrdId, OrdStatus, Px, Qty, SessionKey, Side, Timestamp};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Correlation state for one submitted order.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    /// Client-assigned order identifier.
    pub cl_ord_id: ClOrdId,
    /// Session the order was submitted on.
    pub session: SessionKey,
    /// Instrument symbol.
    pub symbol: String,
    /// Order side.
    pub side: Side,
    /// Requested quantity.
    pub requested_qty: Qty,
    /// Limit price, if any.
    pub price: Option<Px>,
    /// Exchange-assigned order identifier, filled on first execution report.
    pub exchange_order_id: Option<String>,
    /// Current status.
    pub status: OrdStatus,
    /// The built message awaiting a successful transport send, if any.
    ///
    /// Cleared once the transport acknowledges transmission; used to
    /// re-send idempotently after a reconnect.
    pub pending_send: Option<NewOrderSingle>,
    /// Time the command was built.
    pub created_at: Timestamp,
    /// Time of the last applied mutation.
    pub last_update: Timestamp,
}

impl OrderRecord {
    /// Creates the initial record for a just-built new-order message.
    #[must_use]
    pub fn pending(session: SessionKey, message: NewOrderSingle) -> Self {
        let now = Timestamp::now();
        Self {
            cl_ord_id: message.cl_ord_id.clone(),
            session,
            symbol: message.symbol.clone(),
            side: message.side,
            requested_qty: message.order_qty,
            price: message.price,
            exchange_order_id: None,
            status: OrdStatus::Pending,
            pending_send: Some(message),
            created_at: now,
            last_update: now,
        }
    }

    /// Returns true if the record's transport send has not yet succeeded.
    #[must_use]
    pub const fn awaiting_transmit(&self) -> bool {
        self.pending_send.is_some()
    }
}

/// Table correlating outbound order commands with execution reports.
///
/// The table exclusively owns [`OrderRecord`] state. Client order ids are
/// unique for the process lifetime; a duplicate insertion is rejected, not
/// overwritten, and records are never deleted once a send succeeded.
#[derive(Debug, Default)]
pub struct OrderCorrelationTable {
    records: RwLock<HashMap<ClOrdId, Arc<Mutex<OrderRecord>>>>,
    by_exchange_id: RwLock<HashMap<String, ClOrdId>>,
}

impl OrderCorrelationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, cl_ord_id: &ClOrdId) -> Option<Arc<Mutex<OrderRecord>>> {
        self.records.read().get(cl_ord_id).map(Arc::clone)
    }

    /// Returns true if a record exists for the id.
    #[must_use]
    pub fn contains(&self, cl_ord_id: &ClOrdId) -> bool {
        self.records.read().contains_key(cl_ord_id)
    }

    /// Inserts the initial record for a new-order command.
    ///
    /// The duplicate check and the insertion are one critical section.
    ///
    /// # Errors
    /// Returns `SubmitError::DuplicateOrderId` if the id is already present;
    /// the existing record is not touched.
    pub fn reserve(&self, record: OrderRecord) -> Result<(), SubmitError> {
        let mut records = self.records.write();
        if records.contains_key(&record.cl_ord_id) {
            return Err(SubmitError::DuplicateOrderId {
                cl_ord_id: record.cl_ord_id,
            });
        }
        records.insert(record.cl_ord_id.clone(), Arc::new(Mutex::new(record)));
        Ok(())
    }

    /// Removes a reservation whose transport send failed.
    ///
    /// Submission failures must not leave partial state behind; this undoes
    /// a [`OrderCorrelationTable::reserve`] that never reached the wire.
    pub fn release(&self, cl_ord_id: &ClOrdId) {
        self.records.write().remove(cl_ord_id);
    }

    /// Marks the record's message as successfully handed to the transport.
    ///
    /// The status stays `Pending`: transmission is not acceptance, only the
    /// first execution report advances the status.
    pub fn confirm_transmitted(&self, cl_ord_id: &ClOrdId) {
        if let Some(handle) = self.handle(cl_ord_id) {
            let mut record = handle.lock();
            record.pending_send = None;
            record.last_update = Timestamp::now();
        }
    }

    /// Moves an order to `PendingCancel` ahead of a cancel-request send.
    ///
    /// # Errors
    /// - `SubmitError::UnknownOrder` if no record exists for the id
    /// - `SubmitError::InvalidState` if the order is already terminal
    ///
    /// # Returns
    /// The status the order held before the transition, for rollback if the
    /// cancel send fails.
    pub fn begin_cancel(&self, cl_ord_id: &ClOrdId) -> Result<OrdStatus, SubmitError> {
        let handle = self
            .handle(cl_ord_id)
            .ok_or_else(|| SubmitError::UnknownOrder {
                cl_ord_id: cl_ord_id.clone(),
            })?;
        let mut record = handle.lock();
        if record.status.is_terminal() {
            return Err(SubmitError::InvalidState {
                cl_ord_id: cl_ord_id.clone(),
                status: record.status,
            });
        }
        let previous = record.status;
        record.status = OrdStatus::PendingCancel;
        record.last_update = Timestamp::now();
        Ok(previous)
    }

    /// Restores the status saved by [`OrderCorrelationTable::begin_cancel`]
    /// after a failed cancel send.
    pub fn rollback_cancel(&self, cl_ord_id: &ClOrdId, previous: OrdStatus) {
        if let Some(handle) = self.handle(cl_ord_id) {
            let mut record = handle.lock();
            record.status = previous;
            record.last_update = Timestamp::now();
        }
    }

    /// Applies an inbound execution report.
    ///
    /// Resolution is by the echoed client order id; a report without one is
    /// recovered through the exchange-id index when possible. Reports for
    /// unknown orders and reports implying a backward status transition are
    /// logged and dropped; the inbound path never fails.
    ///
    /// # Returns
    /// `true` if the report mutated a record.
    pub fn apply_report(&self, report: &ExecutionReport) -> bool {
        let cl_ord_id = match self.resolve_report_id(report) {
            Some(id) => id,
            None => return false,
        };

        let handle = match self.handle(&cl_ord_id) {
            Some(handle) => handle,
            None => {
                warn!(
                    cl_ord_id = %cl_ord_id,
                    order_id = report.order_id.as_deref().unwrap_or("-"),
                    "execution report for unknown order dropped"
                );
                return false;
            }
        };

        let mut record = handle.lock();

        // First sight of the exchange-assigned id, even on a report whose
        // status transition ends up refused.
        if record.exchange_order_id.is_none() {
            if let Some(order_id) = &report.order_id {
                record.exchange_order_id = Some(order_id.clone());
                self.by_exchange_id
                    .write()
                    .insert(order_id.clone(), cl_ord_id.clone());
            }
        }

        if !record.status.can_transition_to(report.ord_status) {
            warn!(
                cl_ord_id = %cl_ord_id,
                current = %record.status,
                reported = %report.ord_status,
                "out-of-order execution report discarded"
            );
            return false;
        }

        debug!(
            cl_ord_id = %cl_ord_id,
            from = %record.status,
            to = %report.ord_status,
            "order status advanced"
        );
        record.status = report.ord_status;
        record.pending_send = None;
        record.last_update = Timestamp::now();
        true
    }

    fn resolve_report_id(&self, report: &ExecutionReport) -> Option<ClOrdId> {
        if let Some(id) = &report.cl_ord_id {
            return Some(id.clone());
        }
        match &report.order_id {
            Some(order_id) => {
                let recovered = self.by_exchange_id.read().get(order_id).cloned();
                if recovered.is_none() {
                    warn!(
                        order_id = %order_id,
                        "execution report without client order id dropped"
                    );
                }
                recovered
            }
            None => {
                warn!("execution report carries no correlatable id, dropped");
                None
            }
        }
    }

    /// Returns the current status of an order.
    #[must_use]
    pub fn status_of(&self, cl_ord_id: &ClOrdId) -> Option<OrdStatus> {
        self.handle(cl_ord_id).map(|handle| handle.lock().status)
    }

    /// Returns a snapshot of an order record.
    #[must_use]
    pub fn record(&self, cl_ord_id: &ClOrdId) -> Option<OrderRecord> {
        self.handle(cl_ord_id).map(|handle| handle.lock().clone())
    }

    /// Returns the ids of records on `session` still awaiting a successful
    /// transport send.
    #[must_use]
    pub fn pending_transmits(&self, session: &SessionKey) -> Vec<ClOrdId> {
        self.records
            .read()
            .values()
            .filter_map(|handle| {
                let record = handle.lock();
                (record.session == *session && record.awaiting_transmit())
                    .then(|| record.cl_ord_id.clone())
            })
            .collect()
    }

    /// Returns the number of tracked orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if no orders are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
