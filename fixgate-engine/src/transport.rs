/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Transport engine boundary.
//!
//! The gateway never touches sockets, framing, sequence numbers, or message
//! stores; all of that belongs to an external transport engine. This module
//! defines the contract the gateway consumes: a synchronous outbound send
//! primitive, session enumeration, logon re-driving, and the handoff of the
//! resolved listen-address to template-set binding.

use fixgate_core::error::TransportError;
use fixgate_core::message::{ExecutionReport, MessageKind, NewOrderSingle, OrderCancelRequest};
use fixgate_core::types::SessionKey;
use fixgate_session::resolver::TemplateMapping;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Outbound message handed to the transport for encoding and delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// New order request.
    NewOrderSingle(NewOrderSingle),
    /// Cancel request.
    OrderCancelRequest(OrderCancelRequest),
    /// Execution report.
    ExecutionReport(ExecutionReport),
}

impl OutboundMessage {
    /// Returns the dispatch tag for this message.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::NewOrderSingle(_) => MessageKind::NewOrderSingle,
            Self::OrderCancelRequest(_) => MessageKind::OrderCancelRequest,
            Self::ExecutionReport(_) => MessageKind::ExecutionReport,
        }
    }
}

/// Handle to the external transport engine.
///
/// Implementations wrap a concrete FIX engine. All methods are callable from
/// any worker thread; `send` is synchronous and bounded (it may briefly
/// block on a socket write buffer but performs no retries).
pub trait TransportHandle: Send + Sync {
    /// Hands the resolved template providers to the transport.
    ///
    /// Must be called before [`TransportHandle::start`]. The transport is
    /// responsible for matching an inbound connection's negotiated CompIDs
    /// against the templates bound to the address it connected on.
    ///
    /// # Errors
    /// Returns `TransportError::BindFailed` if an address cannot be bound.
    fn bind_templates(
        &self,
        providers: &HashMap<SocketAddr, Vec<TemplateMapping>>,
    ) -> Result<(), TransportError>;

    /// Starts the transport: binds listeners and/or opens outbound
    /// connections for the configured sessions.
    ///
    /// # Errors
    /// Returns `TransportError::StartFailed` if the transport cannot start.
    fn start(&self) -> Result<(), TransportError>;

    /// Stops the transport and drops all connections.
    fn stop(&self);

    /// Sends a message on the given session.
    ///
    /// # Returns
    /// `false` if the session is not currently logged on at the transport
    /// layer. The gateway treats `false` identically to a
    /// `SessionNotLoggedOn` failure.
    fn send(&self, message: OutboundMessage, key: &SessionKey) -> bool;

    /// Returns the keys of all sessions currently known to the transport.
    fn sessions(&self) -> Vec<SessionKey>;

    /// Asks the transport to re-drive the logon handshake for a session.
    fn request_logon(&self, key: &SessionKey);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgate_core::message::{OrdType, TimeInForce};
    use fixgate_core::types::{ClOrdId, Side, Timestamp};
    use rust_decimal::Decimal;

    #[test]
    fn test_outbound_message_kind() {
        let order = NewOrderSingle {
            cl_ord_id: ClOrdId::new("A1").unwrap(),
            symbol: "BTC".to_string(),
            side: Side::Buy,
            order_qty: Decimal::ONE,
            price: None,
            ord_type: OrdType::Market,
            time_in_force: TimeInForce::Day,
            currency: None,
            transact_time: Timestamp::from_millis(0),
        };
        let msg = OutboundMessage::NewOrderSingle(order);
        assert_eq!(msg.kind(), MessageKind::NewOrderSingle);
        assert_eq!(msg.kind().msg_type(), 'D');
    }
}
