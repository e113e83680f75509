/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Decoded message model for the transport boundary.
//!
//! The transport engine owns the wire grammar; what crosses into the gateway
//! are already-decoded messages. This module provides:
//! - [`NewOrderSingle`], [`OrderCancelRequest`], [`ExecutionReport`]: the
//!   application messages the gateway originates or consumes
//! - [`AppMessage`] / [`AdminMessage`]: tagged unions used for dispatch by
//!   explicit message kind rather than runtime type inspection
//! - [`MessageKind`]: the dispatch tag, aligned with FIX MsgType characters

use crate::types::{ClOrdId, OrdStatus, Px, Qty, Side, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order type (tag 40).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrdType {
    /// Market order.
    Market,
    /// Limit order.
    Limit,
}

impl OrdType {
    /// Returns the FIX character for this order type.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Market => '1',
            Self::Limit => '2',
        }
    }
}

/// Time in force (tag 59).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Valid for the trading day.
    #[default]
    Day,
    /// Good until canceled.
    GoodTillCancel,
    /// Immediate or cancel.
    ImmediateOrCancel,
}

impl TimeInForce {
    /// Returns the FIX character for this time in force.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Day => '0',
            Self::GoodTillCancel => '1',
            Self::ImmediateOrCancel => '3',
        }
    }
}

/// Execution type (tag 150) carried by an execution report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecType {
    /// Order accepted.
    New,
    /// Order canceled.
    Canceled,
    /// Cancel pending.
    PendingCancel,
    /// Order rejected.
    Rejected,
    /// Fill or partial fill.
    Trade,
}

impl ExecType {
    /// Creates an ExecType from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::New),
            '4' => Some(Self::Canceled),
            '6' => Some(Self::PendingCancel),
            '8' => Some(Self::Rejected),
            'F' => Some(Self::Trade),
            _ => None,
        }
    }

    /// Returns the FIX character for this execution type.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::New => '0',
            Self::Canceled => '4',
            Self::PendingCancel => '6',
            Self::Rejected => '8',
            Self::Trade => 'F',
        }
    }
}

/// New order request (MsgType D).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderSingle {
    /// Client-assigned order identifier (tag 11).
    pub cl_ord_id: ClOrdId,
    /// Instrument symbol (tag 55).
    pub symbol: String,
    /// Order side (tag 54).
    pub side: Side,
    /// Requested quantity (tag 38).
    pub order_qty: Qty,
    /// Limit price (tag 44), absent for market orders.
    pub price: Option<Px>,
    /// Order type (tag 40).
    pub ord_type: OrdType,
    /// Time in force (tag 59).
    pub time_in_force: TimeInForce,
    /// Settlement currency (tag 15).
    pub currency: Option<String>,
    /// Time the command was built (tag 60).
    pub transact_time: Timestamp,
}

/// Cancel request for a previously submitted order (MsgType F).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelRequest {
    /// Client-assigned identifier of the cancel request itself (tag 11).
    pub cl_ord_id: ClOrdId,
    /// Identifier of the order being canceled (tag 41).
    pub orig_cl_ord_id: ClOrdId,
    /// Instrument symbol (tag 55).
    pub symbol: String,
    /// Order side (tag 54).
    pub side: Side,
    /// Quantity being canceled (tag 38).
    pub order_qty: Qty,
    /// Free text (tag 58).
    pub text: Option<String>,
    /// Time the command was built (tag 60).
    pub transact_time: Timestamp,
}

/// Asynchronous status update for a previously submitted order (MsgType 8).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Echoed client order identifier (tag 11), if the counterparty echoed it.
    pub cl_ord_id: Option<ClOrdId>,
    /// Exchange-assigned order identifier (tag 37).
    pub order_id: Option<String>,
    /// Execution identifier (tag 17).
    pub exec_id: String,
    /// Execution type (tag 150).
    pub exec_type: ExecType,
    /// Order status after this execution (tag 39).
    pub ord_status: OrdStatus,
    /// Instrument symbol (tag 55).
    pub symbol: String,
    /// Order side (tag 54).
    pub side: Side,
    /// Quantity open for further execution (tag 151).
    pub leaves_qty: Qty,
    /// Cumulative executed quantity (tag 14).
    pub cum_qty: Qty,
    /// Average execution price (tag 6).
    pub avg_px: Px,
    /// Free text (tag 58).
    pub text: Option<String>,
    /// Counterparty transaction time (tag 60).
    pub transact_time: Timestamp,
}

/// Dispatch tag for application messages, aligned with FIX MsgType.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// New Order Single (D).
    NewOrderSingle,
    /// Order Cancel Request (F).
    OrderCancelRequest,
    /// Execution Report (8).
    ExecutionReport,
}

impl MessageKind {
    /// Returns the FIX MsgType character for this kind.
    #[must_use]
    pub const fn msg_type(self) -> char {
        match self {
            Self::NewOrderSingle => 'D',
            Self::OrderCancelRequest => 'F',
            Self::ExecutionReport => '8',
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NewOrderSingle => "NewOrderSingle",
            Self::OrderCancelRequest => "OrderCancelRequest",
            Self::ExecutionReport => "ExecutionReport",
        };
        write!(f, "{}", name)
    }
}

/// Decoded application message delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMessage {
    /// New order request.
    NewOrderSingle(NewOrderSingle),
    /// Cancel request.
    OrderCancelRequest(OrderCancelRequest),
    /// Execution report.
    ExecutionReport(ExecutionReport),
}

impl AppMessage {
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

/// Decoded administrative message delivered by the transport.
///
/// Only the admin traffic the gateway acts on is modeled; everything else
/// stays inside the transport engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminMessage {
    /// Logon request or acknowledgement (MsgType A).
    Logon {
        /// Negotiated heartbeat interval in seconds (tag 108).
        heartbeat_interval: u32,
    },
    /// Logout (MsgType 5).
    Logout {
        /// Free text (tag 58).
        text: Option<String>,
    },
    /// Heartbeat (MsgType 0).
    Heartbeat {
        /// TestReqID being answered (tag 112), if any.
        test_req_id: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn order(id: &str) -> NewOrderSingle {
        NewOrderSingle {
            cl_ord_id: ClOrdId::new(id).unwrap(),
            symbol: "BTC".to_string(),
            side: Side::Buy,
            order_qty: Decimal::ZERO,
            price: None,
            ord_type: OrdType::Market,
            time_in_force: TimeInForce::Day,
            currency: Some("CNY".to_string()),
            transact_time: Timestamp::from_millis(0),
        }
    }

    #[test]
    fn test_app_message_kind() {
        let msg = AppMessage::NewOrderSingle(order("A1"));
        assert_eq!(msg.kind(), MessageKind::NewOrderSingle);
        assert_eq!(msg.kind().msg_type(), 'D');
        assert_eq!(msg.kind().to_string(), "NewOrderSingle");
    }

    #[test]
    fn test_exec_type_roundtrip() {
        for exec in [
            ExecType::New,
            ExecType::Canceled,
            ExecType::PendingCancel,
            ExecType::Rejected,
            ExecType::Trade,
        ] {
            assert_eq!(ExecType::from_char(exec.as_char()), Some(exec));
        }
        assert_eq!(ExecType::from_char('z'), None);
    }

    #[test]
    fn test_ord_type_chars() {
        assert_eq!(OrdType::Market.as_char(), '1');
        assert_eq!(OrdType::Limit.as_char(), '2');
        assert_eq!(TimeInForce::Day.as_char(), '0');
    }
}
