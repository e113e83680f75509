/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Core types for gateway session and order identification.
//!
//! This module provides the fundamental types used throughout the FixGate gateway:
//! - [`CompId`]: Component identifier (SenderCompID, TargetCompID)
//! - [`SessionKey`]: Identity of a logical counterparty session
//! - [`ClOrdId`]: Client-assigned order identifier
//! - [`Side`]: Order side enumeration
//! - [`OrdStatus`]: Order status with the monotonic transition relation
//! - [`Timestamp`]: UTC timestamp with FIX-style formatting

use arrayvec::ArrayString;
use chrono::{DateTime, Utc};
use num_derive::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for CompID strings in bytes.
pub const COMP_ID_MAX_LEN: usize = 32;

/// Maximum length for client order identifiers in bytes.
pub const CL_ORD_ID_MAX_LEN: usize = 64;

/// Order quantity as an exact decimal value.
pub type Qty = Decimal;

/// Price as an exact decimal value.
pub type Px = Decimal;

/// Component identifier for FIX sessions.
///
/// Used for SenderCompID (tag 49), TargetCompID (tag 56), and related fields.
/// Maximum length is 32 characters as per FIX specification.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct CompId(ArrayString<COMP_ID_MAX_LEN>);

impl CompId {
    /// Creates a new CompId from a string slice.
    ///
    /// # Arguments
    /// * `s` - The component identifier string
    ///
    /// # Returns
    /// `Some(CompId)` if the string fits within the maximum length, `None` otherwise.
    #[must_use]
    pub fn new(s: &str) -> Option<Self> {
        ArrayString::from(s).ok().map(Self)
    }

    /// Returns the CompId as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the length of the CompId in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the CompId is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for CompId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CompId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompId {
    type Err = arrayvec::CapacityError<()>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArrayString::try_from(s)
            .map(Self)
            .map_err(|_| arrayvec::CapacityError::new(()))
    }
}

/// Identity of a logical counterparty session.
///
/// A session key is the immutable tuple of FIX version, sender and target
/// CompIDs, plus an optional qualifier distinguishing multiple sessions
/// between the same pair of counterparties. Equality is structural and the
/// key is used for all registry and correlation lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    /// BeginString (FIX version, e.g. "FIX.4.4").
    pub begin_string: String,
    /// Sender CompID (tag 49).
    pub sender_comp_id: CompId,
    /// Target CompID (tag 56).
    pub target_comp_id: CompId,
    /// Optional session qualifier.
    pub qualifier: Option<String>,
}

impl SessionKey {
    /// Creates a new session key without a qualifier.
    ///
    /// # Arguments
    /// * `begin_string` - The FIX version string
    /// * `sender_comp_id` - The sender CompID
    /// * `target_comp_id` - The target CompID
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: CompId,
        target_comp_id: CompId,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id,
            target_comp_id,
            qualifier: None,
        }
    }

    /// Sets the session qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Returns the key for the opposite direction of this session.
    ///
    /// Sender and target CompIDs are swapped; the qualifier is preserved.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            begin_string: self.begin_string.clone(),
            sender_comp_id: self.target_comp_id.clone(),
            target_comp_id: self.sender_comp_id.clone(),
            qualifier: self.qualifier.clone(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}->{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id
        )?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, "/{}", qualifier)?;
        }
        Ok(())
    }
}

/// Client-assigned order identifier (tag 11).
///
/// Generated by the order originator and globally unique for the lifetime
/// of the process. All correlation between commands and execution reports
/// is keyed by this identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ClOrdId(ArrayString<CL_ORD_ID_MAX_LEN>);

impl ClOrdId {
    /// Creates a new client order id from a string slice.
    ///
    /// # Returns
    /// `Some(ClOrdId)` if the string fits within the maximum length, `None` otherwise.
    #[must_use]
    pub fn new(s: &str) -> Option<Self> {
        ArrayString::from(s).ok().map(Self)
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ClOrdId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ClOrdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClOrdId {
    type Err = arrayvec::CapacityError<()>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArrayString::try_from(s)
            .map(Self)
            .map_err(|_| arrayvec::CapacityError::new(()))
    }
}

/// Order side enumeration (tag 54).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order.
    Buy = b'1',
    /// Sell order.
    Sell = b'2',
    /// Sell short.
    SellShort = b'5',
    /// Sell short exempt.
    SellShortExempt = b'6',
}

impl Side {
    /// Creates a Side from a single character.
    ///
    /// # Returns
    /// `Some(Side)` if the character is valid, `None` otherwise.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Buy),
            '2' => Some(Self::Sell),
            '5' => Some(Self::SellShort),
            '6' => Some(Self::SellShortExempt),
            _ => None,
        }
    }

    /// Returns the character representation of this side.
    #[must_use]
    pub const fn as_char(self) -> char {
        self as u8 as char
    }

    /// Returns true if this is a buy-side order.
    #[must_use]
    pub const fn is_buy(self) -> bool {
        matches!(self, Self::Buy)
    }

    /// Returns true if this is a sell-side order.
    #[must_use]
    pub const fn is_sell(self) -> bool {
        matches!(self, Self::Sell | Self::SellShort | Self::SellShortExempt)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<u8> for Side {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_char(value as char).ok_or(())
    }
}

/// Order status (tag 39) as tracked by the correlation table.
///
/// `Pending` is the local pre-acknowledgement state assigned when a command
/// is built; it maps to the FIX `PendingNew` character. All other variants
/// mirror the counterparty-reported statuses. Transitions are monotonic:
/// [`OrdStatus::can_transition_to`] defines the allowed forward edges and
/// anything else is treated as an out-of-order or duplicate report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrdStatus {
    /// Command built and possibly transmitted, no report seen yet.
    Pending = b'A',
    /// Accepted by the counterparty.
    New = b'0',
    /// Partially filled.
    PartiallyFilled = b'1',
    /// Completely filled.
    Filled = b'2',
    /// Cancel requested, not yet confirmed.
    PendingCancel = b'6',
    /// Canceled.
    Canceled = b'4',
    /// Rejected by the counterparty.
    Rejected = b'8',
}

impl OrdStatus {
    /// Creates an OrdStatus from a single character.
    ///
    /// # Returns
    /// `Some(OrdStatus)` if the character is valid, `None` otherwise.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::Pending),
            '0' => Some(Self::New),
            '1' => Some(Self::PartiallyFilled),
            '2' => Some(Self::Filled),
            '6' => Some(Self::PendingCancel),
            '4' => Some(Self::Canceled),
            '8' => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns the character representation of this status.
    #[must_use]
    pub const fn as_char(self) -> char {
        self as u8 as char
    }

    /// Returns true if the order can no longer change state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Canceled | Self::Rejected)
    }

    /// Returns the position of this status in the execution ordering.
    ///
    /// Used to classify refused transitions: a report whose status ranks at
    /// or below the current one is a duplicate or out-of-order delivery.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::New => 1,
            Self::PartiallyFilled => 2,
            Self::PendingCancel => 3,
            Self::Filled | Self::Canceled | Self::Rejected => 4,
        }
    }

    /// Returns true if a transition from this status to `next` is a valid
    /// forward step in the execution ordering.
    ///
    /// Repeated `PartiallyFilled` reports are valid (progressing fills);
    /// a fill may still overtake a pending cancel.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, n) => !matches!(n, Self::Pending),
            (
                Self::New,
                Self::PartiallyFilled
                | Self::Filled
                | Self::PendingCancel
                | Self::Canceled
                | Self::Rejected,
            ) => true,
            (
                Self::PartiallyFilled,
                Self::PartiallyFilled
                | Self::Filled
                | Self::PendingCancel
                | Self::Canceled
                | Self::Rejected,
            ) => true,
            (Self::PendingCancel, Self::Canceled | Self::Filled | Self::PartiallyFilled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OrdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::New => "New",
            Self::PartiallyFilled => "PartiallyFilled",
            Self::Filled => "Filled",
            Self::PendingCancel => "PendingCancel",
            Self::Canceled => "Canceled",
            Self::Rejected => "Rejected",
        };
        write!(f, "{}", name)
    }
}

/// UTC timestamp with FIX-style millisecond formatting.
///
/// Timestamps are generated at command-build time in the local process
/// clock; they are informational and never used for correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Milliseconds since Unix epoch (1970-01-01 00:00:00 UTC).
    millis_since_epoch: i64,
}

impl Timestamp {
    /// Creates a timestamp from milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self {
            millis_since_epoch: millis,
        }
    }

    /// Returns the current UTC timestamp.
    #[inline]
    #[must_use]
    pub fn now() -> Self {
        Self {
            millis_since_epoch: Utc::now().timestamp_millis(),
        }
    }

    /// Returns milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.millis_since_epoch
    }

    /// Converts to a chrono `DateTime<Utc>`.
    #[must_use]
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis_since_epoch).unwrap_or_default()
    }

    /// Formats the timestamp in FIX format with millisecond precision.
    ///
    /// Format: `YYYYMMDD-HH:MM:SS.sss`
    #[must_use]
    pub fn format_fix(self) -> ArrayString<21> {
        let dt = self.to_datetime();
        let mut buf = ArrayString::new();
        let _ = std::fmt::write(
            &mut buf,
            format_args!("{}", dt.format("%Y%m%d-%H:%M:%S%.3f")),
        );
        buf
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            millis_since_epoch: dt.timestamp_millis(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fix())
    }
}
