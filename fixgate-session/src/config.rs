/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Gateway configuration.
//!
//! Configuration is an ordered list of session sections plus gateway-level
//! settings. Sections derive `serde::Deserialize`, so the host process can
//! load them from any serde-backed format; the file format itself is not
//! part of the gateway. Configuration is read once at startup and never
//! mutated afterwards.

use fixgate_core::error::ConfigError;
use fixgate_core::types::{CompId, SessionKey};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Connection role of a session section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    /// Accepts inbound connections.
    Acceptor,
    /// Opens outbound connections.
    Initiator,
}

/// One configured session section.
///
/// A section either names one fixed counterparty or, when
/// `acceptor_template` is set, matches a class of inbound connections whose
/// concrete CompIDs are materialized by the transport at connect time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSection {
    /// FIX version BeginString (e.g. "FIX.4.4").
    pub begin_string: String,
    /// Sender CompID (tag 49).
    pub sender_comp_id: String,
    /// Target CompID (tag 56).
    pub target_comp_id: String,
    /// Optional session qualifier.
    #[serde(default)]
    pub qualifier: Option<String>,
    /// Connection role.
    pub role: SessionRole,
    /// Marks an acceptor section as a dynamic-session template.
    #[serde(default)]
    pub acceptor_template: bool,
    /// Listening host for acceptor sections; defaults to `0.0.0.0`.
    #[serde(default)]
    pub accept_address: Option<String>,
    /// Listening port for acceptor sections; required, no default.
    #[serde(default)]
    pub accept_port: Option<u16>,
}

impl SessionSection {
    /// Creates an acceptor section.
    #[must_use]
    pub fn acceptor(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            qualifier: None,
            role: SessionRole::Acceptor,
            acceptor_template: false,
            accept_address: None,
            accept_port: None,
        }
    }

    /// Creates an initiator section.
    #[must_use]
    pub fn initiator(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            role: SessionRole::Initiator,
            ..Self::acceptor(begin_string, sender_comp_id, target_comp_id)
        }
    }

    /// Sets the session qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Marks this section as a dynamic-session template.
    #[must_use]
    pub const fn as_template(mut self) -> Self {
        self.acceptor_template = true;
        self
    }

    /// Sets the listening host.
    #[must_use]
    pub fn with_accept_address(mut self, address: impl Into<String>) -> Self {
        self.accept_address = Some(address.into());
        self
    }

    /// Sets the listening port.
    #[must_use]
    pub const fn with_accept_port(mut self, port: u16) -> Self {
        self.accept_port = Some(port);
        self
    }

    /// Builds the session key for this section.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidCompId` if either CompID is empty or
    /// exceeds the permitted length.
    pub fn key(&self) -> Result<SessionKey, ConfigError> {
        let sender = parse_comp_id(&self.sender_comp_id)?;
        let target = parse_comp_id(&self.target_comp_id)?;
        let mut key = SessionKey::new(self.begin_string.clone(), sender, target);
        if let Some(qualifier) = &self.qualifier {
            key = key.with_qualifier(qualifier.clone());
        }
        Ok(key)
    }
}

fn parse_comp_id(value: &str) -> Result<CompId, ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::InvalidCompId {
            value: value.to_string(),
        });
    }
    CompId::new(value).ok_or_else(|| ConfigError::InvalidCompId {
        value: value.to_string(),
    })
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Ordered session sections.
    pub sessions: Vec<SessionSection>,
    /// Counterparty CompIDs accepted by the shipped allow-list policy.
    #[serde(default)]
    pub allowed_counterparties: Vec<String>,
}

impl GatewayConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a session section.
    #[must_use]
    pub fn add_session(mut self, section: SessionSection) -> Self {
        self.sessions.push(section);
        self
    }

    /// Adds a counterparty CompID to the allow list.
    #[must_use]
    pub fn allow_counterparty(mut self, comp_id: impl Into<String>) -> Self {
        self.allowed_counterparties.push(comp_id.into());
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// - `ConfigError::NoSessions` if no sections are configured
    /// - `ConfigError::InvalidCompId` for malformed CompIDs
    /// - `ConfigError::DuplicateSession` if two sections resolve to one key
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sessions.is_empty() {
            return Err(ConfigError::NoSessions);
        }
        let mut seen = HashSet::new();
        for section in &self.sessions {
            let key = section.key()?;
            if !seen.insert(key.clone()) {
                return Err(ConfigError::DuplicateSession {
                    session: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_key() {
        let section = SessionSection::acceptor("FIX.4.4", "GATEWAY", "CLIENT")
            .with_qualifier("desk2")
            .as_template()
            .with_accept_port(9880);
        let key = section.key().unwrap();
        assert_eq!(key.to_string(), "FIX.4.4:GATEWAY->CLIENT/desk2");
        assert!(section.acceptor_template);
    }

    #[test]
    fn test_invalid_comp_id_rejected() {
        let section = SessionSection::acceptor("FIX.4.4", "", "CLIENT");
        assert!(matches!(
            section.key(),
            Err(ConfigError::InvalidCompId { .. })
        ));

        let section = SessionSection::acceptor("FIX.4.4", "X".repeat(64), "CLIENT");
        assert!(matches!(
            section.key(),
            Err(ConfigError::InvalidCompId { .. })
        ));
    }

    #[test]
    fn test_validate_empty_config() {
        assert_eq!(GatewayConfig::new().validate(), Err(ConfigError::NoSessions));
    }

    #[test]
    fn test_validate_duplicate_sessions() {
        let config = GatewayConfig::new()
            .add_session(SessionSection::acceptor("FIX.4.4", "GATEWAY", "CLIENT"))
            .add_session(SessionSection::acceptor("FIX.4.4", "GATEWAY", "CLIENT"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateSession { .. })
        ));
    }

    #[test]
    fn test_validate_ok() {
        let config = GatewayConfig::new()
            .add_session(
                SessionSection::acceptor("FIX.4.4", "GATEWAY", "CLIENT")
                    .as_template()
                    .with_accept_port(9880),
            )
            .add_session(SessionSection::initiator("FIX.4.4", "CLIENT", "GATEWAY"))
            .allow_counterparty("CLIENT");
        assert!(config.validate().is_ok());
    }
}
