/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session template resolution.
//!
//! On the acceptor side, several logical counterparties may share one
//! listening address. The resolver walks the configured sections once at
//! startup, picks the ones flagged as templates, and groups them by their
//! resolved `(host, port)` bind address. The result is handed to the
//! transport as the authoritative listen-address to template-set binding;
//! the transport matches an inbound connection's negotiated CompIDs against
//! the templates bound to the address it connected on.
//!
//! Resolution happens once; the mapping is immutable for the process
//! lifetime and safe for concurrent reads without locking.

use crate::config::{GatewayConfig, SessionSection};
use fixgate_core::error::ConfigError;
use fixgate_core::types::SessionKey;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use tracing::info;

/// Default bind host when a template section names no accept address.
pub const DEFAULT_ACCEPT_ADDRESS: &str = "0.0.0.0";

/// Binding of a session template to the listening address it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMapping {
    /// Resolved listening address.
    pub address: SocketAddr,
    /// The template session key.
    pub template: SessionKey,
}

/// Resolves configured template sections into per-address provider sets.
#[derive(Debug, Default)]
pub struct TemplateResolver {
    providers: HashMap<SocketAddr, Vec<TemplateMapping>>,
}

impl TemplateResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the resolver from configuration.
    ///
    /// A section is a template iff its `acceptor_template` flag is set.
    /// The bind host defaults to `0.0.0.0`; an absent port is a fatal
    /// configuration error.
    ///
    /// # Errors
    /// - `ConfigError::MissingAcceptPort` for a template without a port
    /// - `ConfigError::InvalidAcceptAddress` for an unparsable host
    /// - `ConfigError::InvalidCompId` for malformed template CompIDs
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let mut resolver = Self::new();
        for section in config.sessions.iter().filter(|s| s.acceptor_template) {
            let address = accept_socket_address(section)?;
            resolver.register_template(address, section.key()?);
        }
        info!(
            addresses = resolver.providers.len(),
            templates = resolver.template_count(),
            "session templates resolved"
        );
        Ok(resolver)
    }

    /// Registers a template under a listening address.
    pub fn register_template(&mut self, address: SocketAddr, template: SessionKey) {
        self.providers
            .entry(address)
            .or_default()
            .push(TemplateMapping { address, template });
    }

    /// Returns the listen-address to template-set mapping.
    #[must_use]
    pub const fn providers(&self) -> &HashMap<SocketAddr, Vec<TemplateMapping>> {
        &self.providers
    }

    /// Returns the templates bound to an address.
    #[must_use]
    pub fn templates_for(&self, address: &SocketAddr) -> &[TemplateMapping] {
        self.providers
            .get(address)
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the number of distinct listening addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if no templates were resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Returns the total number of registered templates across addresses.
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.providers.values().map(Vec::len).sum()
    }
}

/// Resolves the bind address of a template section.
fn accept_socket_address(section: &SessionSection) -> Result<SocketAddr, ConfigError> {
    let session = || {
        section
            .key()
            .map_or_else(|_| section.sender_comp_id.clone(), |k| k.to_string())
    };

    let host = section
        .accept_address
        .as_deref()
        .unwrap_or(DEFAULT_ACCEPT_ADDRESS);
    let port = section
        .accept_port
        .ok_or_else(|| ConfigError::MissingAcceptPort { session: session() })?;
    let ip: IpAddr = host
        .parse()
        .map_err(|_| ConfigError::InvalidAcceptAddress {
            session: session(),
            address: host.to_string(),
        })?;
    Ok(SocketAddr::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionSection;

    fn template(target: &str, port: Option<u16>) -> SessionSection {
        let mut section = SessionSection::acceptor("FIX.4.4", "GATEWAY", target).as_template();
        section.accept_port = port;
        section
    }

    #[test]
    fn test_fan_out_on_shared_address() {
        let config = GatewayConfig::new()
            .add_session(template("ALPHA", Some(9880)))
            .add_session(template("BRAVO", Some(9880)));

        let resolver = TemplateResolver::from_config(&config).unwrap();
        assert_eq!(resolver.len(), 1);

        let addr: SocketAddr = "0.0.0.0:9880".parse().unwrap();
        let mappings = resolver.templates_for(&addr);
        assert_eq!(mappings.len(), 2);
        let targets: Vec<&str> = mappings
            .iter()
            .map(|m| m.template.target_comp_id.as_str())
            .collect();
        assert!(targets.contains(&"ALPHA"));
        assert!(targets.contains(&"BRAVO"));
    }

    #[test]
    fn test_missing_port_is_fatal() {
        let config = GatewayConfig::new().add_session(template("ALPHA", None));
        assert!(matches!(
            TemplateResolver::from_config(&config),
            Err(ConfigError::MissingAcceptPort { .. })
        ));
    }

    #[test]
    fn test_invalid_address_is_fatal() {
        let config = GatewayConfig::new()
            .add_session(template("ALPHA", Some(9880)).with_accept_address("not-an-ip"));
        assert!(matches!(
            TemplateResolver::from_config(&config),
            Err(ConfigError::InvalidAcceptAddress { .. })
        ));
    }

    #[test]
    fn test_explicit_address_separates_bindings() {
        let config = GatewayConfig::new()
            .add_session(template("ALPHA", Some(9880)).with_accept_address("127.0.0.1"))
            .add_session(template("BRAVO", Some(9881)).with_accept_address("127.0.0.1"));

        let resolver = TemplateResolver::from_config(&config).unwrap();
        assert_eq!(resolver.len(), 2);
        assert_eq!(resolver.template_count(), 2);
    }

    #[test]
    fn test_non_template_sections_ignored() {
        let config = GatewayConfig::new()
            .add_session(SessionSection::acceptor("FIX.4.4", "GATEWAY", "FIXED").with_accept_port(9880))
            .add_session(SessionSection::initiator("FIX.4.4", "CLIENT", "GATEWAY"));

        let resolver = TemplateResolver::from_config(&config).unwrap();
        assert!(resolver.is_empty());
    }
}
