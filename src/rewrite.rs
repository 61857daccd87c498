//! Address substitution policy for broker and coordinator entries.
//!
//! An [`AddressMap`] is built once from configuration and shared read-only by
//! every connection's rewriter. Rules are keyed either by stable node
//! identity or by the advertised (host, port) pair. Node identity is the
//! preferred key: it stays valid after a rewrite, so repeated application
//! cannot chain through already-mapped addresses. The address index exists
//! for entries without a usable node id, such as the per-key coordinator list
//! of a coordinator lookup response.

use std::collections::HashMap;

use tracing::debug;

#[cfg(feature = "metrics")]
use crate::metrics;
use crate::protocol::{BrokerEndpoint, Coordinator};

/// A network endpoint expressed as host and port.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config-serde", derive(serde::Deserialize))]
pub struct HostPort {
    /// Host name or address.
    pub host: String,
    /// Port number.
    pub port: u16,
}

impl HostPort {
    /// Construct an endpoint from a host and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// Identity a rewrite rule matches against.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "config-serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-serde", serde(rename_all = "snake_case"))]
pub enum RuleKey {
    /// Match by the broker's stable node identity.
    NodeId(i32),
    /// Match by the advertised (host, port) pair.
    Address(HostPort),
}

/// One configured address substitution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "config-serde", derive(serde::Deserialize))]
pub struct RewriteRule {
    /// Which advertised entries this rule applies to.
    pub key: RuleKey,
    /// Proxy-reachable replacement address.
    pub proxy: HostPort,
}

/// Read-only lookup table from advertised identity to proxy address.
#[derive(Clone, Debug, Default)]
pub struct AddressMap {
    by_node: HashMap<i32, HostPort>,
    by_address: HashMap<HostPort, HostPort>,
}

impl AddressMap {
    /// Build the lookup table from configured rules.
    ///
    /// Later rules win when two rules share a key.
    #[must_use]
    pub fn from_rules(rules: &[RewriteRule]) -> Self {
        let mut map = Self::default();
        for rule in rules {
            match &rule.key {
                RuleKey::NodeId(node_id) => {
                    map.by_node.insert(*node_id, rule.proxy.clone());
                }
                RuleKey::Address(address) => {
                    map.by_address.insert(address.clone(), rule.proxy.clone());
                }
            }
        }
        map
    }

    /// Returns `true` when no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.by_node.is_empty() && self.by_address.is_empty() }

    /// Replacement for a metadata broker entry: node identity first, then
    /// the advertised address.
    fn broker_target(&self, node_id: i32, address: &HostPort) -> Option<&HostPort> {
        self.by_node
            .get(&node_id)
            .or_else(|| self.by_address.get(address))
    }

    /// Replacement for a coordinator entry: advertised address first, then
    /// node identity.
    fn coordinator_target(&self, node_id: i32, address: &HostPort) -> Option<&HostPort> {
        self.by_address
            .get(address)
            .or_else(|| self.by_node.get(&node_id))
    }
}

/// Apply the rewrite policy to one broker entry.
///
/// Mapped entries have their host and port replaced; unmapped entries are
/// returned unchanged. Node id, rack, and list position are never altered.
#[must_use]
pub fn rewrite_broker(map: &AddressMap, broker: BrokerEndpoint) -> BrokerEndpoint {
    let advertised = HostPort::new(broker.host.clone(), broker.port);
    match map.broker_target(broker.node_id, &advertised) {
        Some(proxy) => {
            debug!(
                node_id = broker.node_id,
                host = %broker.host,
                port = broker.port,
                proxy_host = %proxy.host,
                proxy_port = proxy.port,
                "rewriting broker address",
            );
            #[cfg(feature = "metrics")]
            metrics::inc_addresses_rewritten();
            BrokerEndpoint {
                host: proxy.host.clone(),
                port: proxy.port,
                ..broker
            }
        }
        None => broker,
    }
}

/// Apply the rewrite policy to one coordinator entry.
#[must_use]
pub fn rewrite_coordinator(map: &AddressMap, coordinator: Coordinator) -> Coordinator {
    let advertised = HostPort::new(coordinator.host.clone(), coordinator.port);
    match map.coordinator_target(coordinator.node_id, &advertised) {
        Some(proxy) => {
            debug!(
                node_id = coordinator.node_id,
                host = %coordinator.host,
                port = coordinator.port,
                proxy_host = %proxy.host,
                proxy_port = proxy.port,
                "rewriting coordinator address",
            );
            #[cfg(feature = "metrics")]
            metrics::inc_addresses_rewritten();
            Coordinator {
                host: proxy.host.clone(),
                port: proxy.port,
                ..coordinator
            }
        }
        None => coordinator,
    }
}
