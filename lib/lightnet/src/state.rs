//! Network connectivity queries.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

/// Transport kind of the active network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkTransport {
    /// Wi-Fi.
    Wifi,
    /// Mobile data.
    Cellular,
    /// Wired.
    Ethernet,
    /// Anything else (VPN, Bluetooth, ...).
    Other,
}

/// Description of the active network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    /// How the network is reached.
    pub transport: NetworkTransport,
    /// Whether connectivity through this network was validated.
    pub validated: bool,
}

/// Platform capability answering connectivity questions.
pub trait ConnectivityProvider: Send + Sync + fmt::Debug {
    /// Whether the process may query the network state.
    fn has_network_state_permission(&self) -> bool;

    /// The currently active network, if any.
    fn active_network(&self) -> Option<NetworkInfo>;
}

/// Provider returning fixed answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedConnectivity {
    permission: bool,
    network: Option<NetworkInfo>,
}

impl FixedConnectivity {
    /// Permission granted, validated network of the given kind.
    #[must_use]
    pub const fn online(transport: NetworkTransport) -> Self {
        Self {
            permission: true,
            network: Some(NetworkInfo {
                transport,
                validated: true,
            }),
        }
    }

    /// Permission granted, no active network.
    #[must_use]
    pub const fn offline() -> Self {
        Self {
            permission: true,
            network: None,
        }
    }

    /// Arbitrary answers.
    #[must_use]
    pub const fn new(permission: bool, network: Option<NetworkInfo>) -> Self {
        Self {
            permission,
            network,
        }
    }
}

impl ConnectivityProvider for FixedConnectivity {
    fn has_network_state_permission(&self) -> bool {
        self.permission
    }

    fn active_network(&self) -> Option<NetworkInfo> {
        self.network
    }
}

/// Connectivity state queries over a [`ConnectivityProvider`].
///
/// Every query answers `false` when the permission is missing, when no
/// network is active, or when the active network is not validated.
#[derive(Debug, Clone)]
pub struct State {
    provider: Arc<dyn ConnectivityProvider>,
}

impl State {
    /// Create a state backed by `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn ConnectivityProvider>) -> Self {
        Self { provider }
    }

    /// Whether a validated network is active.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.validated_network().is_some()
    }

    /// Whether the active validated network is Wi-Fi.
    #[must_use]
    pub fn is_connected_through_wifi(&self) -> bool {
        self.validated_network()
            .is_some_and(|network| network.transport == NetworkTransport::Wifi)
    }

    fn validated_network(&self) -> Option<NetworkInfo> {
        if !self.provider.has_network_state_permission() {
            debug!("cannot check connectivity, network state permission not granted");
            return None;
        }
        self.provider.active_network().filter(|network| network.validated)
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    fn state(provider: FixedConnectivity) -> State {
        State::new(Arc::new(provider))
    }

    #[test]
    fn connected_through_wifi() {
        let state = state(FixedConnectivity::online(NetworkTransport::Wifi));
        check!(state.is_connected());
        check!(state.is_connected_through_wifi());
    }

    #[test]
    fn connected_through_cellular() {
        let state = state(FixedConnectivity::online(NetworkTransport::Cellular));
        check!(state.is_connected());
        check!(!state.is_connected_through_wifi());
    }

    #[test]
    fn false_without_permission() {
        let network = NetworkInfo {
            transport: NetworkTransport::Wifi,
            validated: true,
        };
        let state = state(FixedConnectivity::new(false, Some(network)));
        check!(!state.is_connected());
        check!(!state.is_connected_through_wifi());
    }

    #[test]
    fn false_without_network_or_validation() {
        check!(!state(FixedConnectivity::offline()).is_connected());

        let unvalidated = NetworkInfo {
            transport: NetworkTransport::Wifi,
            validated: false,
        };
        let state = state(FixedConnectivity::new(true, Some(unvalidated)));
        check!(!state.is_connected());
        check!(!state.is_connected_through_wifi());
    }
}
