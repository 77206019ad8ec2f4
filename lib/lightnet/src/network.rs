//! Entry point bundling the HTTP manager and connectivity state.

use std::sync::Arc;

use crate::{ConnectivityProvider, HttpManager, NetworkExecutable, State};

/// Small facade over an [`HttpManager`] and a connectivity [`State`].
#[derive(Debug, Clone)]
pub struct LightNetwork {
    http_manager: HttpManager,
    state: State,
}

impl LightNetwork {
    /// Bundle `http_manager` with a state over `connectivity`.
    #[must_use]
    pub fn new(http_manager: HttpManager, connectivity: Arc<dyn ConnectivityProvider>) -> Self {
        Self {
            http_manager,
            state: State::new(connectivity),
        }
    }

    /// Manager for HTTP calls.
    #[must_use]
    pub const fn http_manager(&self) -> &HttpManager {
        &self.http_manager
    }

    /// Connectivity state.
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Executable for declared operations under `base_url`.
    #[must_use]
    pub fn executable(&self, base_url: impl Into<String>) -> NetworkExecutable {
        NetworkExecutable::with_base_url(self.http_manager.clone(), base_url)
    }
}
