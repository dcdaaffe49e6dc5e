//! The license client: one backend session per check.

use crate::backend::{BackendFactory, OutcomeAdapter, SessionConfig};
use crate::config::LicenseConfig;
use crate::device::PlatformIdentity;
use crate::outcome::CheckOutcome;
use crate::request::CheckRequest;
use std::sync::Arc;
use tracing::debug;

/// Starts license checks against freshly built backend sessions.
///
/// The client neither retries nor times out; both belong to the backend.
#[derive(Clone)]
pub struct LicenseClient {
    config: LicenseConfig,
    identity: Arc<dyn PlatformIdentity>,
    backends: Arc<dyn BackendFactory>,
}

impl LicenseClient {
    pub fn new(
        config: LicenseConfig,
        identity: Arc<dyn PlatformIdentity>,
        backends: Arc<dyn BackendFactory>,
    ) -> Self {
        Self {
            config,
            identity,
            backends,
        }
    }

    /// Returns the configured defaults.
    pub fn config(&self) -> &LicenseConfig {
        &self.config
    }

    /// Resolves the session values for a request: overrides win over
    /// configured defaults, identity comes from the platform.
    pub fn session_config(&self, request: &CheckRequest) -> SessionConfig {
        SessionConfig {
            salt: request
                .salt
                .clone()
                .unwrap_or_else(|| self.config.salt.clone()),
            package_name: self.identity.package_name(),
            device_id: self.identity.device_id(),
            public_key: request
                .public_key
                .clone()
                .unwrap_or_else(|| self.config.public_key.clone()),
        }
    }

    /// Runs one check. `on_outcome` is called once, on whichever thread
    /// the backend reports from.
    pub fn check_access<F>(&self, request: &CheckRequest, on_outcome: F)
    where
        F: FnOnce(CheckOutcome) + Send + 'static,
    {
        let session = self.session_config(request);
        debug!(operation = %request.operation, ?session, "Starting backend session");
        let backend = self.backends.create(session);
        backend.check_access(Box::new(OutcomeAdapter::new(on_outcome)));
    }
}
