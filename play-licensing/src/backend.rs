//! The licensing backend seam.
//!
//! A backend performs the actual challenge/response with the licensing
//! server, verifies signatures and caches responses. None of that lives
//! here: the bridge only builds one backend session per request, starts
//! its check, and listens on the callback.

use crate::outcome::{CheckOutcome, RETRY};
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Values a backend session is built from.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Obfuscation salt.
    pub salt: Vec<u8>,
    /// Package name of the calling application.
    pub package_name: String,
    /// Stable per-device identifier.
    pub device_id: String,
    /// Base64 licensing public key.
    pub public_key: String,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("salt_len", &self.salt.len())
            .field("package_name", &self.package_name)
            .field("device_id", &self.device_id)
            .field("public_key_len", &self.public_key.len())
            .finish()
    }
}

/// The backend's native callback shape: three methods, exactly one of
/// which is called, once, from any thread.
pub trait LicenseCheckerCallback: Send {
    /// The license was confirmed.
    fn allow(self: Box<Self>, reason: i32);
    /// The license was denied.
    fn dont_allow(self: Box<Self>, reason: i32);
    /// The check could not be performed.
    fn application_error(self: Box<Self>, error_code: i32);
}

/// One single-use check session.
pub trait LicenseBackend: Send {
    /// Starts the asynchronous check. Must return without blocking on the
    /// server and report through `callback` exactly once.
    fn check_access(self: Box<Self>, callback: Box<dyn LicenseCheckerCallback>);
}

/// Builds a fresh backend session per request.
pub trait BackendFactory: Send + Sync {
    fn create(&self, session: SessionConfig) -> Box<dyn LicenseBackend>;
}

impl<F> BackendFactory for F
where
    F: Fn(SessionConfig) -> Box<dyn LicenseBackend> + Send + Sync,
{
    fn create(&self, session: SessionConfig) -> Box<dyn LicenseBackend> {
        self(session)
    }
}

/// Folds the three callback methods into one [`CheckOutcome`] handler.
pub struct OutcomeAdapter<F> {
    on_outcome: F,
}

impl<F> OutcomeAdapter<F>
where
    F: FnOnce(CheckOutcome) + Send + 'static,
{
    pub fn new(on_outcome: F) -> Self {
        Self { on_outcome }
    }
}

impl<F> LicenseCheckerCallback for OutcomeAdapter<F>
where
    F: FnOnce(CheckOutcome) + Send + 'static,
{
    fn allow(self: Box<Self>, reason: i32) {
        (self.on_outcome)(CheckOutcome::Allowed(reason));
    }

    fn dont_allow(self: Box<Self>, reason: i32) {
        (self.on_outcome)(CheckOutcome::DontAllow(reason));
    }

    fn application_error(self: Box<Self>, error_code: i32) {
        (self.on_outcome)(CheckOutcome::ApplicationError(error_code));
    }
}

/// A backend that answers a fixed outcome from its own worker thread.
///
/// Stands in for the real licensing library in tests and in the CLI.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    outcome: CheckOutcome,
    delay: Duration,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new(outcome: CheckOutcome) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
        }
    }

    /// Waits this long on the worker thread before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Runs the answer on a worker started by `spawn`. If no worker can be
    /// started the check is reported as `dont_allow(RETRY)` on the calling
    /// thread, the way a backend that cannot reach its service answers.
    fn check_with<S>(self, callback: Box<dyn LicenseCheckerCallback>, spawn: S)
    where
        S: FnOnce(Box<dyn FnOnce() + Send>) -> io::Result<()>,
    {
        let slot = Arc::new(Mutex::new(Some(callback)));
        let worker_slot = Arc::clone(&slot);
        let spawned = spawn(Box::new(move || {
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            if let Some(callback) = take_callback(&worker_slot) {
                debug!(outcome = ?self.outcome, "Scripted backend answering");
                match self.outcome {
                    CheckOutcome::Allowed(reason) => callback.allow(reason),
                    CheckOutcome::DontAllow(reason) => callback.dont_allow(reason),
                    CheckOutcome::ApplicationError(code) => callback.application_error(code),
                }
            }
        }));

        if let Err(e) = spawned {
            warn!(error = %e, "Scripted backend could not spawn its worker");
            if let Some(callback) = take_callback(&slot) {
                callback.dont_allow(RETRY);
            }
        }
    }
}

fn take_callback(
    slot: &Mutex<Option<Box<dyn LicenseCheckerCallback>>>,
) -> Option<Box<dyn LicenseCheckerCallback>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

impl LicenseBackend for ScriptedBackend {
    fn check_access(self: Box<Self>, callback: Box<dyn LicenseCheckerCallback>) {
        (*self).check_with(callback, |job| {
            thread::Builder::new()
                .name("license-backend".into())
                .spawn(job)
                .map(drop)
        });
    }
}

impl BackendFactory for ScriptedBackend {
    fn create(&self, session: SessionConfig) -> Box<dyn LicenseBackend> {
        debug!(?session, "Creating scripted backend session");
        Box::new(self.clone())
    }
}
