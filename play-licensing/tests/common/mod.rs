//! Shared test helpers for licensing bridge tests.

#![allow(dead_code)]

use play_licensing::{
    BackendFactory, CheckOutcome, LicenseBackend, LicenseConfig, LicensingPlugin, Reply,
    ResultHandle, ScriptedBackend, SessionConfig, StaticIdentity,
};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

pub const PACKAGE: &str = "com.example.licensed";
pub const DEVICE_ID: &str = "0123456789abcdef";

/// How long tests wait for a reply before failing.
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn test_identity() -> Arc<StaticIdentity> {
    Arc::new(StaticIdentity::new(PACKAGE, DEVICE_ID))
}

/// Attaches a plugin whose backend always answers `outcome`.
pub fn plugin_answering(outcome: CheckOutcome) -> LicensingPlugin {
    LicensingPlugin::attach(
        LicenseConfig::default(),
        test_identity(),
        Arc::new(ScriptedBackend::new(outcome)),
    )
    .unwrap()
}

/// A result handle that reports the reply and the thread it arrived on.
pub fn recording_handle() -> (ResultHandle, Receiver<(Reply, ThreadId)>) {
    let (tx, rx) = mpsc::channel();
    let handle = ResultHandle::new(move |reply: Reply| {
        tx.send((reply, thread::current().id())).unwrap();
    });
    (handle, rx)
}

/// A backend factory that records every session it builds, then answers
/// `outcome` like [`ScriptedBackend`].
#[derive(Clone)]
pub struct RecordingFactory {
    pub sessions: Arc<Mutex<Vec<SessionConfig>>>,
    outcome: CheckOutcome,
}

impl RecordingFactory {
    pub fn new(outcome: CheckOutcome) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Vec::new())),
            outcome,
        }
    }

    pub fn sessions(&self) -> Vec<SessionConfig> {
        self.sessions.lock().unwrap().clone()
    }
}

impl BackendFactory for RecordingFactory {
    fn create(&self, session: SessionConfig) -> Box<dyn LicenseBackend> {
        self.sessions.lock().unwrap().push(session);
        Box::new(ScriptedBackend::new(self.outcome))
    }
}
