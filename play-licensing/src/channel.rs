//! The named method channel calls arrive on.

use crate::dispatcher::ResultHandle;
use crate::error::{LicensingError, LicensingResult};
use crate::reply::Reply;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Name of the licensing channel.
pub const PLAY_LICENSING_CHANNEL: &str = "play_licensing";

/// A method name plus its loosely typed arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    /// A call with no arguments.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Map::new(),
        }
    }

    /// Adds one argument.
    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Parses a call from `{"method": ..., "arguments": {...}}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not have that shape.
    pub fn from_json(json: &str) -> LicensingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Answers calls arriving on a channel.
pub trait MethodCallHandler: Send + Sync {
    /// Must return promptly and answer `result` exactly once, now or later.
    fn on_method_call(&self, call: MethodCall, result: ResultHandle);
}

/// A named channel holding zero or one handler.
pub struct MethodChannel {
    name: String,
    handler: RwLock<Option<Arc<dyn MethodCallHandler>>>,
}

impl MethodChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installs or, with `None`, clears the handler.
    pub fn set_method_call_handler(&self, handler: Option<Arc<dyn MethodCallHandler>>) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = handler;
    }

    pub fn has_handler(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Hands a call to the handler. Without one, the call is answered
    /// `NotImplemented` right away.
    pub fn invoke(&self, call: MethodCall, result: ResultHandle) {
        let handler = self
            .handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match handler {
            Some(handler) => handler.on_method_call(call, result),
            None => {
                warn!(channel = %self.name, method = %call.method, "No handler on channel");
                result.not_implemented();
            }
        }
    }

    /// Invokes a call and waits for its reply.
    ///
    /// # Errors
    ///
    /// Returns [`LicensingError::ReplyDropped`] if the reply was dropped,
    /// which happens when the plugin detaches while the check is in flight.
    pub async fn invoke_async(&self, call: MethodCall) -> LicensingResult<Reply> {
        let (tx, rx) = oneshot::channel();
        self.invoke(
            call,
            ResultHandle::new(move |reply: Reply| {
                if tx.send(reply).is_err() {
                    debug!("Caller stopped waiting for reply");
                }
            }),
        );
        rx.await.map_err(|_| LicensingError::ReplyDropped)
    }
}
