//! Plugin lifecycle: wiring the router onto the licensing channel.

use crate::backend::BackendFactory;
use crate::channel::{MethodCall, MethodCallHandler, MethodChannel, PLAY_LICENSING_CHANNEL};
use crate::client::LicenseClient;
use crate::config::LicenseConfig;
use crate::device::PlatformIdentity;
use crate::dispatcher::ResultDispatcher;
use crate::error::LicensingResult;
use crate::reply::Reply;
use crate::router::RequestRouter;
use std::sync::Arc;
use tracing::info;

/// The licensing bridge as attached to an application.
pub struct LicensingPlugin {
    channel: Arc<MethodChannel>,
    dispatcher: Arc<ResultDispatcher>,
}

impl LicensingPlugin {
    /// Starts the delivery thread and installs the router on the
    /// `play_licensing` channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery thread cannot be spawned.
    pub fn attach(
        config: LicenseConfig,
        identity: Arc<dyn PlatformIdentity>,
        backends: Arc<dyn BackendFactory>,
    ) -> LicensingResult<Self> {
        let dispatcher = ResultDispatcher::start()?;
        let client = LicenseClient::new(config, identity, backends);
        let router: Arc<dyn MethodCallHandler> =
            Arc::new(RequestRouter::new(client, Arc::clone(&dispatcher)));

        let channel = Arc::new(MethodChannel::new(PLAY_LICENSING_CHANNEL));
        channel.set_method_call_handler(Some(router));
        info!(channel = channel.name(), "Licensing plugin attached");

        Ok(Self {
            channel,
            dispatcher,
        })
    }

    pub fn channel(&self) -> &Arc<MethodChannel> {
        &self.channel
    }

    pub fn dispatcher(&self) -> &Arc<ResultDispatcher> {
        &self.dispatcher
    }

    /// Shorthand for [`MethodChannel::invoke_async`].
    ///
    /// # Errors
    ///
    /// Returns an error if the reply was dropped before delivery.
    pub async fn call(&self, call: MethodCall) -> LicensingResult<Reply> {
        self.channel.invoke_async(call).await
    }

    /// Clears the channel handler and stops delivery. Checks still in
    /// flight finish in the backend, but their replies are dropped.
    pub fn detach(&self) {
        self.channel.set_method_call_handler(None);
        self.dispatcher.detach();
        info!(channel = self.channel.name(), "Licensing plugin detached");
    }
}
