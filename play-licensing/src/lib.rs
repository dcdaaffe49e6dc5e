//! Play Licensing bridge.
//!
//! Exposes a licensing backend to a cross-platform application layer over
//! a named method channel (`play_licensing`). Two methods are answered:
//!
//! - `check`: replies with the backend's allow-reason code, or a
//!   structured error carrying the deny reason or application error code
//! - `isAllowed`: replies `true`/`false`; only a missing permission or a
//!   check already in progress is reported as an error
//!
//! Both accept an optional hex `salt` and an optional `publicKey` that
//! override the configured defaults for that call.
//!
//! # Architecture
//!
//! - **Backend**: builds one single-use session per check and reports
//!   through a three-method callback, on any thread it likes
//! - **Client**: resolves session values and folds the callback into a
//!   [`CheckOutcome`]
//! - **Dispatcher**: a dedicated thread every reply is executed on
//! - **Router**: decodes calls and shapes outcomes into replies
//!
//! # Example
//!
//! ```
//! use play_licensing::{
//!     CheckOutcome, LicenseConfig, LicensingPlugin, MethodCall, Reply, ScriptedBackend,
//!     StaticIdentity, LICENSED,
//! };
//! use std::sync::Arc;
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let plugin = LicensingPlugin::attach(
//!     LicenseConfig::default(),
//!     Arc::new(StaticIdentity::new("com.example.app", "0123456789abcdef")),
//!     Arc::new(ScriptedBackend::new(CheckOutcome::Allowed(LICENSED))),
//! )
//! .unwrap();
//!
//! let reply = plugin.call(MethodCall::new("isAllowed")).await.unwrap();
//! assert_eq!(reply, Reply::success(true));
//! # }
//! ```

mod backend;
mod channel;
mod client;
mod config;
mod device;
mod dispatcher;
mod error;
mod outcome;
mod plugin;
mod reply;
mod request;
mod router;
mod salt;

pub use backend::{
    BackendFactory, LicenseBackend, LicenseCheckerCallback, OutcomeAdapter, ScriptedBackend,
    SessionConfig,
};
pub use channel::{MethodCall, MethodCallHandler, MethodChannel, PLAY_LICENSING_CHANNEL};
pub use client::LicenseClient;
pub use config::{LicenseConfig, DEFAULT_SALT, PUBLIC_KEY_ENV, SALT_ENV};
pub use device::{HostIdentity, PlatformIdentity, StaticIdentity};
pub use dispatcher::{ResultDispatcher, ResultHandle, MAIN_THREAD_NAME};
pub use error::{LicensingError, LicensingResult};
pub use outcome::{ApplicationErrorCode, CheckOutcome, LICENSED, NOT_LICENSED, RETRY};
pub use plugin::LicensingPlugin;
pub use reply::{Reply, ReplySink};
pub use request::{CheckRequest, Operation, PUBLIC_KEY_ARG, SALT_ARG};
pub use router::{reply_for, RequestRouter};
pub use salt::{decode_hex_salt, encode_hex};
