//! Routing of method calls to license checks, and shaping of replies.

use crate::channel::{MethodCall, MethodCallHandler};
use crate::client::LicenseClient;
use crate::dispatcher::{ResultDispatcher, ResultHandle};
use crate::outcome::{ApplicationErrorCode, CheckOutcome};
use crate::reply::Reply;
use crate::request::{CheckRequest, Operation};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Entry point for `check` and `isAllowed`.
///
/// `handle` returns immediately. The reply is produced when the backend
/// reports and is always executed on the dispatcher's thread.
pub struct RequestRouter {
    client: LicenseClient,
    dispatcher: Arc<ResultDispatcher>,
}

impl RequestRouter {
    pub fn new(client: LicenseClient, dispatcher: Arc<ResultDispatcher>) -> Self {
        Self { client, dispatcher }
    }

    pub fn client(&self) -> &LicenseClient {
        &self.client
    }

    /// Answers one call.
    pub fn handle(&self, call: MethodCall, result: ResultHandle) {
        let result = result.on_main(&self.dispatcher);

        let Some(operation) = Operation::from_method(&call.method) else {
            debug!(method = %call.method, "Unknown method");
            result.not_implemented();
            return;
        };

        if !self.dispatcher.is_attached() {
            debug!(%operation, "Router detached, dropping call");
            result.discard();
            return;
        }

        let request = CheckRequest::from_arguments(operation, &call.arguments);
        let request_id = Uuid::new_v4();
        info!(%request_id, %operation, "License check requested");

        self.client.check_access(&request, move |outcome| {
            debug!(%request_id, ?outcome, "License check finished");
            result.send(reply_for(operation, outcome));
        });
    }
}

impl MethodCallHandler for RequestRouter {
    fn on_method_call(&self, call: MethodCall, result: ResultHandle) {
        self.handle(call, result);
    }
}

/// Shapes an outcome into the reply for `operation`.
///
/// `check` surfaces every code: allow reasons as success, denials and
/// application errors as failures carrying the code. `isAllowed` answers
/// a boolean and only fails for a missing permission or a check already
/// in progress; any other application error reads as `false`.
#[must_use]
pub fn reply_for(operation: Operation, outcome: CheckOutcome) -> Reply {
    match operation {
        Operation::Check => check_reply(outcome),
        Operation::IsAllowed => is_allowed_reply(outcome),
    }
}

fn check_reply(outcome: CheckOutcome) -> Reply {
    match outcome {
        CheckOutcome::Allowed(reason) => Reply::success(reason),
        CheckOutcome::DontAllow(code) | CheckOutcome::ApplicationError(code) => {
            Reply::error(code.to_string(), None, Some(code.into()))
        }
    }
}

fn is_allowed_reply(outcome: CheckOutcome) -> Reply {
    match outcome {
        CheckOutcome::Allowed(_) => Reply::success(true),
        CheckOutcome::DontAllow(_) => Reply::success(false),
        CheckOutcome::ApplicationError(code) => match ApplicationErrorCode::from_code(code) {
            Some(
                known @ (ApplicationErrorCode::MissingPermission
                | ApplicationErrorCode::CheckInProgress),
            ) => Reply::error(code.to_string(), Some(known.name().to_string()), Some(code.into())),
            _ => Reply::success(false),
        },
    }
}
