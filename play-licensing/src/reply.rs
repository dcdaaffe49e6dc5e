//! Replies sent back across the method channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The single answer to one method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum Reply {
    /// The call succeeded with a payload.
    Success(Value),
    /// The call failed with a structured error.
    Error {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
    /// No handler answers this method.
    NotImplemented,
}

impl Reply {
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success(value.into())
    }

    pub fn error(code: impl Into<String>, message: Option<String>, details: Option<Value>) -> Self {
        Self::Error {
            code: code.into(),
            message,
            details,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// The caller's end of a method call. Receives exactly one reply.
pub trait ReplySink: Send {
    fn send(self: Box<Self>, reply: Reply);
}

impl<F> ReplySink for F
where
    F: FnOnce(Reply) + Send,
{
    fn send(self: Box<Self>, reply: Reply) {
        (*self)(reply);
    }
}
