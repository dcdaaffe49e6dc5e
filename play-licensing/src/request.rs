//! Decoding of incoming method calls into check requests.

use crate::salt::decode_hex_salt;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Argument key carrying a hex-encoded salt override.
pub const SALT_ARG: &str = "salt";

/// Argument key carrying a public key override.
pub const PUBLIC_KEY_ARG: &str = "publicKey";

/// The operations the router answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Returns the raw allow-reason code, or a structured failure.
    Check,
    /// Returns a boolean; denials are not failures.
    IsAllowed,
}

impl Operation {
    /// Parses a method name. Unknown names yield `None`.
    #[must_use]
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "check" => Some(Self::Check),
            "isAllowed" => Some(Self::IsAllowed),
            _ => None,
        }
    }

    #[must_use]
    pub fn method_name(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::IsAllowed => "isAllowed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// One decoded license check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub operation: Operation,
    /// Salt override; `None` means use the configured salt.
    pub salt: Option<Vec<u8>>,
    /// Public key override; `None` means use the configured key.
    pub public_key: Option<String>,
}

impl CheckRequest {
    /// A request with no overrides.
    #[must_use]
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            salt: None,
            public_key: None,
        }
    }

    /// Decodes the argument map of a call. Never fails: a missing,
    /// non-string or malformed argument is treated as absent.
    #[must_use]
    pub fn from_arguments(operation: Operation, args: &Map<String, Value>) -> Self {
        let salt = match args.get(SALT_ARG) {
            Some(Value::String(s)) => {
                let decoded = decode_hex_salt(s);
                if decoded.is_none() {
                    debug!(%operation, "Ignoring malformed salt argument");
                }
                decoded
            }
            Some(Value::Null) | None => None,
            Some(other) => {
                debug!(%operation, kind = value_kind(other), "Ignoring non-string salt argument");
                None
            }
        };

        let public_key = args
            .get(PUBLIC_KEY_ARG)
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            operation,
            salt,
            public_key,
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
