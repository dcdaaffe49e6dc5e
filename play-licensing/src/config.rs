//! Licensing configuration.
//!
//! Replaces a process-wide constant object: the defaults are compiled in,
//! but the value is built once at startup and handed to the client.

use crate::error::{LicensingError, LicensingResult};
use crate::salt::decode_hex_salt;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable overriding the default salt (hex pairs).
pub const SALT_ENV: &str = "PLAY_LICENSING_SALT";

/// Environment variable overriding the default public key (base64).
pub const PUBLIC_KEY_ENV: &str = "PLAY_LICENSING_PUBLIC_KEY";

/// Default obfuscation salt (20 bytes).
pub const DEFAULT_SALT: [u8; 20] = [
    0xd2, 0x41, 0x1e, 0x80, 0x9b, 0xc7, 0x4a, 0xc0, 0x33, 0x58,
    0xa1, 0xd3, 0x4f, 0x8b, 0xdc, 0x8f, 0xf3, 0x20, 0xc0, 0x59,
];

/// Process defaults for license checks. Both values can be overridden per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LicenseConfig {
    /// Salt used when a call does not carry its own.
    #[serde(with = "hex")]
    pub salt: Vec<u8>,
    /// Base64 licensing public key used when a call does not carry its own.
    pub public_key: String,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            salt: DEFAULT_SALT.to_vec(),
            public_key: String::new(),
        }
    }
}

impl LicenseConfig {
    /// Parses a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the salt is not valid hex.
    pub fn from_json(json: &str) -> LicensingResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from the defaults, overridden by
    /// `PLAY_LICENSING_SALT` and `PLAY_LICENSING_PUBLIC_KEY` when set.
    ///
    /// # Errors
    ///
    /// Returns an error if `PLAY_LICENSING_SALT` is set but is not a
    /// non-empty hex string.
    pub fn from_env() -> LicensingResult<Self> {
        let mut config = Self::default();
        if let Ok(salt) = env::var(SALT_ENV) {
            config.salt = decode_hex_salt(&salt).ok_or_else(|| {
                LicensingError::InvalidConfig(format!("{SALT_ENV} is not a hex string"))
            })?;
        }
        if let Ok(key) = env::var(PUBLIC_KEY_ENV) {
            config.public_key = key;
        }
        config.validate()?;
        Ok(config)
    }

    /// Replaces the default salt.
    #[must_use]
    pub fn with_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = salt.into();
        self
    }

    /// Replaces the default public key.
    #[must_use]
    pub fn with_public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = key.into();
        self
    }

    fn validate(&self) -> LicensingResult<()> {
        if self.salt.is_empty() {
            return Err(LicensingError::InvalidConfig("salt must not be empty".into()));
        }
        Ok(())
    }
}
