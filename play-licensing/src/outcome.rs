//! Check outcomes and the codes a licensing backend reports.

use serde::{Deserialize, Serialize};

/// Reason code: the server confirmed the license.
pub const LICENSED: i32 = 0x0100;

/// Reason code: the server reported the user is not licensed.
pub const NOT_LICENSED: i32 = 0x0231;

/// Reason code: the check could not complete and may be retried.
pub const RETRY: i32 = 0x0123;

/// The single result of one license check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "code", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Access allowed, with the backend's reason code.
    Allowed(i32),
    /// Access denied, with the backend's reason code.
    DontAllow(i32),
    /// The check itself failed; see [`ApplicationErrorCode`].
    ApplicationError(i32),
}

/// Application error codes reported by the backend when a check cannot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationErrorCode {
    InvalidPackageName,
    NonMatchingUid,
    NotMarketManaged,
    CheckInProgress,
    InvalidPublicKey,
    MissingPermission,
}

impl ApplicationErrorCode {
    /// Maps a raw backend code to a known error, or `None` if unrecognized.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::InvalidPackageName),
            2 => Some(Self::NonMatchingUid),
            3 => Some(Self::NotMarketManaged),
            4 => Some(Self::CheckInProgress),
            5 => Some(Self::InvalidPublicKey),
            6 => Some(Self::MissingPermission),
            _ => None,
        }
    }

    /// The raw backend code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::InvalidPackageName => 1,
            Self::NonMatchingUid => 2,
            Self::NotMarketManaged => 3,
            Self::CheckInProgress => 4,
            Self::InvalidPublicKey => 5,
            Self::MissingPermission => 6,
        }
    }

    /// The `ERROR_*` name used as the message of a structured failure.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidPackageName => "ERROR_INVALID_PACKAGE_NAME",
            Self::NonMatchingUid => "ERROR_NON_MATCHING_UID",
            Self::NotMarketManaged => "ERROR_NOT_MARKET_MANAGED",
            Self::CheckInProgress => "ERROR_CHECK_IN_PROGRESS",
            Self::InvalidPublicKey => "ERROR_INVALID_PUBLIC_KEY",
            Self::MissingPermission => "ERROR_MISSING_PERMISSION",
        }
    }
}
