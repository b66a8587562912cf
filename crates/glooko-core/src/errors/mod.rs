// ABOUTME: Unified error handling for the Glooko bridge with machine-readable error codes
// ABOUTME: Re-exports auth, fetch and bridge error types used across the workspace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! Every error the bridge can surface carries an [`ErrorCode`] so callers can
//! branch on a stable identifier instead of parsing messages. Local recovery is
//! limited to falling back between authentication strategies; everything else
//! propagates to the caller.

/// Authentication cascade errors
pub mod auth;
/// Endpoint fetch errors
pub mod fetch;

pub use auth::AuthError;
pub use fetch::FetchError;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard error codes used throughout the bridge
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (1000-1999)
    /// Login email is missing from the configuration
    #[serde(rename = "CONNECT_GLOOKO_EMAIL")]
    MissingEmail = 1000,
    /// Login password is missing from the configuration
    #[serde(rename = "CONNECT_GLOOKO_PASSWORD")]
    MissingPassword = 1001,
    /// Configuration failed validation and cannot be used
    #[serde(rename = "CONFIG_DISABLED")]
    ConfigDisabled = 1002,

    // Authentication (2000-2999)
    /// Browser automation capability is not available
    #[serde(rename = "AUTH_UNAVAILABLE")]
    AuthUnavailable = 2000,
    /// A single authentication strategy failed
    #[serde(rename = "AUTH_STAGE_FAILED")]
    AuthStageFailed = 2001,
    /// Every applicable authentication strategy failed
    #[serde(rename = "AUTH_EXHAUSTED")]
    AuthExhausted = 2002,

    // Fetching (3000-3999)
    /// An endpoint request failed
    #[serde(rename = "FETCH_FAILED")]
    FetchFailed = 3000,

    // Driver (4000-4999)
    /// The driver was run before both contracts were registered
    #[serde(rename = "DRIVER_INCOMPLETE")]
    DriverIncomplete = 4000,
}

impl ErrorCode {
    /// Stable string form, identical to the serialized representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingEmail => "CONNECT_GLOOKO_EMAIL",
            Self::MissingPassword => "CONNECT_GLOOKO_PASSWORD",
            Self::ConfigDisabled => "CONFIG_DISABLED",
            Self::AuthUnavailable => "AUTH_UNAVAILABLE",
            Self::AuthStageFailed => "AUTH_STAGE_FAILED",
            Self::AuthExhausted => "AUTH_EXHAUSTED",
            Self::FetchFailed => "FETCH_FAILED",
            Self::DriverIncomplete => "DRIVER_INCOMPLETE",
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::MissingEmail => "The Glooko login email is required",
            Self::MissingPassword => "The Glooko login password is required",
            Self::ConfigDisabled => "The Glooko configuration is incomplete and disabled",
            Self::AuthUnavailable => "Browser automation is not available",
            Self::AuthStageFailed => "A Glooko authentication strategy failed",
            Self::AuthExhausted => "Unable to authenticate with Glooko",
            Self::FetchFailed => "A Glooko data request failed",
            Self::DriverIncomplete => "The session or loop contract is not registered",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error returned by the driver glue
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Authentication failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Fetching data failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A driver contract is missing
    #[error("{0} contract not registered")]
    Incomplete(&'static str),
}

impl BridgeError {
    /// Error code of the wrapped error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Auth(e) => e.code(),
            Self::Fetch(e) => e.code(),
            Self::Incomplete(_) => ErrorCode::DriverIncomplete,
        }
    }
}
