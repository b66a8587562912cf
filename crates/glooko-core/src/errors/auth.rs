// ABOUTME: Authentication error types for the Glooko login cascade
// ABOUTME: Distinguishes unavailable capabilities, per-strategy failures, and terminal exhaustion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ErrorCode;
use crate::models::AuthStrategy;

/// Remediation shown when the branch without a manual patient identifier is exhausted
pub const REMEDIATION_NO_PATIENT_ID: &str = "Unable to authenticate. Please add \
CONNECT_GLOOKO_PATIENT_ID=your-patient-id to your environment, or configure \
GLOOKO_WEBDRIVER_URL for automatic patient ID extraction.";

/// Remediation shown when the manual patient identifier branch is exhausted
pub const REMEDIATION_WEB_FORM: &str = "Unable to authenticate with the Glooko web login. \
Check CONNECT_GLOOKO_EMAIL and CONNECT_GLOOKO_PASSWORD, and that \
CONNECT_GLOOKO_PATIENT_ID matches your account.";

/// Errors raised while producing a session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Browser automation capability is missing; the cascade falls through
    #[error("{strategy} unavailable: {reason}")]
    Unavailable {
        /// Strategy that could not run
        strategy: AuthStrategy,
        /// Why the capability is missing
        reason: String,
    },

    /// One strategy failed (credentials rejected, token or cookies missing, timeout)
    #[error("{strategy} failed: {reason}")]
    StageFailed {
        /// Strategy that failed
        strategy: AuthStrategy,
        /// Failure details
        reason: String,
    },

    /// The last applicable strategy failed
    #[error("{remediation} (last attempt: {strategy}: {cause})")]
    Exhausted {
        /// Last strategy that was attempted
        strategy: AuthStrategy,
        /// Operator-facing remediation message
        remediation: &'static str,
        /// Failure of the last strategy
        cause: String,
    },

    /// Configuration did not validate and cannot authenticate
    #[error("Glooko configuration is disabled: email and password are required")]
    ConfigDisabled,
}

impl AuthError {
    /// Create a stage failure for a strategy
    #[must_use]
    pub fn stage(strategy: AuthStrategy, reason: impl Into<String>) -> Self {
        Self::StageFailed {
            strategy,
            reason: reason.into(),
        }
    }

    /// Create an unavailable-capability error for a strategy
    #[must_use]
    pub fn unavailable(strategy: AuthStrategy, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            strategy,
            reason: reason.into(),
        }
    }

    /// Whether the cascade may continue with another strategy after this error
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::StageFailed { .. })
    }

    /// Error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unavailable { .. } => ErrorCode::AuthUnavailable,
            Self::StageFailed { .. } => ErrorCode::AuthStageFailed,
            Self::Exhausted { .. } => ErrorCode::AuthExhausted,
            Self::ConfigDisabled => ErrorCode::ConfigDisabled,
        }
    }
}
