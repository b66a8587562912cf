// ABOUTME: Fetch error types for Glooko data endpoints
// ABOUTME: Every variant names the endpoint so failures are attributable without retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ErrorCode;

/// Errors raised by a single endpoint fetch
///
/// These are never retried locally; the external scheduler owns recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the connection failed
    #[error("request to {endpoint} failed: {reason}")]
    Request {
        /// Endpoint name
        endpoint: &'static str,
        /// Transport error details
        reason: String,
    },

    /// The provider answered with a non-success status
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// Endpoint name
        endpoint: &'static str,
        /// HTTP status code
        status: u16,
    },

    /// The response body did not match the expected shape
    #[error("failed to decode {endpoint} response: {reason}")]
    Decode {
        /// Endpoint name
        endpoint: &'static str,
        /// Decoder error details
        reason: String,
    },
}

impl FetchError {
    /// Endpoint the error belongs to
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        match self {
            Self::Request { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => endpoint,
        }
    }

    /// Error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::FetchFailed
    }
}
