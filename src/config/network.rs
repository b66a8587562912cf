// ABOUTME: Network configuration for the shared HTTP clients
// ABOUTME: Request and connect timeouts loaded from the environment with fixed defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::env;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP client timeout configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl HttpClientConfig {
    /// Load HTTP client configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            timeout_secs: env::var("GLOOKO_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            connect_timeout_secs: env::var("GLOOKO_HTTP_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_http_client_config_from_env() {
        env::remove_var("GLOOKO_HTTP_TIMEOUT_SECS");
        env::remove_var("GLOOKO_HTTP_CONNECT_TIMEOUT_SECS");
        assert_eq!(HttpClientConfig::from_env(), HttpClientConfig::default());

        env::set_var("GLOOKO_HTTP_TIMEOUT_SECS", "5");
        env::set_var("GLOOKO_HTTP_CONNECT_TIMEOUT_SECS", "not-a-number");
        let config = HttpClientConfig::from_env();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);

        env::remove_var("GLOOKO_HTTP_TIMEOUT_SECS");
        env::remove_var("GLOOKO_HTTP_CONNECT_TIMEOUT_SECS");
    }
}
