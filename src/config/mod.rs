// ABOUTME: Environment-driven configuration for the Glooko bridge runtime
// ABOUTME: Loads credentials, HTTP client timeouts, WebDriver endpoint, and fetch overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration loading
//!
//! - **Environment**: Glooko credentials, browser endpoint and fetch overrides
//! - **Network**: HTTP client timeouts
//!
//! Validation of the loaded settings lives in [`crate::settings`].

/// Credentials, browser and fetch settings from environment variables
pub mod environment;
/// HTTP client timeout configuration
pub mod network;

pub use environment::{fetch_options_from_env, input_settings_from_env, BrowserConfig};
pub use network::HttpClientConfig;
