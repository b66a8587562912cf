// ABOUTME: Environment variable loading for Glooko credentials and runtime overrides
// ABOUTME: Produces raw InputSettings, the WebDriver endpoint, and fetch workaround overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fetcher::FetchOptions;
use crate::settings::InputSettings;

/// Login email
pub const ENV_EMAIL: &str = "CONNECT_GLOOKO_EMAIL";
/// Login password
pub const ENV_PASSWORD: &str = "CONNECT_GLOOKO_PASSWORD";
/// Manual patient identifier
pub const ENV_PATIENT_ID: &str = "CONNECT_GLOOKO_PATIENT_ID";
/// Environment selector
pub const ENV_ENV: &str = "CONNECT_GLOOKO_ENV";
/// Explicit API server override
pub const ENV_SERVER: &str = "CONNECT_GLOOKO_SERVER";
/// Timezone offset in hours
pub const ENV_TIMEZONE_OFFSET: &str = "CONNECT_GLOOKO_TIMEZONE_OFFSET";
/// WebDriver endpoint used for browser login
pub const ENV_WEBDRIVER_URL: &str = "GLOOKO_WEBDRIVER_URL";
/// Override for the graph timestamp correction, in hours
pub const ENV_TIMESTAMP_CORRECTION_HOURS: &str = "GLOOKO_TIMESTAMP_CORRECTION_HOURS";
/// Override for the pagination GUID
pub const ENV_LAST_GUID: &str = "GLOOKO_LAST_GUID";

/// Read the raw Glooko settings from the environment
///
/// Nothing is validated here; pass the result to [`crate::settings::validate`].
#[must_use]
pub fn input_settings_from_env() -> InputSettings {
    InputSettings {
        email: env::var(ENV_EMAIL).ok(),
        password: env::var(ENV_PASSWORD).ok(),
        patient_id: env::var(ENV_PATIENT_ID).ok(),
        env: env::var(ENV_ENV).ok(),
        server: env::var(ENV_SERVER).ok(),
        timezone_offset_hours: env::var(ENV_TIMEZONE_OFFSET).ok(),
    }
}

/// Browser automation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint of a headless Chrome, e.g. `http://localhost:9515`
    pub webdriver_url: Option<String>,
}

impl BrowserConfig {
    /// Load browser settings from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            webdriver_url: env::var(ENV_WEBDRIVER_URL)
                .ok()
                .filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Fetch options with the provider workarounds taken from the environment when set
///
/// Unparsable values are ignored with a warning and the defaults are kept.
#[must_use]
pub fn fetch_options_from_env() -> FetchOptions {
    let mut options = FetchOptions::default();

    if let Ok(raw) = env::var(ENV_TIMESTAMP_CORRECTION_HOURS) {
        match raw.trim().parse::<i64>().ok().and_then(Duration::try_hours) {
            Some(correction) => options.timestamp_correction = correction,
            None => warn!(
                value = %raw,
                "Ignoring invalid or out of range {ENV_TIMESTAMP_CORRECTION_HOURS}"
            ),
        }
    }

    if let Ok(guid) = env::var(ENV_LAST_GUID) {
        if !guid.trim().is_empty() {
            options.last_guid = guid.trim().to_owned();
        }
    }

    options
}
