// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Server table, endpoint paths, timing windows and scheduler values for the Glooko provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Glooko publishes no stable API contract; every value here was observed from
//! the web application. Immutable tables with explicit fallbacks are used instead
//! of mutable globals.

/// API and web hostnames
pub mod servers {
    /// Environment name used when none is configured or the name is unknown
    pub const DEFAULT_ENV: &str = "default";

    /// Environment name selecting the EU web application
    pub const EU_ENV: &str = "eu";

    /// Known environments and their API hostnames
    pub const KNOWN_SERVERS: &[(&str, &str)] = &[
        ("default", "api.glooko.com"),
        ("development", "api.glooko.work"),
        ("production", "externalapi.glooko.com"),
        ("eu", "eu.api.glooko.com"),
    ];

    /// Web application host for every environment except EU
    pub const WEB_HOST: &str = "my.glooko.com";

    /// Web application host for the EU environment
    pub const WEB_HOST_EU: &str = "eu.my.glooko.com";

    /// Scheme used for every provider host
    pub const SCHEME: &str = "https";

    /// Look up the API hostname for an environment, falling back to the default entry
    #[must_use]
    pub fn api_host_for(env: &str) -> &'static str {
        KNOWN_SERVERS
            .iter()
            .find(|(name, _)| *name == env)
            .or_else(|| KNOWN_SERVERS.iter().find(|(name, _)| *name == DEFAULT_ENV))
            .map_or("api.glooko.com", |(_, host)| host)
    }
}

/// Endpoint paths relative to the resolved API or web base
pub mod endpoints {
    /// Web sign-in form page (web host)
    pub const LOGIN_FORM: &str = "/users/sign_in?locale=en";

    /// Web sign-in form POST target (web host)
    pub const LOGIN: &str = "/users/sign_in";

    /// Legacy JSON sign-in endpoint (API host)
    pub const API_LOGIN: &str = "/api/v2/users/sign_in";

    /// Paginated pump basal schedule endpoint
    pub const PUMP_SCHEDULED_BASALS: &str = "/api/v2/pumps/scheduled_basals";

    /// Paginated pump bolus endpoint
    pub const PUMP_NORMAL_BOLUSES: &str = "/api/v2/pumps/normal_boluses";

    /// Graph endpoint for the three CGM severity series
    pub const GRAPH_CGM_READINGS: &str = "/api/v3/graph/data?patient=_PATIENT_\
&startDate=_STARTDATE_&endDate=_ENDDATE_&series[]=cgmHigh&series[]=cgmNormal\
&series[]=cgmLow&locale=en&insulinTooltips=true&filterBgReadings=true&splitByDay=false";

    /// Placeholder replaced by the patient identifier
    pub const PATIENT_PLACEHOLDER: &str = "_PATIENT_";

    /// Placeholder replaced by the window start
    pub const START_DATE_PLACEHOLDER: &str = "_STARTDATE_";

    /// Placeholder replaced by the window end
    pub const END_DATE_PLACEHOLDER: &str = "_ENDDATE_";

    /// Pagination GUID sent to the paginated endpoints
    ///
    /// Arbitrary value with no documented meaning; the provider accepts it.
    /// Revalidate if the paginated endpoints start returning empty pages.
    pub const LAST_GUID: &str = "1e0c094e-1e54-4a4f-8e6a-f94484b53789";
}

/// Fetch window and timestamp handling
pub mod fetch {
    /// Maximum lookback regardless of the last known reading (hours)
    pub const LOOKBACK_HOURS: i64 = 48;

    /// CGM sampling interval used to size pagination (minutes)
    pub const SAMPLE_INTERVAL_MINUTES: i64 = 5;

    /// Hours subtracted from graph timestamps
    ///
    /// The graph endpoint reports a fixed local offset labelled as UTC.
    /// Revalidate against accounts in other regions before relying on it.
    pub const TIMESTAMP_CORRECTION_HOURS: i64 = 3;
}

/// Session lifetime values handed to the external scheduler
pub mod session {
    /// One day in milliseconds
    pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;

    /// Re-authenticate this long after a session was produced (ms)
    pub const REFRESH_AFTER_MS: u64 = DAY_MS - 600_000;

    /// Treat a session as expired this long after it was produced (ms)
    pub const EXPIRE_MS: u64 = DAY_MS;
}

/// Loop registration values handed to the external scheduler
pub mod schedule {
    /// Loop name registered with the scheduler
    pub const LOOP_NAME: &str = "Glooko";

    /// Base interval of the exponential backoff (2.5 minutes)
    pub const BACKOFF_INTERVAL_MS: u64 = 150_000;

    /// Retries after the first attempt (two attempts total)
    pub const MAX_RETRIES: u32 = 1;

    /// New data is expected this long after the last success (5 minutes)
    pub const EXPECTED_DATA_INTERVAL_MS: u64 = 300_000;
}

/// Browser automation waits
pub mod browser {
    /// Wait for the credential input to appear (seconds)
    pub const ELEMENT_WAIT_SECS: u64 = 10;

    /// Wait for post-login navigation (seconds)
    pub const NAVIGATION_WAIT_SECS: u64 = 15;

    /// Desktop Chrome user agent presented by the automated browser
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
}

/// Browser-like request headers sent to the API
pub mod headers {
    /// Desktop Safari user agent used for API requests
    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.5 Safari/605.1.15";

    /// JSON accept header
    pub const ACCEPT_JSON: &str = "application/json, text/plain, */*";

    /// HTML accept header used by the web form login
    pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
image/avif,image/webp,image/apng,*/*;q=0.8";

    /// Accept-Language for API requests
    pub const ACCEPT_LANGUAGE: &str = "en-GB,en;q=0.9";

    /// Accept-Language for the web form login
    pub const ACCEPT_LANGUAGE_FORM: &str = "en-US,en;q=0.9";
}
