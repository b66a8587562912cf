// ABOUTME: Glooko input settings and their validation into an immutable Config
// ABOUTME: Reports missing credentials as an ordered, structured issue list instead of failing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ErrorCode;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Remediation text for a missing login email
pub const MISSING_EMAIL_DESC: &str = "The Glooko User Login Email is required. \
CONNECT_GLOOKO_EMAIL must be an email belonging to an active Glooko User to log in.";

/// Remediation text for a missing login password
pub const MISSING_PASSWORD_DESC: &str = "Glooko User Login Password is required. \
CONNECT_GLOOKO_PASSWORD must be the password for the Glooko User Login.";

/// Raw, unvalidated settings as read from the environment or command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSettings {
    /// Login email
    pub email: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Manually configured patient identifier
    pub patient_id: Option<String>,
    /// Environment selector (`default`, `development`, `production`, `eu`)
    pub env: Option<String>,
    /// Explicit API server override
    pub server: Option<String>,
    /// Timezone offset in hours, as text
    pub timezone_offset_hours: Option<String>,
}

/// Whether a validated configuration may be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKind {
    /// Credentials are present
    Glooko,
    /// Validation failed; the authentication cascade refuses this config
    Disabled,
}

/// Validated, immutable configuration
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Whether the config is usable
    pub kind: ConfigKind,
    /// Login email (empty when missing)
    pub email: String,
    /// Login password (empty when missing)
    #[serde(skip_serializing)]
    pub password: String,
    /// Manually configured patient identifier
    pub patient_id: Option<String>,
    /// Environment selector
    pub env: Option<String>,
    /// Explicit API server override
    pub server: Option<String>,
    /// Timezone offset as signed milliseconds (`hours * -3_600_000`)
    pub timezone_offset_ms: i64,
}

impl Config {
    /// Whether credentials were present at validation time
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.kind == ConfigKind::Glooko
    }

    /// Manual patient identifier, if configured
    #[must_use]
    pub fn manual_patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("kind", &self.kind)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("patient_id", &self.patient_id)
            .field("env", &self.env)
            .field("server", &self.server)
            .field("timezone_offset_ms", &self.timezone_offset_ms)
            .finish()
    }
}

/// One validation problem: a remediation string and a machine-readable code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Human-readable remediation
    pub desc: &'static str,
    /// Machine-distinguishable code
    pub err: ErrorCode,
}

/// Result of validating input settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// True when no issues were found
    pub ok: bool,
    /// Issues in fixed order: email first, password second
    pub errors: Vec<ValidationIssue>,
    /// Config built from the input; `Disabled` when not ok
    pub config: Config,
}

/// Validate raw settings
///
/// Never fails: missing values are reported in `errors` and the returned config
/// is marked disabled. Empty and whitespace-only strings count as missing for
/// every field, so a credential of only spaces is reported like an absent one.
#[must_use]
pub fn validate(input: &InputSettings) -> Validation {
    let email = non_empty(input.email.as_deref());
    let password = non_empty(input.password.as_deref());

    let mut errors = Vec::new();
    if email.is_none() {
        errors.push(ValidationIssue {
            desc: MISSING_EMAIL_DESC,
            err: ErrorCode::MissingEmail,
        });
    }
    if password.is_none() {
        errors.push(ValidationIssue {
            desc: MISSING_PASSWORD_DESC,
            err: ErrorCode::MissingPassword,
        });
    }

    let timezone_offset_ms = timezone_offset_ms(input.timezone_offset_hours.as_deref());
    tracing::debug!(timezone_offset_ms, "Glooko timezone offset resolved");

    let ok = errors.is_empty();
    let config = Config {
        kind: if ok {
            ConfigKind::Glooko
        } else {
            ConfigKind::Disabled
        },
        email: email.unwrap_or_default().to_owned(),
        password: password.unwrap_or_default().to_owned(),
        patient_id: non_empty(input.patient_id.as_deref()).map(str::to_owned),
        env: non_empty(input.env.as_deref()).map(str::to_owned),
        server: non_empty(input.server.as_deref()).map(str::to_owned),
        timezone_offset_ms,
    };

    Validation { ok, errors, config }
}

/// Convert an hour offset to signed milliseconds; anything non-numeric becomes 0
#[allow(clippy::cast_possible_truncation)]
fn timezone_offset_ms(hours: Option<&str>) -> i64 {
    let Some(raw) = hours.map(str::trim) else {
        return 0;
    };
    if raw.is_empty() {
        return 0;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|h| h.is_finite())
        .map_or(0, |h| (h * -MS_PER_HOUR).round() as i64)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
