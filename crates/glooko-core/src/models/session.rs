// ABOUTME: Authenticated Glooko session produced by exactly one login strategy
// ABOUTME: Enforces non-empty cookies and patient identifier at construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AuthError;

/// Login strategies of the authentication cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStrategy {
    /// Headless browser login with in-page patient identifier discovery
    BrowserAutomation,
    /// JSON login against the legacy API endpoint
    LegacyApiLogin,
    /// Web form login with CSRF token and a manually configured patient identifier
    WebFormLogin,
}

impl AuthStrategy {
    /// Stable name used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BrowserAutomation => "browser_automation",
            Self::LegacyApiLogin => "legacy_api_login",
            Self::WebFormLogin => "web_form_login",
        }
    }
}

impl fmt::Display for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cookie header and patient identifier needed by every data request
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    cookies: String,
    patient_id: String,
    strategy: AuthStrategy,
}

impl Session {
    /// Build a session; both the cookie header and the patient identifier must be non-empty
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StageFailed` for the producing strategy when either value is empty
    pub fn new(
        cookies: impl Into<String>,
        patient_id: impl Into<String>,
        strategy: AuthStrategy,
    ) -> Result<Self, AuthError> {
        let cookies = cookies.into();
        let patient_id = patient_id.into();

        if cookies.trim().is_empty() {
            return Err(AuthError::stage(strategy, "no session cookies received"));
        }
        if patient_id.trim().is_empty() {
            return Err(AuthError::stage(strategy, "no patient identifier available"));
        }

        Ok(Self {
            cookies,
            patient_id,
            strategy,
        })
    }

    /// Combined `Cookie` header value
    #[must_use]
    pub fn cookies(&self) -> &str {
        &self.cookies
    }

    /// Glooko patient identifier (glooko code)
    #[must_use]
    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// Strategy that produced this session
    #[must_use]
    pub const fn strategy(&self) -> AuthStrategy {
        self.strategy
    }
}

// Cookies are credentials; keep them out of debug output
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookies", &"[REDACTED]")
            .field("patient_id", &self.patient_id)
            .field("strategy", &self.strategy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_requires_cookies_and_patient() {
        assert!(Session::new("", "us-east-1-abc", AuthStrategy::LegacyApiLogin).is_err());
        assert!(Session::new("_session=1", " ", AuthStrategy::LegacyApiLogin).is_err());

        let session = Session::new("_session=1", "us-east-1-abc", AuthStrategy::WebFormLogin)
            .unwrap();
        assert_eq!(session.cookies(), "_session=1");
        assert_eq!(session.patient_id(), "us-east-1-abc");
        assert_eq!(session.strategy(), AuthStrategy::WebFormLogin);
    }

    #[test]
    fn test_session_debug_redacts_cookies() {
        let session =
            Session::new("_session=secret", "eu-west-1-x", AuthStrategy::BrowserAutomation)
                .unwrap();
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("eu-west-1-x"));
    }
}
