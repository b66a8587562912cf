// ABOUTME: Headless browser login capability and the scoped browser login strategy
// ABOUTME: Drives the sign-in page, extracts the patient identifier, and always releases the browser
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::patient_id::{patient_id_from_page_state, PAGE_STATE_SCRIPT};
use super::LoginStrategy;
use crate::constants::{browser, endpoints};
use crate::servers::ServerEndpoints;
use crate::settings::Config;
use crate::{AuthError, AuthStrategy, Session};

/// Login email input
pub const EMAIL_INPUT: &str = r#"input[name="user[email]"]"#;
/// Login password input
pub const PASSWORD_INPUT: &str = r#"input[name="user[password]"]"#;
/// Submit control
pub const SUBMIT_BUTTON: &str = r#"input[type="submit"], button[type="submit"]"#;

/// Failures raised by a browser session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrowserError {
    /// The browser could not be started
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// Navigation or page interaction failed
    #[error("browser navigation failed: {0}")]
    Navigation(String),

    /// An element did not appear within the wait
    #[error("element {selector} not found within {waited_secs}s")]
    ElementNotFound {
        /// CSS selector
        selector: String,
        /// Seconds waited
        waited_secs: u64,
    },

    /// A bounded wait elapsed
    #[error("timed out after {secs}s waiting for {what}")]
    Timeout {
        /// What was awaited
        what: &'static str,
        /// Seconds waited
        secs: u64,
    },

    /// In-page script evaluation failed
    #[error("script evaluation failed: {0}")]
    Script(String),

    /// Any other driver protocol failure
    #[error("browser protocol error: {0}")]
    Protocol(String),
}

/// Starts isolated browser sessions
///
/// Resolved once at startup and shared by reference. A cascade built without a
/// launcher reports browser automation as unavailable.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Open a fresh session; the caller must [`BrowserSession::close`] it
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// One open browser session
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to a URL
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// Wait until an element matching `selector` exists
    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Type text into the first element matching `selector`
    async fn type_into(&self, selector: &str, text: &str) -> Result<(), BrowserError>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> Result<(), BrowserError>;

    /// Wait until the page URL differs from `from_url`
    ///
    /// Returns [`BrowserError::Timeout`] when nothing changed within `timeout`.
    async fn wait_for_navigation(&self, from_url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Current page URL
    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Evaluate a script body (which ends in `return ...`) and return its JSON result
    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError>;

    /// All cookies visible to the page as `(name, value)` pairs
    async fn cookies(&self) -> Result<Vec<(String, String)>, BrowserError>;

    /// Release the session and its out-of-process browser
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Browser automation login: discovers the patient identifier from the page
pub struct BrowserLogin {
    launcher: Option<Arc<dyn BrowserLauncher>>,
    endpoints: ServerEndpoints,
}

impl BrowserLogin {
    /// Create the strategy; `None` means no automation capability
    #[must_use]
    pub fn new(launcher: Option<Arc<dyn BrowserLauncher>>, endpoints: ServerEndpoints) -> Self {
        Self {
            launcher,
            endpoints,
        }
    }

    async fn drive_login(
        &self,
        page: &dyn BrowserSession,
        config: &Config,
    ) -> Result<Session, AuthError> {
        let fail = |e: BrowserError| AuthError::stage(AuthStrategy::BrowserAutomation, e.to_string());

        page.goto(&self.endpoints.web_url(endpoints::LOGIN_FORM))
            .await
            .map_err(fail)?;
        page.wait_for_element(EMAIL_INPUT, Duration::from_secs(browser::ELEMENT_WAIT_SECS))
            .await
            .map_err(fail)?;
        page.type_into(EMAIL_INPUT, &config.email).await.map_err(fail)?;
        page.type_into(PASSWORD_INPUT, &config.password)
            .await
            .map_err(fail)?;

        let before = page.current_url().await.map_err(fail)?;
        page.click(SUBMIT_BUTTON).await.map_err(fail)?;

        match page
            .wait_for_navigation(&before, Duration::from_secs(browser::NAVIGATION_WAIT_SECS))
            .await
        {
            Ok(()) => {}
            Err(BrowserError::Timeout { .. }) => {
                debug!("No navigation after sign-in submit, checking page anyway");
            }
            Err(e) => return Err(fail(e)),
        }

        let landed = page.current_url().await.map_err(fail)?;
        if landed.contains(endpoints::LOGIN) {
            return Err(AuthError::stage(
                AuthStrategy::BrowserAutomation,
                "still on the sign-in page after submitting credentials",
            ));
        }

        let state = page.evaluate(PAGE_STATE_SCRIPT).await.map_err(fail)?;
        let patient_id = patient_id_from_page_state(&state).ok_or_else(|| {
            AuthError::stage(
                AuthStrategy::BrowserAutomation,
                "no patient identifier found in page state",
            )
        })?;

        let cookies = page
            .cookies()
            .await
            .map_err(fail)?
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");

        Session::new(cookies, patient_id, AuthStrategy::BrowserAutomation)
    }
}

#[async_trait]
impl LoginStrategy for BrowserLogin {
    fn strategy(&self) -> AuthStrategy {
        AuthStrategy::BrowserAutomation
    }

    async fn produce_session(&self, config: &Config) -> Result<Session, AuthError> {
        let Some(launcher) = &self.launcher else {
            return Err(AuthError::unavailable(
                AuthStrategy::BrowserAutomation,
                "no browser automation capability configured",
            ));
        };

        let mut page = launcher
            .launch()
            .await
            .map_err(|e| AuthError::unavailable(AuthStrategy::BrowserAutomation, e.to_string()))?;
        info!("Browser session launched for Glooko sign-in");

        let outcome = self.drive_login(page.as_ref(), config).await;

        // Released on every exit path, exactly once
        if let Err(e) = page.close().await {
            warn!(error = %e, "Failed to close browser session");
        }

        outcome
    }
}
