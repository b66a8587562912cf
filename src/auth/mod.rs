// ABOUTME: Authentication cascade over the three Glooko login strategies
// ABOUTME: Pure next-strategy selection plus a sequential driver that yields exactly one Session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication cascade
//!
//! Without a manual patient identifier the cascade tries browser automation
//! first (the only strategy that can discover the identifier) and falls back to
//! the legacy JSON login. With a manual identifier it goes straight to the web
//! form login and never touches the browser.
//!
//! Strategies run strictly one after another and none is attempted twice.

/// Browser capability traits and the browser login strategy
pub mod browser;
/// Legacy JSON API login
pub mod legacy;
/// Patient identifier discovery from page state
pub mod patient_id;
/// Web form login with CSRF token
pub mod web_form;
/// WebDriver-backed browser capability
#[cfg(feature = "browser")]
pub mod webdriver;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::config::BrowserConfig;
use crate::errors::auth::{REMEDIATION_NO_PATIENT_ID, REMEDIATION_WEB_FORM};
use crate::http_client::login_client;
use crate::servers::ServerEndpoints;
use crate::settings::Config;
use crate::{AuthError, AuthStrategy, Session};

pub use browser::{BrowserError, BrowserLauncher, BrowserLogin, BrowserSession};
pub use legacy::LegacyLogin;
pub use web_form::WebFormLogin;

/// One way of turning a config into a session
#[async_trait]
pub trait LoginStrategy: Send + Sync {
    /// Which strategy this is
    fn strategy(&self) -> AuthStrategy;

    /// Attempt a login; a single attempt, never retried here
    async fn produce_session(&self, config: &Config) -> Result<Session, AuthError>;
}

/// Entry strategy for a config
#[must_use]
pub const fn first_strategy(has_manual_patient_id: bool) -> AuthStrategy {
    if has_manual_patient_id {
        AuthStrategy::WebFormLogin
    } else {
        AuthStrategy::BrowserAutomation
    }
}

/// Strategy to try after `current` failed with `failure`, or `None` when the branch is done
#[must_use]
pub const fn next_strategy(
    current: AuthStrategy,
    has_manual_patient_id: bool,
    failure: &AuthError,
) -> Option<AuthStrategy> {
    if !failure.is_recoverable() {
        return None;
    }
    match (current, has_manual_patient_id) {
        (AuthStrategy::BrowserAutomation, false) => Some(AuthStrategy::LegacyApiLogin),
        _ => None,
    }
}

/// Remediation surfaced when `last` was the final strategy of its branch
#[must_use]
pub const fn remediation_for(last: AuthStrategy) -> &'static str {
    match last {
        AuthStrategy::WebFormLogin => REMEDIATION_WEB_FORM,
        AuthStrategy::BrowserAutomation | AuthStrategy::LegacyApiLogin => {
            REMEDIATION_NO_PATIENT_ID
        }
    }
}

/// Every strategy the cascade may try for a config, in order
#[must_use]
pub fn plan(has_manual_patient_id: bool) -> Vec<AuthStrategy> {
    let mut steps = vec![first_strategy(has_manual_patient_id)];
    let probe = AuthError::stage(AuthStrategy::BrowserAutomation, "");
    while let Some(next) = steps
        .last()
        .and_then(|last| next_strategy(*last, has_manual_patient_id, &probe))
    {
        steps.push(next);
    }
    steps
}

/// Resolve the browser capability once at startup
///
/// `None` when no WebDriver endpoint is configured or the crate was built
/// without the `browser` feature.
#[must_use]
pub fn launcher_from_config(config: &BrowserConfig) -> Option<Arc<dyn BrowserLauncher>> {
    #[cfg(feature = "browser")]
    {
        config.webdriver_url.as_ref().map(|url| {
            Arc::new(webdriver::WebDriverLauncher::new(url.clone())) as Arc<dyn BrowserLauncher>
        })
    }
    #[cfg(not(feature = "browser"))]
    {
        if config.webdriver_url.is_some() {
            warn!("WebDriver endpoint configured but browser support is not compiled in");
        }
        None
    }
}

/// Runs the login strategies for one config until one produces a session
pub struct AuthCascade {
    config: Config,
    browser: BrowserLogin,
    legacy: LegacyLogin,
    web_form: WebFormLogin,
}

impl AuthCascade {
    /// Build a cascade on the shared non-redirecting login client
    #[must_use]
    pub fn new(
        config: Config,
        endpoints: ServerEndpoints,
        launcher: Option<Arc<dyn BrowserLauncher>>,
    ) -> Self {
        Self::with_client(config, endpoints, launcher, login_client().clone())
    }

    /// Build a cascade on a caller-provided client
    #[must_use]
    pub fn with_client(
        config: Config,
        endpoints: ServerEndpoints,
        launcher: Option<Arc<dyn BrowserLauncher>>,
        client: Client,
    ) -> Self {
        Self {
            config,
            browser: BrowserLogin::new(launcher, endpoints.clone()),
            legacy: LegacyLogin::new(client.clone(), endpoints.clone()),
            web_form: WebFormLogin::new(client, endpoints),
        }
    }

    /// Config the cascade authenticates with
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn strategy(&self, which: AuthStrategy) -> &dyn LoginStrategy {
        match which {
            AuthStrategy::BrowserAutomation => &self.browser,
            AuthStrategy::LegacyApiLogin => &self.legacy,
            AuthStrategy::WebFormLogin => &self.web_form,
        }
    }

    /// Produce a session
    ///
    /// # Errors
    ///
    /// `ConfigDisabled` when the config failed validation, otherwise `Exhausted`
    /// carrying operator remediation once the last strategy of the branch failed
    #[instrument(skip(self), fields(manual_patient_id = self.config.manual_patient_id().is_some()))]
    pub async fn authenticate(&self) -> Result<Session, AuthError> {
        if !self.config.is_enabled() {
            return Err(AuthError::ConfigDisabled);
        }

        let has_manual = self.config.manual_patient_id().is_some();
        let mut current = first_strategy(has_manual);

        loop {
            let login = self.strategy(current);
            info!(strategy = %login.strategy(), "Attempting Glooko sign-in");
            match login.produce_session(&self.config).await {
                Ok(session) => {
                    info!(strategy = %current, "Glooko sign-in succeeded");
                    return Ok(session);
                }
                Err(failure) => {
                    warn!(strategy = %current, error = %failure, "Glooko sign-in strategy failed");
                    match next_strategy(current, has_manual, &failure) {
                        Some(next) => current = next,
                        None => {
                            return Err(AuthError::Exhausted {
                                strategy: current,
                                remediation: remediation_for(current),
                                cause: failure.to_string(),
                            })
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_failure() -> AuthError {
        AuthError::stage(AuthStrategy::BrowserAutomation, "boom")
    }

    #[test]
    fn test_manual_identifier_never_plans_browser() {
        assert_eq!(plan(true), vec![AuthStrategy::WebFormLogin]);
        assert!(!plan(true).contains(&AuthStrategy::BrowserAutomation));
    }

    #[test]
    fn test_discovery_branch_plan() {
        assert_eq!(
            plan(false),
            vec![AuthStrategy::BrowserAutomation, AuthStrategy::LegacyApiLogin]
        );
    }

    #[test]
    fn test_browser_failure_advances_once() {
        let unavailable = AuthError::unavailable(AuthStrategy::BrowserAutomation, "none");
        for failure in [stage_failure(), unavailable] {
            assert_eq!(
                next_strategy(AuthStrategy::BrowserAutomation, false, &failure),
                Some(AuthStrategy::LegacyApiLogin)
            );
        }
        assert_eq!(
            next_strategy(AuthStrategy::LegacyApiLogin, false, &stage_failure()),
            None
        );
    }

    #[test]
    fn test_terminal_errors_stop_the_cascade() {
        assert_eq!(
            next_strategy(AuthStrategy::BrowserAutomation, false, &AuthError::ConfigDisabled),
            None
        );
    }

    #[test]
    fn test_remediation_per_branch() {
        assert_eq!(
            remediation_for(AuthStrategy::LegacyApiLogin),
            REMEDIATION_NO_PATIENT_ID
        );
        assert_eq!(remediation_for(AuthStrategy::WebFormLogin), REMEDIATION_WEB_FORM);
    }
}
