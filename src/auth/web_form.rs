// ABOUTME: Web form login used when the patient identifier is configured manually
// ABOUTME: Fetches the sign-in form, extracts its CSRF token, and replays the browser form POST
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument};

use super::LoginStrategy;
use crate::constants::endpoints;
use crate::http_client::{form_login_headers, form_page_headers, join_cookies, set_cookie_pairs};
use crate::servers::ServerEndpoints;
use crate::settings::Config;
use crate::{AuthError, AuthStrategy, Session};

static CSRF_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"name="authenticity_token" value="([^"]+)""#).ok());

/// Extract the Rails authenticity token from the sign-in form HTML
#[must_use]
pub fn extract_csrf_token(html: &str) -> Option<String> {
    CSRF_TOKEN
        .as_ref()?
        .captures(html)?
        .get(1)
        .map(|m| m.as_str().to_owned())
}

/// Form login against the web host, pairing fresh cookies with the manual identifier
pub struct WebFormLogin {
    client: Client,
    endpoints: ServerEndpoints,
}

impl WebFormLogin {
    /// Create the strategy with a non-redirecting client
    #[must_use]
    pub const fn new(client: Client, endpoints: ServerEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl LoginStrategy for WebFormLogin {
    fn strategy(&self) -> AuthStrategy {
        AuthStrategy::WebFormLogin
    }

    #[instrument(skip(self, config), fields(strategy = "web_form_login"))]
    async fn produce_session(&self, config: &Config) -> Result<Session, AuthError> {
        let fail = |reason: String| AuthError::stage(AuthStrategy::WebFormLogin, reason);

        let patient_id = config
            .manual_patient_id()
            .ok_or_else(|| fail("no manual patient identifier configured".into()))?;

        let form = self
            .client
            .get(self.endpoints.web_url(endpoints::LOGIN_FORM))
            .headers(form_page_headers())
            .send()
            .await
            .map_err(|e| fail(format!("login form request failed: {e}")))?;

        if !(form.status().is_success() || form.status().is_redirection()) {
            return Err(fail(format!("login form returned HTTP {}", form.status())));
        }

        let form_cookies = join_cookies(&set_cookie_pairs(form.headers()));
        let html = form
            .text()
            .await
            .map_err(|e| fail(format!("unreadable login form: {e}")))?;
        let token = extract_csrf_token(&html)
            .ok_or_else(|| fail("could not extract CSRF token from login form".into()))?;
        debug!("Extracted CSRF token from login form");

        let login_headers = form_login_headers(&self.endpoints.web_base, &form_cookies)
            .map_err(|e| fail(format!("invalid login headers: {e}")))?;

        let fields = [
            ("authenticity_token", token.as_str()),
            ("redirect_to", ""),
            ("language", "en"),
            ("user[email]", config.email.as_str()),
            ("user[password]", config.password.as_str()),
            ("commit", "Sign In"),
        ];

        let response = self
            .client
            .post(self.endpoints.web_url(endpoints::LOGIN))
            .headers(login_headers)
            .form(&fields)
            .send()
            .await
            .map_err(|e| fail(format!("login request failed: {e}")))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Web form login response");
        if !(status.is_success() || status.is_redirection()) {
            return Err(fail(format!("login rejected with HTTP {status}")));
        }

        let cookies = set_cookie_pairs(response.headers());
        if cookies.is_empty() {
            return Err(fail("no session cookies received after login".into()));
        }

        Session::new(join_cookies(&cookies), patient_id, AuthStrategy::WebFormLogin)
    }
}
