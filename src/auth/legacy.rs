// ABOUTME: Legacy JSON API login for accounts without a configured patient identifier
// ABOUTME: Posts credentials with a mobile device descriptor and reads the glooko code from the reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::LoginStrategy;
use crate::constants::{endpoints, headers};
use crate::http_client::set_cookie_pairs;
use crate::servers::ServerEndpoints;
use crate::settings::Config;
use crate::{AuthError, AuthStrategy, Session};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload<'a> {
    user_login: Credentials<'a>,
    device_information: DeviceInformation,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceInformation {
    device_model: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    user_login: Option<UserLogin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserLogin {
    glooko_code: Option<String>,
}

/// JSON login against the API host
pub struct LegacyLogin {
    client: Client,
    endpoints: ServerEndpoints,
}

impl LegacyLogin {
    /// Create the strategy with a non-redirecting client
    #[must_use]
    pub const fn new(client: Client, endpoints: ServerEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl LoginStrategy for LegacyLogin {
    fn strategy(&self) -> AuthStrategy {
        AuthStrategy::LegacyApiLogin
    }

    #[instrument(skip(self, config), fields(strategy = "legacy_api_login"))]
    async fn produce_session(&self, config: &Config) -> Result<Session, AuthError> {
        let fail = |reason: String| AuthError::stage(AuthStrategy::LegacyApiLogin, reason);

        let payload = LoginPayload {
            user_login: Credentials {
                email: &config.email,
                password: &config.password,
            },
            device_information: DeviceInformation {
                device_model: "iPhone",
            },
        };

        let response = self
            .client
            .post(self.endpoints.api_url(endpoints::API_LOGIN))
            .header(USER_AGENT, headers::USER_AGENT)
            .header(ACCEPT, headers::ACCEPT_JSON)
            .json(&payload)
            .send()
            .await
            .map_err(|e| fail(format!("login request failed: {e}")))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Legacy login response");
        if !(status.is_success() || status.is_redirection()) {
            return Err(fail(format!("login rejected with HTTP {status}")));
        }

        // The session cookie is the first one the server sets
        let cookie = set_cookie_pairs(response.headers())
            .into_iter()
            .next()
            .ok_or_else(|| fail("no session cookie in login response".into()))?;

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| fail(format!("unreadable login response: {e}")))?;

        let patient_id = body
            .user_login
            .and_then(|login| login.glooko_code)
            .ok_or_else(|| fail("login response carries no glooko code".into()))?;

        Session::new(cookie, patient_id, AuthStrategy::LegacyApiLogin)
    }
}
