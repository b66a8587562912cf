// ABOUTME: Resolves the configured environment to Glooko API and web base URLs
// ABOUTME: Pure lookup over the fixed server table with an explicit override taking precedence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::constants::servers::{api_host_for, DEFAULT_ENV, EU_ENV, SCHEME, WEB_HOST, WEB_HOST_EU};
use crate::settings::Config;

/// Base URLs for one configured environment, without trailing slash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoints {
    /// API base, e.g. `https://api.glooko.com`
    pub api_base: String,
    /// Web application base, e.g. `https://my.glooko.com`
    pub web_base: String,
}

impl ServerEndpoints {
    /// Endpoints rooted at explicit base URLs
    #[must_use]
    pub fn new(api_base: impl Into<String>, web_base: impl Into<String>) -> Self {
        Self {
            api_base: trim_base(api_base.into()),
            web_base: trim_base(web_base.into()),
        }
    }

    /// Absolute URL for a path on the API host
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// Absolute URL for a path on the web host
    #[must_use]
    pub fn web_url(&self, path: &str) -> String {
        format!("{}{path}", self.web_base)
    }
}

/// Resolve API and web bases for a config
///
/// A server override wins over the environment table. An override that already
/// carries a scheme is used verbatim, otherwise `https://` is prepended. Unknown
/// environment names fall back to the default entry.
#[must_use]
pub fn resolve(config: &Config) -> ServerEndpoints {
    let env = config.env.as_deref().unwrap_or(DEFAULT_ENV);

    let api_base = config.server.as_deref().map_or_else(
        || format!("{SCHEME}://{}", api_host_for(env)),
        |server| {
            if server.contains("://") {
                server.to_owned()
            } else {
                format!("{SCHEME}://{server}")
            }
        },
    );

    let web_host = if env == EU_ENV { WEB_HOST_EU } else { WEB_HOST };

    ServerEndpoints::new(api_base, format!("{SCHEME}://{web_host}"))
}

fn trim_base(mut base: String) -> String {
    while base.ends_with('/') {
        base.pop();
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{validate, InputSettings};

    fn config(env: Option<&str>, server: Option<&str>) -> Config {
        validate(&InputSettings {
            email: Some("user@example.com".into()),
            password: Some("pw".into()),
            env: env.map(Into::into),
            server: server.map(Into::into),
            ..InputSettings::default()
        })
        .config
    }

    #[test]
    fn test_known_environments() {
        let cases = [
            (None, "https://api.glooko.com", "https://my.glooko.com"),
            (Some("development"), "https://api.glooko.work", "https://my.glooko.com"),
            (Some("production"), "https://externalapi.glooko.com", "https://my.glooko.com"),
            (Some("eu"), "https://eu.api.glooko.com", "https://eu.my.glooko.com"),
        ];
        for (env, api, web) in cases {
            let endpoints = resolve(&config(env, None));
            assert_eq!(endpoints.api_base, api, "env {env:?}");
            assert_eq!(endpoints.web_base, web, "env {env:?}");
        }
    }

    #[test]
    fn test_unknown_environment_falls_back_to_default() {
        let endpoints = resolve(&config(Some("staging"), None));
        assert_eq!(endpoints.api_base, "https://api.glooko.com");
        assert_eq!(endpoints.web_base, "https://my.glooko.com");
    }

    #[test]
    fn test_server_override_wins() {
        let endpoints = resolve(&config(Some("eu"), Some("custom.example.com")));
        assert_eq!(endpoints.api_base, "https://custom.example.com");
        assert_eq!(endpoints.web_base, "https://eu.my.glooko.com");

        let verbatim = resolve(&config(None, Some("http://127.0.0.1:8080/")));
        assert_eq!(verbatim.api_base, "http://127.0.0.1:8080");
        assert_eq!(verbatim.api_url("/x"), "http://127.0.0.1:8080/x");
    }
}
