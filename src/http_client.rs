// ABOUTME: Shared HTTP clients and browser-like header sets for Glooko requests
// ABOUTME: Pooled fetch client, non-redirecting login client, and Set-Cookie normalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, ACCEPT, ACCEPT_LANGUAGE,
    CACHE_CONTROL, CONTENT_TYPE, COOKIE, ORIGIN, REFERER, SET_COOKIE, USER_AGENT,
};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};

use crate::config::HttpClientConfig;
use crate::constants::{endpoints, headers};

/// Timeout configuration captured once at startup
static CLIENT_CONFIG: OnceLock<HttpClientConfig> = OnceLock::new();

/// Shared client for data fetches
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Shared client for sign-in requests
static LOGIN_CLIENT: OnceLock<Client> = OnceLock::new();

/// Record the timeout configuration used by the shared clients
///
/// Must run before the first call to [`shared_client`] or [`login_client`] to take
/// effect; later calls are ignored.
pub fn initialize_http_clients(config: HttpClientConfig) {
    if CLIENT_CONFIG.set(config).is_err() {
        tracing::debug!("HTTP client configuration already initialized");
    }
}

fn client_config() -> HttpClientConfig {
    CLIENT_CONFIG.get().copied().unwrap_or_default()
}

fn build_client(config: HttpClientConfig, redirect: Policy) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(redirect)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}

/// Pooled client for the data endpoints
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| build_client(client_config(), Policy::default()))
}

/// Pooled client for sign-in requests
///
/// Redirects are not followed so the sign-in response's `Set-Cookie` headers
/// are observed directly.
pub fn login_client() -> &'static Client {
    LOGIN_CLIENT.get_or_init(|| create_login_client(client_config()))
}

/// Non-redirecting client with explicit timeouts, for callers that bring their own settings
#[must_use]
pub fn create_login_client(config: HttpClientConfig) -> Client {
    build_client(config, Policy::none())
}

/// Header set sent with every data request
///
/// # Errors
///
/// Returns an error if the cookie string or web base contain bytes not allowed
/// in a header value
pub fn api_headers(web_base: &str, cookies: &str) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut map = HeaderMap::new();
    map.insert(USER_AGENT, HeaderValue::from_static(headers::USER_AGENT));
    map.insert(ACCEPT, HeaderValue::from_static(headers::ACCEPT_JSON));
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    map.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(headers::ACCEPT_LANGUAGE));
    map.insert(REFERER, HeaderValue::from_str(&format!("{web_base}/"))?);
    map.insert(ORIGIN, HeaderValue::from_str(web_base)?);
    map.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    map.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    map.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-site"),
    );
    map.insert(COOKIE, HeaderValue::from_str(cookies)?);
    Ok(map)
}

/// Header set for the sign-in form GET
pub fn form_page_headers() -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(USER_AGENT, HeaderValue::from_static(headers::USER_AGENT));
    map.insert(ACCEPT, HeaderValue::from_static(headers::ACCEPT_HTML));
    map.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(headers::ACCEPT_LANGUAGE_FORM),
    );
    map
}

/// Header set for the sign-in form POST
///
/// # Errors
///
/// Returns an error if the captured cookies or web base are not valid header values
pub fn form_login_headers(
    web_base: &str,
    form_cookies: &str,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut map = form_page_headers();
    map.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    map.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    map.insert(ORIGIN, HeaderValue::from_str(web_base)?);
    map.insert(
        REFERER,
        HeaderValue::from_str(&format!("{web_base}{}", endpoints::LOGIN_FORM))?,
    );
    if !form_cookies.is_empty() {
        map.insert(COOKIE, HeaderValue::from_str(form_cookies)?);
    }
    Ok(map)
}

/// The `name=value` part of every `Set-Cookie` header, in response order
///
/// Attributes such as `Path` or `HttpOnly` are dropped and blank entries skipped.
#[must_use]
pub fn set_cookie_pairs(response_headers: &HeaderMap) -> Vec<String> {
    response_headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Join cookie pairs into one `Cookie` header value
#[must_use]
pub fn join_cookies(pairs: &[String]) -> String {
    pairs.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_cookie_pairs_strip_attributes() {
        let mut map = HeaderMap::new();
        map.append(
            SET_COOKIE,
            HeaderValue::from_static("_logbook_session=abc123; path=/; HttpOnly"),
        );
        map.append(SET_COOKIE, HeaderValue::from_static("remember=1"));
        map.append(SET_COOKIE, HeaderValue::from_static(" ; path=/"));

        let pairs = set_cookie_pairs(&map);
        assert_eq!(pairs, vec!["_logbook_session=abc123", "remember=1"]);
        assert_eq!(join_cookies(&pairs), "_logbook_session=abc123; remember=1");
    }

    #[test]
    fn test_api_headers_carry_origin_and_cookie() {
        let map = api_headers("https://my.glooko.com", "a=1; b=2").unwrap();
        assert_eq!(map[ORIGIN], "https://my.glooko.com");
        assert_eq!(map[REFERER], "https://my.glooko.com/");
        assert_eq!(map[COOKIE], "a=1; b=2");
        assert_eq!(map["sec-fetch-mode"], "cors");
    }

    #[test]
    fn test_invalid_cookie_is_rejected() {
        assert!(api_headers("https://my.glooko.com", "bad\ncookie").is_err());
    }

    #[test]
    fn test_form_headers_omit_empty_cookie() {
        let map = form_login_headers("https://my.glooko.com", "").unwrap();
        assert!(map.get(COOKIE).is_none());
        assert_eq!(
            map[REFERER],
            "https://my.glooko.com/users/sign_in?locale=en"
        );
    }
}
