// ABOUTME: Shared test utilities for Glooko bridge integration tests
// ABOUTME: Config builders, mock-server endpoints, and a scripted fake browser that counts launches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
//! Shared test utilities for `glooko_bridge`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use glooko_bridge::auth::{BrowserError, BrowserLauncher, BrowserSession};
use glooko_bridge::config::HttpClientConfig;
use glooko_bridge::http_client::create_login_client;
use glooko_bridge::{validate, AuthCascade, Config, InputSettings, ServerEndpoints};
use reqwest::Client;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const EMAIL: &str = "patient@example.com";
pub const PASSWORD: &str = "correct horse";
pub const PATIENT_ID: &str = "us-east-1-happy-otter-1234";

/// Valid config, optionally with a manual patient identifier
pub fn config(manual_patient_id: Option<&str>) -> Config {
    let validation = validate(&InputSettings {
        email: Some(EMAIL.into()),
        password: Some(PASSWORD.into()),
        patient_id: manual_patient_id.map(Into::into),
        ..InputSettings::default()
    });
    assert!(validation.ok);
    validation.config
}

/// Both API and web bases pointed at the mock server
pub fn endpoints(server: &MockServer) -> ServerEndpoints {
    ServerEndpoints::new(server.uri(), server.uri())
}

pub fn login_client() -> Client {
    create_login_client(HttpClientConfig::default())
}

pub fn cascade(
    server: &MockServer,
    manual_patient_id: Option<&str>,
    launcher: Option<Arc<dyn BrowserLauncher>>,
) -> AuthCascade {
    AuthCascade::with_client(
        config(manual_patient_id),
        endpoints(server),
        launcher,
        login_client(),
    )
}

/// How the scripted post-login navigation behaves
#[derive(Debug, Clone)]
pub enum Navigation {
    /// Lands on the given URL
    LandsOn(String),
    /// The wait elapses, the page ends up on the given URL anyway
    TimesOut(String),
    /// The driver reports an error while waiting
    Fails,
}

/// Scripted behavior of the fake browser
#[derive(Debug, Clone)]
pub struct BrowserScript {
    pub fail_launch: bool,
    pub has_email_input: bool,
    pub navigation: Navigation,
    pub page_state: Value,
    pub cookies: Vec<(String, String)>,
}

impl Default for BrowserScript {
    fn default() -> Self {
        Self {
            fail_launch: false,
            has_email_input: true,
            navigation: Navigation::LandsOn("https://my.glooko.com/dashboard".into()),
            page_state: json!({
                "variables": [PATIENT_ID, null, null, null],
                "scripts": []
            }),
            cookies: vec![
                ("_logbook_session".into(), "browser-session".into()),
                ("remember_user_token".into(), "xyz".into()),
            ],
        }
    }
}

/// Call counters shared between the launcher and its sessions
#[derive(Debug, Default)]
pub struct BrowserCounters {
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub typed: Mutex<Vec<(String, String)>>,
}

impl BrowserCounters {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub struct FakeLauncher {
    pub script: BrowserScript,
    pub counters: Arc<BrowserCounters>,
}

impl FakeLauncher {
    pub fn new(script: BrowserScript) -> (Arc<dyn BrowserLauncher>, Arc<BrowserCounters>) {
        let counters = Arc::new(BrowserCounters::default());
        let launcher = Arc::new(Self {
            script,
            counters: Arc::clone(&counters),
        });
        (launcher, counters)
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_launch {
            return Err(BrowserError::Launch("chrome not found".into()));
        }
        Ok(Box::new(FakeSession {
            script: self.script.clone(),
            counters: Arc::clone(&self.counters),
            url: Mutex::new("about:blank".into()),
        }))
    }
}

struct FakeSession {
    script: BrowserScript,
    counters: Arc<BrowserCounters>,
    url: Mutex<String>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        *self.url.lock().unwrap() = url.to_owned();
        Ok(())
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        if self.script.has_email_input {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound {
                selector: selector.to_owned(),
                waited_secs: timeout.as_secs(),
            })
        }
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), BrowserError> {
        self.counters
            .typed
            .lock()
            .unwrap()
            .push((selector.to_owned(), text.to_owned()));
        Ok(())
    }

    async fn click(&self, _selector: &str) -> Result<(), BrowserError> {
        if let Navigation::LandsOn(target) | Navigation::TimesOut(target) = &self.script.navigation {
            *self.url.lock().unwrap() = target.clone();
        }
        Ok(())
    }

    async fn wait_for_navigation(&self, _from_url: &str, timeout: Duration) -> Result<(), BrowserError> {
        match self.script.navigation {
            Navigation::LandsOn(_) => Ok(()),
            Navigation::TimesOut(_) => Err(BrowserError::Timeout {
                what: "post-login navigation",
                secs: timeout.as_secs(),
            }),
            Navigation::Fails => Err(BrowserError::Navigation("target closed".into())),
        }
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn evaluate(&self, _script: &str) -> Result<Value, BrowserError> {
        Ok(self.script.page_state.clone())
    }

    async fn cookies(&self) -> Result<Vec<(String, String)>, BrowserError> {
        Ok(self.script.cookies.clone())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Graph payload with one point per bucket
pub fn graph_body() -> Value {
    json!({
        "series": {
            "cgmHigh": [{ "timestamp": "2024-01-01T12:10:00.000Z", "y": 250 }],
            "cgmNormal": [{ "timestamp": "2024-01-01T12:00:00.000Z", "y": 120 }],
            "cgmLow": [{ "timestamp": "2024-01-01T11:50:00.000Z", "y": 65 }],
            "bgHigh": [{ "timestamp": "2024-01-01T12:00:00.000Z", "y": 300 }]
        }
    })
}
