// ABOUTME: WebDriver implementation of the browser capability for headless Chrome sign-in
// ABOUTME: Connects to a chromedriver endpoint and quits the browser when the session is closed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use thirtyfour::prelude::*;
use tracing::debug;

use super::browser::{BrowserError, BrowserLauncher, BrowserSession};
use crate::constants::browser::USER_AGENT;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches headless Chrome sessions through a WebDriver endpoint
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    server_url: String,
}

impl WebDriverLauncher {
    /// Launcher for a chromedriver (or Selenium) endpoint, e.g. `http://localhost:9515`
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let launch_err = |e: WebDriverError| BrowserError::Launch(e.to_string());

        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--headless=new").map_err(launch_err)?;
        caps.add_arg("--no-sandbox").map_err(launch_err)?;
        caps.add_arg("--disable-setuid-sandbox").map_err(launch_err)?;
        caps.add_arg("--disable-dev-shm-usage").map_err(launch_err)?;
        caps.add_arg(&format!("--user-agent={USER_AGENT}"))
            .map_err(launch_err)?;

        let driver = WebDriver::new(&self.server_url, caps)
            .await
            .map_err(launch_err)?;
        debug!(server = %self.server_url, "WebDriver session started");

        Ok(Box::new(WebDriverSession {
            driver: Some(driver),
        }))
    }
}

/// A live WebDriver session; `None` once quit
pub struct WebDriverSession {
    driver: Option<WebDriver>,
}

impl WebDriverSession {
    fn driver(&self) -> Result<&WebDriver, BrowserError> {
        self.driver
            .as_ref()
            .ok_or_else(|| BrowserError::Protocol("browser session already closed".into()))
    }
}

fn nav_err(e: WebDriverError) -> BrowserError {
    BrowserError::Navigation(e.to_string())
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.driver()?.goto(url).await.map_err(nav_err)
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.driver()?
            .query(By::Css(selector.to_owned()))
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await
            .map(|_| ())
            .map_err(|_| BrowserError::ElementNotFound {
                selector: selector.to_owned(),
                waited_secs: timeout.as_secs(),
            })
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), BrowserError> {
        let element = self
            .driver()?
            .find(By::Css(selector.to_owned()))
            .await
            .map_err(nav_err)?;
        element.send_keys(text).await.map_err(nav_err)
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .driver()?
            .find(By::Css(selector.to_owned()))
            .await
            .map_err(nav_err)?;
        element.click().await.map_err(nav_err)
    }

    async fn wait_for_navigation(&self, from_url: &str, timeout: Duration) -> Result<(), BrowserError> {
        let started = Instant::now();
        loop {
            if self.current_url().await? != from_url {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(BrowserError::Timeout {
                    what: "post-login navigation",
                    secs: timeout.as_secs(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        self.driver()?
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(nav_err)
    }

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        let ret = self
            .driver()?
            .execute(script, Vec::new())
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(ret.json().clone())
    }

    async fn cookies(&self) -> Result<Vec<(String, String)>, BrowserError> {
        let cookies = self
            .driver()?
            .get_all_cookies()
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;
        Ok(cookies
            .into_iter()
            .map(|cookie| (cookie.name, cookie.value))
            .collect())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        match self.driver.take() {
            Some(driver) => driver
                .quit()
                .await
                .map_err(|e| BrowserError::Protocol(e.to_string())),
            None => Ok(()),
        }
    }
}
