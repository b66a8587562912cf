// ABOUTME: Glooko bridge CLI - validate settings, sign in, or run one sync cycle
// ABOUTME: Reads settings from the environment with per-flag overrides and prints JSON results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Check that credentials are configured
//! glooko-bridge validate
//!
//! # Sign in and show which strategy succeeded
//! glooko-bridge login
//!
//! # Fetch everything since a checkpoint and print the normalized batch
//! glooko-bridge sync --since 2024-03-10T08:00:00Z
//! ```

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use glooko_bridge::auth::{launcher_from_config, plan};
use glooko_bridge::config::{
    fetch_options_from_env, input_settings_from_env, BrowserConfig, HttpClientConfig,
};
use glooko_bridge::http_client::initialize_http_clients;
use glooko_bridge::logging::LoggingConfig;
use glooko_bridge::{
    resolve, validate, AuthCascade, DriverAdapter, IncrementalFetcher, InputSettings, LastKnown,
    OneShotDriver, PassthroughTransformer,
};

#[derive(Parser)]
#[command(
    name = "glooko-bridge",
    about = "Glooko bridge CLI",
    long_about = "Authenticates against Glooko and pulls pump and CGM data once. \
Settings come from CONNECT_GLOOKO_* environment variables; flags override them."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Login email override
    #[arg(long, global = true)]
    email: Option<String>,

    /// Login password override
    #[arg(long, global = true)]
    password: Option<String>,

    /// Manual patient identifier override
    #[arg(long, global = true)]
    patient_id: Option<String>,

    /// Environment override (default, development, production, eu)
    #[arg(long, global = true)]
    env: Option<String>,

    /// API server override
    #[arg(long, global = true)]
    server: Option<String>,

    /// Timezone offset override, in hours
    #[arg(long, global = true, allow_hyphen_values = true)]
    timezone_offset: Option<String>,

    /// WebDriver endpoint override for browser sign-in
    #[arg(long, global = true)]
    webdriver_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Validate settings and print any problems
    Validate,

    /// Sign in and print the session summary
    Login,

    /// Run one fetch cycle and print the normalized batch
    Sync {
        /// Checkpoint: timestamp of the newest reading already stored (RFC 3339)
        #[arg(long)]
        since: Option<String>,
    },
}

impl Cli {
    fn input_settings(&self) -> InputSettings {
        let env = input_settings_from_env();
        InputSettings {
            email: self.email.clone().or(env.email),
            password: self.password.clone().or(env.password),
            patient_id: self.patient_id.clone().or(env.patient_id),
            env: self.env.clone().or(env.env),
            server: self.server.clone().or(env.server),
            timezone_offset_hours: self.timezone_offset.clone().or(env.timezone_offset_hours),
        }
    }

    fn browser_config(&self) -> BrowserConfig {
        BrowserConfig {
            webdriver_url: self
                .webdriver_url
                .clone()
                .or_else(|| BrowserConfig::from_env().webdriver_url),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LoggingConfig::from_env().verbose(cli.verbose).init()?;
    initialize_http_clients(HttpClientConfig::from_env());

    let validation = validate(&cli.input_settings());

    if matches!(cli.command, Command::Validate) {
        let has_manual = validation.config.manual_patient_id().is_some();
        let report = json!({
            "ok": validation.ok,
            "errors": validation.errors,
            "config": validation.config,
            "strategies": plan(has_manual),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !validation.ok {
            bail!("Glooko settings are incomplete");
        }
        return Ok(());
    }

    for issue in &validation.errors {
        tracing::error!(code = %issue.err, "{}", issue.desc);
    }

    let config = validation.config;
    let endpoints = resolve(&config);
    info!(api = %endpoints.api_base, web = %endpoints.web_base, "Resolved Glooko servers");

    let launcher = launcher_from_config(&cli.browser_config());
    let cascade = AuthCascade::new(config, endpoints.clone(), launcher);

    match cli.command {
        Command::Validate => Ok(()),
        Command::Login => {
            let session = cascade.authenticate().await?;
            let summary = json!({
                "strategy": session.strategy(),
                "patientId": session.patient_id(),
                "cookieCount": session.cookies().split("; ").count(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Sync { since } => {
            let last_known = match since {
                Some(raw) => LastKnown::at(
                    DateTime::parse_from_rfc3339(&raw)
                        .with_context(|| format!("invalid --since timestamp: {raw}"))?
                        .with_timezone(&Utc),
                ),
                None => LastKnown::default(),
            };

            let fetcher =
                IncrementalFetcher::new(endpoints).with_options(fetch_options_from_env());
            let mut driver = OneShotDriver::new();
            DriverAdapter::new(cascade, fetcher)
                .generate_driver(&mut driver, PassthroughTransformer);

            let batch = driver.run_once(&last_known).await?;
            println!("{}", serde_json::to_string_pretty(&batch)?);
            Ok(())
        }
    }
}
