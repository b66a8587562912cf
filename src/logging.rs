// ABOUTME: Logging configuration and structured logging setup for the Glooko bridge
// ABOUTME: Configures log levels, output format, and noise reduction for HTTP client crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging built on `tracing-subscriber`

use anyhow::Result;
use serde_json::json;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const SERVICE_NAME: &str = "glooko-bridge";

/// Logging configuration
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Emit span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` lines for log shippers
    Json,
    /// Multi-line human readable output
    Pretty,
    /// Single-line output
    Compact,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("json") => Self::Json,
            Some("compact") => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: SERVICE_NAME.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    ///
    /// Reads `RUST_LOG`, `LOG_FORMAT`, `LOG_INCLUDE_LOCATION`, `LOG_INCLUDE_THREAD`
    /// and `LOG_INCLUDE_SPANS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: LogFormat::from_env_value(env::var("LOG_FORMAT").ok().as_deref()),
            include_location: env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: env::var("LOG_INCLUDE_THREAD").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            ..Self::default()
        }
    }

    /// Raise the level to `debug` unless `RUST_LOG` already chose one
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        if verbose && env::var("RUST_LOG").is_err() {
            self.level = "debug".into();
        }
        self
    }

    /// Build the filter: the configured level plus quieter HTTP internals
    fn env_filter(&self) -> EnvFilter {
        let base = env::var("RUST_LOG").unwrap_or_else(|_| self.level.clone());
        EnvFilter::new(base)
            .add_directive(
                "hyper=warn"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            )
            .add_directive(
                "reqwest=warn"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            )
            .add_directive(
                "thirtyfour=warn"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            )
            .add_directive(
                format!("glooko_bridge={}", self.level)
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::INFO.into()),
            )
            .add_directive(
                format!("glooko_core={}", self.level)
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::INFO.into()),
            )
    }

    /// Initialize the global tracing subscriber
    ///
    /// Logs go to stderr so that command output on stdout stays machine readable.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .with_span_events(span_events)
                    .json();

                registry.with(json_layer).try_init()?;
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .with_span_events(span_events);

                registry.with(pretty_layer).try_init()?;
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stderr)
                    .with_span_events(FmtSpan::NONE);

                registry.with(compact_layer).try_init()?;
            }
        }

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            log.level = %self.level,
            log.format = ?self.format,
            "Glooko bridge starting up"
        );

        let config_summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "features": {
                    "location": self.include_location,
                    "thread": self.include_thread,
                    "spans": self.include_spans
                }
            }
        });

        tracing::debug!("Logging configured: {}", config_summary);
    }
}
