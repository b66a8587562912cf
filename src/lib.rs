// ABOUTME: Main library entry point for the Glooko bridge
// ABOUTME: Authentication cascade, incremental data sync, and scheduler driver bindings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Glooko Bridge
//!
//! Unofficial client for the Glooko platform. It authenticates through an ordered
//! cascade of login strategies and incrementally pulls pump basals, pump boluses
//! and CGM readings into a [`NormalizedBatch`] for a downstream transformer.
//!
//! ## Pipeline
//!
//! ```text
//! servers::resolve -> AuthCascade -> SessionStore -> IncrementalFetcher -> BatchTransformer
//! ```
//!
//! The recurring scheduler is external; [`driver`] exposes the session and loop
//! contracts it consumes.

// Re-export glooko-core modules so callers can use `glooko_bridge::errors::*` etc.
pub use glooko_core::config as settings;
pub use glooko_core::constants;
pub use glooko_core::errors;
pub use glooko_core::models;

/// Authentication cascade and login strategies
pub mod auth;
/// Environment-driven configuration
pub mod config;
/// Scheduler contracts and one-shot driver
pub mod driver;
/// Incremental fetch window, URL building and CGM merge
pub mod fetcher;
/// Shared HTTP clients and browser-like headers
pub mod http_client;
/// Structured logging setup
pub mod logging;
/// Environment to hostname resolution
pub mod servers;
/// Holder for the active session
pub mod session;

pub use auth::{AuthCascade, BrowserLauncher, BrowserSession};
pub use driver::{
    BatchTransformer, DriverAdapter, DriverBuilder, LoopContract, OneShotDriver,
    PassthroughTransformer, SessionContract,
};
pub use fetcher::{FetchOptions, IncrementalFetcher};
pub use glooko_core::{
    validate, AuthError, AuthStrategy, BridgeError, Config, FetchError, FetchWindow,
    InputSettings, LastKnown, NormalizedBatch, NormalizedReading, Session,
};
pub use servers::{resolve, ServerEndpoints};
pub use session::SessionStore;
