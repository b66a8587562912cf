// ABOUTME: Core types and constants for the Glooko bridge
// ABOUTME: Foundation crate with error handling, domain models, provider constants, and config validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Glooko Core
//!
//! Foundation crate providing shared types and constants for the Glooko bridge.
//! This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: `ErrorCode` plus the auth, fetch and bridge error enums
//! - **constants**: server table, endpoint paths, timing and scheduler values
//! - **models**: `Session`, `FetchWindow`, `NormalizedReading`, `NormalizedBatch`
//! - **config**: raw input settings and their validation into a `Config`

/// Error codes and domain error types
pub mod errors;

/// Provider constants organized by domain
pub mod constants;

/// Domain models shared between authentication, fetching and the driver
pub mod models;

/// Input settings and validation
pub mod config;

pub use config::{validate, Config, ConfigKind, InputSettings, Validation, ValidationIssue};
pub use errors::{AuthError, BridgeError, ErrorCode, FetchError};
pub use models::{
    AuthStrategy, DeviceModel, FetchWindow, LastKnown, NormalizedBatch, NormalizedReading,
    Session,
};
