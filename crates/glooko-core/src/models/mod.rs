// ABOUTME: Domain models shared by authentication, fetching and the scheduler driver
// ABOUTME: Session, fetch window, normalized readings and the batch handed to the transformer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Normalized batch and reading types
pub mod batch;
/// Authenticated session and strategy identifiers
pub mod session;
/// Incremental fetch window
pub mod window;

pub use batch::{DeviceModel, NormalizedBatch, NormalizedReading};
pub use session::{AuthStrategy, Session};
pub use window::{FetchWindow, LastKnown};
