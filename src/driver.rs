// ABOUTME: Binds the auth cascade and incremental fetcher to an external scheduler
// ABOUTME: Session and loop contracts, the transformer seam, and a one-shot driver for the CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Driver adapter
//!
//! The recurring scheduler lives outside this crate. It consumes two
//! contracts: a [`SessionContract`] (how to sign in and how long a session
//! lives) and a [`LoopContract`] (how to fetch, how to transform, and the
//! declarative retry settings). [`DriverAdapter::generate_driver`] registers
//! both with any [`DriverBuilder`]. Backoff and retry values are configuration
//! for the scheduler; nothing here retries.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::auth::AuthCascade;
use crate::constants::{schedule, session};
use crate::fetcher::IncrementalFetcher;
use crate::session::SessionStore;
use crate::{AuthError, BridgeError, FetchError, LastKnown, NormalizedBatch, Session};

/// When the scheduler should re-authenticate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDelays {
    /// Refresh the session after this long
    pub refresh_after: Duration,
    /// Treat the session as expired after this long
    pub expire: Duration,
}

impl Default for SessionDelays {
    fn default() -> Self {
        Self {
            refresh_after: Duration::from_millis(session::REFRESH_AFTER_MS),
            expire: Duration::from_millis(session::EXPIRE_MS),
        }
    }
}

/// How the scheduler obtains and refreshes sessions
#[derive(Clone)]
pub struct SessionContract {
    cascade: Arc<AuthCascade>,
    /// Refresh and expiry delays
    pub delays: SessionDelays,
}

impl SessionContract {
    /// Contract backed by an authentication cascade with default delays
    #[must_use]
    pub fn new(cascade: Arc<AuthCascade>) -> Self {
        Self {
            cascade,
            delays: SessionDelays::default(),
        }
    }

    /// Run the authentication cascade
    ///
    /// # Errors
    ///
    /// Propagates the cascade's terminal error
    pub async fn authenticate(&self) -> Result<Session, AuthError> {
        self.cascade.authenticate().await
    }

    /// Identity: a fresh session needs no further authorization step
    #[must_use]
    pub fn authorize(&self, session: Session) -> Session {
        session
    }
}

/// Retry spacing handed to the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Base interval of the scheduler's exponential backoff
    pub interval: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(schedule::BACKOFF_INTERVAL_MS),
        }
    }
}

/// Converts a normalized batch into whatever the downstream system stores
pub trait BatchTransformer: Send + Sync {
    /// Downstream batch type
    type Output: Send;

    /// Transform one batch; `timezone_offset_ms` is the configured offset
    fn transform(&self, batch: NormalizedBatch, timezone_offset_ms: i64) -> Self::Output;
}

/// Hands the normalized batch back unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTransformer;

impl BatchTransformer for PassthroughTransformer {
    type Output = NormalizedBatch;

    fn transform(&self, batch: NormalizedBatch, _timezone_offset_ms: i64) -> NormalizedBatch {
        batch
    }
}

/// One recurring fetch-and-transform loop
pub struct LoopContract<T: BatchTransformer> {
    /// Loop name shown by the scheduler
    pub name: &'static str,
    fetcher: IncrementalFetcher,
    transformer: T,
    timezone_offset_ms: i64,
    /// Retry spacing
    pub backoff: Backoff,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// How often new data is expected
    pub expected_data_interval: Duration,
}

impl<T: BatchTransformer> LoopContract<T> {
    /// Contract with the Glooko loop defaults
    #[must_use]
    pub fn new(fetcher: IncrementalFetcher, transformer: T, timezone_offset_ms: i64) -> Self {
        Self {
            name: schedule::LOOP_NAME,
            fetcher,
            transformer,
            timezone_offset_ms,
            backoff: Backoff::default(),
            max_retries: schedule::MAX_RETRIES,
            expected_data_interval: Duration::from_millis(schedule::EXPECTED_DATA_INTERVAL_MS),
        }
    }

    /// Total attempts per cycle the scheduler should make
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Fetch one batch
    ///
    /// # Errors
    ///
    /// Propagates any endpoint failure
    pub async fn fetch(
        &self,
        session: &Session,
        last_known: &LastKnown,
    ) -> Result<NormalizedBatch, FetchError> {
        self.fetcher.fetch(session, last_known).await
    }

    /// Transform one batch for the downstream system
    pub fn transform(&self, batch: NormalizedBatch) -> T::Output {
        self.transformer.transform(batch, self.timezone_offset_ms)
    }
}

/// Registration surface of an external scheduler
pub trait DriverBuilder {
    /// Transformer the builder's loops use
    type Transformer: BatchTransformer;

    /// Register how sessions are produced
    fn support_session(&mut self, contract: SessionContract) -> &mut Self;

    /// Register a fetch loop
    fn register_loop(&mut self, contract: LoopContract<Self::Transformer>) -> &mut Self;
}

/// Wires a cascade and fetcher into a scheduler
pub struct DriverAdapter {
    cascade: Arc<AuthCascade>,
    fetcher: IncrementalFetcher,
}

impl DriverAdapter {
    /// Adapter over a cascade and a fetcher
    #[must_use]
    pub fn new(cascade: AuthCascade, fetcher: IncrementalFetcher) -> Self {
        Self {
            cascade: Arc::new(cascade),
            fetcher,
        }
    }

    /// Register the session and loop contracts with `builder`
    pub fn generate_driver<B: DriverBuilder>(
        self,
        builder: &mut B,
        transformer: B::Transformer,
    ) -> &mut B {
        let timezone_offset_ms = self.cascade.config().timezone_offset_ms;
        let session = SessionContract::new(Arc::clone(&self.cascade));
        let fetch_loop = LoopContract::new(self.fetcher, transformer, timezone_offset_ms);
        debug!(loop_name = fetch_loop.name, "Registering Glooko driver");
        builder.support_session(session).register_loop(fetch_loop)
    }
}

/// Builder that runs authenticate, fetch, transform cycles on demand
///
/// A session is reused by later cycles until its refresh delay has passed. A
/// failed fetch drops it, so the next cycle signs in again.
pub struct OneShotDriver<T: BatchTransformer> {
    session: Option<SessionContract>,
    fetch_loop: Option<LoopContract<T>>,
    store: SessionStore,
}

impl<T: BatchTransformer> Default for OneShotDriver<T> {
    fn default() -> Self {
        Self {
            session: None,
            fetch_loop: None,
            store: SessionStore::new(),
        }
    }
}

impl<T: BatchTransformer> OneShotDriver<T> {
    /// Empty driver; register contracts through [`DriverBuilder`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered loop, if any
    #[must_use]
    pub const fn fetch_loop(&self) -> Option<&LoopContract<T>> {
        self.fetch_loop.as_ref()
    }

    /// Registered session contract, if any
    #[must_use]
    pub const fn session_contract(&self) -> Option<&SessionContract> {
        self.session.as_ref()
    }

    /// Sign in and return the session, reusing a stored one younger than the refresh delay
    ///
    /// # Errors
    ///
    /// `Incomplete` without a session contract, otherwise the cascade's error
    pub async fn session(&self) -> Result<Session, BridgeError> {
        let contract = self.session.as_ref().ok_or(BridgeError::Incomplete("session"))?;
        if let Some(session) = self.store.get_fresh(contract.delays.refresh_after).await {
            return Ok(session);
        }
        let session = contract.authorize(contract.authenticate().await?);
        self.store.replace(session.clone()).await;
        Ok(session)
    }

    /// Run one cycle
    ///
    /// # Errors
    ///
    /// `Incomplete` when a contract is missing, otherwise the first auth or fetch error
    pub async fn run_once(&self, last_known: &LastKnown) -> Result<T::Output, BridgeError> {
        let fetch_loop = self.fetch_loop.as_ref().ok_or(BridgeError::Incomplete("loop"))?;
        let session = self.session().await?;
        let batch = match fetch_loop.fetch(&session, last_known).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(endpoint = e.endpoint(), error = %e, "Fetch failed, dropping stored session");
                self.store.clear().await;
                return Err(e.into());
            }
        };
        info!(loop_name = fetch_loop.name, readings = batch.readings.len(), "Cycle complete");
        Ok(fetch_loop.transform(batch))
    }
}

impl<T: BatchTransformer> DriverBuilder for OneShotDriver<T> {
    type Transformer = T;

    fn support_session(&mut self, contract: SessionContract) -> &mut Self {
        self.session = Some(contract);
        self
    }

    fn register_loop(&mut self, contract: LoopContract<T>) -> &mut Self {
        self.fetch_loop = Some(contract);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_delays() {
        let delays = SessionDelays::default();
        assert_eq!(delays.expire, Duration::from_secs(24 * 60 * 60));
        assert_eq!(delays.expire - delays.refresh_after, Duration::from_secs(600));
    }

    #[test]
    fn test_backoff_default() {
        assert_eq!(Backoff::default().interval, Duration::from_millis(150_000));
    }

    #[test]
    fn test_passthrough_transformer() {
        let batch = NormalizedBatch::default();
        assert_eq!(PassthroughTransformer.transform(batch.clone(), -10_800_000), batch);
    }
}
