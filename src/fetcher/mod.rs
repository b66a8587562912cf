// ABOUTME: Incremental fetch of pump basals, pump boluses and CGM readings for one session
// ABOUTME: Runs the three endpoint requests concurrently and merges them into a NormalizedBatch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Incremental fetcher
//!
//! Each cycle computes a [`FetchWindow`] from the scheduler's checkpoint, issues
//! the three endpoint requests at once and merges the graph series. A failure
//! of any request fails the whole fetch; retries belong to the scheduler.

/// CGM graph decoding and merge
pub mod merge;
/// Endpoint URL construction
pub mod urls;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::constants::{endpoints, fetch};
use crate::http_client::{api_headers, shared_client};
use crate::servers::ServerEndpoints;
use crate::{FetchError, FetchWindow, LastKnown, NormalizedBatch, Session};

use merge::{merge_cgm_series, BasalsPage, BolusesPage, GraphResponse};
use urls::{request_url, Endpoint};

/// Provider workarounds, kept overridable
///
/// Neither value has a documented rationale upstream; both should be revalidated
/// against live data before relying on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Subtracted from every graph timestamp (the provider labels a fixed local offset as UTC)
    pub timestamp_correction: Duration,
    /// `lastGuid` pagination value sent to the paginated endpoints
    pub last_guid: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timestamp_correction: Duration::hours(fetch::TIMESTAMP_CORRECTION_HOURS),
            last_guid: endpoints::LAST_GUID.to_owned(),
        }
    }
}

/// Pulls one normalized batch per call
#[derive(Debug, Clone)]
pub struct IncrementalFetcher {
    client: Client,
    endpoints: ServerEndpoints,
    options: FetchOptions,
}

impl IncrementalFetcher {
    /// Fetcher on the shared HTTP client with default options
    #[must_use]
    pub fn new(endpoints: ServerEndpoints) -> Self {
        Self::with_client(shared_client().clone(), endpoints)
    }

    /// Fetcher on a caller-provided client
    #[must_use]
    pub fn with_client(client: Client, endpoints: ServerEndpoints) -> Self {
        Self {
            client,
            endpoints,
            options: FetchOptions::default(),
        }
    }

    /// Replace the provider workaround values
    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch everything newer than `last_known`, as of now
    ///
    /// # Errors
    ///
    /// Returns the first failing endpoint's error, in endpoint order
    pub async fn fetch(
        &self,
        session: &Session,
        last_known: &LastKnown,
    ) -> Result<NormalizedBatch, FetchError> {
        self.fetch_at(session, last_known, Utc::now()).await
    }

    /// Fetch with an explicit cycle time
    ///
    /// # Errors
    ///
    /// Returns the first failing endpoint's error, in endpoint order
    #[instrument(skip(self, session, last_known), fields(strategy = %session.strategy()))]
    pub async fn fetch_at(
        &self,
        session: &Session,
        last_known: &LastKnown,
        now: DateTime<Utc>,
    ) -> Result<NormalizedBatch, FetchError> {
        let window = FetchWindow::compute(now, last_known);
        debug!(
            since = %window.since,
            until = %window.until,
            max_count = window.max_count,
            "Computed Glooko fetch window"
        );

        // Independent requests: all three run to completion before errors are checked
        let (basals, boluses, graph) = tokio::join!(
            self.get_json::<BasalsPage>(Endpoint::ScheduledBasals, session, &window),
            self.get_json::<BolusesPage>(Endpoint::NormalBoluses, session, &window),
            self.get_json::<GraphResponse>(Endpoint::CgmGraph, session, &window),
        );
        let (basals, boluses, graph) = (basals?, boluses?, graph?);

        let readings = graph
            .series
            .map(|series| merge_cgm_series(&series, self.options.timestamp_correction))
            .unwrap_or_default();

        let batch = NormalizedBatch {
            scheduled_basals: basals.scheduled_basals.unwrap_or_default(),
            normal_boluses: boluses.normal_boluses.unwrap_or_default(),
            readings,
        };

        info!(
            basals = batch.scheduled_basals.len(),
            boluses = batch.normal_boluses.len(),
            readings = batch.readings.len(),
            "Fetched Glooko batch"
        );
        Ok(batch)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        session: &Session,
        window: &FetchWindow,
    ) -> Result<T, FetchError> {
        let name = endpoint.name();
        let url = request_url(
            &self.endpoints.api_base,
            endpoint,
            session.patient_id(),
            window,
            &self.options.last_guid,
        );
        let headers =
            api_headers(&self.endpoints.web_base, session.cookies()).map_err(|e| {
                FetchError::Request {
                    endpoint: name,
                    reason: format!("invalid request headers: {e}"),
                }
            })?;

        debug!(endpoint = name, "Requesting Glooko endpoint");
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                endpoint: name,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: name,
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| FetchError::Decode {
            endpoint: name,
            reason: e.to_string(),
        })
    }
}
