// ABOUTME: Request URL construction for the three Glooko data endpoints
// ABOUTME: Substitutes graph placeholders in place and appends window and pagination parameters otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use urlencoding::encode;

use crate::constants::endpoints;
use crate::models::batch::to_iso_millis;
use crate::FetchWindow;

/// Data endpoints fetched each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Pump basal schedule (paginated)
    ScheduledBasals,
    /// Pump bolus events (paginated)
    NormalBoluses,
    /// CGM graph series (window in URL, not paginated)
    CgmGraph,
}

impl Endpoint {
    /// Short name used in logs and errors
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ScheduledBasals => "scheduled_basals",
            Self::NormalBoluses => "normal_boluses",
            Self::CgmGraph => "cgm_graph",
        }
    }

    /// Path template relative to the API base
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::ScheduledBasals => endpoints::PUMP_SCHEDULED_BASALS,
            Self::NormalBoluses => endpoints::PUMP_NORMAL_BOLUSES,
            Self::CgmGraph => endpoints::GRAPH_CGM_READINGS,
        }
    }

    /// Whether the endpoint takes `lastGuid`/`lastUpdatedAt`/`limit`
    #[must_use]
    pub const fn paginated(self) -> bool {
        !matches!(self, Self::CgmGraph)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Absolute request URL for one endpoint and window
///
/// Templates carrying the patient placeholder get patient, start and end
/// substituted in place; other paths get them appended as query parameters.
/// The start is the beginning of the 48 hour range, the end is the window's
/// `until`. Paginated endpoints additionally carry `lastGuid`, `lastUpdatedAt`
/// (the window's `since`) and `limit` (its `max_count`).
#[must_use]
pub fn request_url(
    api_base: &str,
    endpoint: Endpoint,
    patient_id: &str,
    window: &FetchWindow,
    last_guid: &str,
) -> String {
    let path = endpoint.path();
    let patient = encode(patient_id);
    let start = to_iso_millis(&window.range_start);
    let end = to_iso_millis(&window.until);

    let mut url = if path.contains(endpoints::PATIENT_PLACEHOLDER) {
        format!(
            "{api_base}{}",
            path.replace(endpoints::PATIENT_PLACEHOLDER, &patient)
                .replace(endpoints::START_DATE_PLACEHOLDER, &encode(&start))
                .replace(endpoints::END_DATE_PLACEHOLDER, &encode(&end))
        )
    } else {
        format!(
            "{api_base}{path}?patient={patient}&startDate={}&endDate={}",
            encode(&start),
            encode(&end)
        )
    };

    if endpoint.paginated() {
        let since = to_iso_millis(&window.since);
        url.push_str(&format!(
            "&lastGuid={}&lastUpdatedAt={}&limit={}",
            encode(last_guid),
            encode(&since),
            window.max_count
        ));
    }

    url
}
