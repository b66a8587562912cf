// ABOUTME: Normalized batch handed from the incremental fetcher to the external transformer
// ABOUTME: CGM readings carry corrected UTC timestamps serialized with millisecond precision
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Device model tag attached to each normalized reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceModel {
    /// Continuous glucose monitor
    Cgm,
}

/// A single CGM reading taken from one of the graph severity buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReading {
    /// Corrected UTC timestamp
    #[serde(serialize_with = "serialize_iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Glucose value as reported by the provider
    pub value: f64,
    /// Always `cgm`
    pub device_model: DeviceModel,
}

impl NormalizedReading {
    /// Create a CGM reading
    #[must_use]
    pub fn cgm(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            device_model: DeviceModel::Cgm,
        }
    }

    /// Timestamp rendered as `YYYY-MM-DDTHH:MM:SS.mmmZ`
    #[must_use]
    pub fn timestamp_iso(&self) -> String {
        to_iso_millis(&self.timestamp)
    }
}

/// Output of one incremental fetch
///
/// `readings` is sorted ascending by timestamp. Readings are not deduplicated,
/// so overlapping windows across cycles can repeat entries downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBatch {
    /// Pump basal schedule entries, verbatim from the provider
    pub scheduled_basals: Vec<serde_json::Value>,
    /// Pump bolus events, verbatim from the provider
    pub normal_boluses: Vec<serde_json::Value>,
    /// Merged CGM readings
    pub readings: Vec<NormalizedReading>,
}

impl NormalizedBatch {
    /// Timestamp of the newest reading, used as the next cycle's checkpoint
    #[must_use]
    pub fn latest_reading_at(&self) -> Option<DateTime<Utc>> {
        self.readings.last().map(|r| r.timestamp)
    }

    /// Whether the batch carries no data at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scheduled_basals.is_empty() && self.normal_boluses.is_empty() && self.readings.is_empty()
    }
}

/// Format a timestamp the way the provider expects: millisecond precision, `Z` suffix
#[must_use]
pub fn to_iso_millis(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso_millis<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_iso_millis(timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reading_serializes_iso_millis() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let json = serde_json::to_value(NormalizedReading::cgm(ts, 120.0)).unwrap();
        assert_eq!(json["timestamp"], "2024-01-01T09:00:00.000Z");
        assert_eq!(json["deviceModel"], "cgm");
        assert_eq!(json["value"], 120.0);
    }

    #[test]
    fn test_batch_uses_camel_case_keys() {
        let json = serde_json::to_value(NormalizedBatch::default()).unwrap();
        assert!(json.get("scheduledBasals").is_some());
        assert!(json.get("normalBoluses").is_some());
        assert!(json.get("readings").is_some());
    }
}
