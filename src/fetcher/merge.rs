// ABOUTME: Graph payload decoding and CGM severity bucket merge
// ABOUTME: Corrects the provider's mislabeled timestamps and stable-sorts the combined readings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::NormalizedReading;

/// Graph endpoint response; only the CGM series are read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphResponse {
    /// Series keyed by bucket name
    #[serde(default)]
    pub series: Option<GraphSeries>,
}

/// The three CGM severity buckets
///
/// Buckets stay raw JSON: a bucket that is not an array, or a point of an
/// unexpected shape, is skipped instead of failing the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSeries {
    /// Readings above range
    #[serde(default)]
    pub cgm_high: Option<Value>,
    /// Readings in range
    #[serde(default)]
    pub cgm_normal: Option<Value>,
    /// Readings below range
    #[serde(default)]
    pub cgm_low: Option<Value>,
}

/// Paginated list payloads; the wanted key may be absent or null
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BasalsPage {
    #[serde(default)]
    pub scheduled_basals: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BolusesPage {
    #[serde(default)]
    pub normal_boluses: Option<Vec<Value>>,
}

/// Merge the three buckets into one reading list
///
/// Points missing a timestamp or a numeric value are dropped, as are buckets
/// that are not arrays. Each timestamp is shifted back by `correction`. Buckets
/// are concatenated high, normal, low and then stable-sorted ascending, so
/// equal timestamps keep bucket order. Nothing is deduplicated.
#[must_use]
pub fn merge_cgm_series(series: &GraphSeries, correction: Duration) -> Vec<NormalizedReading> {
    let mut readings: Vec<NormalizedReading> = [&series.cgm_high, &series.cgm_normal, &series.cgm_low]
        .into_iter()
        .flatten()
        .filter_map(|bucket| {
            let points = bucket.as_array();
            if points.is_none() && !bucket.is_null() {
                warn!("Skipping CGM bucket that is not an array");
            }
            points
        })
        .flatten()
        .filter_map(|point| reading_from_point(point, correction))
        .collect();

    readings.sort_by_key(|reading| reading.timestamp);
    readings
}

fn reading_from_point(point: &Value, correction: Duration) -> Option<NormalizedReading> {
    let raw = point.get("timestamp").and_then(Value::as_str)?;
    let value = point.get("y").and_then(point_value)?;
    let Some(timestamp) = parse_provider_timestamp(raw) else {
        warn!(timestamp = raw, "Skipping CGM point with unparsable timestamp");
        return None;
    };
    let Some(corrected) = timestamp.checked_sub_signed(correction) else {
        warn!(timestamp = raw, "Skipping CGM point whose corrected timestamp is out of range");
        return None;
    };
    Some(NormalizedReading::cgm(corrected, value))
}

/// Numeric `y`, also accepting numbers sent as strings
fn point_value(y: &Value) -> Option<f64> {
    y.as_f64()
        .or_else(|| y.as_str().and_then(|raw| raw.trim().parse::<f64>().ok()))
        .filter(|value| value.is_finite())
}

/// Parse an RFC 3339 timestamp, or a naive one read as UTC
#[must_use]
pub fn parse_provider_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn series(value: &Value) -> GraphSeries {
        serde_json::from_value::<GraphResponse>(value.clone())
            .unwrap()
            .series
            .unwrap_or_default()
    }

    #[test]
    fn test_timestamp_correction() {
        let s = series(&json!({
            "series": { "cgmNormal": [{ "timestamp": "2024-01-01T12:00:00.000Z", "y": 110 }] }
        }));
        let readings = merge_cgm_series(&s, Duration::hours(3));
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].timestamp_iso(), "2024-01-01T09:00:00.000Z");
        assert!((readings[0].value - 110.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_buckets_concatenate_and_sort() {
        let s = series(&json!({
            "series": {
                "cgmHigh": [
                    { "timestamp": "2024-01-01T12:10:00.000Z", "y": 250 },
                    { "timestamp": "2024-01-01T12:00:00.000Z", "y": 260 }
                ],
                "cgmNormal": [{ "timestamp": "2024-01-01T12:05:00.000Z", "y": 120 }],
                "cgmLow": [
                    { "timestamp": "2024-01-01T11:55:00.000Z", "y": 60 },
                    { "timestamp": "2024-01-01T12:15:00.000Z", "y": 65 },
                    { "timestamp": "2024-01-01T12:20:00.000Z", "y": 62 }
                ]
            }
        }));
        let readings = merge_cgm_series(&s, Duration::zero());
        assert_eq!(readings.len(), 2 + 1 + 3);
        assert!(readings.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_equal_timestamps_keep_bucket_order() {
        let s = series(&json!({
            "series": {
                "cgmHigh": [{ "timestamp": "2024-01-01T12:00:00Z", "y": 200 }],
                "cgmLow": [{ "timestamp": "2024-01-01T12:00:00Z", "y": 60 }]
            }
        }));
        let values: Vec<f64> = merge_cgm_series(&s, Duration::zero())
            .iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec![200.0, 60.0]);
    }

    #[test]
    fn test_incomplete_points_are_dropped() {
        let s = series(&json!({
            "series": {
                "cgmNormal": [
                    null,
                    { "timestamp": "2024-01-01T12:00:00Z" },
                    { "y": 100 },
                    { "timestamp": "not a time", "y": 100 },
                    { "timestamp": "2024-01-01T12:00:00", "y": 0 }
                ],
                "cgmHigh": null
            }
        }));
        let readings = merge_cgm_series(&s, Duration::hours(3));
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].timestamp_iso(), "2024-01-01T09:00:00.000Z");
    }

    #[test]
    fn test_odd_shapes_skip_only_the_offending_bucket_or_point() {
        let s = series(&json!({
            "series": {
                "cgmHigh": {},
                "cgmNormal": [
                    { "timestamp": "2024-01-01T12:00:00Z", "y": 120 },
                    { "timestamp": "2024-01-01T12:05:00Z", "y": "121" },
                    { "timestamp": "2024-01-01T12:10:00Z", "y": "high" },
                    { "timestamp": 1_704_110_400, "y": 130 },
                    "12:15"
                ],
                "cgmLow": "none"
            }
        }));
        let values: Vec<f64> = merge_cgm_series(&s, Duration::zero())
            .iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec![120.0, 121.0]);
    }

    #[test]
    fn test_out_of_range_correction_skips_points() {
        let s = series(&json!({
            "series": { "cgmNormal": [{ "timestamp": "2024-01-01T12:00:00Z", "y": 110 }] }
        }));
        let correction = Duration::try_hours(3_000_000_000).unwrap();
        assert!(merge_cgm_series(&s, correction).is_empty());
    }

    #[test]
    fn test_missing_series_yields_nothing() {
        let response: GraphResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.series.is_none());
        assert!(merge_cgm_series(&GraphSeries::default(), Duration::hours(3)).is_empty());
    }
}
