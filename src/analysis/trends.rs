//! Time-of-day trends: hourly volume, 15-minute timeline, failing flows.

use std::collections::BTreeMap;

use chrono::{Duration, DurationRound, NaiveDateTime};
use serde::Serialize;

use super::stats::{mean, ranked_counts, LabelCount};
use crate::matrix::HOURS_PER_DAY;
use crate::records::{NormalizedRecord, StatusFamily};

/// Width of one timeline bucket in minutes.
pub const TIMELINE_BUCKET_MINUTES: i64 = 15;

/// Longest gap-filled timeline: one week of buckets. Wider spans list only
/// the buckets that saw executions.
pub const MAX_TIMELINE_BUCKETS: i64 = 7 * 24 * 60 / TIMELINE_BUCKET_MINUTES;

pub const TOP_FAILING_FLOWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyCount {
    pub hour: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySuccess {
    pub hour: u8,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineBucket {
    /// Wall-clock start, matching the hour buckets.
    pub start: NaiveDateTime,
    pub count: usize,
    /// `None` for buckets without executions.
    pub success_rate: Option<f64>,
}

/// Executions per hour, all 24 hours present.
pub fn hourly_distribution(records: &[NormalizedRecord]) -> Vec<HourlyCount> {
    let mut counts = [0usize; HOURS_PER_DAY as usize];
    for record in records {
        counts[usize::from(record.hour) % counts.len()] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourlyCount {
            hour: hour as u8,
            count,
        })
        .collect()
}

/// Mean success per hour, only for hours that saw executions.
pub fn hourly_success_rate(records: &[NormalizedRecord]) -> Vec<HourlySuccess> {
    let mut by_hour: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
    for record in records {
        by_hour.entry(record.hour).or_default().push(record.success_rate);
    }
    by_hour
        .into_iter()
        .map(|(hour, values)| HourlySuccess {
            hour,
            success_rate: mean(&values),
        })
        .collect()
}

/// Failed-family executions by flow name.
pub fn top_failing_flows(records: &[NormalizedRecord]) -> Vec<LabelCount> {
    ranked_counts(
        records
            .iter()
            .filter(|r| StatusFamily::of(&r.status) == StatusFamily::Failed)
            .map(|r| r.flow_name.as_str()),
        Some(TOP_FAILING_FLOWS),
    )
}

/// Fixed-width buckets spanning the first to the last execution.
///
/// Gaps are filled with empty buckets while the span fits in
/// [`MAX_TIMELINE_BUCKETS`]; beyond that only occupied buckets are returned.
pub fn timeline(records: &[NormalizedRecord]) -> Vec<TimelineBucket> {
    let width = Duration::minutes(TIMELINE_BUCKET_MINUTES);

    let mut buckets: BTreeMap<NaiveDateTime, Vec<f64>> = BTreeMap::new();
    for record in records {
        let Ok(start) = record.started_at.naive_local().duration_trunc(width) else {
            continue;
        };
        buckets.entry(start).or_default().push(record.success_rate);
    }

    let (Some(first), Some(last)) = (
        buckets.keys().next().copied(),
        buckets.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let span = (last - first).num_minutes() / TIMELINE_BUCKET_MINUTES + 1;
    if span > MAX_TIMELINE_BUCKETS {
        tracing::debug!(span, occupied = buckets.len(), "timeline too wide, skipping empty buckets");
        return buckets
            .into_iter()
            .map(|(start, values)| TimelineBucket {
                start,
                count: values.len(),
                success_rate: Some(mean(&values)),
            })
            .collect();
    }

    let mut out = Vec::new();
    let mut cursor = first;
    while cursor <= last {
        let values = buckets.get(&cursor);
        out.push(TimelineBucket {
            start: cursor,
            count: values.map_or(0, Vec::len),
            success_rate: values.map(|v| mean(v)),
        });
        cursor += width;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{normalize, ExecutionRecord, NormalizeOptions};

    fn records() -> Vec<NormalizedRecord> {
        normalize(
            &[
                ExecutionRecord::new("A", "o", "Failed", "2024-05-01 09:05:00").with_success(false),
                ExecutionRecord::new("A", "o", "Error", "2024-05-01 09:20:00").with_success(false),
                ExecutionRecord::new("B", "o", "Succeeded", "2024-05-01 09:25:00").with_success(true),
                ExecutionRecord::new("B", "o", "Failed", "2024-05-01 10:10:00").with_success(false),
                ExecutionRecord::new("C", "o", "Succeeded", "2024-05-01 10:14:59").with_success(true),
            ],
            None,
            NormalizeOptions::default(),
        )
        .records
    }

    #[test]
    fn test_hourly_views() {
        let records = records();
        let hourly = hourly_distribution(&records);
        assert_eq!(hourly.len(), 24);
        assert_eq!(hourly[9].count, 3);
        assert_eq!(hourly[10].count, 2);
        assert_eq!(hourly[0].count, 0);

        let success = hourly_success_rate(&records);
        assert_eq!(success.len(), 2);
        assert!((success[0].success_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(success[1].success_rate, 50.0);
    }

    #[test]
    fn test_top_failing_uses_failed_family() {
        let top = top_failing_flows(&records());
        assert_eq!(top[0], LabelCount { label: "A".into(), count: 2 });
        assert_eq!(top[1], LabelCount { label: "B".into(), count: 1 });
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_timeline_fills_gaps() {
        let buckets = timeline(&records());
        // 09:00, 09:15, 09:30, 09:45, 10:00
        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[1].count, 2);
        assert_eq!(buckets[1].success_rate, Some(50.0));
        assert_eq!(buckets[2].count, 0);
        assert_eq!(buckets[2].success_rate, None);
        assert_eq!(buckets[4].count, 2);
        assert!(timeline(&[]).is_empty());
    }

    #[test]
    fn test_wide_timeline_lists_only_occupied_buckets() {
        let records = normalize(
            &[
                ExecutionRecord::new("A", "o", "Failed", "2020-01-01 09:05:00"),
                ExecutionRecord::new("A", "o", "Succeeded", "2024-05-01 10:20:00").with_success(true),
            ],
            None,
            NormalizeOptions::default(),
        )
        .records;
        let buckets = timeline(&records);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].start.to_string(), "2020-01-01 09:00:00");
        assert_eq!(buckets[1].success_rate, Some(100.0));
    }

    #[test]
    fn test_timeline_buckets_use_wall_clock() {
        let records = normalize(
            &[ExecutionRecord::new("A", "o", "Failed", "2024-05-01T13:50:00+02:00")],
            None,
            NormalizeOptions::default(),
        )
        .records;
        assert_eq!(timeline(&records)[0].start.to_string(), "2024-05-01 13:45:00");
    }
}
