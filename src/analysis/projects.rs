//! Per-project health and overall performance figures.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::stats::{mean, percentage, round1};
use crate::records::{NormalizedRecord, StatusFamily};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectMetrics {
    pub project: String,
    pub total_executions: usize,
    pub success_rate: f64,
    pub failure_rate: f64,
    pub unique_flows: usize,
    /// success rate − 2 × failure rate, one decimal.
    pub health_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub failure_rate: f64,
    pub total_executions: usize,
    pub active_flows: usize,
    pub avg_duration_minutes: Option<f64>,
}

fn is_failed(record: &NormalizedRecord) -> bool {
    StatusFamily::of(&record.status) == StatusFamily::Failed
}

/// Metrics per project, healthiest first (ties by project name).
pub fn project_metrics(records: &[NormalizedRecord]) -> Vec<ProjectMetrics> {
    let mut groups: BTreeMap<&str, Vec<&NormalizedRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.project.as_str()).or_default().push(record);
    }

    let mut metrics: Vec<ProjectMetrics> = groups
        .into_iter()
        .map(|(project, group)| {
            let success: Vec<f64> = group.iter().map(|r| r.success_rate).collect();
            let success_rate = mean(&success);
            let failure_rate = percentage(group.iter().filter(|r| is_failed(r)).count(), group.len());
            let flows: HashSet<&str> = group.iter().map(|r| r.flow_name.as_str()).collect();
            ProjectMetrics {
                project: project.to_string(),
                total_executions: group.len(),
                success_rate: round1(success_rate),
                failure_rate: round1(failure_rate),
                unique_flows: flows.len(),
                health_score: round1(success_rate - 2.0 * failure_rate),
            }
        })
        .collect();

    metrics.sort_by(|a, b| b.health_score.total_cmp(&a.health_score));
    metrics
}

pub fn performance(records: &[NormalizedRecord]) -> PerformanceMetrics {
    let flows: HashSet<&str> = records.iter().map(|r| r.flow_name.as_str()).collect();

    let durations: Vec<f64> = records
        .iter()
        .filter_map(|r| {
            let completed = r.completed_at?;
            let elapsed = completed.signed_duration_since(r.started_at);
            (elapsed.num_milliseconds() >= 0).then(|| elapsed.num_milliseconds() as f64 / 60_000.0)
        })
        .collect();

    PerformanceMetrics {
        failure_rate: percentage(records.iter().filter(|r| is_failed(r)).count(), records.len()),
        total_executions: records.len(),
        active_flows: flows.len(),
        avg_duration_minutes: (!durations.is_empty()).then(|| mean(&durations)),
    }
}
