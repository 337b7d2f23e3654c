//! Dashboard analytics over normalized records.
//!
//! Everything here is a pure function of the record slice; an empty slice
//! yields a zeroed summary.

pub mod projects;
pub mod stats;
pub mod trends;

use serde::Serialize;

use crate::records::NormalizedRecord;

pub use self::projects::{performance, project_metrics, PerformanceMetrics, ProjectMetrics};
pub use self::stats::{ranked_counts, LabelCount};
pub use self::trends::{
    hourly_distribution, hourly_success_rate, timeline, top_failing_flows, HourlyCount, HourlySuccess,
    TimelineBucket,
};

/// Number of projects listed in the project distribution.
pub const TOP_PROJECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub status_distribution: Vec<LabelCount>,
    pub project_distribution: Vec<LabelCount>,
    pub owner_distribution: Vec<LabelCount>,
    pub overall_success_rate: f64,
    pub project_metrics: Vec<ProjectMetrics>,
    pub performance: PerformanceMetrics,
    pub hourly_distribution: Vec<HourlyCount>,
    pub hourly_success_rate: Vec<HourlySuccess>,
    pub top_failing_flows: Vec<LabelCount>,
    pub timeline: Vec<TimelineBucket>,
}

pub fn summarize(records: &[NormalizedRecord]) -> DashboardSummary {
    let success: Vec<f64> = records.iter().map(|r| r.success_rate).collect();

    let summary = DashboardSummary {
        status_distribution: ranked_counts(records.iter().map(|r| r.status.as_str()), None),
        project_distribution: ranked_counts(records.iter().map(|r| r.project.as_str()), Some(TOP_PROJECTS)),
        owner_distribution: ranked_counts(records.iter().map(|r| r.owner.as_str()), None),
        overall_success_rate: stats::mean(&success),
        project_metrics: project_metrics(records),
        performance: performance(records),
        hourly_distribution: hourly_distribution(records),
        hourly_success_rate: hourly_success_rate(records),
        top_failing_flows: top_failing_flows(records),
        timeline: timeline(records),
    };

    tracing::debug!(
        records = records.len(),
        projects = summary.project_metrics.len(),
        "summarized dashboard"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{normalize, ExecutionRecord, NormalizeOptions};

    #[test]
    fn test_empty_summary_is_zeroed() {
        let summary = summarize(&[]);
        assert!(summary.status_distribution.is_empty());
        assert_eq!(summary.overall_success_rate, 0.0);
        assert_eq!(summary.performance.total_executions, 0);
        assert_eq!(summary.hourly_distribution.len(), 24);
        assert!(summary.hourly_distribution.iter().all(|h| h.count == 0));
        assert!(summary.timeline.is_empty());
    }

    #[test]
    fn test_summary_distributions() {
        let records = normalize(
            &[
                ExecutionRecord::new("A", "ops serviceaccount", "Failed", "2024-05-01 01:00:00"),
                ExecutionRecord::new("B", "ops serviceaccount", "Succeeded", "2024-05-01 02:00:00")
                    .with_success(true),
                ExecutionRecord::new("C", "dev", "Succeeded", "2024-05-01 03:00:00").with_success(true),
                ExecutionRecord::new("D", "dev", "Succeeded", "2024-05-01 03:30:00").with_success(true),
            ],
            None,
            NormalizeOptions::default(),
        )
        .records;

        let summary = summarize(&records);
        assert_eq!(summary.status_distribution[0].label, "Succeeded");
        assert_eq!(summary.status_distribution[0].count, 3);
        assert_eq!(summary.overall_success_rate, 75.0);
        // Equal counts fall back to label order.
        let owners: Vec<_> = summary.owner_distribution.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(owners, vec!["Dev", "Ops"]);
        assert_eq!(summary.project_distribution.len(), 1);
        assert_eq!(summary.top_failing_flows[0].label, "A");
    }
}
