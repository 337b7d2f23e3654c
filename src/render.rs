//! Plain-text rendering of the matrix and the summary for the CLI.

use std::fmt::Write as _;

use crate::analysis::DashboardSummary;
use crate::matrix::MatrixResult;

const UNKNOWN_PART: &str = "Unknown";
const DEFAULT_GLYPH: &str = "⚪";

const GLYPHS: &[(&str, &str)] = &[
    ("Succeeded", "🟢"),
    ("Completed", "🟢"),
    ("Failed", "🔴"),
    ("Error", "🔴"),
    ("TimedOut", "🔴"),
    ("Running", "🟡"),
    ("Canceled", "⚫"),
    ("Suspended", "🔵"),
    ("Skipped", "⚪"),
    ("No Run", "⚪"),
];

/// Glyph for a status: exact match first, then case-insensitive.
pub fn status_glyph(status: &str) -> &'static str {
    let status = status.trim();
    GLYPHS
        .iter()
        .find(|(name, _)| *name == status)
        .or_else(|| GLYPHS.iter().find(|(name, _)| name.eq_ignore_ascii_case(status)))
        .map_or(DEFAULT_GLYPH, |(_, glyph)| glyph)
}

/// Split `"owner | project | flow"`; missing parts become `"Unknown"`.
pub fn split_display_key(key: &str) -> (String, String, String) {
    let mut parts = key.splitn(3, " | ").map(str::to_string);
    let mut next = || parts.next().unwrap_or_else(|| UNKNOWN_PART.to_string());
    let owner = next();
    let project = next();
    let flow = next();
    (owner, project, flow)
}

pub fn render_matrix(result: &MatrixResult) -> String {
    if result.is_empty() {
        return "No bot executions match the current filters.\n".to_string();
    }

    let mut out = String::new();
    let hours: Vec<String> = result.hours.iter().map(|h| format!("{:02}", h)).collect();
    let _ = writeln!(out, "Owner | Automation Project | Cloud Flow | {}", hours.join(" "));

    let mut keys: Vec<&String> = result.keys.iter().collect();
    keys.sort();
    for key in keys {
        let (owner, project, flow) = split_display_key(key);
        let cells: Vec<String> = result
            .hours
            .iter()
            .map(|&h| format!("{:<2}", status_glyph(result.status_at(key, h).unwrap_or_default())))
            .collect();
        let _ = writeln!(out, "{} | {} | {} | {}", owner, project, flow, cells.join(" "));
    }
    out
}

pub fn render_summary(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    let perf = &summary.performance;

    let _ = writeln!(out, "Executions:      {}", perf.total_executions);
    let _ = writeln!(out, "Active flows:    {}", perf.active_flows);
    let _ = writeln!(out, "Success rate:    {:.1}%", summary.overall_success_rate);
    let _ = writeln!(out, "Failure rate:    {:.1}%", perf.failure_rate);
    match perf.avg_duration_minutes {
        Some(minutes) => {
            let _ = writeln!(out, "Avg duration:    {:.1} min", minutes);
        }
        None => {
            let _ = writeln!(out, "Avg duration:    n/a");
        }
    }

    if !summary.status_distribution.is_empty() {
        let _ = writeln!(out, "\nStatus");
        for entry in &summary.status_distribution {
            let _ = writeln!(out, "  {} {:<12} {}", status_glyph(&entry.label), entry.label, entry.count);
        }
    }

    if !summary.project_metrics.is_empty() {
        let _ = writeln!(out, "\nProject health");
        for p in &summary.project_metrics {
            let _ = writeln!(
                out,
                "  {:<30} runs={:<5} success={:>5.1}% failure={:>5.1}% health={:>6.1}",
                p.project, p.total_executions, p.success_rate, p.failure_rate, p.health_score
            );
        }
    }

    if !summary.top_failing_flows.is_empty() {
        let _ = writeln!(out, "\nTop failing flows");
        for entry in &summary.top_failing_flows {
            let _ = writeln!(out, "  {:<40} {}", entry.label, entry.count);
        }
    }
    out
}
