//! Record normalization: attach project, hour bucket, owner label, display
//! key and status priority to every execution record.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::status::{status_priority, UnknownStatusPolicy, NO_RUN};
use super::ExecutionRecord;
use crate::source::mapping::FlowMapping;

/// Project label for flows without a mapping entry.
pub const UNMAPPED_PROJECT: &str = "Other Cloud Flow";

/// Suffix stripped from service-account owners before title-casing.
const OWNER_SUFFIX: &str = " serviceaccount";

const REQUIRED_FIELDS: [&str; 4] = ["flow_name", "owner", "status", "started_at"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub unknown_status: UnknownStatusPolicy,
}

/// Coarse grouping of the trigger that started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerGroup {
    Manual,
    Recurrence,
    OtherTrigger,
}

impl TriggerGroup {
    pub fn of(trigger_type: Option<&str>) -> Self {
        match trigger_type {
            Some("manual") => TriggerGroup::Manual,
            Some("Recurrence") => TriggerGroup::Recurrence,
            _ => TriggerGroup::OtherTrigger,
        }
    }
}

/// An execution record ready for matrix building and analytics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub flow_name: String,
    pub owner: String,
    pub project: String,
    pub status: String,
    /// Start time with its original offset; `hour` and `date` are its
    /// wall-clock components, ordering compares the instant.
    pub started_at: DateTime<FixedOffset>,
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub hour: u8,
    pub date: NaiveDate,
    pub display_key: String,
    pub status_priority: u8,
    pub success_rate: f64,
    pub trigger_type: Option<String>,
    pub trigger_group: TriggerGroup,
}

/// Why a normalization produced what it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "fields", rename_all = "snake_case")]
pub enum NormalizeOutcome {
    Ok,
    EmptyInput,
    /// Required fields absent from every input record.
    MissingFields(Vec<&'static str>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub outcome: NormalizeOutcome,
    pub input_rows: usize,
    /// Rows excluded because `started_at` was absent or unparseable.
    pub dropped_rows: usize,
    /// Unknown statuses replaced by `No Run` under the coercion policy.
    pub coerced_statuses: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    pub records: Vec<NormalizedRecord>,
    pub report: NormalizeReport,
}

impl Normalized {
    fn degraded(outcome: NormalizeOutcome, input_rows: usize) -> Self {
        Self {
            records: Vec::new(),
            report: NormalizeReport {
                outcome,
                input_rows,
                dropped_rows: 0,
                coerced_statuses: 0,
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.report.outcome == NormalizeOutcome::Ok
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalize raw execution records.
///
/// Never fails: empty input and missing columns are reported through
/// [`NormalizeReport::outcome`] with an empty record list.
pub fn normalize(
    records: &[ExecutionRecord],
    mapping: Option<&FlowMapping>,
    options: NormalizeOptions,
) -> Normalized {
    if records.is_empty() {
        warn!("empty record set passed to normalize");
        return Normalized::degraded(NormalizeOutcome::EmptyInput, 0);
    }

    let missing = missing_fields(records);
    if !missing.is_empty() {
        warn!(?missing, "required fields missing from every record");
        return Normalized::degraded(NormalizeOutcome::MissingFields(missing), records.len());
    }

    let mut normalized = Vec::with_capacity(records.len());
    let mut dropped_rows = 0;
    let mut coerced_statuses = 0;

    for record in records {
        let Some(started_at) = record.started() else {
            dropped_rows += 1;
            continue;
        };

        let flow_name = record.flow_name.clone().unwrap_or_default();
        let project = project_label(&flow_name, mapping);
        let owner = owner_label(record.owner.as_deref().unwrap_or_default());

        let raw_status = record.status.as_deref().unwrap_or(NO_RUN);
        let status = options.unknown_status.apply(raw_status);
        if status != raw_status {
            coerced_statuses += 1;
        }

        normalized.push(NormalizedRecord {
            display_key: format!("{} | {} | {}", owner, project, flow_name),
            status_priority: status_priority(&status),
            success_rate: if record.success_flag() != 0.0 { 100.0 } else { 0.0 },
            hour: started_at.hour() as u8,
            date: started_at.date_naive(),
            completed_at: record.completed(),
            trigger_type: record.trigger_type.clone(),
            trigger_group: TriggerGroup::of(record.trigger_type.as_deref()),
            flow_name,
            owner,
            project,
            status,
            started_at,
        });
    }

    if dropped_rows > 0 {
        warn!(dropped_rows, "records without a usable start time were excluded");
    }

    let projects: HashSet<&str> = normalized.iter().map(|r| r.project.as_str()).collect();
    let bots: HashSet<&str> = normalized.iter().map(|r| r.display_key.as_str()).collect();
    info!(
        records = normalized.len(),
        projects = projects.len(),
        bots = bots.len(),
        "normalized execution records"
    );

    Normalized {
        records: normalized,
        report: NormalizeReport {
            outcome: NormalizeOutcome::Ok,
            input_rows: records.len(),
            dropped_rows,
            coerced_statuses,
        },
    }
}

/// Required fields absent from every record.
pub fn missing_fields(records: &[ExecutionRecord]) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .into_iter()
        .filter(|field| {
            records.iter().all(|r| match *field {
                "flow_name" => r.flow_name.is_none(),
                "owner" => r.owner.is_none(),
                "status" => r.status.is_none(),
                _ => r.started_at.is_none(),
            })
        })
        .collect()
}

fn project_label(flow_name: &str, mapping: Option<&FlowMapping>) -> String {
    mapping
        .and_then(|m| m.project_for(flow_name))
        .unwrap_or(UNMAPPED_PROJECT)
        .to_string()
}

/// Strip the service-account suffix and title-case the remainder.
pub fn owner_label(raw: &str) -> String {
    title_case(&raw.replace(OWNER_SUFFIX, ""))
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::mapping::FlowInfo;

    fn mapping() -> FlowMapping {
        FlowMapping::from_iter([(
            "Finance - Daily Report".to_string(),
            FlowInfo::new("Finance Reporting"),
        )])
    }

    #[test]
    fn test_derived_fields() {
        let records = vec![ExecutionRecord::new(
            " Finance - Daily Report ",
            "finance ops serviceaccount",
            "Failed",
            "2024-05-01 09:15:00",
        )
        .with_success(false)
        .with_trigger("Recurrence")];

        let out = normalize(&records, Some(&mapping()), NormalizeOptions::default());
        assert!(out.is_ok());
        let rec = &out.records[0];
        assert_eq!(rec.project, "Finance Reporting");
        assert_eq!(rec.owner, "Finance Ops");
        assert_eq!(rec.hour, 9);
        assert_eq!(rec.status_priority, 100);
        assert_eq!(rec.success_rate, 0.0);
        assert_eq!(rec.trigger_group, TriggerGroup::Recurrence);
        assert_eq!(
            rec.display_key,
            "Finance Ops | Finance Reporting |  Finance - Daily Report "
        );
    }

    #[test]
    fn test_offset_timestamp_keeps_wall_clock_hour() {
        let records = vec![
            ExecutionRecord::new("Pay", "ops", "Failed", "2024-05-01T13:45:00+02:00"),
            ExecutionRecord::new("Pay", "ops", "Failed", "2024-05-01T23:10:00-05:00"),
        ];
        let out = normalize(&records, None, NormalizeOptions::default());
        assert_eq!(out.records[0].hour, 13);
        assert_eq!(out.records[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(out.records[1].hour, 23);
        assert_eq!(out.records[1].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_unmapped_flow_gets_fallback_project() {
        let records = vec![ExecutionRecord::new("AMZ_Orders", "ops", "Succeeded", "2024-05-01 01:00:00")
            .with_success(true)];

        let without = normalize(&records, None, NormalizeOptions::default());
        assert_eq!(without.records[0].project, UNMAPPED_PROJECT);
        assert_eq!(without.records[0].success_rate, 100.0);

        let with = normalize(&records, Some(&mapping()), NormalizeOptions::default());
        assert_eq!(with.records[0].project, UNMAPPED_PROJECT);
    }

    #[test]
    fn test_empty_input_is_reported() {
        let out = normalize(&[], None, NormalizeOptions::default());
        assert!(out.is_empty());
        assert_eq!(out.report.outcome, NormalizeOutcome::EmptyInput);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let mut record = ExecutionRecord::new("Flow", "owner", "Failed", "2024-05-01 01:00:00");
        record.status = None;
        let out = normalize(&[record.clone(), record], None, NormalizeOptions::default());
        assert!(out.is_empty());
        assert_eq!(out.report.outcome, NormalizeOutcome::MissingFields(vec!["status"]));
    }

    #[test]
    fn test_unparseable_start_is_dropped() {
        let records = vec![
            ExecutionRecord::new("Flow", "owner", "Failed", "not a time"),
            ExecutionRecord::new("Flow", "owner", "Failed", "2024-05-01 01:00:00"),
        ];
        let out = normalize(&records, None, NormalizeOptions::default());
        assert!(out.is_ok());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.report.dropped_rows, 1);
    }

    #[test]
    fn test_unknown_status_policies() {
        let records = vec![ExecutionRecord::new("Flow", "owner", "Exploded", "2024-05-01 01:00:00")];

        let kept = normalize(&records, None, NormalizeOptions::default());
        assert_eq!(kept.records[0].status, "Exploded");
        assert_eq!(kept.records[0].status_priority, 0);
        assert_eq!(kept.report.coerced_statuses, 0);

        let coerced = normalize(
            &records,
            None,
            NormalizeOptions {
                unknown_status: UnknownStatusPolicy::CoerceToNoRun,
            },
        );
        assert_eq!(coerced.records[0].status, NO_RUN);
        assert_eq!(coerced.report.coerced_statuses, 1);
    }

    #[test]
    fn test_owner_label() {
        assert_eq!(owner_label("jane DOE"), "Jane Doe");
        assert_eq!(owner_label("billing serviceaccount"), "Billing");
        assert_eq!(owner_label("team-a1b"), "Team-A1B");
        assert_eq!(owner_label(""), "");
    }
}
