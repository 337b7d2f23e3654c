//! Execution records and the normalization pipeline that prepares them for the matrix.

pub mod normalize;
pub mod project;
pub mod status;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use self::normalize::{normalize, NormalizeOptions, NormalizeOutcome, NormalizeReport, Normalized, NormalizedRecord};
pub use self::project::{extract_project, ProjectCache};
pub use self::status::{status_priority, StatusFamily, UnknownStatusPolicy, NO_RUN};

/// One bot run as delivered by a record source.
///
/// Every field is optional so that a column missing from the source can be
/// told apart from a bad value in a single row. The original column names of
/// the flow-run export (`flowname`, `taskstatus`, ...) are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    #[serde(default, alias = "flowname")]
    pub flow_name: Option<String>,
    #[serde(default, alias = "flowowner")]
    pub owner: Option<String>,
    #[serde(default, alias = "taskstatus")]
    pub status: Option<String>,
    #[serde(default, alias = "datetimestarted")]
    pub started_at: Option<String>,
    #[serde(default, alias = "datetimecompleted")]
    pub completed_at: Option<String>,
    #[serde(default, alias = "triggertype")]
    pub trigger_type: Option<String>,
    /// Boolean, 0/1 number or numeric string.
    #[serde(default, alias = "wassuccessful")]
    pub was_successful: Option<Value>,
}

impl ExecutionRecord {
    /// Convenience constructor for a run with the four required fields set.
    pub fn new(flow_name: &str, owner: &str, status: &str, started_at: &str) -> Self {
        Self {
            flow_name: Some(flow_name.to_string()),
            owner: Some(owner.to_string()),
            status: Some(status.to_string()),
            started_at: Some(started_at.to_string()),
            ..Self::default()
        }
    }

    pub fn with_success(mut self, successful: bool) -> Self {
        self.was_successful = Some(Value::Bool(successful));
        self
    }

    pub fn with_trigger(mut self, trigger_type: &str) -> Self {
        self.trigger_type = Some(trigger_type.to_string());
        self
    }

    pub fn with_completed(mut self, completed_at: &str) -> Self {
        self.completed_at = Some(completed_at.to_string());
        self
    }

    /// Parsed start time, `None` when absent or unparseable.
    pub fn started(&self) -> Option<DateTime<FixedOffset>> {
        self.started_at.as_deref().and_then(parse_timestamp)
    }

    pub fn completed(&self) -> Option<DateTime<FixedOffset>> {
        self.completed_at.as_deref().and_then(parse_timestamp)
    }

    /// Calendar day of the start time, in the timestamp's own offset.
    pub fn started_date(&self) -> Option<NaiveDate> {
        self.started().map(|ts| ts.date_naive())
    }

    /// The success flag coerced to a number; anything unparseable counts as 0.
    pub fn success_flag(&self) -> f64 {
        match &self.was_successful {
            Some(Value::Bool(b)) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
            Some(Value::String(s)) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    1.0
                } else {
                    s.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
                }
            }
            _ => 0.0,
        }
    }
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parse a run timestamp, keeping its wall-clock time and offset.
/// Offset-less values get a zero offset.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}
