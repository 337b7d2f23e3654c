//! Day selection over raw records.

use chrono::NaiveDate;
use serde::Serialize;

use crate::records::ExecutionRecord;

/// Which calendar day (UTC) of runs to look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DateSelection {
    /// The most recent day present in the data.
    #[default]
    Latest,
    On(NaiveDate),
}

impl DateSelection {
    /// `None`, empty and `"latest"` select the latest day; otherwise `YYYY-MM-DD`.
    pub fn parse(raw: Option<&str>) -> Result<Self, chrono::ParseError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(DateSelection::Latest),
            Some(s) if s.eq_ignore_ascii_case("latest") => Ok(DateSelection::Latest),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map(DateSelection::On),
        }
    }

    /// Resolve to a concrete day against the given records.
    pub fn resolve(&self, records: &[ExecutionRecord]) -> Option<NaiveDate> {
        match self {
            DateSelection::Latest => latest_date(records),
            DateSelection::On(date) => Some(*date),
        }
    }
}

/// Latest start date among records with a parseable start time.
pub fn latest_date(records: &[ExecutionRecord]) -> Option<NaiveDate> {
    records.iter().filter_map(ExecutionRecord::started_date).max()
}

/// Keep the records that started on the selected day.
pub fn filter_by_date(records: &[ExecutionRecord], selection: &DateSelection) -> Vec<ExecutionRecord> {
    let Some(day) = selection.resolve(records) else {
        return Vec::new();
    };
    let kept: Vec<ExecutionRecord> = records
        .iter()
        .filter(|r| r.started_date() == Some(day))
        .cloned()
        .collect();
    tracing::info!(%day, from = records.len(), to = kept.len(), "filtered records by date");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs() -> Vec<ExecutionRecord> {
        vec![
            ExecutionRecord::new("A", "o", "Failed", "2024-04-30 23:59:00"),
            ExecutionRecord::new("B", "o", "Succeeded", "2024-05-01 00:10:00"),
            ExecutionRecord::new("C", "o", "Running", "garbage"),
            ExecutionRecord::new("D", "o", "Succeeded", "2024-05-01T18:00:00Z"),
        ]
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(DateSelection::parse(None).unwrap(), DateSelection::Latest);
        assert_eq!(DateSelection::parse(Some("latest")).unwrap(), DateSelection::Latest);
        assert_eq!(
            DateSelection::parse(Some("2024-04-30")).unwrap(),
            DateSelection::On(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap())
        );
        assert!(DateSelection::parse(Some("30/04/2024")).is_err());
    }

    #[test]
    fn test_latest_day() {
        let records = runs();
        assert_eq!(latest_date(&records), NaiveDate::from_ymd_opt(2024, 5, 1));

        let latest = filter_by_date(&records, &DateSelection::Latest);
        let names: Vec<_> = latest.iter().filter_map(|r| r.flow_name.as_deref()).collect();
        assert_eq!(names, vec!["B", "D"]);
    }

    #[test]
    fn test_specific_day_and_empty_input() {
        let records = runs();
        let day = DateSelection::On(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert_eq!(filter_by_date(&records, &day).len(), 1);

        assert!(filter_by_date(&[], &DateSelection::Latest).is_empty());
        assert!(latest_date(&[]).is_none());
    }
}
