//! Post-build consistency pass over a matrix draft.

use std::collections::HashSet;

use super::{all_hours, empty_row, HourRow, MatrixResult, StatusMatrix, HOURS_PER_DAY};
use crate::records::NO_RUN;

/// Outcome of validating a matrix draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Repaired { result: MatrixResult, message: String },
    Rejected { message: String },
}

/// Checks a matrix draft and either accepts, repairs or rejects it.
pub trait MatrixValidator {
    fn validate(&self, draft: &MatrixResult) -> Validation;
}

/// Repairs key/row mismatches; rejects drafts whose hour axis is not 0..=23.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepairingValidator;

impl MatrixValidator for RepairingValidator {
    fn validate(&self, draft: &MatrixResult) -> Validation {
        if draft.hours != all_hours() {
            return Validation::Rejected {
                message: format!("hour axis has {} entries, expected 0..=23", draft.hours.len()),
            };
        }

        let mut issues = Vec::new();

        let mut keys = draft.keys.clone();
        if keys.is_empty() && !draft.matrix.is_empty() {
            keys = draft.matrix.keys().cloned().collect();
            issues.push(format!("recovered {} display keys from matrix rows", keys.len()));
        }

        let mut seen = HashSet::new();
        let before = keys.len();
        keys.retain(|k| seen.insert(k.clone()));
        if keys.len() != before {
            issues.push(format!("removed {} duplicate display keys", before - keys.len()));
        }

        let mut matrix = StatusMatrix::new();
        for key in &keys {
            let row = match draft.matrix.get(key) {
                Some(row) => {
                    let (row, changed) = repair_row(row);
                    if changed {
                        issues.push(format!("repaired hours for '{}'", key));
                    }
                    row
                }
                None => {
                    issues.push(format!("filled missing row for '{}'", key));
                    empty_row()
                }
            };
            matrix.insert(key.clone(), row);
        }

        let extra = draft.matrix.keys().filter(|k| !seen.contains(*k)).count();
        if extra > 0 {
            issues.push(format!("dropped {} rows without a display key", extra));
        }

        if issues.is_empty() {
            Validation::Valid
        } else {
            Validation::Repaired {
                result: MatrixResult {
                    matrix,
                    keys,
                    hours: draft.hours.clone(),
                },
                message: issues.join("; "),
            }
        }
    }
}

/// Keep hours 0-23, fill gaps with `No Run`. Returns whether anything changed.
fn repair_row(row: &HourRow) -> (HourRow, bool) {
    let mut repaired: HourRow = row
        .iter()
        .filter(|(hour, _)| **hour < HOURS_PER_DAY)
        .map(|(hour, status)| (*hour, status.clone()))
        .collect();
    for hour in 0..HOURS_PER_DAY {
        repaired.entry(hour).or_insert_with(|| NO_RUN.to_string());
    }
    let changed = repaired != *row;
    (repaired, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(keys: &[&str], rows: &[&str]) -> MatrixResult {
        MatrixResult {
            matrix: rows.iter().map(|k| (k.to_string(), empty_row())).collect(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            hours: all_hours(),
        }
    }

    #[test]
    fn test_consistent_draft_is_valid() {
        let d = draft(&["a", "b"], &["a", "b"]);
        assert_eq!(RepairingValidator.validate(&d), Validation::Valid);
        assert_eq!(RepairingValidator.validate(&MatrixResult::empty()), Validation::Valid);
    }

    #[test]
    fn test_recovers_keys_from_rows() {
        let d = draft(&[], &["a", "b"]);
        match RepairingValidator.validate(&d) {
            Validation::Repaired { result, message } => {
                assert_eq!(result.keys, vec!["a".to_string(), "b".to_string()]);
                assert!(message.contains("recovered 2"));
            }
            other => panic!("expected repair, got {:?}", other),
        }
    }

    #[test]
    fn test_repairs_mismatched_rows() {
        let mut d = draft(&["a", "a", "b"], &["a", "stray"]);
        d.matrix.get_mut("a").unwrap().remove(&5);
        d.matrix.get_mut("a").unwrap().insert(30, "Failed".to_string());

        let Validation::Repaired { result, message } = RepairingValidator.validate(&d) else {
            panic!("expected repair");
        };
        assert_eq!(result.keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(result.matrix.len(), 2);
        assert!(!result.matrix.contains_key("stray"));
        for row in result.matrix.values() {
            assert_eq!(row.len(), 24);
        }
        assert_eq!(result.status_at("a", 5), Some(NO_RUN));
        assert!(message.contains("duplicate"));
        assert!(message.contains("filled missing row for 'b'"));
        assert!(message.contains("dropped 1 rows"));
    }

    #[test]
    fn test_rejects_bad_hour_axis() {
        let mut d = draft(&["a"], &["a"]);
        d.hours.pop();
        assert!(matches!(
            RepairingValidator.validate(&d),
            Validation::Rejected { .. }
        ));
    }
}
