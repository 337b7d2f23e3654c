//! Matrix construction: filter, pick the most notable bots, then resolve the
//! dominant status of every (bot, hour) cell.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info, warn};

use super::filters::Selection;
use super::validate::{MatrixValidator, RepairingValidator, Validation};
use super::{all_hours, empty_row, MatrixResult, StatusMatrix, HOURS_PER_DAY};
use crate::records::{NormalizedRecord, StatusFamily};

/// Default cap on the number of matrix rows.
pub const DEFAULT_MAX_ROWS: usize = 300;

/// Build the status matrix with the default repairing validator.
pub fn build_matrix(
    records: &[NormalizedRecord],
    project: &Selection,
    status: &Selection,
    max_rows: usize,
) -> MatrixResult {
    build_matrix_with(records, project, status, max_rows, &RepairingValidator)
}

/// Build the status matrix and pass the draft through `validator`.
///
/// A rejected draft is returned as-is rather than dropped.
pub fn build_matrix_with(
    records: &[NormalizedRecord],
    project: &Selection,
    status: &Selection,
    max_rows: usize,
    validator: &dyn MatrixValidator,
) -> MatrixResult {
    if records.is_empty() {
        warn!("no records available for matrix creation");
        return MatrixResult::empty();
    }

    let filtered: Vec<&NormalizedRecord> = records
        .iter()
        .filter(|r| project.matches(&r.project) && status.matches(&r.status))
        .collect();
    info!(
        from = records.len(),
        to = filtered.len(),
        ?project,
        ?status,
        "filtered records for matrix"
    );

    if filtered.is_empty() {
        warn!("no records left after filtering");
        return MatrixResult::empty();
    }

    let keys = rank_display_keys(&filtered, max_rows);
    let mut matrix: StatusMatrix = keys.iter().map(|k| (k.clone(), empty_row())).collect();

    // First maximal record per cell, in input order.
    let mut dominant: HashMap<(&str, u8), &NormalizedRecord> = HashMap::new();
    for &record in &filtered {
        if record.hour >= HOURS_PER_DAY || !matrix.contains_key(&record.display_key) {
            continue;
        }
        match dominant.entry((record.display_key.as_str(), record.hour)) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if record.status_priority > slot.get().status_priority {
                    slot.insert(record);
                }
            }
        }
    }

    for ((key, hour), record) in dominant {
        if let Some(row) = matrix.get_mut(key) {
            row.insert(hour, record.status.clone());
        }
    }

    let draft = MatrixResult {
        matrix,
        keys,
        hours: all_hours(),
    };
    debug!(bots = draft.matrix.len(), keys = draft.keys.len(), "matrix pre-validation");

    match validator.validate(&draft) {
        Validation::Valid => {
            info!(rows = draft.keys.len(), "matrix created");
            draft
        }
        Validation::Repaired { result, message } => {
            warn!(%message, rows = result.keys.len(), "matrix repaired during validation");
            result
        }
        Validation::Rejected { message } => {
            warn!(%message, "matrix validation rejected the draft, using pre-validation data");
            draft
        }
    }
}

struct GroupStats<'a> {
    key: &'a str,
    failed: u64,
    running: u64,
    total: u64,
    latest: DateTime<FixedOffset>,
}

impl GroupStats<'_> {
    /// Failing bots first, then running ones, then by volume.
    fn score(&self) -> u64 {
        100 * self.failed + 10 * self.running + self.total
    }
}

/// Rank display keys by notability and keep the first `max_rows`.
///
/// Order: score descending, most recent start descending, key ascending.
pub fn rank_display_keys(records: &[&NormalizedRecord], max_rows: usize) -> Vec<String> {
    let mut groups: HashMap<&str, GroupStats<'_>> = HashMap::new();

    for &record in records {
        let stats = groups
            .entry(record.display_key.as_str())
            .or_insert_with(|| GroupStats {
                key: record.display_key.as_str(),
                failed: 0,
                running: 0,
                total: 0,
                latest: record.started_at,
            });
        match StatusFamily::of(&record.status) {
            StatusFamily::Failed => stats.failed += 1,
            StatusFamily::Running => stats.running += 1,
            _ => {}
        }
        stats.total += 1;
        stats.latest = stats.latest.max(record.started_at);
    }

    let mut ranked: Vec<GroupStats<'_>> = groups.into_values().collect();
    ranked.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| b.latest.cmp(&a.latest))
            .then_with(|| a.key.cmp(b.key))
    });

    if ranked.len() > max_rows {
        debug!(bots = ranked.len(), max_rows, "capping matrix rows");
    }

    ranked
        .into_iter()
        .take(max_rows)
        .map(|g| g.key.to_string())
        .collect()
}
