//! Hour-by-bot status matrix.

pub mod builder;
pub mod filters;
pub mod validate;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::NO_RUN;

pub use self::builder::{build_matrix, build_matrix_with, rank_display_keys, DEFAULT_MAX_ROWS};
pub use self::filters::{filter_options, filter_owner, FilterOptions, Selection};
pub use self::validate::{MatrixValidator, RepairingValidator, Validation};

pub const HOURS_PER_DAY: u8 = 24;

/// Hour of day (0-23) → dominant status.
pub type HourRow = BTreeMap<u8, String>;

/// Display key → hour row.
pub type StatusMatrix = BTreeMap<String, HourRow>;

/// The ordered hour sequence 0..=23.
pub fn all_hours() -> Vec<u8> {
    (0..HOURS_PER_DAY).collect()
}

/// A row with every hour set to `No Run`.
pub fn empty_row() -> HourRow {
    (0..HOURS_PER_DAY).map(|h| (h, NO_RUN.to_string())).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixResult {
    pub matrix: StatusMatrix,
    /// Selected display keys, most notable first.
    pub keys: Vec<String>,
    pub hours: Vec<u8>,
}

impl MatrixResult {
    /// No rows, but the full hour sequence.
    pub fn empty() -> Self {
        Self {
            matrix: StatusMatrix::new(),
            keys: Vec::new(),
            hours: all_hours(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn status_at(&self, key: &str, hour: u8) -> Option<&str> {
        self.matrix.get(key).and_then(|row| row.get(&hour)).map(String::as_str)
    }
}
