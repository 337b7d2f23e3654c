//! Static status-priority table.
//!
//! Higher priority means more attention-worthy. The same table decides the
//! dominant status of a matrix cell and feeds the notability ranking.

use serde::{Deserialize, Serialize};

/// Label used for hours without an execution and for unrecognized statuses.
pub const NO_RUN: &str = "No Run";

/// Families of the known status vocabulary, ordered by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusFamily {
    NoRun,
    Suspended,
    Cancelled,
    Skipped,
    Succeeded,
    Running,
    Failed,
}

impl StatusFamily {
    /// Classify a raw status. Matching is exact; anything else is `NoRun`.
    pub fn of(status: &str) -> Self {
        match status {
            "Failed" | "Error" | "TimedOut" => StatusFamily::Failed,
            "Running" | "InProgress" | "Started" => StatusFamily::Running,
            "Succeeded" | "Completed" | "Done" => StatusFamily::Succeeded,
            "Skipped" => StatusFamily::Skipped,
            "Cancelled" | "Canceled" => StatusFamily::Cancelled,
            "Suspended" | "Paused" => StatusFamily::Suspended,
            _ => StatusFamily::NoRun,
        }
    }

    pub const fn priority(self) -> u8 {
        match self {
            StatusFamily::Failed => 100,
            StatusFamily::Running => 80,
            StatusFamily::Succeeded => 60,
            StatusFamily::Skipped => 40,
            StatusFamily::Cancelled => 30,
            StatusFamily::Suspended => 20,
            StatusFamily::NoRun => 0,
        }
    }
}

/// Priority of a raw status; unknown values rank 0.
pub fn status_priority(status: &str) -> u8 {
    StatusFamily::of(status).priority()
}

/// Whether the status belongs to the known vocabulary (including `No Run`).
pub fn is_known_status(status: &str) -> bool {
    status == NO_RUN || StatusFamily::of(status) != StatusFamily::NoRun
}

/// What to do with status values outside the known vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownStatusPolicy {
    /// Keep the raw value; it ranks with priority 0.
    #[default]
    Keep,
    /// Replace the raw value with `No Run`.
    CoerceToNoRun,
}

impl UnknownStatusPolicy {
    pub fn apply(self, status: &str) -> String {
        match self {
            UnknownStatusPolicy::CoerceToNoRun if !is_known_status(status) => NO_RUN.to_string(),
            _ => status.to_string(),
        }
    }
}
