//! Filter selections and the option lists offered to the viewer.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::records::normalize::{NormalizedRecord, UNMAPPED_PROJECT};
use crate::source::mapping::FlowMapping;

pub const ALL_PROJECTS: &str = "All Projects";
pub const ALL_STATUSES: &str = "All Statuses";
pub const ALL_OWNERS: &str = "All Owners";

/// One filter: everything, or exact equality with a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// `None` and the "all" sentinel select everything; any other value,
    /// including an empty one, is matched exactly.
    pub fn parse(raw: Option<&str>, sentinel: &str) -> Self {
        match raw {
            Some(v) if v != sentinel => Selection::Only(v.to_string()),
            _ => Selection::All,
        }
    }

    pub fn project(raw: Option<&str>) -> Self {
        Self::parse(raw, ALL_PROJECTS)
    }

    pub fn status(raw: Option<&str>) -> Self {
        Self::parse(raw, ALL_STATUSES)
    }

    pub fn owner(raw: Option<&str>) -> Self {
        Self::parse(raw, ALL_OWNERS)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

/// Records owned by the selected owner.
pub fn filter_owner(records: &[NormalizedRecord], owner: &Selection) -> Vec<NormalizedRecord> {
    records.iter().filter(|r| owner.matches(&r.owner)).cloned().collect()
}

/// Choices for the project, status and owner pickers, each led by its sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub projects: Vec<String>,
    pub statuses: Vec<String>,
    pub owners: Vec<String>,
}

pub fn filter_options(records: &[NormalizedRecord], mapping: &FlowMapping) -> FilterOptions {
    let mut known: BTreeSet<String> = mapping.projects().into_iter().collect();
    known.extend(records.iter().map(|r| r.project.clone()));
    known.remove(UNMAPPED_PROJECT);

    let mut projects = vec![ALL_PROJECTS.to_string()];
    projects.extend(known);
    projects.push(UNMAPPED_PROJECT.to_string());

    let statuses: BTreeSet<&str> = records.iter().map(|r| r.status.as_str()).collect();
    let owners: BTreeSet<&str> = records.iter().map(|r| r.owner.as_str()).collect();

    FilterOptions {
        projects,
        statuses: std::iter::once(ALL_STATUSES)
            .chain(statuses)
            .map(str::to_string)
            .collect(),
        owners: std::iter::once(ALL_OWNERS)
            .chain(owners)
            .map(str::to_string)
            .collect(),
    }
}
