//! One dashboard refresh: date filter → normalize → filter options → matrix.
//!
//! Shared by the CLI and the HTTP handlers so both see the same view.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::analysis::{summarize, DashboardSummary};
use crate::config::ProjectsConfig;
use crate::matrix::{build_matrix, filter_options, filter_owner, FilterOptions, MatrixResult, Selection, DEFAULT_MAX_ROWS};
use crate::records::normalize::missing_fields;
use crate::records::project::ProjectCache;
use crate::records::{normalize, ExecutionRecord, NormalizeOptions, NormalizeReport, NormalizedRecord};
use crate::source::dates::{filter_by_date, DateSelection};
use crate::source::mapping::FlowMapping;

/// What the viewer asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    pub date: DateSelection,
    pub project: Selection,
    pub status: Selection,
    pub owner: Selection,
    pub max_rows: usize,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            date: DateSelection::Latest,
            project: Selection::All,
            status: Selection::All,
            owner: Selection::All,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Day shown; `None` when the source had no datable records.
    pub date: Option<NaiveDate>,
    pub report: NormalizeReport,
    /// Records of the day after the owner, project and status filters.
    pub records: Vec<NormalizedRecord>,
    /// Picker choices for the whole day, before any filter.
    pub options: FilterOptions,
    pub matrix: MatrixResult,
}

impl DashboardView {
    pub fn summary(&self) -> DashboardSummary {
        summarize(&self.records)
    }
}

/// Use the configured mapping, or one inferred from flow names when it is
/// empty and inference is enabled.
pub fn effective_mapping<'a>(
    mapping: &'a FlowMapping,
    raw: &[ExecutionRecord],
    projects: &ProjectsConfig,
) -> Cow<'a, FlowMapping> {
    if !mapping.is_empty() || !projects.infer_without_mapping {
        return Cow::Borrowed(mapping);
    }
    let mut cache = ProjectCache::new(projects.cache_capacity);
    let inferred = FlowMapping::inferred(raw.iter().filter_map(|r| r.flow_name.as_deref()), &mut cache);
    let (hits, misses) = cache.stats();
    info!(flows = inferred.len(), hits, misses, "inferred flow mapping from flow names");
    Cow::Owned(inferred)
}

pub fn assemble(
    raw: &[ExecutionRecord],
    mapping: &FlowMapping,
    options: NormalizeOptions,
    query: &DashboardQuery,
) -> DashboardView {
    let date = query.date.resolve(raw);
    // Without a usable start column (or date) there is nothing to select a
    // day from; hand the raw rows over so the report says why.
    let day = match date {
        Some(d) if missing_fields(raw).is_empty() => filter_by_date(raw, &DateSelection::On(d)),
        _ => raw.to_vec(),
    };

    let normalized = normalize(&day, Some(mapping), options);
    let picker = filter_options(&normalized.records, mapping);

    let owned = filter_owner(&normalized.records, &query.owner);
    let matrix = build_matrix(&owned, &query.project, &query.status, query.max_rows);
    let records: Vec<NormalizedRecord> = owned
        .into_iter()
        .filter(|r| query.project.matches(&r.project) && query.status.matches(&r.status))
        .collect();

    DashboardView {
        date,
        report: normalized.report,
        records,
        options: picker,
        matrix,
    }
}
