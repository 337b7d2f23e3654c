//! Flow → project lookup table.
//!
//! Loaded from a JSON object keyed by exact flow name:
//!
//! ```json
//! { "Finance - Daily Report": { "project": "Finance", "type": "Report", "uow_type": "Daily", "owner": "Finance Ops" } }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::SourceError;
use crate::records::project::ProjectCache;

/// Metadata for one mapped flow. Only `project` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowInfo {
    pub project: String,
    #[serde(default, rename = "type")]
    pub flow_type: Option<String>,
    #[serde(default)]
    pub uow_type: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl FlowInfo {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            flow_type: None,
            uow_type: None,
            owner: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowMapping {
    entries: HashMap<String, FlowInfo>,
}

impl FlowMapping {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mapping = Self::from_json(&content).map_err(|source| SourceError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), flows = mapping.len(), "loaded flow mapping");
        Ok(mapping)
    }

    /// Load the mapping, degrading to an empty table when the file is
    /// missing or malformed.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(mapping) => mapping,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "flow mapping unavailable, flows will be unmapped");
                Self::default()
            }
        }
    }

    /// Build a mapping by running the project heuristic over flow names.
    pub fn inferred<'a>(flow_names: impl IntoIterator<Item = &'a str>, cache: &mut ProjectCache) -> Self {
        let mut entries = HashMap::new();
        for name in flow_names {
            let key = name.trim();
            if key.is_empty() || entries.contains_key(key) {
                continue;
            }
            let project = cache.project_for(Some(key));
            entries.insert(key.to_string(), FlowInfo::new(&project));
        }
        Self { entries }
    }

    /// Project for a flow, looked up by the trimmed, case-sensitive name.
    pub fn project_for(&self, flow_name: &str) -> Option<&str> {
        self.entries.get(flow_name.trim()).map(|info| info.project.as_str())
    }

    pub fn get(&self, flow_name: &str) -> Option<&FlowInfo> {
        self.entries.get(flow_name.trim())
    }

    /// Sorted distinct project labels.
    pub fn projects(&self) -> Vec<String> {
        self.entries
            .values()
            .map(|info| info.project.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, FlowInfo)> for FlowMapping {
    fn from_iter<I: IntoIterator<Item = (String, FlowInfo)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPING_JSON: &str = r#"{
        "Finance - Daily Report": { "project": "Finance", "type": "Report", "uow_type": "Daily", "owner": "Finance Ops" },
        "AMZ_Invoice_Processor": { "project": "Amazon", "type": "Batch", "uow_type": "Invoice" },
        "Payroll Export": { "project": "Finance" }
    }"#;

    #[test]
    fn test_parse_and_lookup() {
        let mapping = FlowMapping::from_json(MAPPING_JSON).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.project_for("  AMZ_Invoice_Processor "), Some("Amazon"));
        assert_eq!(mapping.project_for("amz_invoice_processor"), None);
        assert_eq!(mapping.get("Finance - Daily Report").unwrap().flow_type.as_deref(), Some("Report"));
        assert_eq!(mapping.projects(), vec!["Amazon".to_string(), "Finance".to_string()]);
    }

    #[test]
    fn test_load_or_empty_degrades() {
        let dir = tempfile::TempDir::new().unwrap();

        let missing = FlowMapping::load_or_empty(&dir.path().join("absent.json"));
        assert!(missing.is_empty());

        let broken_path = dir.path().join("broken.json");
        std::fs::write(&broken_path, "{ not json").unwrap();
        assert!(FlowMapping::load(&broken_path).is_err());
        assert!(FlowMapping::load_or_empty(&broken_path).is_empty());

        let good_path = dir.path().join("flow_mapping.json");
        std::fs::write(&good_path, MAPPING_JSON).unwrap();
        assert_eq!(FlowMapping::load_or_empty(&good_path).len(), 3);
    }

    #[test]
    fn test_inferred_mapping_uses_heuristic() {
        let mut cache = ProjectCache::new(16);
        let mapping = FlowMapping::inferred(
            ["AMZ_Invoice_Processor", "Finance - Daily Report", "AMZ_Invoice_Processor", " "],
            &mut cache,
        );
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.project_for("AMZ_Invoice_Processor"), Some("AMZ"));
        assert_eq!(mapping.project_for("Finance - Daily Report"), Some("Finance"));
    }
}
