//! Project-name extraction from free-form flow names.
//!
//! Used when no flow mapping is available. The rules form an ordered
//! cascade and the first rule that matches wins:
//!
//! 1. text before the first `" - "`
//! 2. text before the first `_`
//! 3. a leading CamelCase token (`^[A-Z][a-z]+`)
//! 4. the first word, if longer than two characters and capitalized
//! 5. the segment (split on `_`, whitespace, `-`) carrying a known short
//!    organizational identifier
//! 6. the first run of three or more letters
//! 7. `"Unknown"`

use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

pub const UNKNOWN_PROJECT: &str = "Unknown";

/// Checked in this order by rule 5.
const KNOWN_IDENTIFIERS: [&str; 8] = ["AMZ", "AWS", "C2D", "AZ", "WF", "PS", "VP", "BI"];

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

fn camel_lead_re() -> &'static Regex {
    static CAMEL_LEAD_RE: OnceLock<Regex> = OnceLock::new();
    CAMEL_LEAD_RE.get_or_init(|| Regex::new(r"^([A-Z][a-z]+)").expect("valid camel case regex"))
}

fn alpha_run_re() -> &'static Regex {
    static ALPHA_RUN_RE: OnceLock<Regex> = OnceLock::new();
    ALPHA_RUN_RE.get_or_init(|| Regex::new(r"[A-Za-z]{3,}").expect("valid alpha run regex"))
}

fn segment_split_re() -> &'static Regex {
    static SEGMENT_SPLIT_RE: OnceLock<Regex> = OnceLock::new();
    SEGMENT_SPLIT_RE.get_or_init(|| Regex::new(r"[_\s-]").expect("valid segment split regex"))
}

/// Derive a project label from a flow name. Never fails; blank or absent
/// names yield `"Unknown"`.
pub fn extract_project(flow_name: Option<&str>) -> String {
    let Some(name) = flow_name.map(str::trim).filter(|n| !n.is_empty()) else {
        return UNKNOWN_PROJECT.to_string();
    };

    if let Some((head, _)) = name.split_once(" - ") {
        return head.trim().to_string();
    }

    if let Some((head, _)) = name.split_once('_') {
        return head.trim().to_string();
    }

    if let Some(lead) = camel_lead_re().captures(name).and_then(|c| c.get(1)) {
        return lead.as_str().to_string();
    }

    if let Some(word) = name.split_whitespace().next() {
        let capitalized = word.chars().next().is_some_and(char::is_uppercase);
        if word.chars().count() > 2 && capitalized {
            return word.to_string();
        }
    }

    let upper = name.to_uppercase();
    for identifier in KNOWN_IDENTIFIERS {
        if !upper.contains(identifier) {
            continue;
        }
        if let Some(segment) = segment_split_re()
            .split(name)
            .find(|segment| segment.to_uppercase().contains(identifier))
        {
            return segment.to_string();
        }
    }

    if let Some(run) = alpha_run_re().find(name) {
        return run.as_str().to_string();
    }

    UNKNOWN_PROJECT.to_string()
}

/// Bounded memo for [`extract_project`], owned by the caller.
///
/// Keyed by the exact input string. When full, the oldest entry is evicted.
#[derive(Debug)]
pub struct ProjectCache {
    capacity: usize,
    entries: HashMap<String, String>,
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

impl Default for ProjectCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ProjectCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.min(DEFAULT_CACHE_CAPACITY)),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Extract the project for `flow_name`, reusing a cached answer when present.
    pub fn project_for(&mut self, flow_name: Option<&str>) -> String {
        let Some(name) = flow_name else {
            return UNKNOWN_PROJECT.to_string();
        };

        if let Some(project) = self.entries.get(name) {
            self.hits += 1;
            return project.clone();
        }

        self.misses += 1;
        let project = extract_project(Some(name));
        if self.capacity == 0 {
            return project;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(name.to_string(), project.clone());
        self.order.push_back(name.to_string());
        project
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// (hits, misses) since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
