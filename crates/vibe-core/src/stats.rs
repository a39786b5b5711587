use crate::aggregate::aggregate;
use crate::config::TOP_TECH_LIMIT;
use crate::store::AnalyticsStore;
use crate::types::{ProgressStatus, ProjectProgress, ProjectRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ---------------------------------------------------------------------------
// StatsSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Number of tracked records.
    pub total: usize,
    pub complete: usize,
    pub in_progress: usize,
    pub paused: usize,
    /// Most used technologies, most popular first.
    pub top_tech: Vec<(String, usize)>,
    pub type_counts: BTreeMap<String, usize>,
    pub projects: Vec<ProjectProgress>,
}

/// Load the store once and summarize it.
pub fn get_stats_summary(store: &AnalyticsStore) -> StatsSummary {
    let doc = store.load();
    let progress = aggregate(&doc.projects, store.sink());
    summarize(&doc.projects, progress)
}

pub fn summarize(records: &[ProjectRecord], progress: Vec<ProjectProgress>) -> StatsSummary {
    let count = |status: ProgressStatus| {
        progress
            .iter()
            .filter(|p| p.snapshot.status == status)
            .count()
    };

    let mut top_tech = tech_frequency(records);
    top_tech.truncate(TOP_TECH_LIMIT);

    StatsSummary {
        total: records.len(),
        complete: count(ProgressStatus::Complete),
        in_progress: count(ProgressStatus::InProgress),
        paused: count(ProgressStatus::Paused),
        top_tech,
        type_counts: type_frequency(records),
        projects: progress,
    }
}

// ---------------------------------------------------------------------------
// Frequency tables
// ---------------------------------------------------------------------------

/// The main technology of a stack entry: `"Node.js + Express"` -> `"Node.js"`.
/// Empty values and the literal `"None"` carry no technology.
pub fn main_tech(value: &str) -> Option<&str> {
    if value.is_empty() || value == "None" {
        return None;
    }
    Some(value.split('+').next().unwrap_or(value).trim())
}

/// Every technology with its count, descending. Ties keep first-encounter
/// order across records and within each record's stack.
pub fn tech_frequency(records: &[ProjectRecord]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tech in records
        .iter()
        .flat_map(|r| r.stack_entries())
        .filter_map(|(_, value)| main_tech(value))
    {
        match index.get(tech) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(tech.to_string(), counts.len());
                counts.push((tech.to_string(), 1));
            }
        }
    }

    // sort_by is stable, so equal counts stay in encounter order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn type_frequency(records: &[ProjectRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for t in records.iter().flat_map(|r| r.types()) {
        *counts.entry(t).or_insert(0) += 1;
    }
    counts
}
