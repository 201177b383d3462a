//! Upload catalog
//!
//! A per-simulation overview of what a parsed log contains, used to let the
//! uploader verify a file before its runs are processed.

use super::ParsedLog;
use crate::types::SimulationId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Overview of one simulation in a parsed log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Simulation id
    pub simulation_id: SimulationId,
    /// Distinct runs with at least one section
    pub run_count: usize,
    /// Distinct category tags, sorted
    pub categories: Vec<String>,
    /// Lifts in the simulation (0 when no lift section was seen)
    pub lift_count: usize,
    /// `categories × runs`
    pub log_count: usize,
}

/// Catalog entries for every simulation, in first-seen order
pub fn summarize_catalog(parsed: &ParsedLog) -> Vec<CatalogEntry> {
    let mut order: Vec<&SimulationId> = Vec::new();
    for entry in &parsed.entries {
        if !order.contains(&&entry.simulation_id) {
            order.push(&entry.simulation_id);
        }
    }

    order
        .into_iter()
        .map(|simulation_id| {
            let entries: Vec<_> =
                parsed.entries.iter().filter(|e| &e.simulation_id == simulation_id).collect();

            let runs: BTreeSet<_> = entries.iter().map(|e| &e.run_id).collect();
            let categories: BTreeSet<String> =
                entries.iter().map(|e| e.category.tag().to_string()).collect();
            let lift_count = entries.iter().find_map(|e| e.lift_count).unwrap_or(0);

            CatalogEntry {
                simulation_id: simulation_id.clone(),
                run_count: runs.len(),
                log_count: categories.len() * runs.len(),
                categories: categories.into_iter().collect(),
                lift_count,
            }
        })
        .collect()
}

/// Totals across a catalog, for the verification statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CatalogTotals {
    /// Simulations
    pub scenario_count: usize,
    /// Runs across all simulations
    pub run_count: usize,
    /// Smallest lift count
    pub min_lift_count: usize,
    /// Largest lift count
    pub max_lift_count: usize,
    /// Sections across all simulations
    pub log_count: usize,
}

impl CatalogTotals {
    /// Fold catalog entries into totals
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        Self {
            scenario_count: entries.len(),
            run_count: entries.iter().map(|e| e.run_count).sum(),
            min_lift_count: entries.iter().map(|e| e.lift_count).min().unwrap_or(0),
            max_lift_count: entries.iter().map(|e| e.lift_count).max().unwrap_or(0),
            log_count: entries.iter().map(|e| e.log_count).sum(),
        }
    }

    /// One-line statement, e.g. `2 Scenarios | 5 Runs | Lifts: 4 to 6 | Total Logs: 10`
    pub fn statement(&self) -> String {
        format!(
            "{} Scenarios | {} Runs | Lifts: {} to {} | Total Logs: {}",
            self.scenario_count,
            self.run_count,
            self.min_lift_count,
            self.max_lift_count,
            self.log_count
        )
    }
}
