//! Summary table cache
//!
//! Holds the last computed summary table for display. The owner invalidates
//! it whenever a new upload changes the underlying summaries, and the next
//! read recomputes it.

use super::summary::ScenarioSummary;

/// Cached summary table with an explicit invalidation generation
#[derive(Debug, Default)]
pub struct SummaryCache {
    generation: u64,
    table: Option<Vec<ScenarioSummary>>,
    computed_at: Option<u64>,
}

impl SummaryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached table; the next read recomputes it
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.table = None;
    }

    /// Number of invalidations so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a table is cached for the current generation
    pub fn is_fresh(&self) -> bool {
        self.table.is_some() && self.computed_at == Some(self.generation)
    }

    /// The cached table, computing it with `compute` when stale
    pub fn get_or_compute<F>(&mut self, compute: F) -> &[ScenarioSummary]
    where
        F: FnOnce() -> Vec<ScenarioSummary>,
    {
        if !self.is_fresh() {
            self.table = Some(compute());
            self.computed_at = Some(self.generation);
        }
        self.table.as_deref().unwrap_or_default()
    }

    /// The cached table, if fresh
    pub fn peek(&self) -> Option<&[ScenarioSummary]> {
        if self.is_fresh() {
            self.table.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::summary::SummaryKpis;
    use crate::types::SimulationId;

    fn summary(name: &str) -> ScenarioSummary {
        ScenarioSummary {
            name: name.to_string(),
            simulation_id: SimulationId::new("S"),
            run_id: None,
            run_count: Some(1),
            lift_count: 2,
            floor_count: 3,
            peak_clock: "00:00:00".to_string(),
            kpis: SummaryKpis::default(),
        }
    }

    #[test]
    fn test_computes_once_per_generation() {
        let mut cache = SummaryCache::new();
        let mut calls = 0;

        cache.get_or_compute(|| {
            calls += 1;
            vec![summary("a")]
        });
        cache.get_or_compute(|| {
            calls += 1;
            vec![summary("b")]
        });
        assert_eq!(calls, 1);
        assert_eq!(cache.peek().map(|t| t[0].name.as_str()), Some("a"));
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let mut cache = SummaryCache::new();
        cache.get_or_compute(|| vec![summary("a")]);
        cache.invalidate();

        assert!(!cache.is_fresh());
        assert!(cache.peek().is_none());
        assert_eq!(cache.generation(), 1);

        let table = cache.get_or_compute(|| vec![summary("b"), summary("c")]);
        assert_eq!(table.len(), 2);
    }
}
