//! Debug and statistics module

use std::collections::VecDeque;

use crate::ai::{ReplanReport, SearchStatus};

/// Path search statistics tracker
#[derive(Debug)]
pub struct NavStats {
    /// Expansion counts of recent searches
    expansions: VecDeque<usize>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Average expansions per search over the window
    avg_nodes_expanded: f32,
    /// Largest expansion count in the window
    max_nodes_expanded: usize,
    /// Total searches recorded
    total_searches: u64,
    /// Searches that produced a path
    paths_found: u64,
    /// Searches that ended without a path
    failed_searches: u64,
}

impl NavStats {
    /// Create a new search stats tracker
    pub fn new() -> Self {
        Self {
            expansions: VecDeque::with_capacity(120),
            max_samples: 120,
            avg_nodes_expanded: 0.0,
            max_nodes_expanded: 0,
            total_searches: 0,
            paths_found: 0,
            failed_searches: 0,
        }
    }

    /// Record the outcome of one re-plan
    pub fn record(&mut self, report: &ReplanReport) {
        self.total_searches += 1;
        if report.status.has_path() {
            self.paths_found += 1;
        } else {
            self.failed_searches += 1;
        }

        // Same-cell requests never search
        if report.status == SearchStatus::SameCell {
            return;
        }

        if self.expansions.len() >= self.max_samples {
            self.expansions.pop_front();
        }
        self.expansions.push_back(report.nodes_expanded);

        self.update_stats();
    }

    fn update_stats(&mut self) {
        if self.expansions.is_empty() {
            return;
        }

        let total: usize = self.expansions.iter().sum();
        self.avg_nodes_expanded = total as f32 / self.expansions.len() as f32;
        self.max_nodes_expanded = self.expansions.iter().copied().max().unwrap_or(0);
    }

    /// Get average expansions per search
    pub fn avg_nodes_expanded(&self) -> f32 {
        self.avg_nodes_expanded
    }

    /// Get the largest expansion count in the window
    pub fn max_nodes_expanded(&self) -> usize {
        self.max_nodes_expanded
    }

    /// Get total searches recorded
    pub fn total_searches(&self) -> u64 {
        self.total_searches
    }

    /// Get searches that produced a path
    pub fn paths_found(&self) -> u64 {
        self.paths_found
    }

    /// Get searches that ended without a path
    pub fn failed_searches(&self) -> u64 {
        self.failed_searches
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "Searches: {} ({} failed) | Expanded: {:.1} avg, {} max",
            self.total_searches,
            self.failed_searches,
            self.avg_nodes_expanded,
            self.max_nodes_expanded
        )
    }
}

impl Default for NavStats {
    fn default() -> Self {
        Self::new()
    }
}
