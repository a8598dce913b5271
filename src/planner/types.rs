//! Pathfinding types.

use serde::Deserialize;
use std::cmp::Ordering;
use thiserror::Error;

use crate::config::constants::MAX_SEARCH_ITERATIONS;
use crate::geometry::{Coordinate, GeometryError, Heading};

fn default_max_iterations() -> usize {
    MAX_SEARCH_ITERATIONS
}

/// Pathfinding configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of nodes to expand before giving up
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

impl SearchConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// A node close to the goal was reached
    GoalFound,
    /// Every reachable state was expanded without reaching the goal
    Exhausted,
    /// The iteration ceiling was hit first
    IterationLimit,
}

/// Result of a single outbound search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub status: SearchStatus,
    /// Headings from start to goal (empty unless the goal was found)
    pub headings: Vec<Heading>,
    /// Number of nodes expanded during search
    pub nodes_expanded: usize,
}

impl SearchResult {
    pub(super) fn failed(status: SearchStatus, nodes_expanded: usize) -> Self {
        Self {
            status,
            headings: Vec::new(),
            nodes_expanded,
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == SearchStatus::GoalFound
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid input coordinate: {0}")]
    InvalidCoordinate(#[from] GeometryError),
    #[error("region {name:?} has an out-of-range vertex: {source}")]
    InvalidRegion {
        name: String,
        #[source]
        source: GeometryError,
    },
    #[error("no path found ({0:?})")]
    NoPath(SearchStatus),
    #[error("outbound path is empty")]
    EmptyPath,
}

impl PlanError {
    /// True when planning failed because there is no flight to make, as
    /// opposed to bad input.
    pub fn is_no_path(&self) -> bool {
        matches!(self, PlanError::NoPath(_) | PlanError::EmptyPath)
    }
}

/// A search node, stored in the search arena and linked to its parent by index.
#[derive(Debug, Clone)]
pub(super) struct MoveNode {
    pub position: Coordinate,
    pub parent: Option<usize>,
    /// Heading that produced this node from its parent (`None` for the start)
    pub heading: Option<Heading>,
    /// Whether the path up to and including this node has been outside the
    /// central region
    pub has_exited_central: bool,
}

/// Open set entry, ordered so `BinaryHeap` pops the lowest score first and
/// breaks ties by insertion order.
#[derive(Debug, Clone, Copy)]
pub(super) struct OpenEntry {
    pub score: f64,
    pub sequence: u64,
    pub node: usize,
}

impl Eq for OpenEntry {}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
