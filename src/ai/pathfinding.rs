//! A* pathfinding on an occupancy grid
//!
//! Search metadata lives in a per-call scratch map keyed by cell, never on the
//! shared grid, so any number of searches can run against one grid at once.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Connectivity, OccupancyGrid};

/// Orthogonal step cost under eight-way movement
const STRAIGHT_COST: u32 = 10;
/// Diagonal step cost under eight-way movement (10 * sqrt 2, rounded)
const DIAGONAL_COST: u32 = 14;

/// Planner tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Upper bound on closed nodes per search
    pub max_expansions: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: 16_384,
        }
    }
}

impl PlannerConfig {
    /// Set the expansion bound
    #[must_use]
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }
}

/// An ordered list of waypoints from the cell after the start through the target
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec2>,
    cells: Vec<Cell>,
}

impl Path {
    fn new(waypoints: Vec<Vec2>, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(waypoints.len(), cells.len());
        Self { waypoints, cells }
    }

    /// Waypoints in world coordinates
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Grid cells matching each waypoint
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Waypoint at `index`, `None` past the end
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// Final waypoint
    #[must_use]
    pub fn last(&self) -> Option<Vec2> {
        self.waypoints.last().copied()
    }

    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Check if there are no waypoints
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Total world-space length from the given start through every waypoint
    #[must_use]
    pub fn length_from(&self, start: Vec2) -> f32 {
        let mut length = 0.0;
        let mut previous = start;
        for &waypoint in &self.waypoints {
            length += waypoint.distance(previous);
            previous = waypoint;
        }
        length
    }
}

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// Target reached
    Found,
    /// Start and target share a cell; no search was run
    SameCell,
    /// Open set exhausted, or the target cell is an obstacle
    Unreachable,
    /// Gave up after the configured number of expansions
    ExpansionLimit,
}

impl SearchStatus {
    /// Whether a path was produced
    #[must_use]
    pub fn has_path(self) -> bool {
        matches!(self, Self::Found | Self::SameCell)
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Found => "found",
            Self::SameCell => "same cell",
            Self::Unreachable => "unreachable",
            Self::ExpansionLimit => "expansion limit",
        };
        f.write_str(name)
    }
}

/// Result of a search with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    /// Outcome
    pub status: SearchStatus,
    /// The path, when one was found
    pub path: Option<Path>,
    /// Number of nodes closed
    pub nodes_expanded: usize,
    /// Accumulated move cost of the path
    pub total_cost: Option<u32>,
}

impl SearchReport {
    fn without_path(status: SearchStatus, nodes_expanded: usize) -> Self {
        Self {
            status,
            path: None,
            nodes_expanded,
            total_cost: None,
        }
    }

    /// Consume the report, keeping only the path
    #[must_use]
    pub fn into_path(self) -> Option<Path> {
        self.path
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "SearchReport {{ status: {}, waypoints: {}, cost: {}, expanded: {} }}",
                self.status,
                path.len(),
                self.total_cost.unwrap_or(0),
                self.nodes_expanded
            ),
            None => write!(
                f,
                "SearchReport {{ status: {}, expanded: {} }}",
                self.status, self.nodes_expanded
            ),
        }
    }
}

/// Per-search bookkeeping for one cell
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    g_cost: u32,
    h_cost: u32,
    parent: Option<Cell>,
    /// Order of first entry into the open set
    open_seq: u64,
    closed: bool,
}

impl SearchNode {
    fn f_cost(&self) -> u32 {
        self.g_cost + self.h_cost
    }
}

/// Open-set heap entry
///
/// Ordered by lowest f, then lowest h, then earliest first insertion. This is
/// the order a linear scan over an insertion-ordered open list produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f_cost: u32,
    h_cost: u32,
    seq: u64,
    cell: Cell,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* path planner bound to a shared grid
#[derive(Debug, Clone)]
pub struct PathPlanner {
    grid: Arc<OccupancyGrid>,
    config: PlannerConfig,
}

impl PathPlanner {
    /// Create a planner over `grid`
    #[must_use]
    pub fn new(grid: Arc<OccupancyGrid>, config: PlannerConfig) -> Self {
        Self { grid, config }
    }

    /// The grid this planner searches
    #[must_use]
    pub fn grid(&self) -> &Arc<OccupancyGrid> {
        &self.grid
    }

    /// Planner tuning
    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Find a path between two world positions
    ///
    /// Returns `None` when the target cannot be reached.
    #[must_use]
    pub fn find_path(&self, start: Vec2, target: Vec2) -> Option<Path> {
        self.search(start, target).into_path()
    }

    /// Find a path and report search metadata
    #[must_use]
    pub fn search(&self, start: Vec2, target: Vec2) -> SearchReport {
        self.search_with(start, target, |_, _| {})
    }

    fn search_with(
        &self,
        start: Vec2,
        target: Vec2,
        mut on_expand: impl FnMut(Cell, &SearchNode),
    ) -> SearchReport {
        let grid = &*self.grid;
        let start_cell = grid.cell_at(start);
        let target_cell = grid.cell_at(target);

        if start_cell == target_cell {
            return SearchReport {
                status: SearchStatus::SameCell,
                path: Some(Path::new(vec![target], vec![target_cell])),
                nodes_expanded: 0,
                total_cost: Some(0),
            };
        }

        if grid.is_obstacle(target_cell) {
            log::debug!("Target cell {target_cell} is an obstacle");
            return SearchReport::without_path(SearchStatus::Unreachable, 0);
        }

        let eight_way = grid.connectivity() == Connectivity::Eight;
        let heuristic = |cell: Cell| distance(cell, target_cell, eight_way);

        let mut scratch: FxHashMap<Cell, SearchNode> = FxHashMap::default();
        let mut open_set = BinaryHeap::new();
        let mut next_seq = 0_u64;
        let mut nodes_expanded = 0;

        let start_node = SearchNode {
            g_cost: 0,
            h_cost: heuristic(start_cell),
            parent: None,
            open_seq: next_seq,
            closed: false,
        };
        next_seq += 1;
        scratch.insert(start_cell, start_node);
        open_set.push(OpenEntry {
            f_cost: start_node.f_cost(),
            h_cost: start_node.h_cost,
            seq: start_node.open_seq,
            cell: start_cell,
        });

        while let Some(entry) = open_set.pop() {
            let current = match scratch.get_mut(&entry.cell) {
                Some(node) if !node.closed && node.f_cost() == entry.f_cost => {
                    node.closed = true;
                    *node
                }
                // Superseded by a cheaper entry, or already closed
                _ => continue,
            };
            nodes_expanded += 1;
            on_expand(entry.cell, &current);

            if entry.cell == target_cell {
                let path = reconstruct_path(grid, &scratch, target_cell);
                return SearchReport {
                    status: SearchStatus::Found,
                    path: Some(path),
                    nodes_expanded,
                    total_cost: Some(current.g_cost),
                };
            }

            if nodes_expanded >= self.config.max_expansions {
                log::warn!(
                    "Search from {start_cell} to {target_cell} stopped after {nodes_expanded} expansions"
                );
                return SearchReport::without_path(SearchStatus::ExpansionLimit, nodes_expanded);
            }

            for neighbor in grid.neighbors(entry.cell) {
                if grid.is_obstacle(neighbor) || cuts_corner(grid, entry.cell, neighbor) {
                    continue;
                }

                let tentative_g = current.g_cost + distance(entry.cell, neighbor, eight_way);
                let node = match scratch.get_mut(&neighbor) {
                    Some(node) if node.closed || tentative_g >= node.g_cost => continue,
                    Some(node) => {
                        node.g_cost = tentative_g;
                        node.parent = Some(entry.cell);
                        *node
                    }
                    None => {
                        let node = SearchNode {
                            g_cost: tentative_g,
                            h_cost: heuristic(neighbor),
                            parent: Some(entry.cell),
                            open_seq: next_seq,
                            closed: false,
                        };
                        next_seq += 1;
                        scratch.insert(neighbor, node);
                        node
                    }
                };

                open_set.push(OpenEntry {
                    f_cost: node.f_cost(),
                    h_cost: node.h_cost,
                    seq: node.open_seq,
                    cell: neighbor,
                });
            }
        }

        log::debug!(
            "No path from {start_cell} to {target_cell} ({nodes_expanded} nodes expanded)"
        );
        SearchReport::without_path(SearchStatus::Unreachable, nodes_expanded)
    }
}

/// Step and heuristic cost between two cells
///
/// Manhattan for four-way movement, octile with 10/14 weights for eight-way.
fn distance(a: Cell, b: Cell, eight_way: bool) -> u32 {
    let dx = a.x.abs_diff(b.x) as u32;
    let dy = a.y.abs_diff(b.y) as u32;
    if eight_way {
        let (low, high) = if dx < dy { (dx, dy) } else { (dy, dx) };
        DIAGONAL_COST * low + STRAIGHT_COST * (high - low)
    } else {
        dx + dy
    }
}

/// A diagonal step may not squeeze between two blocked orthogonal cells
fn cuts_corner(grid: &OccupancyGrid, from: Cell, to: Cell) -> bool {
    from.is_diagonal_to(to)
        && (grid.is_obstacle(Cell::new(to.x, from.y)) || grid.is_obstacle(Cell::new(from.x, to.y)))
}

/// Walk parents back from the target, then reverse; the start cell is dropped
fn reconstruct_path(
    grid: &OccupancyGrid,
    scratch: &FxHashMap<Cell, SearchNode>,
    target: Cell,
) -> Path {
    let mut cells = Vec::new();
    let mut current = target;
    while let Some(parent) = scratch.get(&current).and_then(|node| node.parent) {
        cells.push(current);
        current = parent;
    }
    cells.reverse();

    let waypoints = cells
        .iter()
        .map(|&cell| grid.world_position_of(cell))
        .collect();
    Path::new(waypoints, cells)
}
