//! Occupancy grid for navigation
//!
//! A uniform lattice over a rectangular world region. Obstacle occupancy is
//! sampled once at construction and never changes afterwards, so a grid can be
//! shared read-only between any number of planners.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::physics::ObstacleQuery;

/// Integer lattice coordinate of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Column index
    pub x: usize,
    /// Row index (0 is the bottom row)
    pub y: usize,
}

impl Cell {
    /// Create a new cell coordinate
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance in cells
    #[must_use]
    pub fn manhattan(self, other: Self) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Whether `other` differs on both axes
    #[must_use]
    pub fn is_diagonal_to(self, other: Self) -> bool {
        self.x != other.x && self.y != other.y
    }
}

impl From<(usize, usize)> for Cell {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which cells count as adjacent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Left, right, down, up
    #[default]
    Four,
    /// Four-way plus diagonals
    Eight,
}

/// Immutable per-cell data owned by the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathNode {
    /// Whether the cell blocks traversal
    pub is_obstacle: bool,
    /// Center of the cell in world space
    pub world_position: Vec2,
}

/// Grid construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World-space center of the covered region
    pub center: Vec2,
    /// World-space width and height of the covered region
    pub extent: Vec2,
    /// Half the cell size; obstacles within this radius of a cell center block it
    pub cell_radius: f32,
    /// Neighbor topology used by the planner
    pub connectivity: Connectivity,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            extent: Vec2::new(100.0, 100.0),
            cell_radius: 0.5,
            connectivity: Connectivity::Four,
        }
    }
}

impl GridConfig {
    /// Set the covered region
    #[must_use]
    pub fn with_region(mut self, center: Vec2, extent: Vec2) -> Self {
        self.center = center;
        self.extent = extent;
        self
    }

    /// Set the cell radius (grid resolution)
    #[must_use]
    pub fn with_cell_radius(mut self, cell_radius: f32) -> Self {
        self.cell_radius = cell_radius;
        self
    }

    /// Set neighbor topology
    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }
}

/// Errors raised while constructing a grid
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Cell radius is not a positive finite number
    InvalidCellRadius(f32),
    /// Extent is degenerate or rounds to zero rows/columns
    InvalidDimensions(&'static str),
    /// Cell count does not fit in memory
    TooLarge {
        /// Requested columns
        columns: usize,
        /// Requested rows
        rows: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellRadius(r) => write!(f, "Invalid cell radius: {r}"),
            Self::InvalidDimensions(msg) => write!(f, "Invalid grid dimensions: {msg}"),
            Self::TooLarge { columns, rows } => {
                write!(f, "Grid too large: {columns}x{rows} cells")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// A 2D occupancy grid
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    columns: usize,
    rows: usize,
    cell_radius: f32,
    /// World position of the grid's bottom-left corner
    bottom_left: Vec2,
    connectivity: Connectivity,
    /// Row-major, `y * columns + x`
    nodes: Vec<PathNode>,
}

impl OccupancyGrid {
    /// Build a grid by sampling `query` once per cell
    ///
    /// # Errors
    ///
    /// Returns an error if the cell radius or extent is degenerate.
    pub fn build<Q: ObstacleQuery + ?Sized>(
        config: &GridConfig,
        query: &Q,
    ) -> Result<Self, GridError> {
        let diameter = validate_radius(config.cell_radius)? * 2.0;
        if !config.extent.is_finite() || !config.center.is_finite() {
            return Err(GridError::InvalidDimensions("extent and center must be finite"));
        }

        let columns = (config.extent.x / diameter).round();
        let rows = (config.extent.y / diameter).round();
        if columns < 1.0 || rows < 1.0 {
            return Err(GridError::InvalidDimensions(
                "extent rounds to zero rows or columns",
            ));
        }

        let bottom_left = config.center - config.extent * 0.5;
        let radius = config.cell_radius;
        let grid = Self::from_cells(
            bottom_left,
            columns as usize,
            rows as usize,
            radius,
            config.connectivity,
            |cell| {
                let center = bottom_left + cell_offset(cell, radius);
                query.overlaps_circle(center, radius)
            },
        )?;

        log::debug!(
            "Built {}x{} occupancy grid ({} obstacle cells, cell radius {})",
            grid.columns,
            grid.rows,
            grid.obstacle_count(),
            radius
        );
        Ok(grid)
    }

    /// Build a grid from a per-cell obstacle predicate
    ///
    /// # Errors
    ///
    /// Returns an error if the cell radius is degenerate or the size is zero.
    pub fn from_cells(
        bottom_left: Vec2,
        columns: usize,
        rows: usize,
        cell_radius: f32,
        connectivity: Connectivity,
        mut blocked: impl FnMut(Cell) -> bool,
    ) -> Result<Self, GridError> {
        validate_radius(cell_radius)?;
        if columns == 0 || rows == 0 {
            return Err(GridError::InvalidDimensions("grid must have at least one cell"));
        }
        let total = columns
            .checked_mul(rows)
            .filter(|&total| total <= isize::MAX as usize / size_of::<PathNode>())
            .ok_or(GridError::TooLarge { columns, rows })?;

        let mut nodes = Vec::with_capacity(total);
        for y in 0..rows {
            for x in 0..columns {
                let cell = Cell::new(x, y);
                nodes.push(PathNode {
                    is_obstacle: blocked(cell),
                    world_position: bottom_left + cell_offset(cell, cell_radius),
                });
            }
        }

        Ok(Self {
            columns,
            rows,
            cell_radius,
            bottom_left,
            connectivity,
            nodes,
        })
    }

    /// Width in cells
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Height in cells
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Half the cell size in world units
    #[must_use]
    pub fn cell_radius(&self) -> f32 {
        self.cell_radius
    }

    /// Cell size in world units
    #[must_use]
    pub fn cell_diameter(&self) -> f32 {
        self.cell_radius * 2.0
    }

    /// World position of the bottom-left corner
    #[must_use]
    pub fn bottom_left(&self) -> Vec2 {
        self.bottom_left
    }

    /// Neighbor topology
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Check whether a cell lies inside the grid
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.columns && cell.y < self.rows
    }

    /// Node data for a cell, `None` if out of bounds
    #[must_use]
    pub fn node(&self, cell: Cell) -> Option<&PathNode> {
        if self.contains(cell) {
            self.nodes.get(cell.y * self.columns + cell.x)
        } else {
            None
        }
    }

    /// Out-of-bounds cells count as obstacles
    #[must_use]
    pub fn is_obstacle(&self, cell: Cell) -> bool {
        self.node(cell).is_none_or(|node| node.is_obstacle)
    }

    /// Center of a cell in world space
    ///
    /// Cells outside the grid are clamped to the nearest edge cell.
    #[must_use]
    pub fn world_position_of(&self, cell: Cell) -> Vec2 {
        let clamped = Cell::new(cell.x.min(self.columns - 1), cell.y.min(self.rows - 1));
        self.bottom_left + cell_offset(clamped, self.cell_radius)
    }

    /// Resolve a world position to the cell containing it
    ///
    /// Positions outside the grid clamp to the nearest edge cell, so this is not
    /// lossless.
    #[must_use]
    pub fn cell_at(&self, world: Vec2) -> Cell {
        let local = (world - self.bottom_left) / self.cell_diameter();
        let index = |value: f32, count: usize| -> usize {
            // NaN saturates to zero in the cast
            value.floor().clamp(0.0, (count - 1) as f32) as usize
        };
        Cell::new(index(local.x, self.columns), index(local.y, self.rows))
    }

    /// In-bounds adjacent cells, obstacles included
    ///
    /// Order is left, right, down, up, then (eight-way only) down-left,
    /// down-right, up-left, up-right. The planner's tie-breaking depends on it.
    #[must_use]
    pub fn neighbors(&self, cell: Cell) -> SmallVec<[Cell; 8]> {
        let mut result = SmallVec::new();
        let Cell { x, y } = cell;
        let left = x > 0;
        let right = x + 1 < self.columns;
        let down = y > 0;
        let up = y + 1 < self.rows;

        if left {
            result.push(Cell::new(x - 1, y));
        }
        if right {
            result.push(Cell::new(x + 1, y));
        }
        if down {
            result.push(Cell::new(x, y - 1));
        }
        if up {
            result.push(Cell::new(x, y + 1));
        }

        if self.connectivity == Connectivity::Eight {
            if down && left {
                result.push(Cell::new(x - 1, y - 1));
            }
            if down && right {
                result.push(Cell::new(x + 1, y - 1));
            }
            if up && left {
                result.push(Cell::new(x - 1, y + 1));
            }
            if up && right {
                result.push(Cell::new(x + 1, y + 1));
            }
        }

        result
    }

    /// Number of obstacle cells
    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_obstacle).count()
    }
}

impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "OccupancyGrid ({}x{}, cell diameter: {:.3})",
            self.columns,
            self.rows,
            self.cell_diameter()
        )?;
        for y in (0..self.rows).rev() {
            for x in 0..self.columns {
                let symbol = if self.is_obstacle(Cell::new(x, y)) { '#' } else { '.' };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn validate_radius(cell_radius: f32) -> Result<f32, GridError> {
    if cell_radius.is_finite() && cell_radius > 0.0 {
        Ok(cell_radius)
    } else {
        Err(GridError::InvalidCellRadius(cell_radius))
    }
}

/// Offset of a cell's center from the bottom-left corner
fn cell_offset(cell: Cell, radius: f32) -> Vec2 {
    let diameter = radius * 2.0;
    Vec2::new(
        cell.x as f32 * diameter + radius,
        cell.y as f32 * diameter + radius,
    )
}
