//! Grid geometry: positions, directions and neighbor topology.

use serde::{Deserialize, Serialize};

/// Cell coordinates on a square grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn add(&self, drow: i32, dcol: i32) -> Self {
        Self {
            row: self.row + drow,
            col: self.col + dcol,
        }
    }

    /// Apply toroidal wrapping for a `size x size` grid
    pub fn wrap(&self, size: i32) -> Self {
        Self {
            row: ((self.row % size) + size) % size,
            col: ((self.col % size) + size) % size,
        }
    }

    pub fn in_bounds(&self, size: i32) -> bool {
        (0..size).contains(&self.row) && (0..size).contains(&self.col)
    }
}

/// Direction from a cell to one of its neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    East,
    South,
    West,
    North,
    SouthEast,
    SouthWest,
    NorthWest,
    NorthEast,
}

impl Direction {
    /// `(drow, dcol)` offset
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::North => (-1, 0),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (-1, 1),
        }
    }

    pub const ALL: [Direction; 8] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    /// Orthogonal directions only.
    pub const CARDINAL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    pub fn all() -> [Direction; 8] {
        Self::ALL
    }
}

/// Which cells count as adjacent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// Orthogonal neighbors only.
    #[default]
    VonNeumann,
    /// Orthogonal and diagonal neighbors.
    Moore,
}

impl Neighborhood {
    pub fn directions(&self) -> &'static [Direction] {
        match self {
            Neighborhood::VonNeumann => &Direction::CARDINAL,
            Neighborhood::Moore => &Direction::ALL,
        }
    }
}

/// How neighbors past the grid edge are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Edges wrap around; every cell has a full neighbor set.
    #[default]
    Wrap,
    /// Out-of-bounds neighbors are dropped.
    Clamp,
}

/// Neighbor selection rule for a square grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    pub neighborhood: Neighborhood,
    pub edges: EdgePolicy,
}

impl Topology {
    pub fn new(neighborhood: Neighborhood, edges: EdgePolicy) -> Self {
        Self { neighborhood, edges }
    }

    /// Neighbors of `pos` on a `size x size` grid, in [`Direction`] order.
    ///
    /// With [`EdgePolicy::Wrap`] on very small grids a neighbor may be `pos`
    /// itself or repeat; that is intended.
    pub fn neighbors(&self, pos: Position, size: i32) -> Neighbors {
        let mut neighbors = Neighbors::default();
        for direction in self.neighborhood.directions() {
            let (drow, dcol) = direction.to_delta();
            let candidate = pos.add(drow, dcol);
            match self.edges {
                EdgePolicy::Wrap => neighbors.push(candidate.wrap(size)),
                EdgePolicy::Clamp if candidate.in_bounds(size) => neighbors.push(candidate),
                EdgePolicy::Clamp => {}
            }
        }
        neighbors
    }
}

/// Fixed-capacity neighbor list; avoids allocating on every step.
#[derive(Debug, Clone, Copy)]
pub struct Neighbors {
    items: [Position; 8],
    len: usize,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self {
            items: [Position::new(0, 0); 8],
            len: 0,
        }
    }
}

impl Neighbors {
    fn push(&mut self, pos: Position) {
        self.items[self.len] = pos;
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<Position> {
        self.as_slice().get(index).copied()
    }

    pub fn as_slice(&self) -> &[Position] {
        &self.items[..self.len]
    }
}
