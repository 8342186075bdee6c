//! Square grid of breeds.

use rps_core::{Breed, Position};

/// A `size x size` grid stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Breed>,
}

impl Grid {
    /// Grid filled with `fill`. Callers validate `size` first.
    pub(crate) fn filled(size: usize, fill: Breed) -> Self {
        Self {
            size,
            cells: vec![fill; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get breed at an in-bounds position
    pub fn get(&self, pos: Position) -> Breed {
        self.cells[self.pos_to_index(pos)]
    }

    /// Set breed at position, returning the previous occupant
    pub fn replace(&mut self, pos: Position, breed: Breed) -> Breed {
        let index = self.pos_to_index(pos);
        std::mem::replace(&mut self.cells[index], breed)
    }

    pub fn swap(&mut self, a: Position, b: Position) {
        let a = self.pos_to_index(a);
        let b = self.pos_to_index(b);
        self.cells.swap(a, b);
    }

    /// Row-major view of every cell
    pub fn cells(&self) -> &[Breed] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Breed] {
        &mut self.cells
    }

    pub fn row(&self, row: usize) -> &[Breed] {
        let start = row * self.size;
        &self.cells[start..start + self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Breed]> + '_ {
        self.cells.chunks(self.size)
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        debug_assert!(pos.in_bounds(self.size as i32), "{:?} out of bounds", pos);
        pos.row as usize * self.size + pos.col as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let row = (index / self.size) as i32;
        let col = (index % self.size) as i32;
        Position::new(row, col)
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, Breed)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &breed)| (self.index_to_pos(i), breed))
    }
}
