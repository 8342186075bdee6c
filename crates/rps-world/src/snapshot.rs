//! Persistable terrain state.

use rps_core::{Breed, BreedCounts, Error, Result};
use serde::{Deserialize, Serialize};

/// Flat copy of a terrain's grid, counts and iteration counter.
///
/// `cells` holds one breed index per cell in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainSnapshot {
    pub size: usize,
    pub cells: Vec<u8>,
    pub counts: [u64; Breed::COUNT],
    pub iterations: u64,
}

impl TerrainSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Decode cells and counts for a terrain of side `size`, checking that
    /// the snapshot describes a consistent state of that shape.
    pub(crate) fn decode(&self, size: usize) -> Result<(Vec<Breed>, BreedCounts)> {
        if self.size != size {
            return Err(Error::InvalidSnapshot(format!(
                "size {} does not match terrain size {}",
                self.size, size
            )));
        }
        let area = size * size;
        if self.cells.len() != area {
            return Err(Error::InvalidSnapshot(format!(
                "expected {} cells, found {}",
                area,
                self.cells.len()
            )));
        }

        let cells = self
            .cells
            .iter()
            .map(|&index| {
                Breed::from_index(index).ok_or_else(|| {
                    Error::InvalidSnapshot(format!("unknown breed index {}", index))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let counts = BreedCounts::new(self.counts);
        if counts.total() != area as u64 {
            return Err(Error::InvalidSnapshot(format!(
                "counts sum to {}, expected {}",
                counts.total(),
                area
            )));
        }
        if counts != BreedCounts::from_cells(&cells) {
            return Err(Error::InvalidSnapshot(
                "counts do not match cells".to_string(),
            ));
        }

        Ok((cells, counts))
    }
}
