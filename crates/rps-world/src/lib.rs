//! Terrain simulation engine.
//!
//! A square grid of breeds competing under cyclic dominance, plus the
//! exclusive-access handle and drive-loop logic used to run it.

pub mod driver;
pub mod grid;
pub mod shared;
pub mod snapshot;
pub mod terrain;

pub use driver::{Driver, TickReport};
pub use grid::Grid;
pub use shared::SharedTerrain;
pub use snapshot::TerrainSnapshot;
pub use terrain::{CellsMut, Terrain};
