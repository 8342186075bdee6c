//! The competition engine.
//!
//! A [`Terrain`] owns the grid, the per-breed counts and the elementary-step
//! counter, and is the only thing that mutates them. Counts are kept in step
//! with the grid on every conversion, so [`Terrain::is_absorbed`] never scans.
//!
//! Accounting rules:
//! - every elementary update advances the counter by one, including ties and
//!   updates where the chosen cell has no neighbor;
//! - [`Terrain::mix`] and [`Terrain::restore`] never advance it.
//!
//! Each elementary update draws, in order, a row, a column and an index into
//! the cell's neighbor list (see [`Topology::neighbors`]).

use crate::grid::Grid;
use crate::snapshot::TerrainSnapshot;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rps_core::{validate_size, Breed, BreedCounts, Position, Result, TerrainConfig, Topology};
use std::ops::{Deref, DerefMut};
use tracing::{debug, info, instrument, trace};

pub struct Terrain<R = ChaCha8Rng> {
    grid: Grid,
    counts: BreedCounts,
    iterations: u64,
    topology: Topology,
    rng: R,
}

impl<R: Rng> Terrain<R> {
    /// Toroidal, 4-neighbor terrain.
    pub fn new(size: usize, rng: R) -> Result<Self> {
        Self::with_topology(size, Topology::default(), rng)
    }

    /// Until [`Terrain::reset`] is called every cell holds the first breed of
    /// the cycle, so counts are consistent from the start.
    pub fn with_topology(size: usize, topology: Topology, rng: R) -> Result<Self> {
        validate_size(size)?;
        let grid = Grid::filled(size, Breed::ALL[0]);
        let counts = BreedCounts::from_cells(grid.cells());
        Ok(Self {
            grid,
            counts,
            iterations: 0,
            topology,
            rng,
        })
    }

    pub fn from_config(config: &TerrainConfig, rng: R) -> Result<Self> {
        Self::with_topology(config.size, config.topology, rng)
    }

    /// Fill every cell with a uniformly drawn breed and zero the counter.
    #[instrument(skip(self), fields(size = self.grid.size()))]
    pub fn reset(&mut self) {
        for cell in self.grid.cells_mut() {
            *cell = self.rng.gen();
        }
        self.counts = BreedCounts::from_cells(self.grid.cells());
        self.iterations = 0;
        debug!(counts = %self.counts, "Terrain reset");
    }

    /// Perform `steps` elementary updates.
    pub fn iterate(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
        trace!(steps, iterations = self.iterations, counts = %self.counts, "Iterated");
    }

    fn step(&mut self) {
        self.iterations += 1;

        let cell = self.random_position();
        let neighbors = self.topology.neighbors(cell, self.grid.size() as i32);
        if neighbors.is_empty() {
            return;
        }
        let neighbor = neighbors.as_slice()[self.rng.gen_range(0..neighbors.len())];

        let ours = self.grid.get(cell);
        let theirs = self.grid.get(neighbor);
        if theirs.beats(ours) {
            self.convert(cell, theirs);
        } else if ours.beats(theirs) {
            self.convert(neighbor, ours);
        }
    }

    fn convert(&mut self, pos: Position, winner: Breed) {
        let loser = self.grid.replace(pos, winner);
        self.counts.transfer(loser, winner);
    }

    /// Swap the contents of `pairs` pairs of uniformly drawn cells.
    ///
    /// Counts are untouched since this only relabels positions.
    pub fn mix(&mut self, pairs: u64) {
        for _ in 0..pairs {
            let a = self.random_position();
            let b = self.random_position();
            self.grid.swap(a, b);
        }
        trace!(pairs, "Mixed");
    }

    fn random_position(&mut self) -> Position {
        let size = self.grid.size() as i32;
        let row = self.rng.gen_range(0..size);
        let col = self.rng.gen_range(0..size);
        Position::new(row, col)
    }

    /// True iff exactly one breed remains.
    pub fn is_absorbed(&self) -> bool {
        self.counts.occupied() == 1
    }

    /// The breed holding every cell, if absorbed.
    pub fn survivor(&self) -> Option<Breed> {
        if !self.is_absorbed() {
            return None;
        }
        self.counts
            .iter()
            .find(|&(_, count)| count > 0)
            .map(|(breed, _)| breed)
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn counts(&self) -> &BreedCounts {
        &self.counts
    }

    pub fn snapshot(&self) -> TerrainSnapshot {
        TerrainSnapshot {
            size: self.grid.size(),
            cells: self.grid.cells().iter().map(|b| b.index()).collect(),
            counts: self.counts.as_array(),
            iterations: self.iterations,
        }
    }

    /// Install a snapshot after validating it. On error nothing changes.
    #[instrument(skip(self, snapshot), fields(size = snapshot.size))]
    pub fn restore(&mut self, snapshot: &TerrainSnapshot) -> Result<()> {
        let (cells, counts) = snapshot.decode(self.grid.size())?;
        self.grid.cells_mut().copy_from_slice(&cells);
        self.counts = counts;
        self.iterations = snapshot.iterations;
        info!(iterations = self.iterations, counts = %self.counts, "Terrain restored");
        Ok(())
    }

    /// Exclusive write access to the cells; counts are recomputed when the
    /// returned guard is dropped.
    pub fn edit(&mut self) -> CellsMut<'_> {
        CellsMut {
            grid: &mut self.grid,
            counts: &mut self.counts,
        }
    }
}

/// Scoped mutable view of a terrain's cells.
pub struct CellsMut<'a> {
    grid: &'a mut Grid,
    counts: &'a mut BreedCounts,
}

impl CellsMut<'_> {
    pub fn set(&mut self, pos: Position, breed: Breed) {
        self.grid.replace(pos, breed);
    }

    pub fn fill(&mut self, breed: Breed) {
        self.grid.cells_mut().fill(breed);
    }
}

impl Deref for CellsMut<'_> {
    type Target = [Breed];

    fn deref(&self) -> &[Breed] {
        self.grid.cells()
    }
}

impl DerefMut for CellsMut<'_> {
    fn deref_mut(&mut self) -> &mut [Breed] {
        self.grid.cells_mut()
    }
}

impl Drop for CellsMut<'_> {
    fn drop(&mut self) {
        *self.counts = BreedCounts::from_cells(self.grid.cells());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rps_core::{EdgePolicy, Error, Neighborhood};

    fn seeded(size: usize, seed: u64) -> Terrain {
        let mut terrain = Terrain::new(size, ChaCha8Rng::seed_from_u64(seed)).unwrap();
        terrain.reset();
        terrain
    }

    fn area(terrain: &Terrain<impl Rng>) -> u64 {
        (terrain.size() * terrain.size()) as u64
    }

    /// Cell-wise and count-wise comparison, ignoring the rng.
    fn same_state<A: Rng, B: Rng>(a: &Terrain<A>, b: &Terrain<B>) -> bool {
        a.grid() == b.grid() && a.counts() == b.counts() && a.iterations() == b.iterations()
    }

    #[test]
    fn test_invalid_size() {
        let result = Terrain::new(0, ChaCha8Rng::seed_from_u64(1));
        assert!(matches!(result, Err(Error::InvalidSize(0))));
    }

    #[test]
    fn test_new_terrain_is_consistent() {
        let terrain = Terrain::new(5, ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(terrain.iterations(), 0);
        assert_eq!(terrain.counts().total(), 25);
        assert_eq!(terrain.grid().len(), 25);
    }

    #[test]
    fn test_reset() {
        let mut terrain = seeded(20, 42);
        terrain.iterate(500);
        assert_eq!(terrain.iterations(), 500);

        terrain.reset();
        assert_eq!(terrain.iterations(), 0);
        assert_eq!(terrain.counts().total(), 400);
        assert_eq!(*terrain.counts(), BreedCounts::from_cells(terrain.grid().cells()));
        // 400 uniform draws leave every breed represented
        assert_eq!(terrain.counts().occupied(), 3);
    }

    #[test]
    fn test_zero_iterate_and_mix_are_noops() {
        let mut terrain = seeded(10, 7);
        terrain.iterate(25);
        let before = terrain.snapshot();

        terrain.iterate(0);
        terrain.mix(0);

        assert_eq!(terrain.snapshot(), before);
    }

    #[test]
    fn test_counter_advances_per_elementary_update() {
        let mut terrain = seeded(10, 3);
        terrain.iterate(1);
        terrain.iterate(9);
        assert_eq!(terrain.iterations(), 10);

        terrain.mix(50);
        assert_eq!(terrain.iterations(), 10);
    }

    #[test]
    fn test_deterministic_with_equal_seeds() {
        let mut a = seeded(16, 99);
        let mut b = seeded(16, 99);
        assert!(same_state(&a, &b));

        for round in 0..20 {
            a.iterate(250);
            b.iterate(250);
            if round % 3 == 0 {
                a.mix(8);
                b.mix(8);
            }
            assert!(same_state(&a, &b));
        }
    }

    #[test]
    fn test_each_step_moves_at_most_one_cell() {
        let mut terrain = seeded(12, 5);
        for _ in 0..2_000 {
            let before = terrain.counts().as_array();
            terrain.iterate(1);
            let after = terrain.counts().as_array();

            let changed: Vec<i64> = before
                .iter()
                .zip(after.iter())
                .map(|(&b, &a)| a as i64 - b as i64)
                .filter(|&d| d != 0)
                .collect();
            match changed.as_slice() {
                [] => {}
                [x, y] => {
                    assert_eq!(x.abs(), 1);
                    assert_eq!(x + y, 0);
                }
                other => panic!("unexpected count delta {:?}", other),
            }
        }
    }

    #[test]
    fn test_mix_preserves_counts() {
        let mut terrain = seeded(15, 11);
        terrain.iterate(1_000);
        let counts = *terrain.counts();

        for _ in 0..10 {
            terrain.mix(8);
            assert_eq!(*terrain.counts(), counts);
        }
        assert_eq!(*terrain.counts(), BreedCounts::from_cells(terrain.grid().cells()));
    }

    #[test]
    fn test_absorbed_grid_stays_put() {
        let mut terrain = seeded(3, 17);
        let snapshot = TerrainSnapshot {
            size: 3,
            cells: vec![Breed::Paper.index(); 9],
            counts: [0, 0, 9],
            iterations: 0,
        };
        terrain.restore(&snapshot).unwrap();
        assert!(terrain.is_absorbed());
        assert_eq!(terrain.survivor(), Some(Breed::Paper));

        let grid = terrain.grid().clone();
        terrain.iterate(50);

        assert_eq!(*terrain.grid(), grid);
        assert_eq!(terrain.counts().as_array(), [0, 0, 9]);
        assert_eq!(terrain.iterations(), 50);
        assert!(terrain.is_absorbed());
    }

    #[test]
    fn test_neighbor_wins_on_scripted_draw() {
        // Every draw is zero: cell (0, 0), first neighbor (east, i.e. (0, 1)).
        let mut terrain = Terrain::new(3, StepRng::new(0, 0)).unwrap();
        let mut cells = vec![Breed::Paper.index(); 9];
        cells[0] = Breed::Scissors.index();
        cells[1] = Breed::Rock.index();
        let snapshot = TerrainSnapshot {
            size: 3,
            cells,
            counts: [1, 1, 7],
            iterations: 0,
        };
        terrain.restore(&snapshot).unwrap();

        terrain.iterate(1);

        assert_eq!(terrain.grid().get(Position::new(0, 0)), Breed::Rock);
        assert_eq!(terrain.grid().get(Position::new(0, 1)), Breed::Rock);
        assert_eq!(terrain.counts()[Breed::Rock], 2);
        assert_eq!(terrain.counts()[Breed::Scissors], 0);
        assert_eq!(terrain.counts()[Breed::Paper], 7);
        assert_eq!(terrain.iterations(), 1);
    }

    #[test]
    fn test_cell_wins_converts_neighbor() {
        let mut terrain = Terrain::new(3, StepRng::new(0, 0)).unwrap();
        {
            let mut cells = terrain.edit();
            cells.fill(Breed::Paper);
            cells.set(Position::new(0, 0), Breed::Rock);
            cells.set(Position::new(0, 1), Breed::Scissors);
        }
        assert_eq!(terrain.counts().as_array(), [1, 1, 7]);

        terrain.iterate(1);

        assert_eq!(terrain.grid().get(Position::new(0, 1)), Breed::Rock);
        assert_eq!(terrain.counts().as_array(), [2, 0, 7]);
    }

    #[test]
    fn test_single_cell_clamped_has_no_neighbors() {
        let topology = Topology::new(Neighborhood::VonNeumann, EdgePolicy::Clamp);
        let mut terrain =
            Terrain::with_topology(1, topology, ChaCha8Rng::seed_from_u64(1)).unwrap();
        terrain.reset();
        let before = terrain.grid().clone();

        terrain.iterate(10);

        assert_eq!(*terrain.grid(), before);
        assert_eq!(terrain.iterations(), 10);
        assert!(terrain.is_absorbed());
    }

    #[test]
    fn test_edit_recomputes_counts() {
        let mut terrain = seeded(4, 8);
        terrain.edit().fill(Breed::Scissors);
        assert_eq!(terrain.counts().as_array(), [0, 16, 0]);
        assert!(terrain.is_absorbed());

        terrain.edit()[3] = Breed::Rock;
        assert_eq!(terrain.counts().as_array(), [1, 15, 0]);
        assert!(!terrain.is_absorbed());
    }

    #[test]
    fn test_rejected_restore_leaves_state() {
        let mut terrain = seeded(4, 2);
        terrain.iterate(10);
        let before = terrain.snapshot();

        let mut bad = before.clone();
        bad.counts[0] += 1;
        assert!(matches!(terrain.restore(&bad), Err(Error::InvalidSnapshot(_))));
        assert_eq!(terrain.snapshot(), before);
    }

    #[test]
    fn test_long_run_absorbs() {
        let mut terrain = seeded(4, 1234);
        let mut rounds = 0;
        while !terrain.is_absorbed() && rounds < 10_000 {
            terrain.iterate(100);
            rounds += 1;
        }
        assert!(terrain.is_absorbed());
        assert_eq!(terrain.counts().total(), 16);
        assert!(terrain.survivor().is_some());
    }

    fn topology_strategy() -> impl Strategy<Value = Topology> {
        (
            prop_oneof![Just(Neighborhood::VonNeumann), Just(Neighborhood::Moore)],
            prop_oneof![Just(EdgePolicy::Wrap), Just(EdgePolicy::Clamp)],
        )
            .prop_map(|(neighborhood, edges)| Topology::new(neighborhood, edges))
    }

    proptest! {
        #[test]
        fn prop_counts_track_grid(
            seed in any::<u64>(),
            size in 1usize..10,
            topology in topology_strategy(),
            ops in prop::collection::vec((0u8..3, 0u64..64), 0..16),
        ) {
            let mut terrain =
                Terrain::with_topology(size, topology, ChaCha8Rng::seed_from_u64(seed)).unwrap();
            terrain.reset();
            for (op, n) in ops {
                match op {
                    0 => terrain.iterate(n),
                    1 => terrain.mix(n),
                    _ => terrain.reset(),
                }
                prop_assert_eq!(terrain.counts().total(), area(&terrain));
                prop_assert_eq!(
                    *terrain.counts(),
                    BreedCounts::from_cells(terrain.grid().cells())
                );
                let single_breed = terrain
                    .grid()
                    .cells()
                    .iter()
                    .all(|&b| b == terrain.grid().cells()[0]);
                prop_assert_eq!(terrain.is_absorbed(), single_breed);
            }
        }

        #[test]
        fn prop_mix_never_changes_counts(
            seed in any::<u64>(),
            size in 1usize..12,
            warmup in 0u64..500,
            pairs in 0u64..200,
        ) {
            let mut terrain = seeded(size, seed);
            terrain.iterate(warmup);
            let counts = *terrain.counts();
            let iterations = terrain.iterations();
            terrain.mix(pairs);
            prop_assert_eq!(*terrain.counts(), counts);
            prop_assert_eq!(terrain.iterations(), iterations);
        }
    }
}
