//! Exclusive-access handle over a terrain.
//!
//! Grid, counts and iteration counter sit behind one mutex and every writer
//! holds it for the whole operation, so any snapshot taken through this
//! handle is consistent.
//!
//! Rendering is the one relaxed path: [`SharedTerrain::try_view`] never
//! blocks, and while a writer is busy it returns `None` so the caller can
//! keep showing its previous frame.

use crate::snapshot::TerrainSnapshot;
use crate::terrain::Terrain;
use parking_lot::Mutex;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rps_core::{BreedCounts, Result};
use std::sync::Arc;

pub struct SharedTerrain<R = ChaCha8Rng> {
    inner: Arc<Mutex<Terrain<R>>>,
}

impl<R> Clone for SharedTerrain<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Rng> SharedTerrain<R> {
    pub fn new(terrain: Terrain<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(terrain)),
        }
    }

    /// Run `f` with exclusive access.
    pub fn with<T>(&self, f: impl FnOnce(&mut Terrain<R>) -> T) -> T {
        let mut terrain = self.inner.lock();
        f(&mut *terrain)
    }

    /// Run `f` only if no writer holds the terrain right now.
    pub fn try_view<T>(&self, f: impl FnOnce(&Terrain<R>) -> T) -> Option<T> {
        self.inner.try_lock().map(|terrain| f(&*terrain))
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    pub fn iterate(&self, steps: u64) {
        self.inner.lock().iterate(steps);
    }

    pub fn mix(&self, pairs: u64) {
        self.inner.lock().mix(pairs);
    }

    pub fn is_absorbed(&self) -> bool {
        self.inner.lock().is_absorbed()
    }

    pub fn iterations(&self) -> u64 {
        self.inner.lock().iterations()
    }

    pub fn counts(&self) -> BreedCounts {
        *self.inner.lock().counts()
    }

    pub fn snapshot(&self) -> TerrainSnapshot {
        self.inner.lock().snapshot()
    }

    pub fn restore(&self, snapshot: &TerrainSnapshot) -> Result<()> {
        self.inner.lock().restore(snapshot)
    }
}
