//! Breeds and their cyclic dominance relation.

use crate::error::Error;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// One of the competing cell types.
///
/// Dominance is computed from [`Breed::index`], never from declaration order:
/// the breed at index `i` beats the breed at index `(i + 1) % COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Breed {
    Rock,
    Paper,
    Scissors,
}

impl Breed {
    pub const COUNT: usize = 3;

    /// All breeds, ordered by dominance index.
    pub const ALL: [Breed; Breed::COUNT] = [Breed::Rock, Breed::Scissors, Breed::Paper];

    /// Position in the dominance cycle.
    pub const fn index(self) -> u8 {
        match self {
            Breed::Rock => 0,
            Breed::Scissors => 1,
            Breed::Paper => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Breed> {
        Self::ALL.get(index as usize).copied()
    }

    /// True iff `other` sits immediately after `self` in the cycle.
    pub fn beats(self, other: Breed) -> bool {
        other.index() as usize == (self.index() as usize + 1) % Self::COUNT
    }

    pub fn loses_to(self, other: Breed) -> bool {
        other.beats(self)
    }

    /// The breed this one defeats.
    pub fn prey(self) -> Breed {
        Self::ALL[(self.index() as usize + 1) % Self::COUNT]
    }

    /// The breed that defeats this one.
    pub fn predator(self) -> Breed {
        Self::ALL[(self.index() as usize + Self::COUNT - 1) % Self::COUNT]
    }
}

impl From<Breed> for u8 {
    fn from(breed: Breed) -> u8 {
        breed.index()
    }
}

impl TryFrom<u8> for Breed {
    type Error = Error;

    fn try_from(index: u8) -> Result<Breed, Error> {
        Breed::from_index(index)
            .ok_or_else(|| Error::InvalidSnapshot(format!("unknown breed index {}", index)))
    }
}

impl Distribution<Breed> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Breed {
        Breed::ALL[rng.gen_range(0..Breed::COUNT)]
    }
}

impl fmt::Display for Breed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Breed::Rock => "rock",
            Breed::Paper => "paper",
            Breed::Scissors => "scissors",
        };
        f.write_str(name)
    }
}

/// Number of cells held by each breed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedCounts([u64; Breed::COUNT]);

impl BreedCounts {
    pub fn new(counts: [u64; Breed::COUNT]) -> Self {
        Self(counts)
    }

    /// Tally a slice of cells with a full scan.
    pub fn from_cells(cells: &[Breed]) -> Self {
        let mut counts = Self::default();
        for &breed in cells {
            counts.0[breed.index() as usize] += 1;
        }
        counts
    }

    pub fn get(&self, breed: Breed) -> u64 {
        self.0[breed.index() as usize]
    }

    /// Move one cell from `loser` to `winner`.
    pub fn transfer(&mut self, loser: Breed, winner: Breed) {
        self.0[loser.index() as usize] -= 1;
        self.0[winner.index() as usize] += 1;
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Number of breeds with at least one cell.
    pub fn occupied(&self) -> usize {
        self.0.iter().filter(|&&count| count > 0).count()
    }

    /// Raw counts in dominance-index order.
    pub fn as_array(&self) -> [u64; Breed::COUNT] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Breed, u64)> + '_ {
        Breed::ALL.iter().map(move |&breed| (breed, self.get(breed)))
    }
}

impl Index<Breed> for BreedCounts {
    type Output = u64;

    fn index(&self, breed: Breed) -> &u64 {
        &self.0[breed.index() as usize]
    }
}

impl fmt::Display for BreedCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (breed, count) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", breed, count)?;
            first = false;
        }
        Ok(())
    }
}
