//! Core types for the rock-paper-scissors terrain simulation.

pub mod breed;
pub mod config;
pub mod error;
pub mod types;

pub use breed::{Breed, BreedCounts};
pub use config::*;
pub use error::{Error, Result};
pub use types::*;
