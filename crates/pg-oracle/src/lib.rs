//! Pattern oracle for the pulsegrid sequencer.
//!
//! [`MapOracle`] reads drum levels from a 5×5 grid of step tables,
//! interpolated at the (x, y) map position, and turns them into per-step
//! triggers through the density thresholds of [`pg_engine::PatternOracle`].

#![cfg_attr(not(feature = "std"), no_std)]

mod map;

pub use map::{MapOracle, GRID_SIZE, NATIVE_LENGTH};
