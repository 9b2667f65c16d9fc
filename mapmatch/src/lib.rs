//! Map matching of noisy position traces onto road networks.
//!
//! The crate combines a family of shortest path searches over weighted directed graphs,
//! a spatial index over node positions, a persistent ordered set for lock-free snapshots
//! and a hidden Markov model decoder which aligns observations with graph nodes.

pub mod error;
pub mod graph;
pub mod graph_impl;
pub mod matcher;
pub mod persistent_set;
pub mod search;
pub mod spatial;

mod search_space;

#[cfg(test)]
mod test_utils;

pub use error::{Error, Result};
