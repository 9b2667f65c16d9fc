//! Graph data structures.
//! 
//! - [`WeightedGraph`] is an append-only directed graph with weighted edges and a position
//!   per node. It is built once and then only read by searches.
//! - [`SpatialIndex`] answers nearest-node and radius queries over node positions.

mod common;
mod spatial_index;
mod weighted_graph;

pub use common::*;
pub use spatial_index::*;
pub use weighted_graph::*;
