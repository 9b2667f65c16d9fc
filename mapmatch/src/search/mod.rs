//! Shortest path searches.
//!
//! Three search modes share one query surface:
//! - [`ShortestPath`]: one source, one destination ([`Astar`], [`FromOneMany`]).
//! - [`ShortestPathOneMany`]: one source, every node within the cutoff ([`Dijkstra`]).
//! - [`ShortestPathAll`]: every pair of a node subset, computed by a worker pool
//!   ([`AllPairs`]).
//!
//! Every search is first `initialize`d with a graph and its endpoints, then `run`. Queries
//! before that fail with [`Error::NotInitialized`] or [`Error::NotRun`]. A node which was
//! not reached has no predecessor (`None`) and weight [`Weight::INFINITY`].

mod all_pairs;
mod astar;
mod dijkstra;
mod from_one_many;
mod heuristic;

pub use all_pairs::*;
pub use astar::*;
pub use dijkstra::*;
pub use from_one_many::*;
pub use heuristic::*;

use crate::error::{Error, Result};
use crate::graph::*;
use crate::persistent_set::PersistentSet;
use std::collections::HashMap;

/// Shortest path between a single pair of nodes
pub trait ShortestPath<G: Weighted> {
  fn initialize(&mut self, graph: G, source: G::NodeId, destination: G::NodeId) -> Result<()>;

  fn run(&mut self) -> Result<()>;

  fn start(&self) -> Option<G::NodeId>;

  fn destination(&self) -> Option<G::NodeId>;

  /// The node chosen prior to getting to `node`, `None` for the source and for nodes which
  /// were never reached.
  fn prev(&self, node: G::NodeId) -> Result<Option<G::NodeId>>;

  /// Weight of the path to the destination, `Weight::INFINITY` if it is unreachable.
  fn path_weight(&self) -> Result<G::Weight>;

  fn has_visited(&self, node: G::NodeId) -> Result<bool>;

  /// Nodes from the source to the destination, empty if the destination is unreachable.
  fn path(&self) -> Result<Vec<G::NodeId>> {
    match (self.start(), self.destination()) {
      (Some(source), Some(destination)) => unwind_path(source, destination, |node| self.prev(node)),
      _ => Err(Error::NotInitialized),
    }
  }
}

/// Shortest paths from one node to all other nodes
pub trait ShortestPathOneMany<G: Weighted> {
  fn initialize(&mut self, graph: G, source: G::NodeId) -> Result<()>;

  fn run(&mut self) -> Result<()>;

  fn start(&self) -> Option<G::NodeId>;

  fn prev(&self, destination: G::NodeId) -> Result<Option<G::NodeId>>;

  fn path_weight(&self, destination: G::NodeId) -> Result<G::Weight>;

  fn has_visited(&self, node: G::NodeId) -> Result<bool>;

  /// Predecessor of every reached node except the source.
  fn predecessors(&self) -> Result<HashMap<G::NodeId, G::NodeId>>;

  fn path(&self, destination: G::NodeId) -> Result<Vec<G::NodeId>> {
    let source = self.start().ok_or(Error::NotInitialized)?;
    unwind_path(source, destination, |node| self.prev(node))
  }
}

/// Shortest paths between each pair of nodes of a subset
pub trait ShortestPathAll<G: Weighted> {
  fn initialize(&mut self, graph: G, nodes: PersistentSet<G::NodeId>) -> Result<()>;

  fn run(&mut self) -> Result<()>;

  fn prev(&self, source: G::NodeId, destination: G::NodeId) -> Result<Option<G::NodeId>>;

  fn path_weight(&self, source: G::NodeId, destination: G::NodeId) -> Result<G::Weight>;

  fn path(&self, source: G::NodeId, destination: G::NodeId) -> Result<Vec<G::NodeId>> {
    unwind_path(source, destination, |node| self.prev(source, node))
  }
}

/// Walks the predecessor chain from `destination` back to `source`.
fn unwind_path<N, F>(source: N, destination: N, prev: F) -> Result<Vec<N>>
where
  N: Identifier,
  F: Fn(N) -> Result<Option<N>>,
{
  let mut result = vec![destination];
  let mut current = destination;
  while current != source {
    match prev(current)? {
      Some(parent) => {
        result.push(parent);
        current = parent;
      }
      None => return Ok(Vec::new()),
    }
  }
  result.reverse();
  Ok(result)
}
