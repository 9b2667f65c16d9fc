use super::{ShortestPathOneMany, ZeroHeuristic};
use crate::error::{Error, Result};
use crate::graph::*;
use crate::search_space::SearchSpace;
use log::trace;
use std::collections::HashMap;

/// Dijkstra search from a fixed source to every node within `max_cost`.
///
/// After `run()` predecessor and weight lookups for any destination are constant time.
/// An instance can be re-initialized and run any number of times, which lets a worker
/// reuse its buffers across sources.
pub struct Dijkstra<G: Weighted> {
  max_cost: G::Weight,
  graph: Option<G>,
  source: Option<G::NodeId>,
  search_space: SearchSpace<G::Weight, G::NodeId>,
  finished: bool,
}

impl<G: Weighted> Dijkstra<G> {
  pub fn new(max_cost: G::Weight) -> Self {
    Self {
      max_cost,
      graph: None,
      source: None,
      search_space: SearchSpace::new(),
      finished: false,
    }
  }

  pub fn unbounded() -> Self {
    Self::new(G::Weight::INFINITY)
  }

  pub fn number_of_visited(&self) -> usize {
    self.search_space.number_of_visited()
  }

  fn results(&self) -> Result<&SearchSpace<G::Weight, G::NodeId>> {
    match (self.graph.is_some(), self.finished) {
      (false, _) => Err(Error::NotInitialized),
      (true, false) => Err(Error::NotRun),
      (true, true) => Ok(&self.search_space),
    }
  }
}

impl<G: Weighted> Default for Dijkstra<G> {
  fn default() -> Self {
    Self::unbounded()
  }
}

impl<G> ShortestPathOneMany<G> for Dijkstra<G>
where
  G: Copy + IntoNeighbors + GraphNodes,
{
  fn initialize(&mut self, graph: G, source: G::NodeId) -> Result<()> {
    if !graph.contains(source) {
      return Err(Error::unknown_node(source));
    }
    self.graph = Some(graph);
    self.source = Some(source);
    self.search_space.clear();
    self.finished = false;
    Ok(())
  }

  fn run(&mut self) -> Result<()> {
    let (graph, source) = match (self.graph, self.source) {
      (Some(graph), Some(source)) => (graph, source),
      _ => return Err(Error::NotInitialized),
    };

    self.search_space.clear();
    self.search_space.init(source, G::Weight::default());
    while self
      .search_space
      .settle_next(graph, &ZeroHeuristic, self.max_cost)
      .is_some()
    {}
    self.finished = true;

    trace!(
      "one-to-many from {:?}: {} nodes visited",
      source,
      self.search_space.number_of_visited()
    );
    Ok(())
  }

  fn start(&self) -> Option<G::NodeId> {
    self.source
  }

  fn prev(&self, destination: G::NodeId) -> Result<Option<G::NodeId>> {
    Ok(self.results()?.prev(destination))
  }

  fn path_weight(&self, destination: G::NodeId) -> Result<G::Weight> {
    Ok(self.results()?.cost(destination))
  }

  fn has_visited(&self, node: G::NodeId) -> Result<bool> {
    Ok(self.results()?.has_visited(node))
  }

  fn predecessors(&self) -> Result<HashMap<G::NodeId, G::NodeId>> {
    Ok(self.results()?.tree())
  }

  fn path(&self, destination: G::NodeId) -> Result<Vec<G::NodeId>> {
    Ok(self.results()?.unwind(destination))
  }
}
