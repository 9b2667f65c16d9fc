use super::{Heuristic, ShortestPath, ZeroHeuristic};
use crate::error::{Error, Result};
use crate::graph::*;
use crate::search_space::SearchSpace;
use log::trace;

/// Best-first search between two nodes, ordered by accumulated weight plus the heuristic
/// estimate of the remaining weight.
///
/// The search stops once the destination is finalized or the frontier is exhausted.
/// Nodes further than `max_cost` from the source are never visited.
pub struct Astar<G: Weighted, H = ZeroHeuristic> {
  heuristic: H,
  max_cost: G::Weight,
  graph: Option<G>,
  source: Option<G::NodeId>,
  destination: Option<G::NodeId>,
  search_space: SearchSpace<G::Weight, G::NodeId>,
  finished: bool,
}

impl<G: Weighted> Astar<G, ZeroHeuristic> {
  /// Plain Dijkstra search without a cutoff.
  pub fn dijkstra() -> Self {
    Self::new(ZeroHeuristic, G::Weight::INFINITY)
  }
}

impl<G: Weighted> Default for Astar<G, ZeroHeuristic> {
  fn default() -> Self {
    Self::dijkstra()
  }
}

impl<G: Weighted, H> Astar<G, H> {
  pub fn new(heuristic: H, max_cost: G::Weight) -> Self {
    Self {
      heuristic,
      max_cost,
      graph: None,
      source: None,
      destination: None,
      search_space: SearchSpace::new(),
      finished: false,
    }
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

impl<G, H> ShortestPath<G> for Astar<G, H>
where
  G: Copy + IntoNeighbors + GraphNodes,
  H: Heuristic<G::NodeId, G::Weight>,
{
  fn initialize(&mut self, graph: G, source: G::NodeId, destination: G::NodeId) -> Result<()> {
    for node in [source, destination].iter() {
      if !graph.contains(*node) {
        return Err(Error::unknown_node(*node));
      }
    }
    self.graph = Some(graph);
    self.source = Some(source);
    self.destination = Some(destination);
    self.search_space.clear();
    self.finished = false;
    Ok(())
  }

  fn run(&mut self) -> Result<()> {
    let (graph, source, destination) = match (self.graph, self.source, self.destination) {
      (Some(graph), Some(source), Some(destination)) => (graph, source, destination),
      _ => return Err(Error::NotInitialized),
    };

    self.search_space.clear();
    self
      .search_space
      .init(source, self.heuristic.estimate(source));

    while let Some((id, _)) = self
      .search_space
      .settle_next(graph, &self.heuristic, self.max_cost)
    {
      if id == destination {
        break;
      }
    }
    self.finished = true;

    trace!(
      "A* {:?} -> {:?}: weight {:?}, {} nodes visited",
      source,
      destination,
      self.search_space.cost(destination),
      self.search_space.number_of_visited()
    );
    Ok(())
  }

  fn start(&self) -> Option<G::NodeId> {
    self.source
  }

  fn destination(&self) -> Option<G::NodeId> {
    self.destination
  }

  fn prev(&self, node: G::NodeId) -> Result<Option<G::NodeId>> {
    Ok(self.results()?.prev(node))
  }

  fn path_weight(&self) -> Result<G::Weight> {
    let destination = self.destination.ok_or(Error::NotInitialized)?;
    Ok(self.results()?.cost(destination))
  }

  fn has_visited(&self, node: G::NodeId) -> Result<bool> {
    Ok(self.results()?.has_visited(node))
  }

  fn path(&self) -> Result<Vec<G::NodeId>> {
    let destination = self.destination.ok_or(Error::NotInitialized)?;
    Ok(self.results()?.unwind(destination))
  }
}
