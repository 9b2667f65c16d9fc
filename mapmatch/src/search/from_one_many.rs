use super::{ShortestPath, ShortestPathOneMany};
use crate::error::{Error, Result};
use crate::graph::*;
use std::marker::PhantomData;

/// Single pair search backed by a one-to-many search.
///
/// The wrapped search still explores everything within its cutoff; the destination only
/// selects which results are reported.
pub struct FromOneMany<G: Weighted, S> {
  one_many: S,
  destination: Option<G::NodeId>,
  _graph: PhantomData<G>,
}

impl<G: Weighted, S: ShortestPathOneMany<G>> FromOneMany<G, S> {
  pub fn new(one_many: S) -> Self {
    Self {
      one_many,
      destination: None,
      _graph: PhantomData,
    }
  }

  pub fn into_inner(self) -> S {
    self.one_many
  }
}

impl<G, S> ShortestPath<G> for FromOneMany<G, S>
where
  G: GraphNodes + Weighted,
  S: ShortestPathOneMany<G>,
{
  fn initialize(&mut self, graph: G, source: G::NodeId, destination: G::NodeId) -> Result<()> {
    if !graph.contains(destination) {
      return Err(Error::unknown_node(destination));
    }
    self.one_many.initialize(graph, source)?;
    self.destination = Some(destination);
    Ok(())
  }

  fn run(&mut self) -> Result<()> {
    self.one_many.run()
  }

  fn start(&self) -> Option<G::NodeId> {
    self.one_many.start()
  }

  fn destination(&self) -> Option<G::NodeId> {
    self.destination
  }

  fn prev(&self, node: G::NodeId) -> Result<Option<G::NodeId>> {
    self.one_many.prev(node)
  }

  fn path_weight(&self) -> Result<G::Weight> {
    let destination = self.destination.ok_or(Error::NotInitialized)?;
    self.one_many.path_weight(destination)
  }

  fn has_visited(&self, node: G::NodeId) -> Result<bool> {
    self.one_many.has_visited(node)
  }
}
