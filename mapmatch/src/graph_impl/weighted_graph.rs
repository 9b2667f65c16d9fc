use super::common::*;
use crate::error::{Error, Result};
use crate::graph::*;
use crate::spatial::Position;
use std::convert::TryFrom;

#[derive(Default, Clone, Debug)]
struct Node<W> {
  out_edges: Vec<(Idx, W)>,
}

/// Directed graph which stores outgoing weighted edges as a vector in each node.
/// 
/// Nodes and edges can only be added. Searches borrow the graph immutably, so it is
/// frozen for as long as any search holds it.
#[derive(Clone, Debug)]
pub struct WeightedGraph<W: Weight = u64> {
  nodes: Vec<Node<W>>,
  positions: Vec<Position>,
}

impl<W: Weight> Default for WeightedGraph<W> {
  fn default() -> Self {
    Self::new()
  }
}

impl<W: Weight> WeightedGraph<W> {
  pub fn new() -> Self {
    Self {
      nodes: Vec::new(),
      positions: Vec::new(),
    }
  }

  /// One node per position, numbered in order. Only the first `Idx::MAX + 1` positions
  /// get addressable ids.
  pub fn new_with_positions(positions: Vec<Position>) -> Self {
    Self {
      nodes: vec![Node { out_edges: Vec::new() }; positions.len()],
      positions,
    }
  }

  /// Appends a node and returns its id. Fails once every `Idx` is taken.
  pub fn add_node(&mut self, position: Position) -> Result<Idx> {
    let id = next_id(self.positions.len())?;
    self.nodes.push(Node { out_edges: Vec::new() });
    self.positions.push(position);
    Ok(id)
  }

  /// Adds a directed edge `from -> to`. Both endpoints must already exist.
  pub fn add_edge(&mut self, from: Idx, to: Idx, weight: W) -> Result<&mut Self> {
    for node in [from, to].iter() {
      if !self.contains(*node) {
        return Err(Error::unknown_node(*node));
      }
    }
    if weight < W::default() {
      return Err(Error::NegativeWeight {
        from: from.to_string(),
        to: to.to_string(),
      });
    }
    self.nodes[from as usize].out_edges.push((to, weight));
    Ok(self)
  }

  pub fn contains(&self, node: Idx) -> bool {
    (node as usize) < self.nodes.len()
  }

  pub fn number_of_nodes(&self) -> usize {
    self.nodes.len()
  }

  pub fn number_of_edges(&self) -> usize {
    self.nodes.iter().map(|node| node.out_edges.len()).sum()
  }
}

fn next_id(size: usize) -> Result<Idx> {
  Idx::try_from(size).map_err(|_| Error::TooManyNodes(size))
}

impl<W: Weight> GraphBase for WeightedGraph<W> {
  type NodeId = Idx;
}

impl<W: Weight> Weighted for WeightedGraph<W> {
  type Weight = W;
}

impl<W: Weight> GraphNodes for WeightedGraph<W> {
  fn contains(&self, node: Idx) -> bool {
    WeightedGraph::contains(self, node)
  }

  fn number_of_nodes(&self) -> usize {
    WeightedGraph::number_of_nodes(self)
  }
}

impl<'a, W: Weight> IntoNeighbors for &'a WeightedGraph<W> {
  type Neighbors = std::iter::Cloned<std::slice::Iter<'a, (Idx, W)>>;

  fn neighbors(self, node_id: Idx) -> Self::Neighbors {
    self
      .nodes
      .get(node_id as usize)
      .map(|node| node.out_edges.as_slice())
      .unwrap_or(&[])
      .iter()
      .cloned()
  }
}

impl<'a, W: Weight> IntoNodes for &'a WeightedGraph<W> {
  type Nodes = std::ops::Range<Idx>;

  fn nodes(self) -> Self::Nodes {
    0..self.nodes.len() as Idx
  }
}

impl<W: Weight> Positioned for WeightedGraph<W> {
  fn position(&self, node: Idx) -> Option<Position> {
    self.positions.get(node as usize).copied()
  }
}
