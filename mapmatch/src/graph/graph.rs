use crate::graph::Weight;
use std::fmt::Debug;
use std::hash::Hash;
use std::iter::Iterator;

// ====== Basic traits =====

/// Requirements for a node identifier
pub trait Identifier: Eq + Ord + Hash + Copy + Debug {}
impl<T> Identifier for T where T: Eq + Ord + Hash + Copy + Debug {}

/// Defines type of the identifier for the graph
pub trait GraphBase {
  type NodeId: Identifier;
}

/// Defines the type of edge weights(costs) of the graph
pub trait Weighted: GraphBase {
  type Weight: Weight;
}

/// Membership and size of the node set
pub trait GraphNodes: GraphBase {
  fn contains(&self, node: Self::NodeId) -> bool;
  fn number_of_nodes(&self) -> usize;
}

// ====== Neighbors access =====

/// Trait for defining graph connectivity
/// 
/// `neighbors()` for node with id `u` must return all pairs `(v, w)` such that there is an
/// edge from `u` to `v` with weight `w` in the graph.
pub trait IntoNeighbors: Weighted {
  type Neighbors: Iterator<Item = (Self::NodeId, Self::Weight)>;
  fn neighbors(self, node: Self::NodeId) -> Self::Neighbors;
}

/// Iteration over all node identifiers of the graph
pub trait IntoNodes: GraphBase {
  type Nodes: Iterator<Item = Self::NodeId>;
  fn nodes(self) -> Self::Nodes;
}

// ====== Blanket implementations =====

impl<'a, G: GraphBase> GraphBase for &'a G {
  type NodeId = G::NodeId;
}

impl<'a, G: Weighted> Weighted for &'a G {
  type Weight = G::Weight;
}

impl<'a, G: GraphNodes> GraphNodes for &'a G {
  fn contains(&self, node: Self::NodeId) -> bool {
    (*self).contains(node)
  }

  fn number_of_nodes(&self) -> usize {
    (*self).number_of_nodes()
  }
}
