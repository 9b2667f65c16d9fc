use crate::graph::GraphBase;
use crate::spatial::Position;

/// Defines how to obtain the position of a graph node
pub trait Positioned: GraphBase {
  fn position(&self, node: Self::NodeId) -> Option<Position>;
}

/// Defines a spatial index for graph nodes
/// 
/// Distances are great-circle distances in metres.
pub trait Spatial: GraphBase {
  /// All nodes within `radius` of `center` as `(node, distance)`, nearest first.
  fn find_nodes(&self, center: &Position, radius: f64) -> Vec<(Self::NodeId, f64)>;

  fn nearest_node(&self, center: &Position) -> Option<(Self::NodeId, f64)>;
}

impl<'a, G: Positioned> Positioned for &'a G {
  fn position(&self, node: Self::NodeId) -> Option<Position> {
    (*self).position(node)
  }
}

impl<'a, G: Spatial> Spatial for &'a G {
  fn find_nodes(&self, center: &Position, radius: f64) -> Vec<(Self::NodeId, f64)> {
    (*self).find_nodes(center, radius)
  }

  fn nearest_node(&self, center: &Position) -> Option<(Self::NodeId, f64)> {
    (*self).nearest_node(center)
  }
}
