use super::common::*;
use crate::graph::*;
use crate::spatial::{envelope, haversine_distance, BoundingBox, Position};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

#[derive(Debug, Clone)]
struct Entry<N> {
  id: N,
  point: [f64; 2],
}

fn to_aabb(bbox: &BoundingBox) -> AABB<[f64; 2]> {
  let min = bbox.min().x_y();
  let max = bbox.max().x_y();
  AABB::from_corners([min.0, min.1], [max.0, max.1])
}

impl<N> Entry<N> {
  fn new(id: N, position: &Position) -> Self {
    Self {
      id,
      point: [position.x, position.y],
    }
  }

  fn position(&self) -> Position {
    Position {
      x: self.point[0],
      y: self.point[1],
    }
  }
}

impl<N> RTreeObject for Entry<N> {
  type Envelope = AABB<[f64; 2]>;
  fn envelope(&self) -> Self::Envelope {
    AABB::from_point(self.point)
  }
}

impl<N> PointDistance for Entry<N> {
  fn distance_2(&self, point: &[f64; 2]) -> f64 {
    let dx = self.point[0] - point[0];
    let dy = self.point[1] - point[1];
    dx * dx + dy * dy
  }
}

/// Nearest-node and radius queries over node positions.
/// 
/// Points are bulk loaded into an R*-tree, which recursively partitions the plane until
/// every leaf holds a bounded number of points. Queries prune with lon/lat envelopes and
/// then measure exact great-circle distances, so results are in metres.
pub struct SpatialIndex<N = Idx> {
  rtree: RTree<Entry<N>>,
}

impl<N: Identifier> SpatialIndex<N> {
  pub fn new<P: IntoIterator<Item = (N, Position)>>(points: P) -> Self {
    let entries = points
      .into_iter()
      .map(|(id, position)| Entry::new(id, &position))
      .collect();
    Self {
      rtree: RTree::bulk_load(entries),
    }
  }

  /// Indexes every node of the graph which has a position.
  pub fn from_graph<G>(graph: G) -> Self
  where
    G: Copy + IntoNodes<NodeId = N> + Positioned,
  {
    Self::new(
      graph
        .nodes()
        .filter_map(|id| graph.position(id).map(|position| (id, position))),
    )
  }

  pub fn len(&self) -> usize {
    self.rtree.size()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<N: Identifier> GraphBase for SpatialIndex<N> {
  type NodeId = N;
}

impl<N: Identifier> Spatial for SpatialIndex<N> {
  fn find_nodes(&self, center: &Position, radius: f64) -> Vec<(N, f64)> {
    if radius < 0.0 || radius.is_nan() {
      return Vec::new();
    }
    let bbox = to_aabb(&envelope(center, radius));
    let mut result: Vec<(N, f64)> = self
      .rtree
      .locate_in_envelope(&bbox)
      .map(|entry| (entry.id, haversine_distance(center, &entry.position())))
      .filter(|(_, distance)| *distance <= radius)
      .collect();
    result.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    result
  }

  fn nearest_node(&self, center: &Position) -> Option<(N, f64)> {
    // The planar nearest point bounds the great-circle nearest one from above.
    let closest = self.rtree.nearest_neighbor(&[center.x, center.y])?;
    let bound = haversine_distance(center, &closest.position());
    self.find_nodes(center, bound).into_iter().next()
  }
}
