use crate::error::{Error, Result};
use crate::graph::*;
use crate::spatial::{haversine_distance, Position};

/// Estimate of the remaining weight from a node to the destination of a search.
///
/// A* returns optimal paths only for admissible heuristics, i.e. estimates which never
/// exceed the true remaining weight. Other heuristics still terminate but may produce a
/// longer path.
pub trait Heuristic<N, W> {
  fn estimate(&self, node: N) -> W;
}

/// Always estimates zero, which reduces A* to Dijkstra's algorithm.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroHeuristic;

impl<N, W: Weight> Heuristic<N, W> for ZeroHeuristic {
  fn estimate(&self, _node: N) -> W {
    W::default()
  }
}

/// Wraps a closure `node -> estimate` into a heuristic.
#[derive(Clone, Copy)]
pub struct FnHeuristic<F>(pub F);

impl<N, W, F: Fn(N) -> W> Heuristic<N, W> for FnHeuristic<F> {
  fn estimate(&self, node: N) -> W {
    (self.0)(node)
  }
}

/// Great-circle distance to the destination, scaled into weight units.
///
/// Admissible whenever every edge weighs at least `scale` times its geometric length in
/// metres, e.g. `scale = 1` for edge lengths in metres.
pub struct HaversineHeuristic<G> {
  graph: G,
  target: Position,
  scale: f64,
}

impl<G: Positioned> HaversineHeuristic<G> {
  pub fn new(graph: G, destination: G::NodeId) -> Result<Self> {
    let target = graph
      .position(destination)
      .ok_or_else(|| Error::unknown_node(destination))?;
    Ok(Self {
      graph,
      target,
      scale: 1.0,
    })
  }

  pub fn with_scale(mut self, scale: f64) -> Self {
    self.scale = scale;
    self
  }
}

impl<G: Positioned, W: Weight> Heuristic<G::NodeId, W> for HaversineHeuristic<G> {
  fn estimate(&self, node: G::NodeId) -> W {
    self
      .graph
      .position(node)
      .map(|position| W::from_f64(haversine_distance(&position, &self.target) * self.scale))
      .unwrap_or_default()
  }
}
