use crate::graph::*;
use crate::graph_impl::*;
use crate::spatial::*;

use proptest::prelude::*;

/// Positions on a 10 column grid with 0.001 degree spacing, roughly 70 by 110 metres.
pub fn grid_position(i: usize) -> Position {
  Position {
    x: 10.0 + (i % 10) as f64 * 0.001,
    y: 50.0 + (i / 10) as f64 * 0.001,
  }
}

pub fn graph_from_positions_and_edges(size: usize, edges: Vec<(usize, usize, u64)>) -> WeightedGraph<u64> {
  let mut graph = WeightedGraph::new_with_positions((0..size).map(grid_position).collect());
  for (from, to, weight) in edges {
    graph.add_edge(from as Idx, to as Idx, weight).unwrap();
  }
  graph
}

fn metric_weight(graph: &WeightedGraph<u64>, from: Idx, to: Idx) -> u64 {
  let from = graph.position(from).unwrap();
  let to = graph.position(to).unwrap();
  haversine_distance(&from, &to).ceil() as u64
}

/// Nodes along a meridian, 0.001 degree apart, connected in both directions by edges
/// weighing their rounded up length in metres.
pub fn line_graph(size: usize) -> WeightedGraph<u64> {
  let positions = (0..size)
    .map(|i| Position {
      x: 10.0,
      y: 50.0 + i as f64 * 0.001,
    })
    .collect();
  let mut graph = WeightedGraph::new_with_positions(positions);
  for i in 1..size as Idx {
    let weight = metric_weight(&graph, i - 1, i);
    graph.add_edge(i - 1, i, weight).unwrap();
    graph.add_edge(i, i - 1, weight).unwrap();
  }
  graph
}

/// Grid graph whose edges weigh at least their length in metres plus the given extra.
pub fn geometric_graph(size: usize, edges: Vec<(usize, usize, u64)>) -> WeightedGraph<u64> {
  let mut graph = graph_from_positions_and_edges(size, vec![]);
  for (from, to, extra) in edges {
    let weight = metric_weight(&graph, from as Idx, to as Idx) + extra;
    graph.add_edge(from as Idx, to as Idx, weight).unwrap();
  }
  graph
}

/// Node count and edges `(from, to, weight)` of a random directed graph.
pub fn random_graph_strategy(
  max_nodes: usize,
  max_edges: usize,
) -> impl Strategy<Value = (usize, Vec<(usize, usize, u64)>)> {
  (1..=max_nodes).prop_flat_map(move |nodes| {
    (
      Just(nodes),
      prop::collection::vec((0..nodes, 0..nodes, 0u64..20), 0..=max_edges),
    )
  })
}

/// Bellman-Ford distances from `source`, `None` for unreachable nodes.
pub fn reference_distances(graph: &WeightedGraph<u64>, source: Idx) -> Vec<Option<u64>> {
  let mut distances = vec![None; graph.number_of_nodes()];
  distances[source as usize] = Some(0);

  for _ in 0..graph.number_of_nodes() {
    let mut changed = false;
    for node in graph.nodes() {
      let base = match distances[node as usize] {
        Some(base) => base,
        None => continue,
      };
      for (next, weight) in graph.neighbors(node) {
        let candidate = base + weight;
        if distances[next as usize].map_or(true, |current| candidate < current) {
          distances[next as usize] = Some(candidate);
          changed = true;
        }
      }
    }
    if !changed {
      break;
    }
  }
  distances
}

/// Weight of a node sequence using the lightest parallel edge per step, `None` if the
/// sequence is empty or a step has no edge.
pub fn path_weight_of(graph: &WeightedGraph<u64>, path: &[Idx]) -> Option<u64> {
  if path.is_empty() {
    return None;
  }
  path.windows(2).try_fold(0u64, |total, step| {
    graph
      .neighbors(step[0])
      .filter(|(to, _)| *to == step[1])
      .map(|(_, weight)| weight)
      .min()
      .map(|weight| total + weight)
  })
}
