use crate::graph::*;
use crate::search::Heuristic;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

#[derive(Copy, Clone, Eq, PartialEq)]
struct State<W: Weight, N: Identifier> {
  // Accumulated cost plus the heuristic estimate of the remainder
  estimate: W,
  cost: W,
  // Discovery order, resolves ties on `estimate`
  sequence: u64,
  id: N,
}

impl<W: Weight, N: Identifier> Ord for State<W, N> {
  fn cmp(&self, other: &Self) -> Ordering {
    // Sorted desc, earliest discovered first among equal estimates
    other
      .estimate
      .cmp(&self.estimate)
      .then_with(|| other.sequence.cmp(&self.sequence))
  }
}

// `PartialOrd` needs to be implemented as well.
impl<W: Weight, N: Identifier> PartialOrd for State<W, N> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

/// Frontier, tentative costs with predecessors and the set of finalized nodes of one
/// best-first search. Each reached node has at most one recorded predecessor, so the
/// resolved entries form a shortest-path tree rooted at the source.
pub struct SearchSpace<W: Weight, N: Identifier> {
  pq: BinaryHeap<State<W, N>>,
  resolved: HashMap<N, (W, Option<N>)>,
  visited: HashSet<N>,
  sequence: u64,
}

impl<W: Weight, N: Identifier> SearchSpace<W, N> {
  pub fn new() -> Self {
    SearchSpace {
      pq: BinaryHeap::new(),
      resolved: HashMap::new(),
      visited: HashSet::new(),
      sequence: 0,
    }
  }

  pub fn clear(&mut self) {
    self.pq.clear();
    self.resolved.clear();
    self.visited.clear();
    self.sequence = 0;
  }

  pub fn init(&mut self, node: N, estimate: W) {
    self.resolved.insert(node, (W::default(), None));
    self.push(node, W::default(), estimate);
  }

  /// Finalizes the next node of the frontier and relaxes its outgoing edges.
  ///
  /// Edges leading beyond `max_cost` are not relaxed, so nodes further away than the
  /// cutoff are never reached. A finalized node reached again with a smaller cost is
  /// reopened, which only happens for heuristics that are admissible but not consistent.
  /// Returns `None` once the frontier is exhausted.
  pub fn settle_next<G, H>(&mut self, graph: G, heuristic: &H, max_cost: W) -> Option<(N, W)>
  where
    G: IntoNeighbors<NodeId = N, Weight = W>,
    H: Heuristic<N, W> + ?Sized,
  {
    let State { cost, id, .. } = loop {
      let state = self.pq.pop()?;
      if self.visited.contains(&state.id) {
        continue;
      }
      if let Some((resolved_cost, _)) = self.resolved.get(&state.id) {
        if state.cost > *resolved_cost {
          continue;
        }
      }
      break state;
    };

    self.visited.insert(id);

    for (target_id, weight) in graph.neighbors(id) {
      let path_cost = cost.saturating_add(weight);
      if path_cost.is_infinite() || path_cost > max_cost {
        continue;
      }
      if let Some((target_cost, _)) = self.resolved.get(&target_id) {
        if path_cost >= *target_cost {
          continue;
        }
      }
      self.resolved.insert(target_id, (path_cost, Some(id)));
      self.visited.remove(&target_id);
      let estimate = path_cost.saturating_add(heuristic.estimate(target_id));
      self.push(target_id, path_cost, estimate);
    }

    Some((id, cost))
  }

  pub fn has_visited(&self, node: N) -> bool {
    self.visited.contains(&node)
  }

  pub fn number_of_visited(&self) -> usize {
    self.visited.len()
  }

  /// Predecessor recorded when `node` was finalized.
  pub fn prev(&self, node: N) -> Option<N> {
    if !self.has_visited(node) {
      return None;
    }
    self.parent(node)
  }

  fn parent(&self, node: N) -> Option<N> {
    self.resolved.get(&node).and_then(|(_, parent)| *parent)
  }

  pub fn cost(&self, node: N) -> W {
    if !self.has_visited(node) {
      return W::INFINITY;
    }
    self
      .resolved
      .get(&node)
      .map(|(cost, _)| *cost)
      .unwrap_or(W::INFINITY)
  }

  /// Nodes from the source to `node`, empty when `node` was not finalized.
  pub fn unwind(&self, node: N) -> Vec<N> {
    let mut result: Vec<N> = Vec::new();
    if !self.has_visited(node) {
      return result;
    }

    // Nodes on the way may have been reopened since, so follow recorded parents directly
    let mut current_node = Some(node);
    while let Some(id) = current_node {
      result.push(id);
      current_node = self.parent(id);
    }
    // Need to reverse the list to get elements in the routing order
    result.reverse();
    result
  }

  /// Predecessor of every finalized node except the source.
  pub fn tree(&self) -> HashMap<N, N> {
    self
      .visited
      .iter()
      .filter_map(|node| self.prev(*node).map(|parent| (*node, parent)))
      .collect()
  }

  fn push(&mut self, node: N, cost: W, estimate: W) {
    self.sequence += 1;
    self.pq.push(State {
      estimate,
      cost,
      sequence: self.sequence,
      id: node,
    });
  }
}
