use super::{ShortestPathAll, ShortestPathOneMany};
use crate::error::{Error, Result};
use crate::graph::*;
use crate::persistent_set::PersistentSet;
use crossbeam_channel::Receiver;
use log::{debug, trace};
use std::collections::HashMap;
use std::thread;

/// Results of one source: weights to its destinations plus the shortest path tree, so
/// paths can be unwound through nodes outside the subset.
struct DistanceRow<N, W> {
  weights: HashMap<N, W>,
  tree: HashMap<N, N>,
}

/// Shortest paths between every pair of a node subset.
///
/// Sources are pushed to a shared queue which is closed before a fixed pool of workers
/// starts draining it. Each worker owns a one-to-many search created by `factory`, so no
/// search state is shared between threads, and produces the rows of the sources it
/// pulled. Rows are disjoint, only the queue is synchronized. A worker stops when the
/// queue is closed and empty.
///
/// By default every node of the subset is a destination of every source.
/// `initialize_pairs` narrows the destinations per source, which keeps the table linear
/// in the number of sources when each of them only needs a few destinations.
pub struct AllPairs<G: Weighted, F> {
  factory: F,
  threads: usize,
  graph: Option<G>,
  nodes: PersistentSet<G::NodeId>,
  targets: Option<HashMap<G::NodeId, PersistentSet<G::NodeId>>>,
  rows: Option<HashMap<G::NodeId, DistanceRow<G::NodeId, G::Weight>>>,
}

impl<G: Weighted, F> AllPairs<G, F> {
  pub fn new(factory: F, threads: usize) -> Self {
    Self {
      factory,
      threads,
      graph: None,
      nodes: PersistentSet::new(),
      targets: None,
      rows: None,
    }
  }

  /// The node subset of the last `initialize()`, the sources after `initialize_pairs()`.
  pub fn nodes(&self) -> &PersistentSet<G::NodeId> {
    &self.nodes
  }

  /// Number of weights held by the distance table.
  pub fn number_of_weights(&self) -> usize {
    self
      .rows
      .as_ref()
      .map_or(0, |rows| rows.values().map(|row| row.weights.len()).sum())
  }

  fn check_threads(&self) -> Result<()> {
    if self.threads == 0 {
      return Err(Error::invalid_parameter("threads", "at least one worker is required"));
    }
    Ok(())
  }

  fn row(&self, source: G::NodeId) -> Result<&DistanceRow<G::NodeId, G::Weight>> {
    let rows = match (self.graph.is_some(), &self.rows) {
      (false, _) => return Err(Error::NotInitialized),
      (true, None) => return Err(Error::NotRun),
      (true, Some(rows)) => rows,
    };
    rows.get(&source).ok_or_else(|| Error::unknown_node(source))
  }
}

impl<G, F, S> AllPairs<G, F>
where
  G: Copy + Send + IntoNodes + GraphNodes + Weighted,
  G::NodeId: Send + Sync,
  F: Fn() -> S + Sync,
  S: ShortestPathOneMany<G>,
{
  /// Uses every node of the graph as the subset.
  pub fn initialize_all(&mut self, graph: G) -> Result<()> {
    let nodes = graph.nodes().collect();
    self.initialize(graph, nodes)
  }
}

impl<G, F, S> AllPairs<G, F>
where
  G: Copy + Send + GraphNodes + Weighted,
  G::NodeId: Send + Sync,
  F: Fn() -> S + Sync,
  S: ShortestPathOneMany<G>,
{
  /// Searches from every key of `targets` and keeps only the weights to its own
  /// destinations.
  pub fn initialize_pairs(
    &mut self,
    graph: G,
    targets: HashMap<G::NodeId, PersistentSet<G::NodeId>>,
  ) -> Result<()> {
    self.check_threads()?;
    let unknown = targets
      .iter()
      .flat_map(|(source, destinations)| std::iter::once(source).chain(destinations.iter()))
      .find(|node| !graph.contains(**node));
    if let Some(unknown) = unknown {
      return Err(Error::unknown_node(*unknown));
    }
    self.graph = Some(graph);
    self.nodes = targets.keys().copied().collect();
    self.targets = Some(targets);
    self.rows = None;
    Ok(())
  }
}

fn worker_loop<G, S>(
  worker: usize,
  graph: G,
  mut search: S,
  queue: Receiver<G::NodeId>,
  nodes: &PersistentSet<G::NodeId>,
  targets: Option<&HashMap<G::NodeId, PersistentSet<G::NodeId>>>,
) -> Result<Vec<(G::NodeId, DistanceRow<G::NodeId, G::Weight>)>>
where
  G: Copy + Weighted,
  S: ShortestPathOneMany<G>,
{
  trace!("all-pairs worker {} started", worker);
  let mut rows = Vec::new();

  // `recv` fails once the queue is closed and drained
  while let Ok(source) = queue.recv() {
    search.initialize(graph, source)?;
    search.run()?;

    let destinations = targets
      .and_then(|targets| targets.get(&source))
      .unwrap_or(nodes);
    let mut weights = HashMap::with_capacity(destinations.len());
    for destination in destinations.iter() {
      weights.insert(*destination, search.path_weight(*destination)?);
    }
    rows.push((
      source,
      DistanceRow {
        weights,
        tree: search.predecessors()?,
      },
    ));
  }

  trace!("all-pairs worker {} finished {} sources", worker, rows.len());
  Ok(rows)
}

impl<G, F, S> ShortestPathAll<G> for AllPairs<G, F>
where
  G: Copy + Send + GraphNodes + Weighted,
  G::NodeId: Send + Sync,
  F: Fn() -> S + Sync,
  S: ShortestPathOneMany<G>,
{
  fn initialize(&mut self, graph: G, nodes: PersistentSet<G::NodeId>) -> Result<()> {
    self.check_threads()?;
    if let Some(unknown) = nodes.iter().find(|node| !graph.contains(**node)) {
      return Err(Error::unknown_node(*unknown));
    }
    self.graph = Some(graph);
    self.nodes = nodes;
    self.targets = None;
    self.rows = None;
    Ok(())
  }

  fn run(&mut self) -> Result<()> {
    let graph = self.graph.ok_or(Error::NotInitialized)?;

    let (sender, receiver) = crossbeam_channel::unbounded();
    for source in self.nodes.iter() {
      // Only fails without receivers, and `receiver` lives until the end of this function
      sender
        .send(*source)
        .map_err(|_| Error::StructuralInvariantBroken("all-pairs work queue"))?;
    }
    drop(sender);

    let nodes = &self.nodes;
    let targets = self.targets.as_ref();
    let factory = &self.factory;
    let threads = self.threads.min(nodes.len().max(1));

    let results: Vec<Result<Vec<_>>> = thread::scope(|scope| {
      let handles: Vec<_> = (0..threads)
        .map(|worker| {
          let queue = receiver.clone();
          scope.spawn(move || worker_loop(worker, graph, factory(), queue, nodes, targets))
        })
        .collect();

      handles
        .into_iter()
        .map(|handle| handle.join().unwrap_or(Err(Error::WorkerPanicked)))
        .collect()
    });

    let mut rows = HashMap::with_capacity(nodes.len());
    for worker_rows in results {
      rows.extend(worker_rows?);
    }

    self.rows = Some(rows);
    debug!(
      "all-pairs computed {} rows with {} weights using {} workers",
      nodes.len(),
      self.number_of_weights(),
      threads
    );
    Ok(())
  }

  fn prev(&self, source: G::NodeId, destination: G::NodeId) -> Result<Option<G::NodeId>> {
    Ok(self.row(source)?.tree.get(&destination).copied())
  }

  fn path_weight(&self, source: G::NodeId, destination: G::NodeId) -> Result<G::Weight> {
    self
      .row(source)?
      .weights
      .get(&destination)
      .copied()
      .ok_or_else(|| Error::unknown_node(destination))
  }
}

#[cfg(test)]
mod tests {
  use super::super::super::test_utils::*;
  use super::super::Dijkstra;
  use super::*;
  use crate::graph_impl::WeightedGraph;
  use proptest::prelude::*;
  use rstest::rstest;

  type Graph<'a> = &'a WeightedGraph<u64>;

  fn grid() -> WeightedGraph<u64> {
    // 3x3 grid, edges to the right and down
    let mut edges = Vec::new();
    for row in 0..3 {
      for col in 0..3 {
        let id = row * 3 + col;
        if col < 2 {
          edges.push((id, id + 1, 1 + col as u64));
        }
        if row < 2 {
          edges.push((id, id + 3, 2));
        }
      }
    }
    graph_from_positions_and_edges(9, edges)
  }

  #[rstest]
  #[case(1)]
  #[case(2)]
  #[case(8)]
  fn test_subset_distances(#[case] threads: usize) {
    let graph = grid();
    let mut all_pairs = AllPairs::new(|| Dijkstra::<Graph>::unbounded(), threads);
    let subset: PersistentSet<u32> = vec![0, 4, 8].into_iter().collect();
    all_pairs.initialize(&graph, subset).unwrap();
    all_pairs.run().unwrap();

    assert_eq!(all_pairs.path_weight(0, 0).unwrap(), 0);
    assert_eq!(all_pairs.path_weight(0, 4).unwrap(), 3);
    assert_eq!(all_pairs.path_weight(0, 8).unwrap(), 7);
    assert_eq!(all_pairs.path_weight(4, 8).unwrap(), 4);
    assert_eq!(all_pairs.path_weight(8, 0).unwrap(), u64::INFINITY);

    assert_eq!(all_pairs.path(0, 4).unwrap(), vec![0, 1, 4]);
    assert_eq!(all_pairs.path(0, 0).unwrap(), vec![0]);
    assert!(all_pairs.path(8, 4).unwrap().is_empty());
    assert_eq!(all_pairs.prev(0, 4).unwrap(), Some(1));
    assert_eq!(all_pairs.prev(0, 0).unwrap(), None);

    // Destinations outside the subset have no stored weight
    assert_eq!(all_pairs.path_weight(0, 5), Err(Error::unknown_node(5u32)));
    assert_eq!(all_pairs.path_weight(5, 0), Err(Error::unknown_node(5u32)));
  }

  #[test]
  fn test_preconditions() {
    let graph = grid();
    let mut all_pairs = AllPairs::new(|| Dijkstra::<Graph>::unbounded(), 0);
    assert!(matches!(
      all_pairs.initialize_all(&graph),
      Err(Error::InvalidParameter { name: "threads", .. })
    ));

    let mut all_pairs = AllPairs::new(|| Dijkstra::<Graph>::unbounded(), 2);
    assert_eq!(all_pairs.run(), Err(Error::NotInitialized));
    let subset: PersistentSet<u32> = vec![1, 12].into_iter().collect();
    assert_eq!(all_pairs.initialize(&graph, subset), Err(Error::unknown_node(12u32)));

    all_pairs.initialize_all(&graph).unwrap();
    assert_eq!(all_pairs.nodes().len(), 9);
    assert_eq!(all_pairs.path_weight(0, 1), Err(Error::NotRun));
  }

  #[test]
  fn test_empty_subset() {
    let graph = grid();
    let mut all_pairs = AllPairs::new(|| Dijkstra::<Graph>::unbounded(), 4);
    all_pairs.initialize(&graph, PersistentSet::new()).unwrap();
    all_pairs.run().unwrap();
    assert_eq!(all_pairs.path_weight(0, 0), Err(Error::unknown_node(0u32)));
  }

  #[test]
  fn test_pairs_keep_only_requested_destinations() {
    let graph = grid();
    let mut targets = HashMap::new();
    targets.insert(0u32, vec![4, 8].into_iter().collect::<PersistentSet<u32>>());
    targets.insert(4, vec![8].into_iter().collect());

    let mut all_pairs = AllPairs::new(|| Dijkstra::<Graph>::unbounded(), 2);
    all_pairs.initialize_pairs(&graph, targets).unwrap();
    assert_eq!(all_pairs.nodes().items(), vec![0, 4]);
    all_pairs.run().unwrap();

    assert_eq!(all_pairs.number_of_weights(), 3);
    assert_eq!(all_pairs.path_weight(0, 8).unwrap(), 7);
    assert_eq!(all_pairs.path_weight(4, 8).unwrap(), 4);
    assert_eq!(all_pairs.path(0, 4).unwrap(), vec![0, 1, 4]);
    assert_eq!(all_pairs.path_weight(4, 0), Err(Error::unknown_node(0u32)));
    assert_eq!(all_pairs.path_weight(8, 8), Err(Error::unknown_node(8u32)));

    let mut unknown = HashMap::new();
    unknown.insert(0u32, vec![20].into_iter().collect::<PersistentSet<u32>>());
    assert_eq!(all_pairs.initialize_pairs(&graph, unknown), Err(Error::unknown_node(20u32)));
  }

  #[test]
  fn test_cutoff_applies_per_row() {
    let graph = grid();
    let mut all_pairs = AllPairs::new(|| Dijkstra::<Graph>::new(4), 3);
    all_pairs.initialize_all(&graph).unwrap();
    all_pairs.run().unwrap();

    assert_eq!(all_pairs.path_weight(0, 4).unwrap(), 3);
    assert_eq!(all_pairs.path_weight(0, 8).unwrap(), u64::INFINITY);
    assert_eq!(all_pairs.path_weight(4, 8).unwrap(), 4);
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn independent_of_thread_count(
      (nodes, edges) in random_graph_strategy(14, 50),
      threads in 2usize..6,
    ) {
      let graph = graph_from_positions_and_edges(nodes, edges);

      let mut parallel = AllPairs::new(|| Dijkstra::<Graph>::unbounded(), threads);
      parallel.initialize_all(&graph).unwrap();
      parallel.run().unwrap();

      for source in 0..nodes as u32 {
        let mut sequential = Dijkstra::unbounded();
        sequential.initialize(&graph, source).unwrap();
        sequential.run().unwrap();

        for destination in 0..nodes as u32 {
          prop_assert_eq!(
            parallel.path_weight(source, destination).unwrap(),
            sequential.path_weight(destination).unwrap()
          );
          prop_assert_eq!(
            parallel.prev(source, destination).unwrap(),
            sequential.prev(destination).unwrap()
          );
        }
      }
    }
  }
}
