//! Map matching with a hidden Markov model.
//!
//! Every observation of a trace is a time step whose hidden states are the graph nodes
//! within `candidate_radius` of it. Emissions are Gaussian in the distance between the
//! observation and the node. Transitions penalize exponentially the difference between
//! the road distance of two candidates and the straight line distance of their
//! observations. Road distances come from an all-pairs search from every candidate to
//! the candidates of the following step, bounded by `max_route_distance`. Viterbi
//! decoding then picks the most likely sequence of candidates.

mod candidates;
mod config;
mod route;
mod viterbi;

pub use candidates::*;
pub use config::*;
pub use route::*;
pub use viterbi::*;

use crate::error::Result;
use crate::graph::*;
use crate::graph_impl::SpatialIndex;
use crate::persistent_set::PersistentSet;
use crate::search::{AllPairs, Dijkstra, ShortestPathAll};
use crate::spatial::haversine_distance;
use log::{debug, info};
use std::collections::HashMap;

/// Maps every candidate node to the candidate nodes of the step after it.
fn transition_targets<N: Identifier>(lattice: &[Vec<Candidate<N>>]) -> HashMap<N, PersistentSet<N>> {
  let mut targets: HashMap<N, PersistentSet<N>> = HashMap::new();
  for pair in lattice.windows(2) {
    if pair[1].is_empty() {
      continue;
    }
    for from in &pair[0] {
      let destinations = targets.entry(from.node).or_default();
      for to in &pair[1] {
        *destinations = destinations.insert(to.node);
      }
    }
  }
  targets
}

pub struct MapMatcher<G: GraphBase> {
  graph: G,
  index: SpatialIndex<G::NodeId>,
  config: MatcherConfig,
}

impl<G> MapMatcher<G>
where
  G: Copy + Send + IntoNeighbors + IntoNodes + GraphNodes + Positioned,
  G::NodeId: Send + Sync,
{
  /// Indexes the node positions of `graph`. Fails if the configuration is invalid.
  pub fn new(graph: G, config: MatcherConfig) -> Result<Self> {
    config.validate()?;
    let index = SpatialIndex::from_graph(graph);
    debug!("indexed {} node positions for matching", index.len());
    Ok(Self { graph, index, config })
  }

  pub fn config(&self) -> &MatcherConfig {
    &self.config
  }

  pub fn index(&self) -> &SpatialIndex<G::NodeId> {
    &self.index
  }

  /// Candidate columns of the lattice, one per observation.
  pub fn candidates(&self, observations: &[Observation]) -> Vec<Vec<Candidate<G::NodeId>>> {
    observations
      .iter()
      .enumerate()
      .map(|(step, observation)| find_candidates(&self.index, step, observation, &self.config))
      .collect()
  }

  pub fn match_trace(&self, observations: &[Observation]) -> Result<MatchedRoute<G::NodeId, G::Weight>> {
    let lattice = self.candidates(observations);
    let targets = transition_targets(&lattice);
    debug!(
      "{} observations, {} candidates, {} transition sources",
      observations.len(),
      lattice.iter().map(Vec::len).sum::<usize>(),
      targets.len()
    );

    let max_cost = G::Weight::from_f64(self.config.max_route_distance);
    let mut routes = AllPairs::new(|| Dijkstra::<G>::new(max_cost), self.config.threads);
    routes.initialize_pairs(self.graph, targets)?;
    routes.run()?;

    let beta = self.config.beta;
    let decoded = decode(&lattice, |from, to| {
      let road = routes.path_weight(from.node, to.node)?.to_f64();
      let straight = haversine_distance(&observations[from.step].position, &observations[to.step].position);
      Ok(log_transition(road, straight, beta))
    })?;

    let mut steps = vec![MatchedStep::Unmatched; observations.len()];
    let mut segments = Vec::with_capacity(decoded.len());
    for segment in decoded {
      let mut nodes = Vec::new();
      let mut cost = G::Weight::default();
      let mut previous: Option<G::NodeId> = None;

      for (offset, state) in segment.states.iter().enumerate() {
        let step = segment.first_step + offset;
        let candidate = &lattice[step][*state];
        steps[step] = MatchedStep::Matched {
          node: candidate.node,
          distance: candidate.distance,
          segment: segments.len(),
        };

        match previous {
          None => nodes.push(candidate.node),
          Some(from) => {
            cost = cost + routes.path_weight(from, candidate.node)?;
            nodes.extend(routes.path(from, candidate.node)?.into_iter().skip(1));
          }
        }
        previous = Some(candidate.node);
      }

      segments.push(MatchedSegment {
        first_step: segment.first_step,
        last_step: segment.last_step(),
        nodes,
        cost,
        log_likelihood: segment.log_likelihood,
      });
    }

    let route = MatchedRoute { steps, segments };
    info!(
      "matched {} of {} observations in {} segments",
      observations.len() - route.number_of_unmatched(),
      observations.len(),
      route.segments.len()
    );
    Ok(route)
  }
}
