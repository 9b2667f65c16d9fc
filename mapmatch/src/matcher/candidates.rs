use super::MatcherConfig;
use crate::graph::{Identifier, Spatial};
use crate::spatial::Position;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Raw position fix of a trace.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
  pub position: Position,
  /// Seconds, only used to order observations.
  pub timestamp: i64,
}

impl Observation {
  pub fn new(position: Position, timestamp: i64) -> Self {
    Self { position, timestamp }
  }
}

/// Graph node hypothesized as the true position behind an observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate<N> {
  pub step: usize,
  pub node: N,
  /// Great-circle distance to the observation in metres.
  pub distance: f64,
  pub log_emission: f64,
}

impl<N> Candidate<N> {
  pub fn emission_probability(&self) -> f64 {
    self.log_emission.exp()
  }
}

/// Log density of a zero mean normal distribution.
pub fn log_emission(distance: f64, sigma_z: f64) -> f64 {
  let z = distance / sigma_z;
  -((2.0 * PI).sqrt() * sigma_z).ln() - 0.5 * z * z
}

/// Log density of an exponential distribution over the difference between the road
/// distance and the great-circle distance of two consecutive observations.
pub fn log_transition(road_distance: f64, great_circle: f64, beta: f64) -> f64 {
  if !road_distance.is_finite() {
    return f64::NEG_INFINITY;
  }
  -beta.ln() - (road_distance - great_circle).abs() / beta
}

/// Candidates of one observation, nearest first.
pub fn find_candidates<S>(index: &S, step: usize, observation: &Observation, config: &MatcherConfig) -> Vec<Candidate<S::NodeId>>
where
  S: Spatial,
  S::NodeId: Identifier,
{
  let mut nearby = index.find_nodes(&observation.position, config.candidate_radius);
  if let Some(limit) = config.max_candidates {
    nearby.truncate(limit);
  }
  nearby
    .into_iter()
    .map(|(node, distance)| Candidate {
      step,
      node,
      distance,
      log_emission: log_emission(distance, config.sigma_z),
    })
    .collect()
}
