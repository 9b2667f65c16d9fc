use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tunables of the map matcher.
///
/// Distances are metres, except `max_route_distance` which is compared against path
/// weights and therefore uses the graph's weight unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
  /// Standard deviation of the observation noise.
  pub sigma_z: f64,
  /// Rate of the exponential penalty on the difference between road and straight line
  /// distance of consecutive observations.
  pub beta: f64,
  pub candidate_radius: f64,
  /// Keep at most this many candidates per observation, nearest first.
  pub max_candidates: Option<usize>,
  /// Cutoff of the transition search. Candidates further apart on the road network can't
  /// follow each other.
  pub max_route_distance: f64,
  pub threads: usize,
}

impl Default for MatcherConfig {
  fn default() -> Self {
    Self {
      sigma_z: 4.07,
      beta: 3.0,
      candidate_radius: 50.0,
      max_candidates: Some(8),
      max_route_distance: 2000.0,
      threads: 4,
    }
  }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
  if value.is_finite() && value > 0.0 {
    Ok(())
  } else {
    Err(Error::invalid_parameter(name, format!("must be positive and finite, got {}", value)))
  }
}

impl MatcherConfig {
  pub fn validate(&self) -> Result<()> {
    positive("sigma_z", self.sigma_z)?;
    positive("beta", self.beta)?;
    positive("candidate_radius", self.candidate_radius)?;
    positive("max_route_distance", self.max_route_distance)?;
    if self.max_candidates == Some(0) {
      return Err(Error::invalid_parameter("max_candidates", "must keep at least one candidate"));
    }
    if self.threads == 0 {
      return Err(Error::invalid_parameter("threads", "at least one worker is required"));
    }
    Ok(())
  }

  pub fn with_sigma_z(mut self, sigma_z: f64) -> Self {
    self.sigma_z = sigma_z;
    self
  }

  pub fn with_beta(mut self, beta: f64) -> Self {
    self.beta = beta;
    self
  }

  pub fn with_candidate_radius(mut self, radius: f64) -> Self {
    self.candidate_radius = radius;
    self
  }

  pub fn with_max_candidates(mut self, max_candidates: Option<usize>) -> Self {
    self.max_candidates = max_candidates;
    self
  }

  pub fn with_max_route_distance(mut self, distance: f64) -> Self {
    self.max_route_distance = distance;
    self
  }

  pub fn with_threads(mut self, threads: usize) -> Self {
    self.threads = threads;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_are_valid() {
    assert!(MatcherConfig::default().validate().is_ok());
  }

  #[test]
  fn test_invalid_parameters() {
    let invalid = vec![
      ("sigma_z", MatcherConfig::default().with_sigma_z(0.0)),
      ("beta", MatcherConfig::default().with_beta(-1.0)),
      ("candidate_radius", MatcherConfig::default().with_candidate_radius(f64::NAN)),
      ("max_route_distance", MatcherConfig::default().with_max_route_distance(f64::INFINITY)),
      ("max_candidates", MatcherConfig::default().with_max_candidates(Some(0))),
      ("threads", MatcherConfig::default().with_threads(0)),
    ];
    for (expected, config) in invalid {
      match config.validate() {
        Err(Error::InvalidParameter { name, .. }) => assert_eq!(name, expected),
        other => panic!("{} was accepted: {:?}", expected, other),
      }
    }
  }

  #[test]
  fn test_deserialize_partial_json() {
    let config: MatcherConfig =
      serde_json::from_str(r#"{"sigma_z": 2.5, "max_candidates": null, "threads": 2}"#).unwrap();

    assert_eq!(
      config,
      MatcherConfig::default()
        .with_sigma_z(2.5)
        .with_max_candidates(None)
        .with_threads(2)
    );

    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(serde_json::from_str::<MatcherConfig>(&json).unwrap(), config);
  }
}
