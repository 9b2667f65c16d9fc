use crate::graph::Weight;

/// Outcome of matching one observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatchedStep<N> {
  Matched {
    node: N,
    /// Distance between the observation and the node in metres.
    distance: f64,
    /// Index into [`MatchedRoute::segments`].
    segment: usize,
  },
  /// No candidate within the radius, or no candidate reachable from the previous step.
  /// The segment before it ends there, and matching resumes with a new segment at the
  /// following step.
  Unmatched,
}

impl<N: Copy> MatchedStep<N> {
  pub fn node(&self) -> Option<N> {
    match self {
      MatchedStep::Matched { node, .. } => Some(*node),
      MatchedStep::Unmatched => None,
    }
  }

  pub fn is_matched(&self) -> bool {
    matches!(self, MatchedStep::Matched { .. })
  }
}

/// Continuous part of a route between two unmatched steps.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchedSegment<N, W> {
  pub first_step: usize,
  pub last_step: usize,
  /// Every node driven through, the matched nodes plus the shortest paths between them.
  pub nodes: Vec<N>,
  /// Road weight of `nodes`.
  pub cost: W,
  pub log_likelihood: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchedRoute<N, W> {
  /// One entry per observation.
  pub steps: Vec<MatchedStep<N>>,
  pub segments: Vec<MatchedSegment<N, W>>,
}

impl<N: Copy, W: Weight> MatchedRoute<N, W> {
  /// Total road weight of all segments.
  pub fn cost(&self) -> W {
    self
      .segments
      .iter()
      .fold(W::default(), |total, segment| total + segment.cost)
  }

  pub fn log_likelihood(&self) -> f64 {
    self.segments.iter().map(|segment| segment.log_likelihood).sum()
  }

  /// Matched node per observation, `None` for unmatched ones.
  pub fn matched_nodes(&self) -> Vec<Option<N>> {
    self.steps.iter().map(MatchedStep::node).collect()
  }

  pub fn number_of_unmatched(&self) -> usize {
    self.steps.iter().filter(|step| !step.is_matched()).count()
  }
}
