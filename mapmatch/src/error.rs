//! Error type shared by all components of the crate.
//!
//! Only precondition violations and internal invariant failures are errors. A missing
//! path or an observation without candidates is an ordinary result: predecessor lookups
//! return `None`, weight lookups return [`Weight::INFINITY`](crate::graph::Weight::INFINITY)
//! and the matcher reports the step as unmatched.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
  /// A node id that is not part of the graph (or of the searched node subset).
  #[error("unknown node {0}")]
  UnknownNode(String),
  /// Edge weights must not be below zero.
  #[error("edge {from} -> {to} has a negative weight")]
  NegativeWeight { from: String, to: String },
  /// A search was run or queried before `initialize()`.
  #[error("search has not been initialized")]
  NotInitialized,
  /// A search was queried before `run()` completed.
  #[error("search results were queried before run()")]
  NotRun,
  /// A configuration or search setting outside its valid range.
  #[error("invalid parameter `{name}`: {reason}")]
  InvalidParameter { name: &'static str, reason: String },
  /// More nodes than node ids can address.
  #[error("graph is full at {0} nodes")]
  TooManyNodes(usize),
  /// An internal structure reached a state which cannot occur, such as a red-black
  /// repair case outside a valid tree.
  #[error("internal invariant broken in {0}")]
  StructuralInvariantBroken(&'static str),
  /// An all-pairs worker thread panicked before handing back its rows.
  #[error("all-pairs worker thread panicked")]
  WorkerPanicked,
}

impl Error {
  pub(crate) fn unknown_node<N: std::fmt::Debug>(node: N) -> Self {
    Error::UnknownNode(format!("{:?}", node))
  }

  pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
    Error::InvalidParameter {
      name,
      reason: reason.into(),
    }
  }

  /// Errors caused by the caller violating an API precondition.
  pub fn is_precondition_violation(&self) -> bool {
    matches!(
      self,
      Error::UnknownNode(_)
        | Error::NegativeWeight { .. }
        | Error::NotInitialized
        | Error::NotRun
        | Error::InvalidParameter { .. }
        | Error::TooManyNodes(_)
    )
  }
}
