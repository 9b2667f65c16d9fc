use super::Candidate;
use crate::error::Result;
use log::debug;

/// Maximum likelihood state sequence of one continuously decoded run of steps.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedSegment {
  pub first_step: usize,
  /// Index of the chosen candidate within its column, one per step.
  pub states: Vec<usize>,
  pub log_likelihood: f64,
}

impl DecodedSegment {
  pub fn last_step(&self) -> usize {
    self.first_step + self.states.len() - 1
  }
}

struct Cell {
  score: f64,
  back: Option<usize>,
}

/// DP table of the segment currently being decoded.
struct Trellis {
  first_step: usize,
  columns: Vec<Vec<Cell>>,
}

impl Trellis {
  fn start<N>(step: usize, column: &[Candidate<N>]) -> Self {
    let cells = column
      .iter()
      .map(|candidate| Cell {
        score: candidate.log_emission,
        back: None,
      })
      .collect();
    Trellis {
      first_step: step,
      columns: vec![cells],
    }
  }

  /// Picks the best final cell, first one on ties, and follows the backpointers.
  fn finish(self) -> DecodedSegment {
    let mut best: Option<(usize, f64)> = None;
    if let Some(last) = self.columns.last() {
      for (index, cell) in last.iter().enumerate() {
        if best.map_or(true, |(_, score)| cell.score > score) {
          best = Some((index, cell.score));
        }
      }
    }

    let (mut state, log_likelihood) = best.unwrap_or((0, f64::NEG_INFINITY));
    let mut states = Vec::with_capacity(self.columns.len());
    for column in self.columns.iter().rev() {
      states.push(state);
      state = column[state].back.unwrap_or(0);
    }
    states.reverse();

    DecodedSegment {
      first_step: self.first_step,
      states,
      log_likelihood,
    }
  }
}

/// Viterbi decoding over a lattice of candidate columns, one column per observation.
///
/// `transition(from, to)` is the log transition probability between candidates of
/// consecutive steps, `f64::NEG_INFINITY` when `to` can't follow `from`. A step without
/// candidates, or whose candidates can't follow any candidate of the previous step, is
/// left unmatched: the current segment ends before it and the next step starts a new
/// segment from emission probabilities alone.
pub fn decode<N, F>(lattice: &[Vec<Candidate<N>>], mut transition: F) -> Result<Vec<DecodedSegment>>
where
  F: FnMut(&Candidate<N>, &Candidate<N>) -> Result<f64>,
{
  let mut segments = Vec::new();
  let mut current: Option<Trellis> = None;

  for (step, column) in lattice.iter().enumerate() {
    if column.is_empty() {
      debug!("step {} has no candidates", step);
      segments.extend(current.take().map(Trellis::finish));
      continue;
    }

    let mut trellis = match current.take() {
      None => {
        current = Some(Trellis::start(step, column));
        continue;
      }
      Some(trellis) => trellis,
    };

    let previous = &lattice[step - 1];
    let mut cells = Vec::with_capacity(column.len());
    for to in column {
      let mut best = Cell {
        score: f64::NEG_INFINITY,
        back: None,
      };
      if let Some(scores) = trellis.columns.last() {
        for (index, from) in previous.iter().enumerate() {
          if scores[index].score == f64::NEG_INFINITY {
            continue;
          }
          let score = scores[index].score + transition(from, to)?;
          if score > best.score {
            best = Cell {
              score,
              back: Some(index),
            };
          }
        }
      }
      if best.back.is_some() {
        best.score += to.log_emission;
      }
      cells.push(best);
    }

    if cells.iter().all(|cell| cell.back.is_none()) {
      debug!("step {} is unreachable from step {}", step, step - 1);
      segments.push(trellis.finish());
    } else {
      trellis.columns.push(cells);
      current = Some(trellis);
    }
  }

  segments.extend(current.map(Trellis::finish));
  Ok(segments)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn column(step: usize, emissions: &[f64]) -> Vec<Candidate<u32>> {
    emissions
      .iter()
      .enumerate()
      .map(|(i, log_emission)| Candidate {
        step,
        node: (step * 10 + i) as u32,
        distance: 0.0,
        log_emission: *log_emission,
      })
      .collect()
  }

  #[test]
  fn test_prefers_transitions_over_emissions() {
    // Candidate 1 of step 1 has the better emission but can only be reached badly
    let lattice = vec![column(0, &[-1.0]), column(1, &[-2.0, -1.5]), column(2, &[-1.0])];
    let segments = decode(&lattice, |from, to| {
      Ok(match (from.node, to.node) {
        (0, 10) => -0.1,
        (0, 11) => -5.0,
        _ => -0.1,
      })
    })
    .unwrap();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].first_step, 0);
    assert_eq!(segments[0].states, vec![0, 0, 0]);
    assert!((segments[0].log_likelihood - (-1.0 - 0.1 - 2.0 - 0.1 - 1.0)).abs() < 1e-12);
  }

  #[test]
  fn test_empty_column_splits_segments() {
    let lattice = vec![column(0, &[-1.0, -0.5]), vec![], column(2, &[-3.0, -2.0])];
    let segments = decode(&lattice, |_, _| Ok(0.0)).unwrap();

    assert_eq!(segments.len(), 2);
    assert_eq!((segments[0].first_step, segments[0].last_step()), (0, 0));
    assert_eq!(segments[0].states, vec![1]);
    assert_eq!((segments[1].first_step, segments[1].last_step()), (2, 2));
    assert_eq!(segments[1].states, vec![1]);
  }

  #[test]
  fn test_unreachable_step_is_skipped() {
    let lattice = vec![column(0, &[-1.0]), column(1, &[-1.0]), column(2, &[-1.0]), column(3, &[-1.0])];
    let segments = decode(&lattice, |from, _| {
      Ok(if from.step == 0 { f64::NEG_INFINITY } else { -1.0 })
    })
    .unwrap();

    assert_eq!(segments.len(), 2);
    assert_eq!((segments[0].first_step, segments[0].last_step()), (0, 0));
    assert_eq!((segments[1].first_step, segments[1].last_step()), (2, 3));
    assert!((segments[1].log_likelihood - -3.0).abs() < 1e-12);
  }

  #[test]
  fn test_ties_pick_first_candidate() {
    let lattice = vec![column(0, &[-1.0, -1.0]), column(1, &[-1.0, -1.0])];
    let segments = decode(&lattice, |_, _| Ok(-1.0)).unwrap();
    assert_eq!(segments[0].states, vec![0, 0]);
  }

  #[test]
  fn test_empty_lattice() {
    assert!(decode::<u32, _>(&[], |_, _| Ok(0.0)).unwrap().is_empty());
    assert!(decode::<u32, _>(&[vec![], vec![]], |_, _| Ok(0.0)).unwrap().is_empty());
  }
}
