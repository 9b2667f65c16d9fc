use std::fmt::Debug;
use std::ops::Add;

/// Trait representing an edge weight(cost) in weighted graph
/// 
/// Weights are totally ordered and non-negative. `INFINITY` is the weight reported for
/// nodes a search never reached; it must compare greater than any real path weight.
pub trait Weight: Default + Add<Output = Self> + Ord + Copy + Debug + Send + Sync + 'static {
  const INFINITY: Self;

  fn to_f64(self) -> f64;

  /// Conversion rounding down, so estimates built from metric distances stay admissible.
  fn from_f64(value: f64) -> Self;

  /// Sum clamped to `INFINITY`, anything plus `INFINITY` stays infinite.
  fn saturating_add(self, other: Self) -> Self;

  fn is_infinite(self) -> bool {
    self == Self::INFINITY
  }
}

macro_rules! integer_weight {
  ($($t:ty),*) => {
    $(
      impl Weight for $t {
        const INFINITY: Self = <$t>::MAX;

        fn to_f64(self) -> f64 {
          if self == Self::INFINITY {
            f64::INFINITY
          } else {
            self as f64
          }
        }

        fn saturating_add(self, other: Self) -> Self {
          <$t>::saturating_add(self, other)
        }

        fn from_f64(value: f64) -> Self {
          if value.is_nan() || value <= 0.0 {
            0
          } else if value >= <$t>::MAX as f64 {
            Self::INFINITY
          } else {
            value.floor() as $t
          }
        }
      }
    )*
  };
}

integer_weight!(u32, u64, usize, i32, i64);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_integer_weights() {
    assert!(u64::INFINITY.is_infinite());
    assert_eq!(u32::INFINITY.to_f64(), f64::INFINITY);
    assert_eq!(u64::from_f64(10.9), 10);
    assert_eq!(i64::from_f64(-3.0), 0);
    assert_eq!(u32::from_f64(1e20), u32::INFINITY);
    assert_eq!(<u64 as Weight>::to_f64(42), 42.0);
    assert_eq!(Weight::saturating_add(u64::INFINITY - 1, 5), u64::INFINITY);
    assert_eq!(Weight::saturating_add(7u32, u32::INFINITY), u32::INFINITY);
    assert!(Weight::saturating_add(i64::INFINITY, 3).is_infinite());
    assert_eq!(Weight::saturating_add(2i32, 3), 5);
  }
}
