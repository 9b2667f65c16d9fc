//! Geographic types.
//!
//! Positions are `(x, y) = (longitude, latitude)` in degrees, distances are metres on a
//! spherical earth.

use geo::{haversine_distance::*, Point, Rect};

#[doc(hidden)]
pub use geo::Coordinate;

pub type Position = Coordinate<f64>;

pub type BoundingBox = Rect<f64>;

/// Mean earth radius in metres, the same one `geo` uses for haversine distances.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

// Slack added to envelopes so points lying exactly on the search circle survive the
// degree/metre round trip.
const ENVELOPE_SLACK_DEG: f64 = 1e-9;

pub fn haversine_distance(from: &Position, to: &Position) -> f64 {
  Point::from(*from).haversine_distance(&Point::from(*to))
}

/// Smallest lon/lat box containing every point within `distance_m` of `center`.
///
/// The longitude extent of a spherical cap is `asin(sin(d) / cos(lat))`; caps that reach
/// a pole or cross the antimeridian fall back to the full longitude range.
pub fn envelope(center: &Position, distance_m: f64) -> BoundingBox {
  let angular = distance_m.max(0.0) / EARTH_RADIUS_M;
  let lat_delta = angular.to_degrees() + ENVELOPE_SLACK_DEG;

  let min_lat = center.y - lat_delta;
  let max_lat = center.y + lat_delta;

  let full_longitude = (-180.0, 180.0);
  let (min_lon, max_lon) = if max_lat >= 90.0 || min_lat <= -90.0 {
    full_longitude
  } else {
    let ratio = angular.sin() / center.y.to_radians().cos();
    if ratio >= 1.0 {
      full_longitude
    } else {
      let lon_delta = ratio.asin().to_degrees() + ENVELOPE_SLACK_DEG;
      if center.x - lon_delta < -180.0 || center.x + lon_delta > 180.0 {
        full_longitude
      } else {
        (center.x - lon_delta, center.x + lon_delta)
      }
    }
  };

  BoundingBox::new(
    Coordinate {
      x: min_lon,
      y: min_lat.max(-90.0),
    },
    Coordinate {
      x: max_lon,
      y: max_lat.min(90.0),
    },
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use geo::haversine_destination::HaversineDestination;

  fn contains(bbox: &BoundingBox, p: &Position) -> bool {
    bbox.min().x <= p.x && p.x <= bbox.max().x && bbox.min().y <= p.y && p.y <= bbox.max().y
  }

  #[test]
  fn test_haversine_distance() {
    let a = Position { x: 13.3548259, y: 52.4947094 };
    let b = Position { x: 13.3596968, y: 52.4943175 };
    let d = haversine_distance(&a, &b);
    assert!((d - 332.0).abs() < 2.0, "distance was {}", d);
    assert_eq!(haversine_distance(&a, &a), 0.0);
  }

  #[test]
  fn test_envelope_contains_circle() {
    let center = Position { x: -8.61, y: 41.15 };
    let bbox = envelope(&center, 500.0);

    for bearing in (0..360).step_by(15) {
      let p = Point::from(center).haversine_destination(bearing as f64, 499.9).0;
      assert!(contains(&bbox, &p), "bearing {} not covered", bearing);
    }

    let far = Point::from(center).haversine_destination(45.0, 800.0).0;
    assert!(!contains(&bbox, &far));
  }

  #[test]
  fn test_envelope_near_pole_and_antimeridian() {
    let polar = envelope(&Position { x: 10.0, y: 89.99 }, 5_000.0);
    assert_eq!(polar.min().x, -180.0);
    assert_eq!(polar.max().x, 180.0);
    assert_eq!(polar.max().y, 90.0);

    let dateline = envelope(&Position { x: 179.9999, y: 0.0 }, 1_000.0);
    assert_eq!(dateline.min().x, -180.0);
    assert_eq!(dateline.max().x, 180.0);
  }
}
