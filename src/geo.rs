//! Geographic coordinates and distances.

use serde::{Deserialize, Serialize};

/// Mean earth radius used for great-circle distances, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Haversine distance to `other`, in metres.
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lng - self.lng).to_radians();
        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// Shift by whole grid steps of `step_degrees`.
    pub fn offset_cells(&self, d_lat: i32, d_lng: i32, step_degrees: f64) -> LatLng {
        LatLng {
            lat: self.lat + d_lat as f64 * step_degrees,
            lng: self.lng + d_lng as f64 * step_degrees,
        }
    }
}

/// One-cell movement directions for the manual controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    North,
    South,
    East,
    West,
}

impl Heading {
    /// (d_lat, d_lng) in cells.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Heading::North => (1, 0),
            Heading::South => (-1, 0),
            Heading::East => (0, 1),
            Heading::West => (0, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_to_self() {
        let p = LatLng::new(36.9895, -122.0628);
        assert_eq!(p.distance_to(&p), 0.0);
    }

    #[test]
    fn one_ten_thousandth_degree_of_latitude_is_about_eleven_metres() {
        let a = LatLng::new(0.0, 0.0);
        let b = LatLng::new(1e-4, 0.0);
        let d = a.distance_to(&b);
        assert!((d - 11.119).abs() < 0.01, "unexpected distance {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = LatLng::new(36.9895, -122.0628);
        let b = LatLng::new(36.9901, -122.0611);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-9);
    }

    #[test]
    fn heading_offsets() {
        let p = LatLng::new(1.0, 2.0);
        let (dl, dg) = Heading::West.delta();
        let q = p.offset_cells(dl, dg, 0.5);
        assert_eq!(q, LatLng::new(1.0, 1.5));
    }
}
