//! Location related module
//!
//! Everything in the dashboard is positioned with plain WGS84 latitude/longitude pairs, distances
//! are great-circle ones computed with the haversine formula.
//!

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Earth radius in meters
const R: f64 = 6_371_088.0;

/// A point on the map.
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Position {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

impl Position {
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Position { lat, lng }
    }

    /// Both coordinates are finite and inside their respective ranges.
    ///
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance in meters.
    ///
    pub fn haversine_distance(&self, other: &Position) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lon / 2.0).sin()
                * (d_lon / 2.0).sin();

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

impl From<(f64, f64)> for Position {
    fn from((lat, lng): (f64, f64)) -> Self {
        Position { lat, lng }
    }
}
