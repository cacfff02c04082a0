//! Great-circle distance on a spherical earth.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in decimal degrees.
///
/// The intermediate term is clamped to `[0, 1]` so rounding can never push
/// `asin` out of its domain on antipodal or coincident points.
#[must_use]
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    c * EARTH_RADIUS_KM
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidCoordinates` if latitude is outside
    /// `[-90, 90]` or longitude is outside `[-180, 180]`.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let point = Self { lat, lon };
        if point.is_valid() {
            Ok(point)
        } else {
            Err(DispatchError::InvalidCoordinates { lat, lon })
        }
    }

    /// Creates a point without any range check.
    #[must_use]
    pub const fn unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Creates a point by clamping latitude and wrapping longitude into range.
    ///
    /// # Errors
    ///
    /// Non-finite input cannot be repaired and is still rejected.
    pub fn clamped(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(DispatchError::InvalidCoordinates { lat, lon });
        }
        let lat = lat.clamp(-90.0, 90.0);
        let lon = if (-180.0..=180.0).contains(&lon) {
            lon
        } else {
            (lon + 180.0).rem_euclid(360.0) - 180.0
        };
        Ok(Self { lat, lon })
    }

    /// Returns `true` if both coordinates are finite and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance in kilometres to another point.
    #[must_use]
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance(self.lat, self.lon, other.lat, other.lon)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// How raw coordinates from a request are turned into a [`GeoPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoordinatePolicy {
    /// Refuse out-of-range or non-finite coordinates.
    #[default]
    Reject,
    /// Clamp latitude, wrap longitude. Non-finite input is still refused.
    Clamp,
    /// Accept whatever was supplied.
    PassThrough,
}

impl CoordinatePolicy {
    /// Applies the policy to a raw latitude/longitude pair.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidCoordinates` when the policy refuses the input.
    pub fn apply(self, lat: f64, lon: f64) -> Result<GeoPoint> {
        match self {
            Self::Reject => GeoPoint::new(lat, lon),
            Self::Clamp => GeoPoint::clamped(lat, lon),
            Self::PassThrough => Ok(GeoPoint::unchecked(lat, lon)),
        }
    }
}

impl fmt::Display for CoordinatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Clamp => write!(f, "clamp"),
            Self::PassThrough => write!(f, "pass-through"),
        }
    }
}

impl FromStr for CoordinatePolicy {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "clamp" => Ok(Self::Clamp),
            "pass-through" | "passthrough" | "pass_through" => Ok(Self::PassThrough),
            _ => Err(DispatchError::UnknownPolicy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANGALORE: (f64, f64) = (12.9716, 77.5946);

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(distance(BANGALORE.0, BANGALORE.1, BANGALORE.0, BANGALORE.1), 0.0);
        assert_eq!(distance(0.0, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(distance(-90.0, 0.0, -90.0, 0.0), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((12.9716, 77.5946), (12.9720, 77.5950)),
            ((51.5074, -0.1278), (40.7128, -74.0060)),
            ((-33.8688, 151.2093), (35.6762, 139.6503)),
        ];
        for ((a_lat, a_lon), (b_lat, b_lon)) in pairs {
            let ab = distance(a_lat, a_lon, b_lat, b_lon);
            let ba = distance(b_lat, b_lon, a_lat, a_lon);
            assert!((ab - ba).abs() < 1e-9, "ab={ab}, ba={ba}");
        }
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = distance(0.0, 0.0, 0.0, 180.0);
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - expected).abs() < 1e-6, "d={d}");
        assert!((d - 20015.0).abs() < 1.0);

        let pole_to_pole = distance(90.0, 0.0, -90.0, 0.0);
        assert!((pole_to_pole - expected).abs() < 1e-6);
    }

    #[test]
    fn short_hop_is_tens_of_metres() {
        let d = distance(12.9716, 77.5946, 12.9720, 77.5950);
        assert!(d > 0.04 && d < 0.07, "d={d}");
    }

    #[test]
    fn london_to_new_york() {
        let d = distance(51.5074, -0.1278, 40.7128, -74.0060);
        assert!((d - 5570.0).abs() < 10.0, "d={d}");
    }

    #[test]
    fn geopoint_validation() {
        assert!(GeoPoint::new(12.0, 77.0).is_ok());
        assert!(GeoPoint::new(90.0, -180.0).is_ok());
        assert!(matches!(
            GeoPoint::new(90.5, 0.0),
            Err(DispatchError::InvalidCoordinates { .. })
        ));
        assert!(GeoPoint::new(0.0, 181.0).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn clamp_policy_repairs_range() {
        let p = CoordinatePolicy::Clamp.apply(95.0, 190.0).unwrap();
        assert_eq!(p.lat, 90.0);
        assert!((p.lon - -170.0).abs() < 1e-9);

        let p = CoordinatePolicy::Clamp.apply(-100.0, -200.0).unwrap();
        assert_eq!(p.lat, -90.0);
        assert!((p.lon - 160.0).abs() < 1e-9);

        assert!(CoordinatePolicy::Clamp.apply(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn pass_through_policy_keeps_raw_values() {
        let p = CoordinatePolicy::PassThrough.apply(123.0, 456.0).unwrap();
        assert_eq!(p, GeoPoint::unchecked(123.0, 456.0));
        assert!(!p.is_valid());
    }

    #[test]
    fn policy_parse() {
        assert_eq!("Reject".parse::<CoordinatePolicy>().unwrap(), CoordinatePolicy::Reject);
        assert_eq!(
            "pass-through".parse::<CoordinatePolicy>().unwrap(),
            CoordinatePolicy::PassThrough
        );
        assert!("ignore".parse::<CoordinatePolicy>().is_err());
        assert_eq!(CoordinatePolicy::default(), CoordinatePolicy::Reject);
    }
}
