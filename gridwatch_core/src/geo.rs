//! Geographic primitives: points, great-circle distance, region validity.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers (haversine).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude (flat-earth scatter approximation).
const KM_PER_DEG_LAT: f64 = 111.0;

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both coordinates finite and within the valid WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance to `other` in kilometers (haversine formula).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Displaces this point by `distance_km` along `bearing_rad`.
    ///
    /// Uses the same flat-earth degree conversion the scatter logic has
    /// always used (1 degree of latitude ~ 111 km, longitude scaled by
    /// cos(lat)). Adequate for the sub-200 km offsets the builder produces.
    pub fn offset_km(&self, bearing_rad: f64, distance_km: f64) -> GeoPoint {
        let lat = self.lat + (distance_km / KM_PER_DEG_LAT) * bearing_rad.cos();
        let lon = self.lon
            + (distance_km / (KM_PER_DEG_LAT * self.lat.to_radians().cos())) * bearing_rad.sin();
        GeoPoint::new(lat, lon)
    }
}

/// Land/region validity predicate, injectable into the population builder.
pub trait RegionValidator {
    fn contains(&self, point: GeoPoint) -> bool;
}

/// Accepts every coordinate-valid point. The default when no regional
/// heuristics are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl RegionValidator for AcceptAll {
    fn contains(&self, point: GeoPoint) -> bool {
        point.is_valid()
    }
}

/// An axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}

/// Validator built from one inclusion box and zero or more exclusion boxes.
///
/// Replaces the ad hoc chain of bounding-box checks in earlier versions with
/// data the caller can construct, inspect and swap in tests.
#[derive(Debug, Clone)]
pub struct BoundsValidator {
    include: Bounds,
    exclusions: Vec<Bounds>,
}

impl BoundsValidator {
    pub fn new(include: Bounds) -> Self {
        Self {
            include,
            exclusions: Vec::new(),
        }
    }

    /// Adds an exclusion carve-out inside the inclusion box.
    pub fn exclude(mut self, bounds: Bounds) -> Self {
        self.exclusions.push(bounds);
        self
    }

    /// Coarse mainland-Spain envelope with open-water carve-outs, matching
    /// the demo deployment's site catalog.
    pub fn peninsular_spain() -> Self {
        Self::new(Bounds::new(36.0, 43.8, -9.3, 4.3))
            // Gulf of Cadiz, south-west of the Huelva coast
            .exclude(Bounds::new(36.0, 36.9, -9.3, -7.3))
            // Alboran Sea, south-east of the Andalusian coast
            .exclude(Bounds::new(36.0, 37.4, -1.5, 1.0))
            // Balearic Sea east of the Levante coast (Palma sits north of this box)
            .exclude(Bounds::new(37.4, 39.2, 0.6, 4.3))
    }
}

impl RegionValidator for BoundsValidator {
    fn contains(&self, point: GeoPoint) -> bool {
        point.is_valid()
            && self.include.contains(point)
            && !self.exclusions.iter().any(|b| b.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_haversine_madrid_barcelona() {
        let madrid = GeoPoint::new(40.4168, -3.7038);
        let barcelona = GeoPoint::new(41.3851, 2.1734);

        // Known distance ~504 km
        let d = madrid.distance_km(&barcelona);
        assert!((500.0..510.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_haversine_zero_distance() {
        let p = GeoPoint::new(40.0, -3.0);
        assert_relative_eq!(p.distance_km(&p), 0.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = GeoPoint::new(43.2627, -2.9253);
        let b = GeoPoint::new(36.7213, -4.4214);
        assert_relative_eq!(a.distance_km(&b), b.distance_km(&a), epsilon = 1e-9);
    }

    #[test]
    fn test_offset_roundtrip_distance() {
        let origin = GeoPoint::new(40.0, -3.0);
        let moved = origin.offset_km(1.2, 100.0);

        // Flat-earth conversion vs haversine should agree within a few km
        // at this scale.
        let d = origin.distance_km(&moved);
        assert!((d - 100.0).abs() < 3.0, "got {d}");
    }

    #[test]
    fn test_point_validity() {
        assert!(GeoPoint::new(40.0, -3.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 200.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_accept_all_rejects_invalid_coordinates() {
        assert!(AcceptAll.contains(GeoPoint::new(40.0, -3.0)));
        assert!(!AcceptAll.contains(GeoPoint::new(f64::INFINITY, 0.0)));
    }

    #[test]
    fn test_bounds_validator_exclusions() {
        let validator = BoundsValidator::peninsular_spain();

        // Madrid is inside, well clear of every carve-out.
        assert!(validator.contains(GeoPoint::new(40.4168, -3.7038)));
        // Paris is outside the inclusion box.
        assert!(!validator.contains(GeoPoint::new(48.8566, 2.3522)));
        // A point in the Gulf of Cadiz falls in an exclusion box.
        assert!(!validator.contains(GeoPoint::new(36.4, -8.0)));
    }
}
