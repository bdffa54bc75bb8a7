//! Great-circle distance on a spherical Earth

use crate::core::EARTH_RADIUS_M;

/// Haversine distance in meters between two (lat, lon) pairs in degrees.
///
/// The haversine term is clamped to `[0, 1]` so rounding never pushes
/// `sqrt(1 - a)` negative for antipodal points.
pub fn haversine_distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Total length of a path through consecutive points (meters)
pub fn track_length<I>(points: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut points = points.into_iter();
    let Some(mut previous) = points.next() else {
        return 0.0;
    };

    let mut total = 0.0;
    for point in points {
        total += haversine_distance(previous, point);
        previous = point;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_zero_distance() {
        assert_eq!(haversine_distance((35.22, -97.44), (35.22, -97.44)), 0.0);
        assert_eq!(haversine_distance((0.0, 0.0), (0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ((0.0, 0.0), (0.0, 0.0005)),
            ((35.2, -97.4), (36.1, -95.9)),
            ((-33.9, 151.2), (51.5, -0.1)),
            ((89.9, 10.0), (-89.9, -170.0)),
        ];
        for (a, b) in pairs {
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            assert!((ab - ba).abs() < 1e-6, "{:?} {:?}: {} vs {}", a, b, ab, ba);
        }
    }

    #[test]
    fn test_small_equatorial_offset() {
        let d = haversine_distance((0.0, 0.0), (0.0, 0.0005));
        assert!((d - 55.6).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let d = haversine_distance((0.0, 0.0), (0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - PI * EARTH_RADIUS_M).abs() < 1e-3);

        let poles = haversine_distance((90.0, 0.0), (-90.0, 0.0));
        assert!((poles - PI * EARTH_RADIUS_M).abs() < 1e-3);
    }

    #[test]
    fn test_track_length() {
        assert_eq!(track_length(Vec::<(f64, f64)>::new()), 0.0);
        assert_eq!(track_length(vec![(10.0, 10.0)]), 0.0);

        let path = vec![(0.0, 0.0), (0.0, 0.001), (0.0, 0.002)];
        let expected = haversine_distance((0.0, 0.0), (0.0, 0.002));
        assert!((track_length(path) - expected).abs() < 1e-6);
    }
}
