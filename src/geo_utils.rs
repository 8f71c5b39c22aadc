//! Geographic helper functions shared across the pipeline.

use geo::{Centroid, Coord, LineString, Polygon};

use crate::GeoPoint;

/// Mean Earth radius in kilometers (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Fixed equirectangular conversion constant: kilometers per decimal degree.
///
/// Route lengths are reported as degree-space Euclidean length multiplied by
/// this constant. This is an approximation, not true geodesic length, and is
/// kept bit-for-bit compatible with the downstream mapping format.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Great-circle distance between two points in kilometers (haversine).
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    central_angle(a, b) * EARTH_RADIUS_KM
}

/// Central angle between two points in radians (haversine formula).
pub fn central_angle(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Approximate polyline length in kilometers.
///
/// Sum of consecutive coordinate Euclidean distances in degree space,
/// multiplied by [`KM_PER_DEGREE`].
pub fn route_length_km(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .windows(2)
        .map(|pair| {
            let dlat = pair[1].latitude - pair[0].latitude;
            let dlng = pair[1].longitude - pair[0].longitude;
            (dlat * dlat + dlng * dlng).sqrt()
        })
        .sum::<f64>()
        * KM_PER_DEGREE
}

/// Round a coordinate to five decimal places (~1.1 m).
///
/// Nearest-neighbour trees are built over rounded coordinates so that
/// repeated runs over re-exported data index identically.
pub fn round_coord(value: f64) -> f64 {
    (value * 1e5).round() / 1e5
}

/// Centroid of a boundary ring, or `None` for a degenerate ring.
pub fn ring_centroid(ring: &[GeoPoint]) -> Option<GeoPoint> {
    if ring.len() < 3 {
        return None;
    }
    let exterior: LineString<f64> = ring
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect();
    let polygon = Polygon::new(exterior, vec![]);
    polygon
        .centroid()
        .map(|c| GeoPoint::new(c.y(), c.x()))
}
