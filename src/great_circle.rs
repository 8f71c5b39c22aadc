//! Great-circle path discretization on a sphere.
//!
//! Paths are sampled along the minor arc by spherical linear interpolation
//! of unit vectors, spaced approximately one step apart, with the origin
//! and destination reproduced exactly as the first and last samples.

use std::f64::consts::PI;

use crate::geo_utils::{central_angle, EARTH_RADIUS_KM};
use crate::GeoPoint;

/// Central angle below which a pair is treated as coincident (radians).
const COINCIDENT_EPSILON: f64 = 1e-15;

/// Margin from pi under which a pair is treated as antipodal (radians).
const ANTIPODAL_EPSILON: f64 = 1e-9;

/// Longitude offset applied to the destination of an antipodal pair, in
/// degrees. The bearing between antipodal points is undefined; the nudge
/// fixes one consistent meridian convention for the sampled arc.
const ANTIPODAL_LON_NUDGE: f64 = 1e-6;

/// Sample the minor-arc great-circle path between two points.
///
/// Points are spaced approximately `step_km` apart:
/// `max(1, round(distance / step_km))` segments, so the path holds that
/// many segments plus one point. The first sample equals `origin` and the
/// last equals `destination` exactly.
///
/// Degenerate inputs take explicit fallback paths rather than erroring:
/// identical points yield a single-point path, and antipodal points are
/// sampled after the fixed longitude nudge.
pub fn sample_arc(origin: &GeoPoint, destination: &GeoPoint, step_km: f64) -> Vec<GeoPoint> {
    if origin == destination {
        return vec![*origin];
    }

    let mut dest = *destination;
    let mut angle = central_angle(origin, &dest);

    if angle < COINCIDENT_EPSILON {
        // Distinct coordinates at zero angular separation; nothing to sample.
        return vec![*origin, *destination];
    }

    if PI - angle < ANTIPODAL_EPSILON {
        dest = GeoPoint::new(
            destination.latitude,
            destination.longitude + ANTIPODAL_LON_NUDGE,
        );
        angle = central_angle(origin, &dest);
    }

    let distance_km = angle * EARTH_RADIUS_KM;
    let segments = ((distance_km / step_km).round() as usize).max(1);

    let a = to_unit_vector(origin);
    let b = to_unit_vector(&dest);
    let sin_angle = angle.sin();

    let mut path = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let fraction = i as f64 / segments as f64;
        let c1 = ((1.0 - fraction) * angle).sin() / sin_angle;
        let c2 = (fraction * angle).sin() / sin_angle;
        let v = [
            c1 * a[0] + c2 * b[0],
            c1 * a[1] + c2 * b[1],
            c1 * a[2] + c2 * b[2],
        ];
        path.push(from_unit_vector(&v));
    }

    // Endpoints are the exact input values, not interpolation output.
    path[0] = *origin;
    let last = path.len() - 1;
    path[last] = *destination;
    path
}

/// Chain great-circle legs over consecutive point pairs into one route.
///
/// The shared endpoint between consecutive legs is deduplicated exactly
/// once, so the junction point appears a single time in the result.
/// Fewer than two input points are returned as-is.
pub fn chain_route(points: &[GeoPoint], step_km: f64) -> Vec<GeoPoint> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut route: Vec<GeoPoint> = Vec::new();
    for pair in points.windows(2) {
        let leg = sample_arc(&pair[0], &pair[1], step_km);
        if route.is_empty() {
            route.extend(leg);
        } else {
            route.extend(leg.into_iter().skip(1));
        }
    }
    route
}

fn to_unit_vector(point: &GeoPoint) -> [f64; 3] {
    let lat = point.latitude.to_radians();
    let lng = point.longitude.to_radians();
    [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()]
}

fn from_unit_vector(v: &[f64; 3]) -> GeoPoint {
    let lat = v[2].atan2((v[0] * v[0] + v[1] * v[1]).sqrt());
    let lng = v[1].atan2(v[0]);
    GeoPoint::new(lat.to_degrees(), lng.to_degrees())
}
