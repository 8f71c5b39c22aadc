//! # Visitflow
//!
//! Movement-pattern reconstruction from geotagged social-media posts.
//!
//! This library provides:
//! - Point-in-polygon classification backed by an R-tree bounding-box index
//! - Time-gap based segmentation of post histories into discrete visits
//! - Nearest-neighbour spatial attribute joins between point sets
//! - Great-circle path discretization and multi-leg route chaining
//! - Per-user movement aggregation (inferred home region → target site)
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel per-user aggregation with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use visitflow::{great_circle, GeoPoint};
//!
//! // Sample the minor-arc great-circle path from New York to Helsinki,
//! // one point roughly every 100 km.
//! let new_york = GeoPoint::new(40.78, -73.98);
//! let helsinki = GeoPoint::new(60.17083, 24.93750);
//!
//! let path = great_circle::sample_arc(&new_york, &helsinki, 100.0);
//! assert_eq!(path.first(), Some(&new_york));
//! assert_eq!(path.last(), Some(&helsinki));
//! ```

use chrono::{DateTime, Utc};
use geo::{Area, Contains, Coord, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{FlowError, Result};

// Geographic utilities (distance, bounds, length calculations)
pub mod geo_utils;

// Bounding-box index over region boundaries
pub mod region_index;
pub use region_index::{RegionBounds, RegionIndex};

// Point-in-polygon classification
pub mod classify;
pub use classify::{assign_region_codes, classify_point, flag_target_site};

// Visit segmentation of post histories
pub mod visits;
pub use visits::{filter_time_window, segment_visits, time_deltas};

// Nearest-neighbour attribute joins
pub mod spatial_join;
pub use spatial_join::{build_point_tree, nearest_neighbor, spatial_join, PointSet};

// Great-circle path discretization
pub mod great_circle;
pub use great_circle::{chain_route, sample_arc};

// Per-user movement aggregation
pub mod movements;
pub use movements::{reconstruct_movements, AggregationStats, FlowSummary, NO_REGION};

// Synthetic post-history generator for tests and benchmarks
pub mod synthetic;

/// Coordinate reference system used by all bundled datasets.
pub const WGS84: &str = "EPSG:4326";

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude in WGS84 degrees.
///
/// # Example
/// ```
/// use visitflow::GeoPoint;
/// let point = GeoPoint::new(-24.99, 31.55); // Kruger National Park
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Axis-aligned bounding box over a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points. Returns `None` for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Check whether a point falls inside the box (boundary inclusive).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// A single geotagged post from a user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPost {
    /// Identifier of the posting user
    pub user_id: String,
    /// Posting time (UTC)
    pub timestamp: DateTime<Utc>,
    /// Where the post was taken
    pub location: GeoPoint,
    /// Region attribute assigned by classification; `None` = unclassified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    /// Whether the post falls inside the (buffered) target-site boundary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within_target_site: Option<bool>,
}

impl GeoPost {
    /// Create an unclassified post.
    pub fn new(user_id: &str, timestamp: DateTime<Utc>, location: GeoPoint) -> Self {
        Self {
            user_id: user_id.to_string(),
            timestamp,
            location,
            region_code: None,
            within_target_site: None,
        }
    }
}

/// A collection of posts together with its coordinate reference system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostSet {
    pub crs: String,
    pub posts: Vec<GeoPost>,
}

impl PostSet {
    /// Create a post set in the given coordinate reference system.
    pub fn new(crs: &str, posts: Vec<GeoPost>) -> Self {
        Self {
            crs: crs.to_string(),
            posts,
        }
    }

    /// Create a post set in WGS84.
    pub fn wgs84(posts: Vec<GeoPost>) -> Self {
        Self::new(WGS84, posts)
    }

    /// Get the number of posts.
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// A polygonal region carrying a classification attribute.
///
/// Only 2-D coordinates exist in the model; the boundary ring is closed
/// implicitly.
#[derive(Debug, Clone)]
pub struct Region {
    /// Attribute value assigned to points contained in this region
    pub attribute: String,
    /// Exterior boundary ring
    pub ring: Vec<GeoPoint>,
    /// Pre-computed bounding box of the ring
    pub bounds: Bounds,
    polygon: Polygon<f64>,
}

impl Region {
    /// Build a region from an attribute value and a boundary ring.
    ///
    /// Returns `None` if the ring has fewer than 3 points.
    pub fn new(attribute: &str, ring: Vec<GeoPoint>) -> Option<Self> {
        if ring.len() < 3 {
            return None;
        }
        let bounds = Bounds::from_points(&ring)?;
        let exterior: LineString<f64> = ring
            .iter()
            .map(|p| Coord {
                x: p.longitude,
                y: p.latitude,
            })
            .collect();
        let polygon = Polygon::new(exterior, vec![]);

        Some(Self {
            attribute: attribute.to_string(),
            ring,
            bounds,
            polygon,
        })
    }

    /// Exact 2-D point-in-ring containment test.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.polygon
            .contains(&Point::new(point.longitude, point.latitude))
    }

    pub(crate) fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }
}

/// A region collection together with its coordinate reference system.
#[derive(Debug, Clone)]
pub struct RegionSet {
    pub crs: String,
    pub regions: Vec<Region>,
}

impl RegionSet {
    /// Create a region set in the given coordinate reference system.
    pub fn new(crs: &str, regions: Vec<Region>) -> Self {
        Self {
            crs: crs.to_string(),
            regions,
        }
    }

    /// Create a region set in WGS84.
    pub fn wgs84(regions: Vec<Region>) -> Self {
        Self::new(WGS84, regions)
    }

    /// Get the number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Expand every boundary outward by a fixed buffer in decimal degrees.
    ///
    /// Used for the target-site boundary so that posts taken immediately
    /// adjacent to the site are not classified as "outside". Buffering can
    /// split a ring into several polygons; the largest one becomes the
    /// expanded boundary.
    pub fn buffered(&self, degrees: f64) -> Self {
        let regions = self
            .regions
            .iter()
            .filter_map(|region| {
                let expanded = geo_buffer::buffer_polygon(region.polygon(), degrees);
                let largest = expanded.into_iter().max_by(|a, b| {
                    a.unsigned_area()
                        .partial_cmp(&b.unsigned_area())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })?;
                let ring: Vec<GeoPoint> = largest
                    .exterior()
                    .points()
                    .map(|p| GeoPoint::new(p.y(), p.x()))
                    .collect();
                Region::new(&region.attribute, ring)
            })
            .collect();

        Self {
            crs: self.crs.clone(),
            regions,
        }
    }
}

/// A contiguous run of one user's posts forming a temporally continuous
/// episode.
///
/// The set of visits for a user is a contiguous, order-preserving partition
/// of that user's posts. The trailing visit of a segmented history is never
/// closed by the gap rule, so its `window_label` and `duration_hours` stay
/// unset (see [`visits::segment_visits`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// `"{start date} - {end date}"`, `None` while the visit is open
    pub window_label: Option<String>,
    /// Rounded visit length in hours, `None` while the visit is open
    pub duration_hours: Option<i64>,
    /// Posts belonging to this visit, in chronological order
    pub posts: Vec<GeoPost>,
}

/// An ordered polyline with a derived approximate length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub points: Vec<GeoPoint>,
}

impl Route {
    /// Create a route from an ordered point sequence.
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Approximate route length in kilometers.
    ///
    /// Sum of consecutive degree-space Euclidean distances multiplied by a
    /// fixed equirectangular constant; see [`geo_utils::route_length_km`].
    pub fn length_km(&self) -> f64 {
        geo_utils::route_length_km(&self.points)
    }
}

/// One reconstructed movement record per qualifying user.
///
/// Serde field names match the fixed output column order:
/// `userid, post_cnt, geometry, distance, t_bef_target, arriv_to_target,
/// t_difference, Home1_region, Home1_cnt, Home2_region, Home2_cnt,
/// Home1_cnt%, Home2_cnt%`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMovementRecord {
    #[serde(rename = "userid")]
    pub user_id: String,
    #[serde(rename = "post_cnt")]
    pub post_count: usize,
    #[serde(rename = "geometry")]
    pub route: Route,
    #[serde(rename = "distance")]
    pub distance_km: f64,
    #[serde(rename = "t_bef_target")]
    pub time_before_arrival: DateTime<Utc>,
    #[serde(rename = "arriv_to_target")]
    pub arrival_time: DateTime<Utc>,
    #[serde(rename = "t_difference")]
    pub days_between: i64,
    #[serde(rename = "Home1_region")]
    pub home_region_1: String,
    #[serde(rename = "Home1_cnt")]
    pub home_count_1: usize,
    #[serde(rename = "Home2_region")]
    pub home_region_2: String,
    #[serde(rename = "Home2_cnt")]
    pub home_count_2: usize,
    #[serde(rename = "Home1_cnt%")]
    pub home_pct_1: f64,
    #[serde(rename = "Home2_cnt%")]
    pub home_pct_2: f64,
}

/// Configuration for the movement-reconstruction pipeline.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Minimum post count for a user to qualify for home inference.
    /// Users at or below this count are recorded as arriving with no
    /// prior location. Default: 20
    pub min_posts: usize,

    /// Inter-post gap that closes a visit, in hours.
    /// Default: 24.0
    pub gap_threshold_hours: f64,

    /// Sampling interval along great-circle paths, in kilometers.
    /// Default: 100.0
    pub step_km: f64,

    /// Outward buffer applied to the target-site boundary, in decimal
    /// degrees (0.2 is roughly 22 km). Default: 0.2
    pub buffer_degrees: f64,

    /// Optional half-open observation window `[start, end)`; posts outside
    /// it are dropped before aggregation. Default: `None`
    pub time_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            min_posts: 20,
            gap_threshold_hours: 24.0,
            step_km: 100.0,
            buffer_degrees: 0.2,
            time_window: None,
        }
    }
}
