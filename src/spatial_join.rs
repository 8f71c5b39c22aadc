//! Nearest-neighbour spatial attribute joins between point sets.
//!
//! Attaches attributes from the nearest point of a source set to each point
//! of a target set. Distances are planar Euclidean in coordinate-degree
//! space, an acceptable approximation for regionally bounded data.

use std::collections::BTreeMap;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde_json::Value;

use crate::error::{ensure_crs_match, FlowError, Result};
use crate::geo_utils::round_coord;
use crate::GeoPoint;

/// A point record collection with named attribute columns.
///
/// Column storage keeps one value per location; columns are kept in a
/// `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    pub crs: String,
    pub locations: Vec<GeoPoint>,
    pub columns: BTreeMap<String, Vec<Value>>,
}

impl PointSet {
    /// Create a point set with no attribute columns.
    pub fn new(crs: &str, locations: Vec<GeoPoint>) -> Self {
        Self {
            crs: crs.to_string(),
            locations,
            columns: BTreeMap::new(),
        }
    }

    /// Add or replace an attribute column.
    ///
    /// The column length should match the number of locations; missing
    /// cells read as null during joins.
    pub fn insert_column(&mut self, name: &str, values: Vec<Value>) {
        self.columns.insert(name.to_string(), values);
    }

    /// Names of all attribute columns, in deterministic order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    /// Get the number of records.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// A point with its record index, used for nearest-neighbour queries.
///
/// Coordinates are rounded to five decimals (~1.1 m) before indexing.
#[derive(Debug, Clone, Copy)]
pub struct IndexedPoint {
    pub idx: usize,
    pub lat: f64,
    pub lng: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlng = self.lng - point[1];
        dlat * dlat + dlng * dlng
    }
}

/// Build a nearest-neighbour index over 5-decimal-rounded coordinates.
pub fn build_point_tree(points: &[GeoPoint]) -> RTree<IndexedPoint> {
    let indexed: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .map(|(idx, p)| IndexedPoint {
            idx,
            lat: round_coord(p.latitude),
            lng: round_coord(p.longitude),
        })
        .collect();
    RTree::bulk_load(indexed)
}

/// Index and degree-space Euclidean distance of the nearest indexed point,
/// for each query point.
///
/// An empty tree yields an empty result.
pub fn nearest_neighbor(tree: &RTree<IndexedPoint>, queries: &[GeoPoint]) -> Vec<(usize, f64)> {
    queries
        .iter()
        .filter_map(|point| {
            let query = [round_coord(point.latitude), round_coord(point.longitude)];
            tree.nearest_neighbor(&query)
                .map(|nearest| (nearest.idx, nearest.distance_2(&query).sqrt()))
        })
        .collect()
}

/// Join attributes from the nearest source record onto each target record.
///
/// - Both sets must share a coordinate reference system, otherwise the join
///   fails with [`FlowError::CrsMismatch`] and produces no output.
/// - Every requested attribute must exist in the source set, otherwise
///   [`FlowError::AttributeNotFound`] lists the available columns.
/// - A requested attribute whose name collides with an existing target
///   column is copied under a `_2` suffix.
/// - Source attributes that were not requested are dropped.
pub fn spatial_join(target: &PointSet, source: &PointSet, attributes: &[&str]) -> Result<PointSet> {
    ensure_crs_match(&target.crs, &source.crs)?;

    for name in attributes {
        if !source.columns.contains_key(*name) {
            return Err(FlowError::AttributeNotFound {
                requested: (*name).to_string(),
                available: source.column_names(),
            });
        }
    }

    let tree = build_point_tree(&source.locations);

    let nearest: Vec<Option<usize>> = target
        .locations
        .iter()
        .map(|point| {
            let query = [round_coord(point.latitude), round_coord(point.longitude)];
            tree.nearest_neighbor(&query).map(|n| n.idx)
        })
        .collect();

    let mut joined = target.clone();
    for name in attributes {
        let source_column = &source.columns[*name];
        let values: Vec<Value> = nearest
            .iter()
            .map(|index| {
                index
                    .and_then(|i| source_column.get(i).cloned())
                    .unwrap_or(Value::Null)
            })
            .collect();

        let out_name = if target.columns.contains_key(*name) {
            format!("{name}_2")
        } else {
            (*name).to_string()
        };
        joined.columns.insert(out_name, values);
    }

    Ok(joined)
}
