//! Bounding-box index over region boundaries.
//!
//! Uses an R-tree as a coarse filter for containment queries: candidate ids
//! form a conservative superset (no false negatives), and the exact ring
//! test is the classifier's responsibility.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::error::{FlowError, Result};
use crate::{GeoPoint, RegionSet};

/// Region bounding box wrapper for R-tree indexing.
///
/// `region_id` is the region's position in the [`RegionSet`] the index was
/// built from.
#[derive(Debug, Clone)]
pub struct RegionBounds {
    pub region_id: usize,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl RTreeObject for RegionBounds {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}

impl PointDistance for RegionBounds {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope().distance_2(point)
    }
}

/// Bounding-box index over a region collection.
///
/// Built once per collection and queried read-only afterwards. Build is
/// O(n) bulk loading; queries are tree searches.
#[derive(Debug)]
pub struct RegionIndex {
    tree: RTree<RegionBounds>,
}

impl RegionIndex {
    /// Bulk-load the index from a region set.
    pub fn build(regions: &RegionSet) -> Result<Self> {
        if regions.is_empty() {
            return Err(FlowError::EmptyRegionSet);
        }

        let entries: Vec<RegionBounds> = regions
            .regions
            .iter()
            .enumerate()
            .map(|(region_id, region)| RegionBounds {
                region_id,
                min_lat: region.bounds.min_lat,
                max_lat: region.bounds.max_lat,
                min_lng: region.bounds.min_lng,
                max_lng: region.bounds.max_lng,
            })
            .collect();

        Ok(Self {
            tree: RTree::bulk_load(entries),
        })
    }

    /// Ids of regions whose bounding box contains the point.
    ///
    /// The result is a conservative superset of the truly containing
    /// regions, sorted ascending so that overlapping-region tie-breaks stay
    /// deterministic regardless of tree build order.
    pub fn candidates(&self, point: &GeoPoint) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .tree
            .locate_all_at_point(&[point.longitude, point.latitude])
            .map(|entry| entry.region_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Get the number of indexed regions.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
