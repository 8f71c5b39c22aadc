//! Point-in-polygon classification layered on the bounding-box index.

use crate::error::{ensure_crs_match, Result};
use crate::region_index::RegionIndex;
use crate::{GeoPoint, PostSet, RegionSet};

/// Classify a single point against an indexed region collection.
///
/// Candidate regions from the index are tested in ascending id order; the
/// attribute of the first region whose ring contains the point is returned.
/// `None` means no region matched, a valid domain state.
///
/// Overlapping regions therefore resolve to the lowest region id. This is a
/// deterministic ordering contract, not a correctness guarantee for
/// overlapping geometries.
pub fn classify_point<'a>(
    point: &GeoPoint,
    index: &RegionIndex,
    regions: &'a RegionSet,
) -> Option<&'a str> {
    for region_id in index.candidates(point) {
        if let Some(region) = regions.regions.get(region_id) {
            if region.contains(point) {
                return Some(region.attribute.as_str());
            }
        }
    }
    None
}

/// Assign region codes to every post that does not already carry one.
///
/// Posts with a pre-assigned `region_code` keep it; unclassifiable posts
/// keep `None`. Fails with [`crate::FlowError::CrsMismatch`] when the post
/// and region sets are in different coordinate reference systems.
pub fn assign_region_codes(
    posts: &PostSet,
    regions: &RegionSet,
    index: &RegionIndex,
) -> Result<PostSet> {
    ensure_crs_match(&posts.crs, &regions.crs)?;

    let classified = posts
        .posts
        .iter()
        .map(|post| {
            let mut post = post.clone();
            if post.region_code.is_none() {
                post.region_code =
                    classify_point(&post.location, index, regions).map(str::to_string);
            }
            post
        })
        .collect();

    Ok(PostSet::new(&posts.crs, classified))
}

/// Flag posts located inside the target-site boundary.
///
/// The site set is expected to be pre-buffered (see
/// [`crate::RegionSet::buffered`]). Contained posts get
/// `within_target_site = Some(true)`; posts outside every site boundary
/// keep `None`, mirroring the nullable site column of the source data.
pub fn flag_target_site(posts: &PostSet, site: &RegionSet, index: &RegionIndex) -> Result<PostSet> {
    ensure_crs_match(&posts.crs, &site.crs)?;

    let flagged = posts
        .posts
        .iter()
        .map(|post| {
            let mut post = post.clone();
            if post.within_target_site.is_none()
                && classify_point(&post.location, index, site).is_some()
            {
                post.within_target_site = Some(true);
            }
            post
        })
        .collect();

    Ok(PostSet::new(&posts.crs, flagged))
}
