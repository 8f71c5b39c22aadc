//! Tests for point-in-polygon classification

use chrono::{TimeZone, Utc};
use visitflow::{
    assign_region_codes, classify_point, flag_target_site, FlowError, GeoPoint, GeoPost, PostSet,
    Region, RegionIndex, RegionSet, WGS84,
};

fn square(attribute: &str, lat: f64, lng: f64, half: f64) -> Region {
    Region::new(
        attribute,
        vec![
            GeoPoint::new(lat - half, lng - half),
            GeoPoint::new(lat - half, lng + half),
            GeoPoint::new(lat + half, lng + half),
            GeoPoint::new(lat + half, lng - half),
        ],
    )
    .expect("valid ring")
}

fn post(user: &str, day: u32, lat: f64, lng: f64) -> GeoPost {
    GeoPost::new(
        user,
        Utc.with_ymd_and_hms(2015, 3, day, 12, 0, 0).unwrap(),
        GeoPoint::new(lat, lng),
    )
}

#[test]
fn test_classify_point_inside_single_region() {
    let regions = RegionSet::wgs84(vec![square("FI", 62.0, 26.0, 3.0), square("SE", 62.0, 15.0, 3.0)]);
    let index = RegionIndex::build(&regions).expect("non-empty set");

    assert_eq!(
        classify_point(&GeoPoint::new(62.5, 26.5), &index, &regions),
        Some("FI")
    );
    assert_eq!(
        classify_point(&GeoPoint::new(61.0, 14.0), &index, &regions),
        Some("SE")
    );
}

#[test]
fn test_classify_point_outside_all_regions() {
    let regions = RegionSet::wgs84(vec![square("FI", 62.0, 26.0, 3.0)]);
    let index = RegionIndex::build(&regions).expect("non-empty set");

    assert_eq!(classify_point(&GeoPoint::new(0.0, 0.0), &index, &regions), None);
}

#[test]
fn test_classify_point_bbox_hit_ring_miss() {
    // Point inside the bounding box of the triangle but outside the ring
    let triangle = Region::new(
        "T",
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 2.0),
            GeoPoint::new(2.0, 2.0),
        ],
    )
    .expect("valid ring");
    let regions = RegionSet::wgs84(vec![triangle]);
    let index = RegionIndex::build(&regions).expect("non-empty set");

    assert_eq!(classify_point(&GeoPoint::new(1.5, 0.2), &index, &regions), None);
}

#[test]
fn test_classify_overlap_resolves_to_lowest_id() {
    // Both squares contain the query point; the first region in id order wins
    let regions = RegionSet::wgs84(vec![square("X", 0.0, 0.0, 2.0), square("Y", 0.5, 0.5, 2.0)]);
    let index = RegionIndex::build(&regions).expect("non-empty set");

    assert_eq!(classify_point(&GeoPoint::new(0.5, 0.5), &index, &regions), Some("X"));
}

#[test]
fn test_assign_region_codes() {
    let regions = RegionSet::wgs84(vec![square("FI", 62.0, 26.0, 3.0)]);
    let index = RegionIndex::build(&regions).expect("non-empty set");
    let posts = PostSet::wgs84(vec![
        post("u1", 1, 62.5, 26.5),
        post("u1", 2, 0.0, 0.0), // unclassifiable
    ]);

    let classified = assign_region_codes(&posts, &regions, &index).expect("matching crs");
    assert_eq!(classified.posts[0].region_code.as_deref(), Some("FI"));
    assert_eq!(classified.posts[1].region_code, None);
}

#[test]
fn test_assign_region_codes_keeps_existing() {
    let regions = RegionSet::wgs84(vec![square("FI", 62.0, 26.0, 3.0)]);
    let index = RegionIndex::build(&regions).expect("non-empty set");

    let mut pre_classified = post("u1", 1, 62.5, 26.5);
    pre_classified.region_code = Some("NO".to_string());
    let posts = PostSet::wgs84(vec![pre_classified]);

    let classified = assign_region_codes(&posts, &regions, &index).expect("matching crs");
    assert_eq!(classified.posts[0].region_code.as_deref(), Some("NO"));
}

#[test]
fn test_assign_region_codes_crs_mismatch() {
    let regions = RegionSet::new("EPSG:3857", vec![square("FI", 62.0, 26.0, 3.0)]);
    let index = RegionIndex::build(&regions).expect("non-empty set");
    let posts = PostSet::new(WGS84, vec![post("u1", 1, 62.5, 26.5)]);

    let result = assign_region_codes(&posts, &regions, &index);
    assert!(matches!(result, Err(FlowError::CrsMismatch { .. })));
}

#[test]
fn test_flag_target_site_buffered_captures_adjacent_post() {
    let site = RegionSet::wgs84(vec![square("PARK", -25.0, 31.5, 0.5)]);

    // 0.1 degrees outside the unbuffered boundary
    let adjacent = post("u1", 1, -25.0, 32.1);
    let far_away = post("u1", 2, -25.0, 35.0);
    let posts = PostSet::wgs84(vec![adjacent, far_away]);

    let buffered = site.buffered(0.2);
    let index = RegionIndex::build(&buffered).expect("non-empty set");
    let flagged = flag_target_site(&posts, &buffered, &index).expect("matching crs");

    assert_eq!(flagged.posts[0].within_target_site, Some(true));
    assert_eq!(flagged.posts[1].within_target_site, None);
}
