//! Tests for the region bounding-box index

use visitflow::{FlowError, GeoPoint, Region, RegionIndex, RegionSet};

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

fn sample_regions() -> RegionSet {
    RegionSet::wgs84(vec![
        square("A", 0.0, 0.0, 1.0),
        square("B", 10.0, 10.0, 1.0),
        square("C", 0.5, 0.5, 1.0), // overlaps A
    ])
}

#[test]
fn test_build_and_len() {
    let index = RegionIndex::build(&sample_regions()).expect("non-empty set");
    assert_eq!(index.len(), 3);
    assert!(!index.is_empty());
}

#[test]
fn test_build_empty_set_fails() {
    let empty = RegionSet::wgs84(vec![]);
    assert!(matches!(
        RegionIndex::build(&empty),
        Err(FlowError::EmptyRegionSet)
    ));
}

#[test]
fn test_candidates_single_hit() {
    let index = RegionIndex::build(&sample_regions()).expect("non-empty set");
    let candidates = index.candidates(&GeoPoint::new(10.0, 10.0));
    assert_eq!(candidates, vec![1]);
}

#[test]
fn test_candidates_no_hit() {
    let index = RegionIndex::build(&sample_regions()).expect("non-empty set");
    assert!(index.candidates(&GeoPoint::new(-45.0, 100.0)).is_empty());
}

#[test]
fn test_candidates_sorted_on_overlap() {
    let index = RegionIndex::build(&sample_regions()).expect("non-empty set");
    // (0.6, 0.6) lies in both A's and C's bounding boxes
    let candidates = index.candidates(&GeoPoint::new(0.6, 0.6));
    assert_eq!(candidates, vec![0, 2]);
}

#[test]
fn test_candidates_are_conservative_superset() {
    // A point outside the ring but inside the bounding box must still be
    // reported; exact containment is the classifier's job.
    let triangle = Region::new(
        "T",
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 2.0),
            GeoPoint::new(2.0, 2.0),
        ],
    )
    .expect("valid ring");
    let set = RegionSet::wgs84(vec![triangle]);
    let index = RegionIndex::build(&set).expect("non-empty set");

    // Inside the box, outside the triangle
    assert_eq!(index.candidates(&GeoPoint::new(1.5, 0.2)), vec![0]);
}
