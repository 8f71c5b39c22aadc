//! Tests for nearest-neighbour spatial joins

use serde_json::{json, Value};
use visitflow::{build_point_tree, nearest_neighbor, spatial_join, FlowError, GeoPoint, PointSet, WGS84};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn source_set() -> PointSet {
    let mut source = PointSet::new(
        WGS84,
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(-5.0, 20.0),
        ],
    );
    source.insert_column(
        "name",
        vec![json!("origin"), json!("northeast"), json!("southeast")],
    );
    source.insert_column("population", vec![json!(100), json!(200), json!(300)]);
    source
}

#[test]
fn test_nearest_neighbor_indices_and_distances() {
    let source = source_set();
    let tree = build_point_tree(&source.locations);

    let queries = vec![GeoPoint::new(0.5, 0.5), GeoPoint::new(9.0, 10.0)];
    let result = nearest_neighbor(&tree, &queries);

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].0, 0);
    assert!(approx_eq(result[0].1, (0.5f64.powi(2) * 2.0).sqrt(), 1e-9));
    assert_eq!(result[1].0, 1);
    assert!(approx_eq(result[1].1, 1.0, 1e-9));
}

#[test]
fn test_tree_rounds_to_five_decimals() {
    // Two points closer than the rounding precision collapse to one cell
    let points = vec![GeoPoint::new(1.000001, 1.0), GeoPoint::new(50.0, 50.0)];
    let tree = build_point_tree(&points);

    let result = nearest_neighbor(&tree, &[GeoPoint::new(1.0, 1.0)]);
    assert_eq!(result[0].0, 0);
    assert!(approx_eq(result[0].1, 0.0, 1e-9));
}

#[test]
fn test_join_copies_requested_attributes() {
    let source = source_set();
    let target = PointSet::new(
        WGS84,
        vec![GeoPoint::new(9.5, 10.2), GeoPoint::new(0.1, -0.1)],
    );

    let joined = spatial_join(&target, &source, &["name"]).expect("valid join");

    assert_eq!(
        joined.columns["name"],
        vec![json!("northeast"), json!("origin")]
    );
    // Unrequested source columns are dropped
    assert!(!joined.columns.contains_key("population"));
}

#[test]
fn test_join_renames_colliding_column() {
    let source = source_set();
    let mut target = PointSet::new(WGS84, vec![GeoPoint::new(10.0, 10.0)]);
    target.insert_column("name", vec![json!("target-name")]);

    let joined = spatial_join(&target, &source, &["name"]).expect("valid join");

    assert_eq!(joined.columns["name"], vec![json!("target-name")]);
    assert_eq!(joined.columns["name_2"], vec![json!("northeast")]);
}

#[test]
fn test_join_unknown_attribute_lists_available() {
    let source = source_set();
    let target = PointSet::new(WGS84, vec![GeoPoint::new(1.0, 1.0)]);

    let err = spatial_join(&target, &source, &["altitude"]).expect_err("unknown column");
    match &err {
        FlowError::AttributeNotFound {
            requested,
            available,
        } => {
            assert_eq!(requested, "altitude");
            assert_eq!(available, &["name".to_string(), "population".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("altitude"));
    assert!(message.contains("name"));
    assert!(message.contains("population"));
}

#[test]
fn test_join_crs_mismatch_produces_no_output() {
    let source = source_set();
    let target = PointSet::new("EPSG:3857", vec![GeoPoint::new(1.0, 1.0)]);

    assert!(matches!(
        spatial_join(&target, &source, &["name"]),
        Err(FlowError::CrsMismatch { .. })
    ));
}

#[test]
fn test_join_short_source_column_reads_null() {
    let mut source = PointSet::new(WGS84, vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(5.0, 5.0)]);
    source.insert_column("name", vec![json!("only-first")]);
    let target = PointSet::new(WGS84, vec![GeoPoint::new(5.1, 5.1)]);

    let joined = spatial_join(&target, &source, &["name"]).expect("valid join");
    assert_eq!(joined.columns["name"], vec![Value::Null]);
}
