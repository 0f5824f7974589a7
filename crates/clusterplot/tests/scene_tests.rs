use clusterplot::core::range::Axis;
use clusterplot::model::validate_dataset;
use clusterplot::prelude::*;
use clusterplot::scene::PrimitiveKey;

const TWO_POINTS: &str = r#"{
    "summary": [
        {"id": "c1", "type": "centroid", "position": [0, 0, 0], "memberships": [], "cluster": "c1", "dataset": "d1"},
        {"id": "s1", "type": "student", "position": [1, 1, 1], "memberships": [1.0], "cluster": "c1", "dataset": "d1"}
    ]
}"#;

const FUZZY: &str = r#"{
    "summary": [
        {"id": "c1", "type": "centroid", "position": [0.1, 0.2, 0.3], "cluster": "c1", "dataset": "d1"},
        {"id": "c2", "type": "centroid", "position": [0.8, 0.7, 0.9], "cluster": "c2", "dataset": "d1"},
        {"id": "s1", "type": "student", "position": [0.2, 0.1, 0.4], "memberships": [0.9, 0.1], "cluster": "c1", "dataset": "d1"},
        {"id": "s2", "type": "student", "position": [0.7, 0.9, 0.8], "memberships": [0.25, 0.75], "cluster": "c2", "dataset": "d1"},
        {"id": "s3", "type": "student", "position": [0.5, 0.5, 0.5], "memberships": [0.5, 0.5], "cluster": "c1", "dataset": "d1"}
    ],
    "breakdown": [
        {"field": "Engagement", "data": [
            {"id": "e-c1", "type": "centroid", "position": [1.0, 2.0], "cluster": "e-c1", "dataset": "engagement"},
            {"id": "e-s1", "type": "student", "position": [1.5, 2.5], "memberships": [1.0], "cluster": "e-c1", "dataset": "engagement"}
        ]}
    ]
}"#;

fn build(points: &[DataPoint], chart: &ChartConfiguration) -> clusterplot::scene::SceneReport {
    let mut views = ViewStateManager::default();
    views.set_dataset(points);
    SceneBuilder::default().build_snapshot(points, chart, &views.snapshot())
}

#[test]
fn two_point_scene_without_grid() {
    let response = ClusterResponse::from_json(TWO_POINTS).unwrap();
    let chart: ChartConfiguration =
        serde_json::from_str(r#"{"grid": false, "axis": true, "axisLabels": false}"#).unwrap();

    let report = build(&response.summary, &chart);
    let data = &report.container;
    assert_eq!(data.scatter.len(), 2);
    assert_eq!(data.axis.len(), 3);
    assert_eq!(data.grid.len(), 0);
    assert!(data.grid_labels.is_empty());
    assert!(data.axis_labels.is_empty());
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn empty_dataset_yields_empty_scene() {
    for chart in [
        ChartConfiguration::default(),
        ChartConfiguration {
            grid: false,
            grid_labels: false,
            axis: false,
            axis_labels: false,
        },
    ] {
        let report = build(&[], &chart);
        assert!(report.container.is_empty());
        assert!(report.container.projected.is_empty());
        assert!(report
            .warnings
            .iter()
            .all(|w| matches!(w.error, SceneError::EmptyDataset)));
    }
}

#[test]
fn full_configuration_emits_every_family() {
    let response = ClusterResponse::from_json(FUZZY).unwrap();
    let report = build(&response.summary, &ChartConfiguration::default());
    let data = &report.container;
    let n = SceneLayout::default().grid_divisions;
    assert_eq!(data.scatter.len(), 5);
    assert_eq!(data.grid.len(), 6 * (n + 1));
    assert_eq!(data.grid_labels.len(), 3 * (n + 1));
    assert_eq!(data.axis.len(), 3);
    assert_eq!(data.axis_labels.len(), 3);
    assert!(data.check_unique().is_ok());
}

#[test]
fn builds_are_deterministic() {
    let response = ClusterResponse::from_json(FUZZY).unwrap();
    let mut views = ViewStateManager::default();
    views.set_dataset(&response.summary);
    views.apply_rotation_delta(0.4, -0.3).unwrap();
    let snapshot = views.snapshot();
    let builder = SceneBuilder::default();
    let chart = ChartConfiguration::default();

    let a = builder.build_snapshot(&response.summary, &chart, &snapshot);
    let b = builder.build_snapshot(&response.summary, &chart, &snapshot);
    assert_eq!(a.container, b.container);
}

#[test]
fn circles_reference_their_source_points() {
    let response = ClusterResponse::from_json(FUZZY).unwrap();
    let data = build(&response.summary, &ChartConfiguration::default()).container;
    for (circle, point) in data.scatter.iter().zip(&response.summary) {
        assert_eq!(circle.key, PrimitiveKey::Point { id: point.id.clone() });
        assert_eq!(circle.parent.id(), point.id);
        let flat = data.resolve(&circle.original).unwrap();
        assert_eq!(flat.components, point.position);
        assert_eq!(flat.fill, circle.fill);
    }
}

#[test]
fn students_share_their_centroid_index() {
    let response = ClusterResponse::from_json(FUZZY).unwrap();
    let data = build(&response.summary, &ChartConfiguration::default()).container;
    let cluster_of = |id: &str| data.projected.iter().find(|p| p.id == id).unwrap().cluster;
    assert_eq!(cluster_of("c1"), 0);
    assert_eq!(cluster_of("c2"), 1);
    assert_eq!(cluster_of("s1"), 0);
    assert_eq!(cluster_of("s2"), 1);
}

#[test]
fn membership_ties_resolve_to_first_centroid() {
    let response = ClusterResponse::from_json(FUZZY).unwrap();
    assert!(validate_dataset(&response.summary).is_empty());
}

#[test]
fn inconsistent_memberships_are_reported_but_drawn() {
    let mut points = ClusterResponse::from_json(FUZZY).unwrap().summary;
    points[2].memberships = vec![0.6, 0.6];
    points[3].cluster = "c1".into();

    let report = build(&points, &ChartConfiguration::default());
    assert_eq!(report.container.scatter.len(), 5);
    let flagged: Vec<_> = report
        .warnings
        .iter()
        .filter(|w| matches!(w.error, SceneError::InconsistentMembership { .. }))
        .filter_map(|w| w.point_id.as_deref())
        .collect();
    assert_eq!(flagged, vec!["s1", "s2"]);
}

#[test]
fn breakdown_slices_build_independently() {
    let response = ClusterResponse::from_json(FUZZY).unwrap();
    assert_eq!(response.fields().collect::<Vec<_>>(), vec!["Engagement"]);
    let slice = response.slice(Some("Engagement")).unwrap();
    let report = build(slice, &ChartConfiguration::default());
    assert_eq!(report.container.scatter.len(), 2);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    // two-dimensional positions are padded with z = 0
    assert_eq!(report.container.projected[0].z, 0.0);
    assert!(response.slice(Some("Summative")).is_none());
}

#[test]
fn data_stays_inside_the_value_range() {
    let response = ClusterResponse::from_json(FUZZY).unwrap();
    let range = ValueRange::from_points(&response.summary, 0.05);
    for p in &response.summary {
        let [x, y, z] = p.xyz();
        assert!(range.contains(glam::DVec3::new(x, y, z)));
    }
}

#[test]
fn rotation_moves_markers_but_not_identities() {
    let response = ClusterResponse::from_json(FUZZY).unwrap();
    let builder = SceneBuilder::default();
    let chart = ChartConfiguration::default();
    let mut views = ViewStateManager::default();
    views.set_dataset(&response.summary);
    let before = builder.build_snapshot(&response.summary, &chart, &views.snapshot());
    views.apply_rotation_delta(0.5, 0.0).unwrap();
    let after = builder.build_snapshot(&response.summary, &chart, &views.snapshot());

    let keys = |d: &DataContainer| d.scatter.iter().map(|c| c.key.clone()).collect::<Vec<_>>();
    assert_eq!(keys(&before.container), keys(&after.container));
    assert_ne!(before.container.scatter, after.container.scatter);
    assert_eq!(
        before.container.axis_labels.iter().map(|t| &t.text).collect::<Vec<_>>(),
        after.container.axis_labels.iter().map(|t| &t.text).collect::<Vec<_>>()
    );
}

#[test]
fn perspective_shrinks_distant_markers() {
    let points = ClusterResponse::from_json(FUZZY).unwrap().summary;
    let mut views = ViewStateManager::new(DisplaySettings::default(), ProjectionKind::perspective());
    views.set_dataset(&points);
    let data = SceneBuilder::default()
        .build_snapshot(&points, &ChartConfiguration::default(), &views.snapshot())
        .container;
    let near = data.scatter.iter().min_by(|a, b| a.depth.total_cmp(&b.depth)).unwrap();
    let far = data.scatter.iter().max_by(|a, b| a.depth.total_cmp(&b.depth)).unwrap();
    assert!(near.scale > far.scale);
}

#[test]
fn axis_keys_follow_axis_order() {
    let points = ClusterResponse::from_json(TWO_POINTS).unwrap().summary;
    let data = build(&points, &ChartConfiguration::default()).container;
    let axes: Vec<_> = data.axis.iter().map(|l| l.key.clone()).collect();
    assert_eq!(
        axes,
        Axis::ALL
            .iter()
            .map(|&axis| PrimitiveKey::Axis { axis })
            .collect::<Vec<_>>()
    );
}
