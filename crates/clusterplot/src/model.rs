//! Domain data: clustered points as delivered by the clustering service.
//!
//! A dataset is a flat list of [`DataPoint`]s where centroid-type points act
//! as the targets of every student's fuzzy membership vector. Centroids are
//! indexed in the order they appear within their dataset partition.

use crate::error::{Result, SceneError, SceneWarning};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tolerance used when checking that student memberships sum to one.
pub const MEMBERSHIP_EPSILON: f64 = 1e-6;

/// Whether a point is an observation or a cluster representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Student,
    Centroid,
}

/// A single clustered observation or centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PointKind,
    /// One coordinate per original dimension.
    pub position: Vec<f64>,
    /// One weight per centroid of the same dataset. Empty for centroids.
    #[serde(default)]
    pub memberships: Vec<f64>,
    /// Id of the most likely centroid.
    pub cluster: String,
    pub dataset: String,
}

impl DataPoint {
    pub fn is_centroid(&self) -> bool {
        self.kind == PointKind::Centroid
    }

    /// First three position components, padded with zeros.
    pub fn xyz(&self) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (slot, value) in out.iter_mut().zip(self.position.iter()) {
            *slot = *value;
        }
        out
    }
}

/// One metric-specific point set inside a [`ClusterResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Metric name, e.g. `Engagement`, `Formative`, `Summative`.
    pub field: String,
    pub data: Vec<DataPoint>,
}

/// Payload returned by the clustering service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterResponse {
    pub summary: Vec<DataPoint>,
    #[serde(default)]
    pub breakdown: Vec<Breakdown>,
}

impl ClusterResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Names of the breakdown fields, in response order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.breakdown.iter().map(|b| b.field.as_str())
    }

    /// The point slice for one chart: the summary for `None`, otherwise the
    /// breakdown with the matching field name.
    pub fn slice(&self, field: Option<&str>) -> Option<&[DataPoint]> {
        match field {
            None => Some(&self.summary),
            Some(name) => self
                .breakdown
                .iter()
                .find(|b| b.field == name)
                .map(|b| b.data.as_slice()),
        }
    }
}

/// Render-ready flattening of a [`DataPoint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDimension {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Index of the point's cluster centroid.
    pub cluster: usize,
    /// CSS hex color derived from `cluster`.
    pub fill: String,
    /// Full original position, kept for tooltips.
    pub components: Vec<f64>,
    #[serde(rename = "type")]
    pub kind: PointKind,
    pub id: String,
}

/// Maps cluster labels to stable numeric indices for one point slice.
///
/// Centroids take indices in appearance order. Labels that match no centroid
/// are numbered after the centroids in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ClusterIndex {
    indices: HashMap<String, usize>,
    centroids: usize,
}

impl ClusterIndex {
    pub fn new(points: &[DataPoint]) -> Self {
        let mut indices = HashMap::new();
        let mut next = 0usize;
        for p in points.iter().filter(|p| p.is_centroid()) {
            indices.entry(p.id.clone()).or_insert_with(|| {
                let idx = next;
                next += 1;
                idx
            });
        }
        let centroids = next;
        for p in points {
            let label = if p.is_centroid() { &p.id } else { &p.cluster };
            if !indices.contains_key(label) {
                indices.insert(label.clone(), next);
                next += 1;
            }
        }
        Self { indices, centroids }
    }

    pub fn centroid_count(&self) -> usize {
        self.centroids
    }

    /// Cluster index for a point.
    pub fn index_of(&self, point: &DataPoint) -> usize {
        let label = if point.is_centroid() {
            &point.id
        } else {
            &point.cluster
        };
        self.indices.get(label).copied().unwrap_or(0)
    }
}

/// Host-owned lookup used to resolve primitive back-references.
#[derive(Debug, Clone, Default)]
pub struct PointIndex<'a> {
    by_id: HashMap<&'a str, &'a DataPoint>,
}

impl<'a> PointIndex<'a> {
    pub fn new(points: &'a [DataPoint]) -> Self {
        let mut by_id = HashMap::with_capacity(points.len());
        for p in points {
            by_id.entry(p.id.as_str()).or_insert(p);
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a DataPoint> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Check membership invariants of every student in `points`.
///
/// Returns one warning per offending point. Centroids are ordered per
/// dataset partition, so mixed slices are validated partition by partition.
pub fn validate_dataset(points: &[DataPoint]) -> Vec<SceneWarning> {
    let mut centroids: HashMap<&str, Vec<&str>> = HashMap::new();
    for p in points.iter().filter(|p| p.is_centroid()) {
        centroids
            .entry(p.dataset.as_str())
            .or_default()
            .push(p.id.as_str());
    }

    let mut warnings = Vec::new();
    for p in points.iter().filter(|p| !p.is_centroid()) {
        let ids = centroids
            .get(p.dataset.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        if let Err(reason) = check_memberships(p, ids) {
            warnings.push(SceneWarning::for_point(
                p.id.clone(),
                SceneError::InconsistentMembership {
                    id: p.id.clone(),
                    reason,
                },
            ));
        }
    }
    warnings
}

fn check_memberships(point: &DataPoint, centroid_ids: &[&str]) -> std::result::Result<(), String> {
    let m = &point.memberships;
    if m.len() != centroid_ids.len() {
        return Err(format!(
            "{} memberships for {} centroids",
            m.len(),
            centroid_ids.len()
        ));
    }
    if let Some(bad) = m.iter().find(|v| !v.is_finite() || **v < 0.0 || **v > 1.0) {
        return Err(format!("membership {bad} outside [0, 1]"));
    }
    let sum: f64 = m.iter().sum();
    if (sum - 1.0).abs() > MEMBERSHIP_EPSILON {
        return Err(format!("memberships sum to {sum}"));
    }
    let best = argmax(m).ok_or_else(|| "no memberships".to_string())?;
    if centroid_ids[best] != point.cluster {
        return Err(format!(
            "cluster '{}' but strongest membership is '{}'",
            point.cluster, centroid_ids[best]
        ));
    }
    Ok(())
}

/// Index of the largest value; ties resolve to the lowest index.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.iter().copied().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centroid(id: &str) -> DataPoint {
        DataPoint {
            id: id.into(),
            kind: PointKind::Centroid,
            position: vec![0.0, 0.0, 0.0],
            memberships: vec![],
            cluster: id.into(),
            dataset: "d1".into(),
        }
    }

    fn student(id: &str, memberships: Vec<f64>, cluster: &str) -> DataPoint {
        DataPoint {
            id: id.into(),
            kind: PointKind::Student,
            position: vec![1.0, 2.0],
            memberships,
            cluster: cluster.into(),
            dataset: "d1".into(),
        }
    }

    #[test]
    fn parses_cluster_response_json() {
        let json = r#"{
            "summary": [
                {"id":"c1","type":"centroid","position":[0,0,0],"memberships":[],"cluster":"c1","dataset":"d1"},
                {"id":"s1","type":"student","position":[1,1,1],"memberships":[1.0],"cluster":"c1","dataset":"d1"}
            ],
            "breakdown": [{"field":"Engagement","data":[]}]
        }"#;
        let response = ClusterResponse::from_json(json).unwrap();
        assert_eq!(response.summary.len(), 2);
        assert_eq!(response.summary[0].kind, PointKind::Centroid);
        assert_eq!(response.fields().collect::<Vec<_>>(), vec!["Engagement"]);
        assert_eq!(response.slice(Some("Engagement")).map(|s| s.len()), Some(0));
        assert!(response.slice(Some("Summative")).is_none());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ClusterResponse::from_json("{\"summary\": 3}").unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)));
    }

    #[test]
    fn xyz_pads_short_positions() {
        let p = student("s", vec![], "c");
        assert_eq!(p.xyz(), [1.0, 2.0, 0.0]);
    }

    #[test]
    fn valid_memberships_produce_no_warnings() {
        let points = vec![
            centroid("c1"),
            centroid("c2"),
            student("s1", vec![0.25, 0.75], "c2"),
            student("s2", vec![0.6, 0.4], "c1"),
        ];
        assert!(validate_dataset(&points).is_empty());
    }

    #[test]
    fn membership_sum_and_label_are_checked() {
        let points = vec![
            centroid("c1"),
            centroid("c2"),
            student("bad_sum", vec![0.5, 0.6], "c2"),
            student("bad_label", vec![0.9, 0.1], "c2"),
            student("bad_len", vec![1.0], "c1"),
        ];
        let warnings = validate_dataset(&points);
        let ids: Vec<_> = warnings
            .iter()
            .filter_map(|w| w.point_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["bad_sum", "bad_label", "bad_len"]);
        assert!(warnings
            .iter()
            .all(|w| matches!(w.error, SceneError::InconsistentMembership { .. })));
    }

    #[test]
    fn membership_sum_tolerance_boundary() {
        let points = vec![
            centroid("c1"),
            centroid("c2"),
            student("over_ok", vec![0.5 + 5e-7, 0.5], "c1"),
            student("under_ok", vec![0.5 - 5e-7, 0.5], "c2"),
            student("over_bad", vec![0.5 + 2e-6, 0.5], "c1"),
            student("under_bad", vec![0.5 - 2e-6, 0.5], "c2"),
        ];
        let warnings = validate_dataset(&points);
        let ids: Vec<_> = warnings
            .iter()
            .filter_map(|w| w.point_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["over_bad", "under_bad"]);
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn cluster_index_orders_centroids_first() {
        let points = vec![
            student("s0", vec![], "orphan"),
            centroid("c1"),
            centroid("c2"),
            student("s1", vec![], "c2"),
        ];
        let index = ClusterIndex::new(&points);
        assert_eq!(index.centroid_count(), 2);
        assert_eq!(index.index_of(&points[1]), 0);
        assert_eq!(index.index_of(&points[3]), 1);
        assert_eq!(index.index_of(&points[0]), 2);
    }

    #[test]
    fn point_index_resolves_ids() {
        let points = vec![centroid("c1"), student("s1", vec![1.0], "c1")];
        let index = PointIndex::new(&points);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("s1").map(|p| p.kind), Some(PointKind::Student));
        assert!(index.get("missing").is_none());
    }
}
