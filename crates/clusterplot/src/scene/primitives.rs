//! Render primitives and the container that owns them.

use crate::core::range::Axis;
use crate::error::{Result, SceneError};
use crate::model::{PointKind, ThreeDimension};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Which primitive families the scene builder emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfiguration {
    pub grid: bool,
    pub grid_labels: bool,
    pub axis: bool,
    pub axis_labels: bool,
}

impl Default for ChartConfiguration {
    fn default() -> Self {
        Self {
            grid: true,
            grid_labels: true,
            axis: true,
            axis_labels: true,
        }
    }
}

/// Back-reference from a primitive to the domain object it was built from.
///
/// Only the id is stored; hosts resolve it through their own lookup such as
/// [`crate::model::PointIndex`] or the container's `projected` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum SourceRef {
    /// A [`crate::model::DataPoint`].
    Point(String),
    /// A [`ThreeDimension`].
    Projected(String),
}

impl SourceRef {
    pub fn id(&self) -> &str {
        match self {
            SourceRef::Point(id) | SourceRef::Projected(id) => id,
        }
    }
}

/// Coordinate plane a grid line lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    Xy,
    Xz,
    Yz,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::Xy, Plane::Xz, Plane::Yz];

    /// The two axes spanning the plane.
    pub fn axes(self) -> (Axis, Axis) {
        match self {
            Plane::Xy => (Axis::X, Axis::Y),
            Plane::Xz => (Axis::X, Axis::Z),
            Plane::Yz => (Axis::Y, Axis::Z),
        }
    }

    /// The axis the plane is orthogonal to.
    pub fn normal(self) -> Axis {
        match self {
            Plane::Xy => Axis::Z,
            Plane::Xz => Axis::Y,
            Plane::Yz => Axis::X,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Plane::Xy => "xy",
            Plane::Xz => "xz",
            Plane::Yz => "yz",
        }
    }
}

/// Stable identity of a primitive across rebuilds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PrimitiveKey {
    Point { id: String },
    Axis { axis: Axis },
    /// Grid line of constant `axis` value at tick `index` within `plane`.
    Grid { plane: Plane, axis: Axis, index: usize },
    AxisLabel { axis: Axis },
    GridLabel { axis: Axis, index: usize },
}

impl fmt::Display for PrimitiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveKey::Point { id } => write!(f, "point:{id}"),
            PrimitiveKey::Axis { axis } => write!(f, "axis:{}", axis.name()),
            PrimitiveKey::Grid { plane, axis, index } => {
                write!(f, "grid:{}:{}:{index}", plane.name(), axis.name())
            }
            PrimitiveKey::AxisLabel { axis } => write!(f, "axis-label:{}", axis.name()),
            PrimitiveKey::GridLabel { axis, index } => {
                write!(f, "grid-label:{}:{index}", axis.name())
            }
        }
    }
}

/// Primitive families held by a [`DataContainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    Scatter,
    Axis,
    AxisLabel,
    Grid,
    GridLabel,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 5] = [
        PrimitiveKind::Scatter,
        PrimitiveKind::Axis,
        PrimitiveKind::AxisLabel,
        PrimitiveKind::Grid,
        PrimitiveKind::GridLabel,
    ];
}

/// A point marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub key: PrimitiveKey,
    #[serde(rename = "type")]
    pub kind: PointKind,
    /// The [`ThreeDimension`] this marker draws.
    pub original: SourceRef,
    /// The source data point.
    pub parent: SourceRef,
    /// Local centre; the screen position lives in `transform`.
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    /// `translate(x,y) scale(s)`.
    pub transform: String,
    pub x: f64,
    pub y: f64,
    pub depth: f64,
    pub scale: f64,
    pub fill: String,
}

/// A straight segment in screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub key: PrimitiveKey,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Line {
    pub fn midpoint(&self) -> (f64, f64) {
        ((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }

    pub fn end(&self) -> (f64, f64) {
        (self.x2, self.y2)
    }
}

/// A label anchored at `(x, y)` and shifted by `(dx, dy)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub key: PrimitiveKey,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub text: String,
}

/// Borrowed view of any primitive, as handed to render surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveView<'a> {
    Circle(&'a Circle),
    Line(&'a Line),
    Text(&'a Text),
}

impl<'a> PrimitiveView<'a> {
    pub fn key(&self) -> &'a PrimitiveKey {
        match self {
            PrimitiveView::Circle(c) => &c.key,
            PrimitiveView::Line(l) => &l.key,
            PrimitiveView::Text(t) => &t.key,
        }
    }

    pub fn to_owned(&self) -> Primitive {
        match self {
            PrimitiveView::Circle(c) => Primitive::Circle((*c).clone()),
            PrimitiveView::Line(l) => Primitive::Line((*l).clone()),
            PrimitiveView::Text(t) => Primitive::Text((*t).clone()),
        }
    }
}

/// Owned counterpart of [`PrimitiveView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Primitive {
    Circle(Circle),
    Line(Line),
    Text(Text),
}

impl Primitive {
    pub fn view(&self) -> PrimitiveView<'_> {
        match self {
            Primitive::Circle(c) => PrimitiveView::Circle(c),
            Primitive::Line(l) => PrimitiveView::Line(l),
            Primitive::Text(t) => PrimitiveView::Text(t),
        }
    }

    pub fn key(&self) -> &PrimitiveKey {
        self.view().key()
    }
}

/// Authoritative collection of the primitives for one scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataContainer {
    pub scatter: Vec<Circle>,
    pub axis: Vec<Line>,
    pub axis_labels: Vec<Text>,
    pub grid: Vec<Line>,
    pub grid_labels: Vec<Text>,
    /// Flattened points behind `scatter`, in the same order.
    pub projected: Vec<ThreeDimension>,
}

impl DataContainer {
    pub fn is_empty(&self) -> bool {
        PrimitiveKind::ALL.iter().all(|k| self.len_of(*k) == 0)
    }

    pub fn len_of(&self, kind: PrimitiveKind) -> usize {
        match kind {
            PrimitiveKind::Scatter => self.scatter.len(),
            PrimitiveKind::Axis => self.axis.len(),
            PrimitiveKind::AxisLabel => self.axis_labels.len(),
            PrimitiveKind::Grid => self.grid.len(),
            PrimitiveKind::GridLabel => self.grid_labels.len(),
        }
    }

    /// Primitives of one family, in emission order.
    pub fn views(&self, kind: PrimitiveKind) -> Vec<PrimitiveView<'_>> {
        match kind {
            PrimitiveKind::Scatter => self.scatter.iter().map(PrimitiveView::Circle).collect(),
            PrimitiveKind::Axis => self.axis.iter().map(PrimitiveView::Line).collect(),
            PrimitiveKind::AxisLabel => self.axis_labels.iter().map(PrimitiveView::Text).collect(),
            PrimitiveKind::Grid => self.grid.iter().map(PrimitiveView::Line).collect(),
            PrimitiveKind::GridLabel => self.grid_labels.iter().map(PrimitiveView::Text).collect(),
        }
    }

    pub fn keys(&self, kind: PrimitiveKind) -> Vec<&PrimitiveKey> {
        self.views(kind).into_iter().map(|v| v.key()).collect()
    }

    /// Fail with [`SceneError::DuplicateIdentity`] if any family repeats a key.
    pub fn check_unique(&self) -> Result<()> {
        for kind in PrimitiveKind::ALL {
            let mut seen = HashSet::with_capacity(self.len_of(kind));
            for key in self.keys(kind) {
                if !seen.insert(key) {
                    return Err(SceneError::DuplicateIdentity(key.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Look up the flattened point behind a circle.
    pub fn resolve(&self, source: &SourceRef) -> Option<&ThreeDimension> {
        self.projected.iter().find(|p| p.id == source.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(key: PrimitiveKey) -> Line {
        Line {
            key,
            x1: 0.0,
            y1: 0.0,
            x2: 2.0,
            y2: 4.0,
        }
    }

    #[test]
    fn key_display_is_stable() {
        let key = PrimitiveKey::Grid {
            plane: Plane::Xz,
            axis: Axis::Z,
            index: 3,
        };
        assert_eq!(key.to_string(), "grid:xz:z:3");
        assert_eq!(
            PrimitiveKey::Point { id: "s1".into() }.to_string(),
            "point:s1"
        );
    }

    #[test]
    fn duplicate_keys_are_detected_per_kind() {
        let mut data = DataContainer::default();
        data.axis.push(line(PrimitiveKey::Axis { axis: Axis::X }));
        data.grid.push(line(PrimitiveKey::Axis { axis: Axis::X }));
        assert!(data.check_unique().is_ok());

        data.axis.push(line(PrimitiveKey::Axis { axis: Axis::X }));
        let err = data.check_unique().unwrap_err();
        assert!(matches!(err, SceneError::DuplicateIdentity(k) if k == "axis:x"));
    }

    #[test]
    fn line_anchors() {
        let l = line(PrimitiveKey::Axis { axis: Axis::Y });
        assert_eq!(l.midpoint(), (1.0, 2.0));
        assert_eq!(l.end(), (2.0, 4.0));
    }

    #[test]
    fn chart_configuration_reads_camel_case() {
        let cfg: ChartConfiguration = serde_json::from_str(
            r#"{"grid":false,"gridLabels":true,"axis":true,"axisLabels":false}"#,
        )
        .unwrap();
        assert!(!cfg.grid && cfg.grid_labels && cfg.axis && !cfg.axis_labels);
    }

    #[test]
    fn empty_container() {
        let data = DataContainer::default();
        assert!(data.is_empty());
        assert!(data.check_unique().is_ok());
    }
}
