//! Per-axis value extents and the linear scales derived from them.

use crate::model::DataPoint;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Relative padding added around computed extents.
pub const DEFAULT_MARGIN: f64 = 0.05;

/// Padding applied to an axis whose values are all equal.
const DEGENERATE_PAD: f64 = 0.5;

/// Degenerate padding relative to the magnitude of the value, so a constant
/// axis far from zero still gets a representable width.
const RELATIVE_PAD: f64 = 1e-9;

/// Closed interval `[min, max]` with `max > min`, both finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisExtent {
    pub min: f64,
    pub max: f64,
}

impl Default for AxisExtent {
    fn default() -> Self {
        Self {
            min: -1.0,
            max: 1.0,
        }
    }
}

impl AxisExtent {
    /// Build an extent covering `[lo, hi]` padded by `margin * (hi - lo)`.
    ///
    /// The result is clamped to the finite `f64` range. Non-finite or
    /// inverted input falls back to `[-1, 1]`.
    pub fn padded(lo: f64, hi: f64, margin: f64) -> Self {
        if !(lo.is_finite() && hi.is_finite() && hi >= lo) {
            return Self::default();
        }
        let half = hi * 0.5 - lo * 0.5;
        let magnitude = lo.abs().max(hi.abs());
        let pad = if half <= f64::EPSILON * magnitude.max(1.0) {
            DEGENERATE_PAD.max(magnitude * RELATIVE_PAD)
        } else {
            half * (2.0 * margin.max(0.0))
        };
        let min = (lo - pad).max(f64::MIN);
        let max = (hi + pad).min(f64::MAX);
        if max > min {
            Self { min, max }
        } else {
            Self::default()
        }
    }

    /// Half the width, always finite.
    pub fn half_span(&self) -> f64 {
        self.max * 0.5 - self.min * 0.5
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// Map `v` linearly so `min -> -1` and `max -> 1`.
    pub fn normalize(&self, v: f64) -> f64 {
        2.0 * ((v * 0.5 - self.min * 0.5) / self.half_span()) - 1.0
    }

    /// Inverse of [`AxisExtent::normalize`].
    pub fn denormalize(&self, n: f64) -> f64 {
        self.lerp((n + 1.0) * 0.5)
    }

    /// Value at tick `i` of `divisions` equal intervals, boundaries included.
    pub fn tick(&self, i: usize, divisions: usize) -> f64 {
        if i == divisions {
            return self.max;
        }
        self.lerp(i as f64 / divisions as f64)
    }

    fn lerp(&self, t: f64) -> f64 {
        self.min * (1.0 - t) + self.max * t
    }
}

/// Extents of a dataset along x, y and z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub x: AxisExtent,
    pub y: AxisExtent,
    pub z: AxisExtent,
}

impl ValueRange {
    /// Extents of the finite 3D positions in `points`, padded by `margin`.
    ///
    /// Points with a non-finite coordinate are ignored, matching the
    /// scene builder which skips them. An empty input yields `[-1, 1]`.
    pub fn from_points(points: &[DataPoint], margin: f64) -> Self {
        Self::from_positions(points.iter().map(|p| DVec3::from_array(p.xyz())), margin)
    }

    pub fn from_positions<I>(positions: I, margin: f64) -> Self
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut lo = DVec3::splat(f64::INFINITY);
        let mut hi = DVec3::splat(f64::NEG_INFINITY);
        let mut any = false;
        for p in positions.into_iter().filter(|p| p.is_finite()) {
            lo = lo.min(p);
            hi = hi.max(p);
            any = true;
        }
        if !any {
            return Self::default();
        }
        Self {
            x: AxisExtent::padded(lo.x, hi.x, margin),
            y: AxisExtent::padded(lo.y, hi.y, margin),
            z: AxisExtent::padded(lo.z, hi.z, margin),
        }
    }

    pub fn axis(&self, axis: Axis) -> &AxisExtent {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    pub fn contains(&self, p: DVec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Map a data-space point into the `[-1, 1]^3` cube.
    pub fn normalize(&self, p: DVec3) -> DVec3 {
        DVec3::new(
            self.x.normalize(p.x),
            self.y.normalize(p.y),
            self.z.normalize(p.z),
        )
    }

    /// The data origin clamped into the range.
    pub fn clamped_origin(&self) -> DVec3 {
        DVec3::new(
            0.0f64.clamp(self.x.min, self.x.max),
            0.0f64.clamp(self.y.min, self.y.max),
            0.0f64.clamp(self.z.min, self.z.max),
        )
    }
}

/// One of the three spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}
