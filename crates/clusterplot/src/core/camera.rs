//! Projection from data space to screen space.
//!
//! Points are normalized through the current [`ValueRange`] into the unit
//! cube, stretched to the render volume, rotated by the view angles and then
//! divided orthographically or with a simple pinhole perspective.

use crate::core::range::ValueRange;
use crate::error::{Result, SceneError};
use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// Denominators at or below this are treated as "behind the camera".
const PERSPECTIVE_EPSILON: f64 = 1e-6;

/// Pixel extents of the render volume plus the current rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplaySettings {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// Marker radius in pixels.
    pub radius: f64,
    /// Rotation about the x axis, radians.
    pub x_view: f64,
    /// Rotation about the y axis, radians.
    pub y_view: f64,
    /// Rotation about the z axis, radians.
    pub z_view: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            depth: 600.0,
            radius: 4.0,
            x_view: 0.0,
            y_view: 0.0,
            z_view: 0.0,
        }
    }
}

impl DisplaySettings {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SceneError::InvalidDisplay(format!(
                    "{name} must be positive and finite, got {v}"
                )));
            }
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(SceneError::InvalidDisplay(format!(
                "radius must be non-negative, got {}",
                self.radius
            )));
        }
        if !(self.x_view.is_finite() && self.y_view.is_finite() && self.z_view.is_finite()) {
            return Err(SceneError::InvalidGeometry(format!(
                "non-finite view angles ({}, {}, {})",
                self.x_view, self.y_view, self.z_view
            )));
        }
        Ok(())
    }

    /// `Rz(zView) * Ry(yView) * Rx(xView)`.
    pub fn rotation_matrix(&self) -> DMat3 {
        DMat3::from_rotation_z(self.z_view)
            * DMat3::from_rotation_y(self.y_view)
            * DMat3::from_rotation_x(self.x_view)
    }

    pub fn half_extents(&self) -> DVec3 {
        DVec3::new(self.width, self.height, self.depth) * 0.5
    }
}

/// Camera projection type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProjectionKind {
    Orthographic,
    Perspective {
        /// Camera distance as a multiple of the largest render extent.
        focal_factor: f64,
    },
}

impl Default for ProjectionKind {
    fn default() -> Self {
        Self::Orthographic
    }
}

impl ProjectionKind {
    pub fn perspective() -> Self {
        Self::Perspective { focal_factor: 2.0 }
    }
}

/// Projection inputs that are not part of [`DisplaySettings`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub range: ValueRange,
    pub zoom: f64,
    pub projection: ProjectionKind,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            range: ValueRange::default(),
            zoom: 1.0,
            projection: ProjectionKind::default(),
        }
    }
}

/// Screen position of a projected point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// Rotated z in pixels; larger is farther from the viewer.
    pub depth: f64,
    /// Combined zoom and perspective scale at this depth.
    pub scale: f64,
}

/// Project a data-space point to screen coordinates.
pub fn project(point: DVec3, view: &ViewState, display: &DisplaySettings) -> Result<Projected> {
    if !point.is_finite() {
        return Err(SceneError::InvalidGeometry(format!(
            "non-finite coordinate ({}, {}, {})",
            point.x, point.y, point.z
        )));
    }
    project_normalized(view.range.normalize(point), view, display)
}

/// Project a point already expressed in the `[-1, 1]^3` cube.
pub fn project_normalized(
    n: DVec3,
    view: &ViewState,
    display: &DisplaySettings,
) -> Result<Projected> {
    if !n.is_finite() {
        return Err(SceneError::InvalidGeometry(format!(
            "non-finite normalized coordinate ({}, {}, {})",
            n.x, n.y, n.z
        )));
    }
    display.validate()?;
    if !view.zoom.is_finite() || view.zoom <= 0.0 {
        return Err(SceneError::InvalidGeometry(format!(
            "zoom must be positive, got {}",
            view.zoom
        )));
    }

    let half = display.half_extents();
    let rotated = display.rotation_matrix() * (n * half);

    let scale = match view.projection {
        ProjectionKind::Orthographic => view.zoom,
        ProjectionKind::Perspective { focal_factor } => {
            let camera = focal_factor * display.width.max(display.height).max(display.depth);
            let denom = camera + rotated.z;
            if !denom.is_finite() || denom <= PERSPECTIVE_EPSILON {
                return Err(SceneError::InvalidGeometry(format!(
                    "point at depth {} lies behind the camera",
                    rotated.z
                )));
            }
            view.zoom * camera / denom
        }
    };

    let projected = Projected {
        x: half.x + rotated.x * scale,
        y: half.y - rotated.y * scale,
        depth: rotated.z,
        scale,
    };
    log::trace!(
        target: "clusterplot",
        "project n=({:.4},{:.4},{:.4}) -> ({:.3},{:.3}) depth={:.3} scale={:.4}",
        n.x, n.y, n.z, projected.x, projected.y, projected.depth, projected.scale
    );
    Ok(projected)
}
