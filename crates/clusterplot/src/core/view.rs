//! The single mutable owner of the current viewpoint.
//!
//! Interaction handlers feed rotation, zoom and resize deltas in here; scene
//! builds only ever see the `Copy` [`ViewSnapshot`] taken before they start.

use crate::core::camera::{DisplaySettings, ProjectionKind, ViewState};
use crate::core::range::{ValueRange, DEFAULT_MARGIN};
use crate::error::{Result, SceneError};
use crate::model::DataPoint;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Drag and wheel sensitivities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Radians of rotation per pixel of drag.
    pub rotate_sensitivity: f64,
    /// Zoom factor change per wheel unit.
    pub zoom_sensitivity: f64,
    /// Relative padding used when recomputing the value range.
    pub range_margin: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            range_margin: DEFAULT_MARGIN,
        }
    }
}

/// Immutable copy of the view published to scene builds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub display: DisplaySettings,
    pub view: ViewState,
    /// Bumped on every mutation; lets hosts drop stale builds.
    pub revision: u64,
}

/// Owns the current display settings and value range.
#[derive(Debug, Clone)]
pub struct ViewStateManager {
    display: DisplaySettings,
    view: ViewState,
    interaction: InteractionSettings,
    initial_angles: (f64, f64, f64),
    revision: u64,
}

impl Default for ViewStateManager {
    fn default() -> Self {
        Self::new(DisplaySettings::default(), ProjectionKind::default())
    }
}

impl ViewStateManager {
    pub fn new(display: DisplaySettings, projection: ProjectionKind) -> Self {
        let mut display = display;
        display.x_view = wrap_angle(finite_or_zero(display.x_view));
        display.y_view = wrap_angle(finite_or_zero(display.y_view));
        display.z_view = wrap_angle(finite_or_zero(display.z_view));
        Self {
            initial_angles: (display.x_view, display.y_view, display.z_view),
            display,
            view: ViewState {
                range: ValueRange::default(),
                zoom: 1.0,
                projection,
            },
            interaction: InteractionSettings::default(),
            revision: 0,
        }
    }

    pub fn with_interaction(mut self, interaction: InteractionSettings) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.view.zoom = clamp_zoom(zoom);
        self
    }

    pub fn interaction(&self) -> &InteractionSettings {
        &self.interaction
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Copy of the current state for a build pass.
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            display: self.display,
            view: self.view,
            revision: self.revision,
        }
    }

    /// Rotate by `dx` radians of yaw and `dy` radians of pitch.
    pub fn apply_rotation_delta(&mut self, dx: f64, dy: f64) -> Result<()> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(SceneError::InvalidGeometry(format!(
                "non-finite rotation delta ({dx}, {dy})"
            )));
        }
        self.display.y_view = wrap_angle(self.display.y_view + dx);
        self.display.x_view = wrap_angle(self.display.x_view + dy);
        self.touch();
        Ok(())
    }

    /// Rotate about the view axis by `dz` radians.
    pub fn apply_roll(&mut self, dz: f64) -> Result<()> {
        if !dz.is_finite() {
            return Err(SceneError::InvalidGeometry(format!(
                "non-finite roll delta {dz}"
            )));
        }
        self.display.z_view = wrap_angle(self.display.z_view + dz);
        self.touch();
        Ok(())
    }

    /// Convert a pixel drag into a rotation delta.
    pub fn apply_drag(&mut self, delta_px: DVec2) -> Result<()> {
        let s = self.interaction.rotate_sensitivity;
        self.apply_rotation_delta(delta_px.x * s, delta_px.y * s)
    }

    /// Zoom in for positive `delta`, out for negative.
    pub fn apply_zoom(&mut self, delta: f64) -> Result<()> {
        if !delta.is_finite() {
            return Err(SceneError::InvalidGeometry(format!(
                "non-finite zoom delta {delta}"
            )));
        }
        let mut factor = 1.0 + delta * self.interaction.zoom_sensitivity;
        if (factor - 1.0).abs() < 1e-3 {
            return Ok(());
        }
        factor = factor.clamp(0.2, 5.0);
        self.view.zoom = clamp_zoom(self.view.zoom * factor);
        self.touch();
        Ok(())
    }

    /// Update the render extents (call when the host surface resizes).
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        let candidate = DisplaySettings {
            width,
            height,
            ..self.display
        };
        candidate.validate()?;
        self.display = candidate;
        self.touch();
        Ok(())
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        let candidate = DisplaySettings {
            radius,
            ..self.display
        };
        candidate.validate()?;
        self.display = candidate;
        self.touch();
        Ok(())
    }

    pub fn set_projection(&mut self, projection: ProjectionKind) {
        self.view.projection = projection;
        self.touch();
    }

    /// Recompute the value range from a new dataset.
    pub fn set_dataset(&mut self, points: &[DataPoint]) {
        self.view.range = ValueRange::from_points(points, self.interaction.range_margin);
        log::debug!(
            target: "clusterplot",
            "value range updated points={} x=[{:.3},{:.3}] y=[{:.3},{:.3}] z=[{:.3},{:.3}]",
            points.len(),
            self.view.range.x.min,
            self.view.range.x.max,
            self.view.range.y.min,
            self.view.range.y.max,
            self.view.range.z.min,
            self.view.range.z.max
        );
        self.touch();
    }

    /// Restore the initial angles and unit zoom.
    pub fn reset_view(&mut self) {
        let (x, y, z) = self.initial_angles;
        self.display.x_view = x;
        self.display.y_view = y;
        self.display.z_view = z;
        self.view.zoom = 1.0;
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_angle(a: f64) -> f64 {
    let w = a.rem_euclid(TAU);
    if w >= TAU {
        0.0
    } else {
        w
    }
}

/// Shortest absolute distance between two angles.
pub fn angle_distance(a: f64, b: f64) -> f64 {
    let d = wrap_angle(a - b);
    d.min(TAU - d)
}

fn clamp_zoom(z: f64) -> f64 {
    if z.is_finite() {
        z.clamp(0.01, 100.0)
    } else {
        1.0
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
