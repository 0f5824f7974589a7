//! Cluster color palette
//!
//! Assigns each cluster index a fill color and provides the neutral colors
//! used for grid, axes and labels.

use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Colors used by the scene builder and exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPalette {
    pub background: Vec4,
    pub axis_color: Vec4,
    pub grid_color: Vec4,
    pub text_color: Vec4,

    /// Series colors, indexed by cluster.
    pub data_colors: Vec<Vec4>,

    /// Amount centroid fills are darkened relative to their cluster color.
    pub centroid_darken: f32,
}

impl Default for ClusterPalette {
    fn default() -> Self {
        Self {
            background: Vec4::new(1.0, 1.0, 1.0, 1.0),
            axis_color: Vec4::new(0.25, 0.27, 0.30, 1.0),
            grid_color: Vec4::new(0.80, 0.82, 0.85, 1.0),
            text_color: Vec4::new(0.12, 0.14, 0.16, 1.0),

            data_colors: vec![
                Vec4::new(0.35, 0.78, 0.48, 1.0), // green
                Vec4::new(0.25, 0.65, 0.85, 1.0), // blue
                Vec4::new(0.95, 0.55, 0.25, 1.0), // orange
                Vec4::new(0.75, 0.35, 0.85, 1.0), // purple
                Vec4::new(0.95, 0.75, 0.25, 1.0), // yellow
                Vec4::new(0.85, 0.35, 0.55, 1.0), // rose
                Vec4::new(0.25, 0.85, 0.75, 1.0), // turquoise
                Vec4::new(0.65, 0.75, 0.35, 1.0), // lime
            ],

            centroid_darken: 0.2,
        }
    }
}

impl ClusterPalette {
    /// Color for a cluster index (cycles through the palette).
    pub fn cluster_color(&self, index: usize) -> Vec4 {
        if self.data_colors.is_empty() {
            return self.axis_color;
        }
        self.data_colors[index % self.data_colors.len()]
    }

    /// Fill for a point of the given cluster; centroids are drawn darker.
    pub fn fill_for(&self, index: usize, centroid: bool) -> String {
        let base = self.cluster_color(index);
        let color = if centroid {
            darken_color(base, self.centroid_darken)
        } else {
            base
        };
        color_to_hex(color)
    }
}

/// Create a darker variant of a color.
pub fn darken_color(color: Vec4, factor: f32) -> Vec4 {
    Vec4::new(
        (color.x - factor).max(0.0),
        (color.y - factor).max(0.0),
        (color.z - factor).max(0.0),
        color.w,
    )
}

/// `#rrggbb` for an RGBA color in `[0, 1]`; alpha is dropped.
pub fn color_to_hex(color: Vec4) -> String {
    let c = color.clamp(Vec4::ZERO, Vec4::ONE);
    format!(
        "#{:02x}{:02x}{:02x}",
        (c.x * 255.0).round() as u8,
        (c.y * 255.0).round() as u8,
        (c.z * 255.0).round() as u8
    )
}
