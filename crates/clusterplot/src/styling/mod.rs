//! Colors for clusters, grid, axes and labels.

pub mod palette;

pub use palette::{color_to_hex, darken_color, ClusterPalette};
