//! Core geometry for clusterplot
//!
//! Value ranges, the 3D-to-2D projection and the view state that drives it.

pub mod camera;
pub mod range;
pub mod view;

pub use camera::{project, project_normalized, DisplaySettings, ProjectionKind, Projected, ViewState};
pub use range::{Axis, AxisExtent, ValueRange};
pub use view::{InteractionSettings, ViewSnapshot, ViewStateManager};
