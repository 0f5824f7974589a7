//! Render diff/update driver
//!
//! Keeps an externally owned surface in sync with the latest
//! [`crate::scene::DataContainer`] by matching primitives on their stable keys.

pub mod reconcile;
pub mod surface;

pub use reconcile::{reconcile, ReconcileStats};
pub use surface::{RenderSurface, RetainedSurface, SurfaceOp};
