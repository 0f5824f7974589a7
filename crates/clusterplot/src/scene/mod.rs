//! Scene construction
//!
//! Turns clustered points into circles, grid lines, axis lines and labels
//! using the projection in [`crate::core`]. Building is a pure function of
//! its inputs; the only side effect is diagnostic logging.

pub mod builder;
pub mod grid;
pub mod primitives;

pub use builder::{SceneBuilder, SceneLayout, SceneReport};
pub use grid::format_tick;
pub use primitives::{
    ChartConfiguration, Circle, DataContainer, Line, Plane, Primitive, PrimitiveKey,
    PrimitiveKind, PrimitiveView, SourceRef, Text,
};
