//! clusterplot: 3D scatter layout for fuzzy clustering results
//!
//! Clustered points (students and their centroids) are projected through a
//! rotatable camera into 2D circles, grid lines, axis lines and labels. A
//! [`render::reconcile()`] pass then brings a host-owned surface from one
//! scene to the next with the smallest set of create/update/remove effects.
//!
//! ```no_run
//! use clusterplot::prelude::*;
//!
//! let response = ClusterResponse::from_json(r#"{"summary": [], "breakdown": []}"#)?;
//! let mut views = ViewStateManager::default();
//! views.set_dataset(&response.summary);
//!
//! let builder = SceneBuilder::default();
//! let scene = builder.build_snapshot(&response.summary, &ChartConfiguration::default(), &views.snapshot());
//!
//! let mut surface = RetainedSurface::new();
//! reconcile(&DataContainer::default(), &scene.container, &mut surface)?;
//! # Ok::<(), clusterplot::SceneError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod model;
pub mod render;
pub mod scene;
pub mod styling;

pub use error::{Result, SceneError, SceneWarning};

/// Common imports for hosts.
pub mod prelude {
    pub use crate::config::{ClusterPlotConfig, ConfigLoader};
    pub use crate::core::{
        project, DisplaySettings, ProjectionKind, ValueRange, ViewSnapshot, ViewState,
        ViewStateManager,
    };
    pub use crate::error::{SceneError, SceneWarning};
    pub use crate::export::SvgExporter;
    pub use crate::model::{ClusterResponse, DataPoint, PointKind, ThreeDimension};
    pub use crate::render::{reconcile, ReconcileStats, RenderSurface, RetainedSurface};
    pub use crate::scene::{ChartConfiguration, DataContainer, SceneBuilder, SceneLayout};
    pub use crate::styling::ClusterPalette;
}
