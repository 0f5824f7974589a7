//! Error taxonomy for the scene engine.
//!
//! Nothing here is fatal to the host: projection failures skip the offending
//! point, membership problems are reported alongside a successful build, and
//! an empty dataset simply yields an empty scene.

use thiserror::Error;

/// Errors produced by projection, scene building and reconciliation.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("inconsistent membership for point '{id}': {reason}")]
    InconsistentMembership { id: String, reason: String },

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("invalid display settings: {0}")]
    InvalidDisplay(String),

    #[error("duplicate primitive identity: {0}")]
    DuplicateIdentity(String),

    #[error("failed to parse cluster response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, SceneError>;

/// A non-fatal diagnostic collected while building a scene.
#[derive(Debug)]
pub struct SceneWarning {
    /// Id of the data point the warning is about, if any.
    pub point_id: Option<String>,
    pub error: SceneError,
}

impl SceneWarning {
    pub fn for_point<S: Into<String>>(id: S, error: SceneError) -> Self {
        Self {
            point_id: Some(id.into()),
            error,
        }
    }

    pub fn global(error: SceneError) -> Self {
        Self {
            point_id: None,
            error,
        }
    }
}

impl std::fmt::Display for SceneWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.point_id {
            Some(id) => write!(f, "[{id}] {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}
