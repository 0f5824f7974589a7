//! Scene builder: domain points plus a view snapshot in, primitives out.

use crate::core::camera::{project, DisplaySettings, ViewState};
use crate::core::view::ViewSnapshot;
use crate::error::{SceneError, SceneWarning};
use crate::model::{validate_dataset, ClusterIndex, DataPoint, ThreeDimension};
use crate::scene::grid;
use crate::scene::primitives::{ChartConfiguration, Circle, DataContainer, PrimitiveKey, SourceRef};
use crate::styling::ClusterPalette;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Layout knobs for grid, labels and markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneLayout {
    /// Number of equal intervals per axis; at least 1.
    pub grid_divisions: usize,
    pub grid_label_offset: (f64, f64),
    pub axis_label_offset: (f64, f64),
    pub axis_names: [String; 3],
    /// Decimals shown on tick labels.
    pub label_precision: usize,
    /// Radius multiplier for centroid markers.
    pub centroid_scale: f64,
    /// Scale markers by perspective depth instead of zoom alone.
    pub depth_scaling: bool,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            grid_divisions: 5,
            grid_label_offset: (0.0, 14.0),
            axis_label_offset: (6.0, -6.0),
            axis_names: ["x".to_string(), "y".to_string(), "z".to_string()],
            label_precision: 2,
            centroid_scale: 1.75,
            depth_scaling: true,
        }
    }
}

/// Result of a build together with the diagnostics it produced.
#[derive(Debug, Default)]
pub struct SceneReport {
    pub container: DataContainer,
    pub warnings: Vec<SceneWarning>,
}

/// Converts points into a [`DataContainer`].
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    layout: SceneLayout,
    palette: ClusterPalette,
}

impl SceneBuilder {
    pub fn new(layout: SceneLayout, palette: ClusterPalette) -> Self {
        Self { layout, palette }
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn palette(&self) -> &ClusterPalette {
        &self.palette
    }

    /// Build the primitives for `points`; diagnostics are logged and dropped.
    pub fn build(
        &self,
        points: &[DataPoint],
        config: &ChartConfiguration,
        view: &ViewState,
        display: &DisplaySettings,
    ) -> DataContainer {
        self.build_report(points, config, view, display).container
    }

    /// Convenience wrapper taking a [`ViewSnapshot`].
    pub fn build_snapshot(
        &self,
        points: &[DataPoint],
        config: &ChartConfiguration,
        snapshot: &ViewSnapshot,
    ) -> SceneReport {
        self.build_report(points, config, &snapshot.view, &snapshot.display)
    }

    /// Build the primitives and return every skip or validation warning.
    pub fn build_report(
        &self,
        points: &[DataPoint],
        config: &ChartConfiguration,
        view: &ViewState,
        display: &DisplaySettings,
    ) -> SceneReport {
        let mut report = SceneReport::default();
        if points.is_empty() {
            log::debug!(target: "clusterplot", "scene build skipped: empty dataset");
            report.warnings.push(SceneWarning::global(SceneError::EmptyDataset));
            return report;
        }
        if let Err(err) = display.validate() {
            log::warn!(target: "clusterplot", "scene build aborted: {err}");
            report.warnings.push(SceneWarning::global(err));
            return report;
        }

        report.warnings.extend(validate_dataset(points));

        let clusters = ClusterIndex::new(points);
        let mut seen: HashSet<&str> = HashSet::with_capacity(points.len());
        let container = &mut report.container;
        for point in points {
            if !seen.insert(point.id.as_str()) {
                log::warn!(target: "clusterplot", "skipping duplicate point id '{}'", point.id);
                report.warnings.push(SceneWarning::for_point(
                    point.id.clone(),
                    SceneError::DuplicateIdentity(
                        PrimitiveKey::Point {
                            id: point.id.clone(),
                        }
                        .to_string(),
                    ),
                ));
                continue;
            }
            let flat = self.flatten(point, &clusters);
            match self.circle_for(&flat, view, display) {
                Ok(circle) => {
                    container.scatter.push(circle);
                    container.projected.push(flat);
                }
                Err(err) => {
                    log::warn!(target: "clusterplot", "skipping point '{}': {err}", point.id);
                    report
                        .warnings
                        .push(SceneWarning::for_point(point.id.clone(), err));
                }
            }
        }

        report
            .warnings
            .extend(self.frame(container, config, view, display));

        log::debug!(
            target: "clusterplot",
            "scene built points={} circles={} grid={} axis={} labels={} warnings={}",
            points.len(),
            container.scatter.len(),
            container.grid.len(),
            container.axis.len(),
            container.axis_labels.len() + container.grid_labels.len(),
            report.warnings.len()
        );
        report
    }

    /// Flatten a data point into its render-ready form.
    pub fn flatten(&self, point: &DataPoint, clusters: &ClusterIndex) -> ThreeDimension {
        let [x, y, z] = point.xyz();
        let cluster = clusters.index_of(point);
        ThreeDimension {
            x,
            y,
            z,
            cluster,
            fill: self.palette.fill_for(cluster, point.is_centroid()),
            components: point.position.clone(),
            kind: point.kind,
            id: point.id.clone(),
        }
    }

    fn circle_for(
        &self,
        flat: &ThreeDimension,
        view: &ViewState,
        display: &DisplaySettings,
    ) -> crate::error::Result<Circle> {
        let p = project(DVec3::new(flat.x, flat.y, flat.z), view, display)?;
        let scale = if self.layout.depth_scaling {
            p.scale
        } else {
            view.zoom
        };
        let r = if flat.kind == crate::model::PointKind::Centroid {
            display.radius * self.layout.centroid_scale
        } else {
            display.radius
        };
        Ok(Circle {
            key: PrimitiveKey::Point {
                id: flat.id.clone(),
            },
            kind: flat.kind,
            original: SourceRef::Projected(flat.id.clone()),
            parent: SourceRef::Point(flat.id.clone()),
            cx: 0.0,
            cy: 0.0,
            r,
            transform: format!("translate({:.3},{:.3}) scale({:.4})", p.x, p.y, scale),
            x: p.x,
            y: p.y,
            depth: p.depth,
            scale,
            fill: flat.fill.clone(),
        })
    }

    /// Grid, axes and their labels according to `config`.
    ///
    /// Each family is generated on its own; a family that fails to project
    /// is left empty and reported without suppressing the others.
    fn frame(
        &self,
        container: &mut DataContainer,
        config: &ChartConfiguration,
        view: &ViewState,
        display: &DisplaySettings,
    ) -> Vec<SceneWarning> {
        let mut warnings = Vec::new();
        let mut family = |name: &str, result: crate::error::Result<()>| {
            if let Err(err) = result {
                log::warn!(target: "clusterplot", "{name} generation failed: {err}");
                warnings.push(SceneWarning::global(err));
            }
        };

        if config.grid {
            family(
                "grid",
                grid::grid_lines(self.layout.grid_divisions, view, display)
                    .map(|lines| container.grid = lines),
            );
            if config.grid_labels {
                family(
                    "grid label",
                    grid::grid_labels(
                        self.layout.grid_divisions,
                        self.layout.grid_label_offset,
                        self.layout.label_precision,
                        view,
                        display,
                    )
                    .map(|labels| container.grid_labels = labels),
                );
            }
        }
        if config.axis {
            family(
                "axis",
                grid::axis_lines(view, display).map(|lines| container.axis = lines),
            );
            // labels hang off the axis endpoints, so they vanish with the axes
            if config.axis_labels {
                container.axis_labels = grid::axis_labels(
                    &container.axis,
                    &self.layout.axis_names,
                    self.layout.axis_label_offset,
                );
            }
        }
        warnings
    }
}
