//! Render a small clustering result to SVG.
//!
//! `cargo run -p clusterplot --example render_svg -- out.svg`

use clusterplot::prelude::*;
use clusterplot_logging::{init_logging, with_build_span, LoggingOptions};

const RESPONSE: &str = r#"{
    "summary": [
        {"id": "c1", "type": "centroid", "position": [0.2, 0.3, 0.1], "cluster": "c1", "dataset": "demo"},
        {"id": "c2", "type": "centroid", "position": [0.8, 0.6, 0.9], "cluster": "c2", "dataset": "demo"},
        {"id": "s1", "type": "student", "position": [0.1, 0.2, 0.2], "memberships": [0.85, 0.15], "cluster": "c1", "dataset": "demo"},
        {"id": "s2", "type": "student", "position": [0.3, 0.4, 0.0], "memberships": [0.7, 0.3], "cluster": "c1", "dataset": "demo"},
        {"id": "s3", "type": "student", "position": [0.7, 0.7, 0.8], "memberships": [0.2, 0.8], "cluster": "c2", "dataset": "demo"},
        {"id": "s4", "type": "student", "position": [0.9, 0.5, 1.0], "memberships": [0.05, 0.95], "cluster": "c2", "dataset": "demo"}
    ]
}"#;

fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load()?;
    let _guard = init_logging(LoggingOptions {
        default_level: config.logging.level.as_filter().to_string(),
        enable_traces: config.logging.traces,
        ..LoggingOptions::default()
    });

    let response = ClusterResponse::from_json(RESPONSE)?;
    let mut views = config.view_manager();
    views.set_dataset(&response.summary);
    views.apply_rotation_delta(0.6, 0.35)?;

    let builder = config.scene_builder(ClusterPalette::default());
    let report = with_build_span("summary", || {
        builder.build_snapshot(&response.summary, &config.chart, &views.snapshot())
    });
    for warning in &report.warnings {
        log::warn!(target: "clusterplot", "{warning}");
    }

    let mut surface = RetainedSurface::new();
    let stats = reconcile(&DataContainer::default(), &report.container, &mut surface)?;
    log::info!(target: "clusterplot", "surface holds {} primitives ({} created)", surface.len(), stats.created);

    let exporter = SvgExporter::new();
    match std::env::args().nth(1) {
        Some(path) => exporter.export_svg(&report.container, path)?,
        None => println!("{}", exporter.render_to_svg(&report.container)?),
    }
    Ok(())
}
