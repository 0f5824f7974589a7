//! SVG export of a built scene.
//!
//! Draws straight from the [`DataContainer`] so the file matches what a live
//! surface would show. Circles are painted far-to-near.

use crate::error::{Result, SceneError};
use crate::scene::primitives::{Circle, DataContainer, Line, PrimitiveKind, Text};
use crate::styling::{color_to_hex, ClusterPalette};
use std::fmt::Write;
use std::path::Path;

/// SVG exporter for scenes
pub struct SvgExporter {
    settings: SvgExportSettings,
    palette: ClusterPalette,
}

/// SVG export configuration
#[derive(Debug, Clone)]
pub struct SvgExportSettings {
    /// Output width in user units
    pub width: f64,
    /// Output height in user units
    pub height: f64,
    pub grid_stroke_width: f64,
    pub axis_stroke_width: f64,
    pub font_size: f64,
    /// Outline drawn around centroid markers
    pub centroid_stroke_width: f64,
    /// Include a `<title>` element
    pub title: Option<String>,
}

impl Default for SvgExportSettings {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            grid_stroke_width: 0.5,
            axis_stroke_width: 1.0,
            font_size: 11.0,
            centroid_stroke_width: 1.5,
            title: None,
        }
    }
}

impl Default for SvgExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_err(e: std::fmt::Error) -> SceneError {
    SceneError::Export(format!("SVG write error: {e}"))
}

impl SvgExporter {
    pub fn new() -> Self {
        Self {
            settings: SvgExportSettings::default(),
            palette: ClusterPalette::default(),
        }
    }

    pub fn with_settings(settings: SvgExportSettings, palette: ClusterPalette) -> Self {
        Self { settings, palette }
    }

    pub fn settings(&self) -> &SvgExportSettings {
        &self.settings
    }

    /// Write the scene to an SVG file.
    pub fn export_svg<P: AsRef<Path>>(&self, data: &DataContainer, path: P) -> Result<()> {
        let svg = self.render_to_svg(data)?;
        std::fs::write(path.as_ref(), svg).map_err(|e| {
            SceneError::Export(format!(
                "failed to write SVG file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        log::debug!(target: "clusterplot", "svg export completed");
        Ok(())
    }

    /// Render the scene to an SVG document.
    pub fn render_to_svg(&self, data: &DataContainer) -> Result<String> {
        let mut svg = String::new();
        writeln!(
            svg,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"#,
            self.settings.width, self.settings.height, self.settings.width, self.settings.height
        )
        .map_err(write_err)?;

        if let Some(title) = &self.settings.title {
            writeln!(svg, "  <title>{}</title>", xml_escape(title)).map_err(write_err)?;
        }
        writeln!(
            svg,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            color_to_hex(self.palette.background)
        )
        .map_err(write_err)?;

        self.add_lines(&mut svg, PrimitiveKind::Grid, &data.grid)?;
        self.add_lines(&mut svg, PrimitiveKind::Axis, &data.axis)?;
        self.add_circles(&mut svg, &data.scatter)?;
        self.add_texts(&mut svg, PrimitiveKind::GridLabel, &data.grid_labels)?;
        self.add_texts(&mut svg, PrimitiveKind::AxisLabel, &data.axis_labels)?;

        writeln!(svg, "</svg>").map_err(write_err)?;
        log::debug!(target: "clusterplot", "svg export size chars={}", svg.len());
        Ok(svg)
    }

    fn add_lines(&self, svg: &mut String, kind: PrimitiveKind, lines: &[Line]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        let (class, color, width) = match kind {
            PrimitiveKind::Grid => ("grid", self.palette.grid_color, self.settings.grid_stroke_width),
            _ => ("axis", self.palette.axis_color, self.settings.axis_stroke_width),
        };
        writeln!(
            svg,
            r#"  <g class="{class}" stroke="{}" stroke-width="{width}">"#,
            color_to_hex(color)
        )
        .map_err(write_err)?;
        for line in lines {
            writeln!(
                svg,
                r#"    <line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}"/>"#,
                line.x1, line.y1, line.x2, line.y2
            )
            .map_err(write_err)?;
        }
        writeln!(svg, "  </g>").map_err(write_err)?;
        Ok(())
    }

    fn add_circles(&self, svg: &mut String, circles: &[Circle]) -> Result<()> {
        if circles.is_empty() {
            return Ok(());
        }
        // painter's order: farthest first, ties keep dataset order
        let mut order: Vec<&Circle> = circles.iter().collect();
        order.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        writeln!(svg, r#"  <g class="scatter">"#).map_err(write_err)?;
        for c in order {
            let stroke = if c.kind == crate::model::PointKind::Centroid {
                format!(
                    r#" stroke="{}" stroke-width="{}""#,
                    color_to_hex(self.palette.axis_color),
                    self.settings.centroid_stroke_width
                )
            } else {
                String::new()
            };
            writeln!(
                svg,
                r#"    <circle id="{}" cx="{}" cy="{}" r="{}" transform="{}" fill="{}"{stroke}/>"#,
                xml_escape(&c.key.to_string()),
                c.cx,
                c.cy,
                c.r,
                c.transform,
                c.fill
            )
            .map_err(write_err)?;
        }
        writeln!(svg, "  </g>").map_err(write_err)?;
        Ok(())
    }

    fn add_texts(&self, svg: &mut String, kind: PrimitiveKind, texts: &[Text]) -> Result<()> {
        if texts.is_empty() {
            return Ok(());
        }
        let (class, anchor) = match kind {
            PrimitiveKind::AxisLabel => ("axis-labels", "start"),
            _ => ("grid-labels", "middle"),
        };
        writeln!(
            svg,
            r#"  <g class="{class}" font-family="sans-serif" font-size="{}" fill="{}" text-anchor="{anchor}">"#,
            self.settings.font_size,
            color_to_hex(self.palette.text_color)
        )
        .map_err(write_err)?;
        for t in texts {
            writeln!(
                svg,
                r#"    <text x="{:.3}" y="{:.3}" dx="{}" dy="{}">{}</text>"#,
                t.x,
                t.y,
                t.dx,
                t.dy,
                xml_escape(&t.text)
            )
            .map_err(write_err)?;
        }
        writeln!(svg, "  </g>").map_err(write_err)?;
        Ok(())
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
