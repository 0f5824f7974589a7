//! Static export of built scenes.

pub mod svg;

pub use svg::{SvgExportSettings, SvgExporter};
