//! Health Chart Visualization Library
//!
//! Draws a fully composed [`ChartScene`] with `plotters`:
//! - Line, step and triangle series, each bound to its own hidden Y-axis
//! - Value labels, reference guides and dated vertical annotations
//! - A single visible, pre-labelled time axis
//!
//! # Architecture
//!
//! - `data`: The scene contract handed over by the composition engine
//! - `layouts`: Pixel layout and dash geometry
//! - `styles`: Color resolution and visual styling
//! - `export`: Static PNG export

pub mod data;
pub mod errors;
pub mod export;
pub mod layouts;
pub mod styles;

// Re-export key types for convenience
pub use data::{
    AxisScale, ChartScene, GuideStroke, HorizontalGuide, LabelAnchor, SeriesPlot, SeriesStyle,
    TimeTick, ValueLabel, VerticalAnnotation,
};
pub use errors::{Result, VisualizationError};
pub use export::{export_png, ChartExporter, ExportConfig, PngExporter};
pub use layouts::ChartLayout;
pub use styles::{parse_color, ChartStyle, ColorScheme};

/// Version of the visualization library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chart dimensions for export
pub const DEFAULT_WIDTH: u32 = 1500;
pub const DEFAULT_HEIGHT: u32 = 900;
