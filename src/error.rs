//! Error types for chart composition
//!
//! Every fatal condition of a render is a [`ChartError`]; the binary turns it
//! into a diagnostic and a non-zero exit status. Line-level parse failures are
//! not errors: they are logged and skipped by the loader.

use health_charts_visualization::VisualizationError;
use std::path::PathBuf;
use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("File “{}” not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Cannot read “{}”: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No data to plot for file “{}”", path.display())]
    NoData { path: PathBuf },

    #[error("No data in the selected period")]
    NoDataInPeriod,

    #[error("Unknown graph “{name}”. Available graphs: {available}")]
    UnknownGraph { name: String, available: String },

    #[error("Marker “{marker}” of graph “{graph}” is not defined in the “Markers” section")]
    UnknownMarker { graph: String, marker: String },

    #[error("Missing “{section}” section in the configuration")]
    MissingSection { section: &'static str },

    #[error("Graph “{graph}” has no “markers” list")]
    MissingMarkers { graph: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid period format: “{input}”. Use YYYYMM-YYYYMM, YYYYMM-, or -YYYYMM")]
    InvalidPeriod { input: String },

    #[error("Invalid normal range “{range}” for marker “{marker}”, expected “min-max”")]
    InvalidNormalRange { marker: String, range: String },

    #[error("No free color left in the palette for marker “{marker}”")]
    PaletteExhausted { marker: String },

    #[error("Rendering failed: {0}")]
    Render(#[from] VisualizationError),
}

impl ChartError {
    /// Map an I/O failure on `path`, singling out a missing file
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ChartError::FileNotFound { path }
        } else {
            ChartError::Io { path, source }
        }
    }
}
