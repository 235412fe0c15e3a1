//! Error types for chart rendering

use thiserror::Error;

/// Result type alias for visualization operations
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Errors that can occur while drawing a chart scene
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("Invalid scene: {message}")]
    InvalidData { message: String },

    #[error("Chart rendering failed: {message}")]
    RenderingError { message: String },

    #[error("File I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Layout calculation error: {message}")]
    LayoutError { message: String },

    #[error("Unknown color “{color}”")]
    InvalidColor { color: String },
}

impl<T: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<T>>
    for VisualizationError
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        VisualizationError::RenderingError {
            message: format!("Drawing area error: {}", err),
        }
    }
}
