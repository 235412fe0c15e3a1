//! # Health Charts
//!
//! Multi-scale time-series charts of health measurements kept in flat text
//! files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use health_charts::{ChartConfig, parse_period, render_graph};
//! use std::path::Path;
//!
//! let config = ChartConfig::load(Path::new("Config.yaml"))?;
//! let period = parse_period("202401-202406")?;
//! render_graph(&config, "Kidney", Some(&period), Path::new("Kidney.png"))?;
//! # Ok::<(), health_charts::ChartError>(())
//! ```
//!
//! ## Pipeline
//!
//! 1. **Load**: marker files are parsed into dated series, bad lines skipped
//! 2. **Compose**: series are cut to the period and scaled; horizontal
//!    markers carry their last known state into the period
//! 3. **Allocate**: markers with equal scales share a hidden Y-axis, and each
//!    marker gets a distinct color
//! 4. **Lay out**: value labels, reference guides, modification annotations
//!    and time ticks are placed
//! 5. **Draw**: the resulting scene is rendered by `health-charts-visualization`

pub mod allocator;
pub mod annotations;
pub mod compositor;
pub mod config;
pub mod error;
pub mod layout;
pub mod loader;
pub mod period;
pub mod scene;
pub mod types;

// Re-export commonly used types for convenience
pub use allocator::{AxisAllocation, DEFAULT_PALETTE, allocate_axes, allocate_colors};
pub use compositor::{Composition, DrawableKind, DrawableMarker, Scale, compose};
pub use config::{ChartConfig, DEFAULT_CONFIG_FILE, ModificationFilter};
pub use error::{ChartError, ChartResult};
pub use period::{Period, parse_period};
pub use scene::{compose_scene, render_graph};
pub use types::{MarkerKind, Measurement, Modification, NormalRange, TargetPolicy};

use tracing_subscriber::EnvFilter;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug output for
/// this crate when `verbose` is on. Calling it twice is harmless.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,health_charts=debug,health_charts_visualization=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
