//! Chart configuration
//!
//! The configuration is a YAML document with three sections:
//!
//! ```yaml
//! Graphs:
//!   Kidney:
//!     markers: [Creatinine, Treatment]
//!     ranges: [Creatinine]
//!     modifications: kidney        # a problem type, "all" or "none"
//! Markers:
//!   Creatinine:
//!     file: data/creatinine.txt
//!     normal_range: "0.6-1.2"
//!     target: below_max
//!   Treatment:
//!     file: data/treatment.txt
//!     horizontal: true
//! Modifications:
//!   file: data/modifications.txt
//!   colors:
//!     kidney: tab:green
//! ```
//!
//! It is loaded once and never mutated; every later stage borrows it.

use crate::error::{ChartError, ChartResult};
use crate::types::{MarkerKind, NormalRange, TargetPolicy};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "Config.yaml";

/// Whole configuration document
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "Graphs", default)]
    graphs: Option<IndexMap<String, GraphConfig>>,
    #[serde(rename = "Markers", default)]
    markers: Option<HashMap<String, MarkerConfig>>,
    #[serde(rename = "Modifications", default)]
    pub modifications: Option<ModificationsConfig>,
    #[serde(rename = "Settings", default)]
    pub settings: Settings,
    /// Directory relative data paths are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// One chart
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub markers: Option<Vec<String>>,
    /// Markers overlaid with their reference range
    #[serde(default)]
    pub ranges: Vec<String>,
    #[serde(default)]
    pub modifications: Option<String>,
}

/// Which modifications a chart shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModificationFilter {
    All,
    Excluded,
    Only(String),
}

impl ModificationFilter {
    pub fn accepts(&self, problem: &str) -> bool {
        match self {
            ModificationFilter::All => true,
            ModificationFilter::Excluded => false,
            ModificationFilter::Only(wanted) => wanted == problem,
        }
    }
}

impl GraphConfig {
    pub fn modification_filter(&self) -> ModificationFilter {
        match self.modifications.as_deref().map(str::trim) {
            None | Some("all") => ModificationFilter::All,
            Some("none") => ModificationFilter::Excluded,
            Some(problem) => ModificationFilter::Only(problem.to_string()),
        }
    }
}

/// One marker, independent of the charts that use it
#[derive(Debug, Clone, Deserialize)]
pub struct MarkerConfig {
    pub file: PathBuf,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub horizontal: bool,
    #[serde(default)]
    pub event: bool,
    #[serde(default)]
    pub normal_range: Option<String>,
    #[serde(default)]
    pub target: TargetPolicy,
    #[serde(default)]
    pub label_color: Option<String>,
}

impl MarkerConfig {
    pub fn kind(&self, name: &str) -> ChartResult<MarkerKind> {
        match (self.horizontal, self.event) {
            (false, false) => Ok(MarkerKind::Connected),
            (true, false) => Ok(MarkerKind::Horizontal),
            (false, true) => Ok(MarkerKind::Event),
            (true, true) => Err(ChartError::InvalidConfig {
                message: format!("marker “{name}” cannot be both horizontal and event"),
            }),
        }
    }

    pub fn normal_range(&self, name: &str) -> ChartResult<Option<NormalRange>> {
        self.normal_range
            .as_deref()
            .map(|text| NormalRange::parse(name, text))
            .transpose()
    }
}

/// Shared modification file and problem-type colors
#[derive(Debug, Clone, Deserialize)]
pub struct ModificationsConfig {
    pub file: PathBuf,
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

/// Rendering knobs
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Quantization step of the axis-sharing key; `0` compares scales exactly
    #[serde(default = "default_axis_tolerance")]
    pub axis_tolerance: f64,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_axis_tolerance() -> f64 {
    1e-9
}

fn default_width() -> u32 {
    1500
}

fn default_height() -> u32 {
    900
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            axis_tolerance: default_axis_tolerance(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl ChartConfig {
    /// Read and parse a configuration file
    pub fn load(path: &Path) -> ChartResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ChartError::from_io(path, e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let config = Self::from_yaml_str(&text, base_dir)?;
        debug!(file = %path.display(), graphs = config.graph_names().len(), "configuration loaded");
        Ok(config)
    }

    /// Parse a configuration document; relative data paths resolve against `base_dir`
    pub fn from_yaml_str(text: &str, base_dir: impl Into<PathBuf>) -> ChartResult<Self> {
        let mut config: ChartConfig =
            serde_yaml::from_str(text).map_err(|e| ChartError::InvalidConfig {
                message: e.to_string(),
            })?;
        config.base_dir = base_dir.into();

        if config.settings.axis_tolerance < 0.0 || !config.settings.axis_tolerance.is_finite() {
            return Err(ChartError::InvalidConfig {
                message: format!(
                    "axis_tolerance must be a non-negative number, got {}",
                    config.settings.axis_tolerance
                ),
            });
        }
        Ok(config)
    }

    fn graphs(&self) -> ChartResult<&IndexMap<String, GraphConfig>> {
        self.graphs
            .as_ref()
            .ok_or(ChartError::MissingSection { section: "Graphs" })
    }

    /// Graph names in document order
    pub fn graph_names(&self) -> Vec<&str> {
        self.graphs
            .iter()
            .flat_map(|graphs| graphs.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn graph(&self, name: &str) -> ChartResult<&GraphConfig> {
        self.graphs()?
            .get(name)
            .ok_or_else(|| ChartError::UnknownGraph {
                name: name.to_string(),
                available: self.graph_names().join(", "),
            })
    }

    /// Ordered marker names of a graph; an absent or empty list is an error
    pub fn graph_markers(&self, graph: &str) -> ChartResult<&[String]> {
        match self.graph(graph)?.markers.as_deref() {
            Some(markers) if !markers.is_empty() => Ok(markers),
            _ => Err(ChartError::MissingMarkers {
                graph: graph.to_string(),
            }),
        }
    }

    pub fn marker(&self, graph: &str, name: &str) -> ChartResult<&MarkerConfig> {
        self.markers
            .as_ref()
            .ok_or(ChartError::MissingSection { section: "Markers" })?
            .get(name)
            .ok_or_else(|| ChartError::UnknownMarker {
                graph: graph.to_string(),
                marker: name.to_string(),
            })
    }

    /// Resolve a data path from the configuration
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
