//! Axis sharing and color allocation

use crate::compositor::{DrawableMarker, Scale, ScaleKey};
use crate::error::{ChartError, ChartResult};
use health_charts_visualization::parse_color;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Qualitative palette cycled through for markers without an explicit color
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Hidden Y-axes and the axis of every marker
#[derive(Debug, Clone, PartialEq)]
pub struct AxisAllocation {
    /// One scale per axis; axis 0 is the primary axis
    pub axes: Vec<Scale>,
    /// Axis index of each marker, in marker order
    pub assignment: Vec<usize>,
}

/// Give each distinct scale its own axis, in marker order.
///
/// Markers whose scale keys are equal under `tolerance` share an axis.
pub fn allocate_axes(markers: &[DrawableMarker], tolerance: f64) -> AxisAllocation {
    let mut by_key: HashMap<ScaleKey, usize> = HashMap::new();
    let mut axes = Vec::new();
    let mut assignment = Vec::with_capacity(markers.len());

    for marker in markers {
        let axis = *by_key.entry(marker.scale.key(tolerance)).or_insert_with(|| {
            axes.push(marker.scale);
            axes.len() - 1
        });
        debug!(marker = %marker.name, axis, top = marker.scale.top, "axis allocated");
        assignment.push(axis);
    }

    AxisAllocation { axes, assignment }
}

/// Comparison key of a color: its RGB value when it resolves, else its
/// lowercase spelling
fn normalize(color: &str) -> String {
    match parse_color(color) {
        Ok(rgb) => format!("#{:02x}{:02x}{:02x}", rgb.0, rgb.1, rgb.2),
        Err(_) => color.trim().to_ascii_lowercase(),
    }
}

/// Resolve one color per marker.
///
/// Explicit colors are kept and reserved first. The others take the next
/// palette entry not yet reserved, continuing the cycle from where the
/// previous marker stopped, so the result only depends on the configuration.
pub fn allocate_colors(markers: &[DrawableMarker], palette: &[&str]) -> ChartResult<Vec<String>> {
    let mut taken: HashSet<String> = HashSet::new();
    for marker in markers {
        if let Some(color) = &marker.color {
            if !taken.insert(normalize(color)) {
                warn!(marker = %marker.name, color = %color, "color already used by another marker");
            }
        }
    }

    let mut cursor = 0;
    let mut colors = Vec::with_capacity(markers.len());
    for marker in markers {
        if let Some(color) = &marker.color {
            colors.push(color.clone());
            continue;
        }

        let free = (0..palette.len())
            .map(|step| palette[(cursor + step) % palette.len()])
            .position(|candidate| !taken.contains(&normalize(candidate)));
        let Some(step) = free else {
            return Err(ChartError::PaletteExhausted {
                marker: marker.name.clone(),
            });
        };

        let color = palette[(cursor + step) % palette.len()];
        cursor = (cursor + step + 1) % palette.len();
        taken.insert(normalize(color));
        debug!(marker = %marker.name, color, "color allocated");
        colors.push(color.to_string());
    }

    Ok(colors)
}
