//! Chart layout and spacing management

use crate::data::ChartScene;
use crate::errors::{Result, VisualizationError};
use serde::{Deserialize, Serialize};

/// Rough advance width of one glyph, as a fraction of the font size
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Chart layout configuration and calculations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartLayout {
    /// Total chart width in pixels
    pub width: u32,
    /// Total chart height in pixels
    pub height: u32,
    /// Margin configuration
    pub margins: Margins,
    /// Height reserved under the plot for rotated tick labels
    pub x_label_area: u32,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 900,
            margins: Margins::default(),
            x_label_area: 90,
        }
    }
}

impl ChartLayout {
    /// Layout of the given size with room above the plot for the scene's
    /// rotated annotation labels
    pub fn for_scene(width: u32, height: u32, scene: &ChartScene, font_size: u32) -> Result<Self> {
        let mut layout = Self {
            width,
            height,
            ..Self::default()
        };

        let longest = scene
            .annotations
            .iter()
            .flat_map(|a| a.lines.iter())
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        if longest > 0 {
            let text_height = (longest as f64 * font_size as f64 * GLYPH_WIDTH_RATIO).ceil() as u32;
            layout.margins.top = layout.margins.top.max(text_height + 50);
        }

        layout.check()?;
        Ok(layout)
    }

    /// Fail when margins leave no room for the plot
    pub fn check(&self) -> Result<()> {
        let horizontal = self.margins.left + self.margins.right;
        let vertical = self.margins.top + self.margins.bottom + self.x_label_area;
        if horizontal >= self.width || vertical >= self.height {
            return Err(VisualizationError::LayoutError {
                message: format!(
                    "{}x{} is too small for margins {}x{}",
                    self.width, self.height, horizontal, vertical
                ),
            });
        }
        Ok(())
    }

    /// Plot area `(left, top, right, bottom)` in pixels
    pub fn plot_area(&self) -> (u32, u32, u32, u32) {
        let left = self.margins.left;
        let right = self.width - self.margins.right;
        let top = self.margins.top;
        let bottom = self.height - self.margins.bottom - self.x_label_area;
        (left, top, right, bottom)
    }
}

/// Margin configuration for chart layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 40,
            right: 40,
            top: 60,
            bottom: 10,
        }
    }
}

/// Split the pixel segment `from`-`to` into dashes.
///
/// The last dash is clipped at `to`. A non-positive dash length yields the
/// whole segment.
pub fn dash_segments(
    from: (i32, i32),
    to: (i32, i32),
    dash: f64,
    gap: f64,
) -> Vec<((i32, i32), (i32, i32))> {
    let dx = (to.0 - from.0) as f64;
    let dy = (to.1 - from.1) as f64;
    let length = (dx * dx + dy * dy).sqrt();
    if dash <= 0.0 || length == 0.0 {
        return vec![(from, to)];
    }

    let at = |t: f64| {
        (
            (from.0 as f64 + dx * t / length).round() as i32,
            (from.1 as f64 + dy * t / length).round() as i32,
        )
    };

    let step = dash + gap.max(0.0);
    let mut segments = Vec::with_capacity((length / step).ceil() as usize);
    let mut start = 0.0;
    while start < length {
        let end = (start + dash).min(length);
        segments.push((at(start), at(end)));
        start += step;
    }
    segments
}
