//! Scene description handed to the renderer
//!
//! A [`ChartScene`] is fully resolved: every value is in data units and tied
//! to one of the scene's hidden Y-axes, every color is a color specification
//! string, and every tick already carries its label text.

use crate::errors::{Result, VisualizationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Independent `(0, top)` Y-range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub top: f64,
}

impl AxisScale {
    /// Map a value of this axis into the shared `[0, 1]` plot space
    pub fn normalize(&self, value: f64) -> f64 {
        if self.top == 0.0 {
            0.0
        } else {
            value / self.top
        }
    }
}

/// How a series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesStyle {
    /// Line through successive points, circle glyphs
    Line,
    /// Horizontal segment from each positive point to the next, circle glyphs
    Steps,
    /// Triangle glyphs only
    Triangles,
}

/// One drawable series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesPlot {
    /// Legend text
    pub name: String,
    pub color: String,
    /// Index into [`ChartScene::axes`]
    pub axis: usize,
    pub style: SeriesStyle,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Which side of its point a value label sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelAnchor {
    /// Text bottom edge at the label position
    Above,
    /// Text top edge at the label position
    Below,
}

/// Value text next to a point; `value` is already offset from the point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueLabel {
    pub date: NaiveDate,
    pub value: f64,
    pub axis: usize,
    pub text: String,
    pub color: String,
    pub anchor: LabelAnchor,
}

/// Stroke pattern of a guide line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideStroke {
    Dashed,
    Dotted,
}

/// Horizontal line across the whole plot at a value of one axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizontalGuide {
    pub axis: usize,
    pub value: f64,
    pub color: String,
    pub stroke: GuideStroke,
}

/// Vertical dashed line at a date with rotated text above the plot area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalAnnotation {
    pub date: NaiveDate,
    pub color: String,
    pub lines: Vec<String>,
}

/// Labelled X tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTick {
    pub date: NaiveDate,
    pub label: String,
}

/// Everything the renderer draws for one chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartScene {
    pub title: String,
    /// Inclusive X extent, no padding
    pub x_range: (NaiveDate, NaiveDate),
    pub ticks: Vec<TimeTick>,
    pub axes: Vec<AxisScale>,
    pub series: Vec<SeriesPlot>,
    pub labels: Vec<ValueLabel>,
    pub guides: Vec<HorizontalGuide>,
    pub annotations: Vec<VerticalAnnotation>,
}

impl ChartScene {
    /// Check the internal references of the scene before drawing anything
    pub fn validate(&self) -> Result<()> {
        if self.series.is_empty() {
            return Err(VisualizationError::InvalidData {
                message: "scene has no series".to_string(),
            });
        }
        if self.x_range.0 > self.x_range.1 {
            return Err(VisualizationError::InvalidData {
                message: format!(
                    "reversed date range {} > {}",
                    self.x_range.0, self.x_range.1
                ),
            });
        }

        let axis_count = self.axes.len();
        let check_axis = |axis: usize, what: &str| {
            if axis < axis_count {
                Ok(())
            } else {
                Err(VisualizationError::InvalidData {
                    message: format!("{} refers to axis {} of {}", what, axis, axis_count),
                })
            }
        };
        for series in &self.series {
            check_axis(series.axis, &format!("series “{}”", series.name))?;
        }
        for label in &self.labels {
            check_axis(label.axis, "value label")?;
        }
        for guide in &self.guides {
            check_axis(guide.axis, "guide")?;
        }
        Ok(())
    }

    /// Width of the X extent in days; single-day charts are widened to one day
    pub fn span_days(&self) -> f64 {
        let days = (self.x_range.1 - self.x_range.0).num_days() as f64;
        days.max(1.0)
    }

    /// Position of a date on the X axis, in days from the start of the range
    pub fn x_of(&self, date: NaiveDate) -> f64 {
        (date - self.x_range.0).num_days() as f64
    }
}
