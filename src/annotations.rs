//! Reference-range guides and dated modification annotations

use crate::compositor::DrawableMarker;
use crate::config::ModificationFilter;
use crate::types::{Modification, TargetPolicy};
use chrono::NaiveDate;
use health_charts_visualization::{GuideStroke, HorizontalGuide, VerticalAnnotation};
use std::collections::HashMap;
use tracing::warn;

/// Annotation color of problem types missing from the color map
pub const FALLBACK_COLOR: &str = "red";
/// Longest annotation line before wrapping
pub const WRAP_WIDTH: usize = 18;

/// Split a label longer than `width` characters onto two lines.
///
/// The break replaces the last space at or before index `width`; without
/// such a space the label is cut at exactly `width` characters.
pub fn wrap_label(label: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= width {
        return vec![label.to_string()];
    }

    let head = &chars[..=width];
    match head.iter().rposition(|&c| c == ' ') {
        Some(space) if space > 0 => vec![
            chars[..space].iter().collect(),
            chars[space + 1..].iter().collect(),
        ],
        _ => vec![chars[..width].iter().collect(), chars[width..].iter().collect()],
    }
}

/// Vertical annotations for the modifications plotted between `first` and
/// `last`, both inclusive
pub fn modification_annotations(
    modifications: &[Modification],
    filter: &ModificationFilter,
    colors: &HashMap<String, String>,
    first: NaiveDate,
    last: NaiveDate,
) -> Vec<VerticalAnnotation> {
    modifications
        .iter()
        .filter(|m| filter.accepts(&m.problem))
        .filter(|m| first <= m.date && m.date <= last)
        .map(|m| VerticalAnnotation {
            date: m.date,
            color: colors
                .get(&m.problem)
                .cloned()
                .unwrap_or_else(|| FALLBACK_COLOR.to_string()),
            lines: wrap_label(&m.label, WRAP_WIDTH),
        })
        .collect()
}

/// Horizontal guides for a marker's normal range, on the marker's own axis
pub fn reference_guides(marker: &DrawableMarker, axis: usize, color: &str) -> Vec<HorizontalGuide> {
    let Some(range) = marker.normal_range else {
        warn!(marker = %marker.name, "no normal_range configured, reference range skipped");
        return Vec::new();
    };

    let guide = |value: f64, stroke: GuideStroke| HorizontalGuide {
        axis,
        value,
        color: color.to_string(),
        stroke,
    };

    match marker.target {
        TargetPolicy::AboveMin => vec![guide(range.min, GuideStroke::Dashed)],
        TargetPolicy::BelowMax => vec![guide(range.max, GuideStroke::Dashed)],
        TargetPolicy::Middle => vec![
            guide(range.min, GuideStroke::Dashed),
            guide(range.max, GuideStroke::Dashed),
            guide(range.midpoint(), GuideStroke::Dotted),
        ],
        TargetPolicy::None => {
            warn!(marker = %marker.name, "no target configured, reference range skipped");
            Vec::new()
        }
    }
}
