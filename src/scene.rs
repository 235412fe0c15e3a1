//! Scene assembly: turns a composition into backend input

use crate::allocator::{DEFAULT_PALETTE, allocate_axes, allocate_colors};
use crate::annotations::{modification_annotations, reference_guides};
use crate::compositor::{Composition, DrawableKind, compose};
use crate::config::{ChartConfig, ModificationFilter};
use crate::error::ChartResult;
use crate::layout::{time_ticks, value_labels};
use crate::loader::load_modifications;
use crate::period::Period;
use crate::types::Modification;
use health_charts_visualization::{
    AxisScale, ChartExporter, ChartScene, ExportConfig, PngExporter, SeriesPlot, SeriesStyle,
};
use std::path::Path;
use tracing::{info, warn};

/// Build the scene of a composed graph.
///
/// `modifications` is the content of the shared modification file, already
/// loaded; the graph's filter and the plotted date range are applied here.
pub fn build_scene(
    config: &ChartConfig,
    composition: &Composition,
    modifications: &[Modification],
) -> ChartResult<ChartScene> {
    let graph = config.graph(&composition.graph)?;
    let axes = allocate_axes(&composition.markers, config.settings.axis_tolerance);
    let colors = allocate_colors(&composition.markers, &DEFAULT_PALETTE)?;

    let mut series = Vec::with_capacity(composition.markers.len());
    let mut labels = Vec::new();
    for ((marker, &axis), color) in composition
        .markers
        .iter()
        .zip(&axes.assignment)
        .zip(&colors)
    {
        let style = match marker.kind {
            DrawableKind::Connected => SeriesStyle::Line,
            DrawableKind::Horizontal { .. } => SeriesStyle::Steps,
            DrawableKind::Event => SeriesStyle::Triangles,
        };
        series.push(SeriesPlot {
            name: marker.name.clone(),
            color: color.clone(),
            axis,
            style,
            points: marker.points.iter().map(|p| (p.date, p.value)).collect(),
        });
        labels.extend(value_labels(marker, axis, color));
    }

    let mut guides = Vec::new();
    for name in &graph.ranges {
        let position = composition.markers.iter().position(|m| &m.name == name);
        match position {
            Some(i) => guides.extend(reference_guides(
                &composition.markers[i],
                axes.assignment[i],
                &colors[i],
            )),
            None => warn!(graph = %composition.graph, marker = %name, "range marker not plotted, skipped"),
        }
    }

    let first = composition.first_date();
    let last = composition.last_date();
    let annotation_colors = config
        .modifications
        .as_ref()
        .map(|m| m.colors.clone())
        .unwrap_or_default();
    let annotations = modification_annotations(
        modifications,
        &graph.modification_filter(),
        &annotation_colors,
        first,
        last,
    );

    Ok(ChartScene {
        title: composition.graph.clone(),
        x_range: (first, last),
        ticks: time_ticks(&composition.dates, composition.period.as_ref()),
        axes: axes.axes.iter().map(|s| AxisScale { top: s.top }).collect(),
        series,
        labels,
        guides,
        annotations,
    })
}

/// Load the modification file named in the configuration, if any
pub fn configured_modifications(config: &ChartConfig) -> ChartResult<Vec<Modification>> {
    match &config.modifications {
        Some(section) => load_modifications(&config.resolve(&section.file)),
        None => Ok(Vec::new()),
    }
}

/// Load, compose and lay out a graph without drawing it
pub fn compose_scene(
    config: &ChartConfig,
    graph: &str,
    period: Option<&Period>,
) -> ChartResult<ChartScene> {
    let composition = compose(config, graph, period)?;
    let modifications = match config.graph(graph)?.modification_filter() {
        ModificationFilter::Excluded => Vec::new(),
        _ => configured_modifications(config)?,
    };
    build_scene(config, &composition, &modifications)
}

/// Compose a graph and write it as a PNG file
pub fn render_graph(
    config: &ChartConfig,
    graph: &str,
    period: Option<&Period>,
    output: &Path,
) -> ChartResult<ChartScene> {
    let scene = compose_scene(config, graph, period)?;
    let exporter = PngExporter::new(ExportConfig {
        width: config.settings.width,
        height: config.settings.height,
        ..ExportConfig::default()
    });
    exporter.export(&scene, output)?;
    info!(graph, output = %output.display(), series = scene.series.len(), "chart written");
    Ok(scene)
}
