//! Static PNG export of a chart scene

use crate::data::{ChartScene, GuideStroke, LabelAnchor, SeriesStyle};
use crate::errors::Result;
use crate::layouts::{dash_segments, ChartLayout};
use crate::styles::{parse_color, ChartStyle};
use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    pub style: ChartStyle,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: crate::DEFAULT_WIDTH,
            height: crate::DEFAULT_HEIGHT,
            style: ChartStyle::default(),
        }
    }
}

/// Something that turns a scene into a file
pub trait ChartExporter {
    fn export(&self, scene: &ChartScene, path: &Path) -> Result<()>;
}

/// Bitmap exporter
#[derive(Debug, Clone, Default)]
pub struct PngExporter {
    pub config: ExportConfig,
}

impl PngExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }
}

impl ChartExporter for PngExporter {
    fn export(&self, scene: &ChartScene, path: &Path) -> Result<()> {
        export_png(scene, path, Some(self.config.clone()))
    }
}

/// Draw `scene` into a PNG file at `path`.
///
/// The scene is validated and every color resolved before the file is
/// created, so a bad scene never leaves a half-drawn image behind.
pub fn export_png<P: AsRef<Path>>(
    scene: &ChartScene,
    path: P,
    config: Option<ExportConfig>,
) -> Result<()> {
    let config = config.unwrap_or_default();
    scene.validate()?;
    let colors = resolve_colors(scene)?;
    let layout = ChartLayout::for_scene(
        config.width,
        config.height,
        scene,
        config.style.tick_font_size,
    )?;

    let root = BitMapBackend::new(path.as_ref(), (layout.width, layout.height)).into_drawing_area();
    draw_scene(&root, scene, &layout, &config.style, &colors)?;
    root.present()?;
    debug!(path = %path.as_ref().display(), "chart written");
    Ok(())
}

fn resolve_colors(scene: &ChartScene) -> Result<HashMap<String, RGBColor>> {
    let specs = scene
        .series
        .iter()
        .map(|s| &s.color)
        .chain(scene.labels.iter().map(|l| &l.color))
        .chain(scene.guides.iter().map(|g| &g.color))
        .chain(scene.annotations.iter().map(|a| &a.color));

    let mut colors = HashMap::new();
    for spec in specs {
        if !colors.contains_key(spec) {
            colors.insert(spec.clone(), parse_color(spec)?);
        }
    }
    Ok(colors)
}

fn font(size: u32) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size as f64, FontStyle::Normal)
}

/// Draw a resolved scene on any plotters backend
pub fn draw_scene<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &ChartScene,
    layout: &ChartLayout,
    style: &ChartStyle,
    colors: &HashMap<String, RGBColor>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let color_of = |spec: &str| colors.get(spec).copied().unwrap_or(style.colors.text);
    let (left, top, right, bottom) = layout.plot_area();
    let (left, top, right, bottom) = (left as i32, top as i32, right as i32, bottom as i32);

    root.fill(&style.colors.background)?;
    root.draw(&Text::new(
        scene.title.clone(),
        ((layout.width / 2) as i32, 10),
        font(style.title_font_size)
            .color(&style.colors.text)
            .pos(Pos::new(HPos::Center, VPos::Top)),
    ))?;

    let mut chart = ChartBuilder::on(root)
        .margin_left(layout.margins.left)
        .margin_right(layout.margins.right)
        .margin_top(layout.margins.top)
        .margin_bottom(layout.margins.bottom)
        .x_label_area_size(layout.x_label_area)
        .build_cartesian_2d(0f64..scene.span_days(), 0f64..1f64)?;

    // All Y-axes share the unit plot space; each value is normalized by the
    // top of its own axis.
    let to_plot = |date: NaiveDate, axis: usize, value: f64| {
        (scene.x_of(date), scene.axes[axis].normalize(value))
    };

    root.draw(&PathElement::new(
        vec![(left, bottom), (right, bottom)],
        style.colors.axis.stroke_width(1),
    ))?;

    let tick_style = font(style.tick_font_size)
        .color(&style.colors.text)
        .transform(FontTransform::Rotate270)
        .pos(Pos::new(HPos::Right, VPos::Center));
    for tick in &scene.ticks {
        let (x, _) = chart.backend_coord(&(scene.x_of(tick.date), 0.0));
        if x < left || x > right {
            continue;
        }
        root.draw(&PathElement::new(
            vec![(x, bottom), (x, bottom + 5)],
            style.colors.axis.stroke_width(1),
        ))?;
        root.draw(&Text::new(tick.label.clone(), (x, bottom + 8), tick_style.clone()))?;
    }

    for guide in &scene.guides {
        let (_, y) = chart.backend_coord(&(0.0, scene.axes[guide.axis].normalize(guide.value)));
        if y < top || y > bottom {
            continue;
        }
        let pattern = match guide.stroke {
            GuideStroke::Dashed => style.dashed,
            GuideStroke::Dotted => style.dotted,
        };
        let line = color_of(&guide.color).stroke_width(pattern.width);
        for (a, b) in dash_segments((left, y), (right, y), pattern.dash, pattern.gap) {
            root.draw(&PathElement::new(vec![a, b], line))?;
        }
    }

    let annotation_font = style.tick_font_size;
    for annotation in &scene.annotations {
        let color = color_of(&annotation.color);
        let (x, _) = chart.backend_coord(&(scene.x_of(annotation.date), 0.0));
        let line = color.stroke_width(style.dashed.width);
        for (a, b) in dash_segments((x, top), (x, bottom), style.dashed.dash, style.dashed.gap) {
            root.draw(&PathElement::new(vec![a, b], line))?;
        }

        let text_style = font(annotation_font)
            .color(&color)
            .transform(FontTransform::Rotate270)
            .pos(Pos::new(HPos::Left, VPos::Center));
        let line_height = (annotation_font as f64 * 1.2) as i32;
        let count = annotation.lines.len() as i32;
        for (i, text) in annotation.lines.iter().enumerate() {
            let dx = (2 * i as i32 - (count - 1)) * line_height / 2;
            root.draw(&Text::new(text.clone(), (x + dx, top - 5), text_style.clone()))?;
        }
    }

    for series in &scene.series {
        let color = color_of(&series.color);
        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|&(date, value)| to_plot(date, series.axis, value))
            .collect();

        match series.style {
            SeriesStyle::Line => {
                chart.draw_series(LineSeries::new(
                    points.iter().copied(),
                    color.stroke_width(style.line_width),
                ))?;
            }
            SeriesStyle::Steps => {
                chart.draw_series(
                    points
                        .windows(2)
                        .filter(|pair| pair[0].1 > 0.0)
                        .map(|pair| {
                            PathElement::new(
                                vec![pair[0], (pair[1].0, pair[0].1)],
                                color.stroke_width(style.step_width),
                            )
                        }),
                )?;
            }
            SeriesStyle::Triangles => {}
        }

        let legend_width = style.line_width;
        let annotated = match series.style {
            SeriesStyle::Triangles => chart.draw_series(points.iter().map(|&p| {
                TriangleMarker::new(p, style.triangle_size as i32, color.filled())
            }))?,
            SeriesStyle::Line | SeriesStyle::Steps => chart.draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, style.point_radius as i32, color.filled())),
            )?,
        };
        annotated
            .label(series.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(legend_width)));
    }

    for label in &scene.labels {
        let vpos = match label.anchor {
            LabelAnchor::Above => VPos::Bottom,
            LabelAnchor::Below => VPos::Top,
        };
        let text_style = font(style.label_font_size)
            .color(&color_of(&label.color))
            .pos(Pos::new(HPos::Center, vpos));
        chart.draw_series(std::iter::once(Text::new(
            label.text.clone(),
            to_plot(label.date, label.axis, label.value),
            text_style,
        )))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&style.colors.legend_background.mix(0.85))
        .border_style(&style.colors.legend_border)
        .label_font(font(style.label_font_size).color(&style.colors.text))
        .draw()?;

    Ok(())
}
