//! Marker composition
//!
//! Loads every marker of a graph, restricts it to the requested period,
//! computes its display scale and label offset, and carries the state of
//! horizontal markers across the left edge of the period.

use crate::config::{ChartConfig, MarkerConfig};
use crate::error::{ChartError, ChartResult};
use crate::loader::load_measurements;
use crate::period::Period;
use crate::types::{MarkerKind, Measurement, NormalRange, TargetPolicy};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Headroom over the maximum so the topmost point and its label stay visible
pub const REGULAR_HEADROOM: f64 = 0.0334;
/// Event markers only use the bottom twentieth of their axis
pub const EVENT_SCALE_FRACTION: f64 = 0.05;
/// Distance between a point and its value label, as a fraction of the maximum
pub const LABEL_OFFSET_RATIO: f64 = 0.016;

/// `(0, top)` Y-range of a marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub top: f64,
}

/// Axis-sharing key derived from a [`Scale`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleKey {
    /// Bit pattern of the top
    Exact(u64),
    /// Bit pattern of the top divided by the tolerance, rounded
    Quantized(u64),
}

impl Scale {
    pub fn for_kind(kind: MarkerKind, max: f64) -> Self {
        let top = match kind {
            MarkerKind::Event => max / EVENT_SCALE_FRACTION,
            MarkerKind::Connected | MarkerKind::Horizontal => max + max * REGULAR_HEADROOM,
        };
        Self { top }
    }

    /// Scales whose tops fall in the same `tolerance`-wide bucket share a key;
    /// a zero tolerance compares the exact bit patterns.
    ///
    /// The bucket index is kept as a float, never narrowed to an integer, so
    /// large tops stay distinct. A quotient that overflows to infinity falls
    /// back to the exact top.
    pub fn key(&self, tolerance: f64) -> ScaleKey {
        // Adding 0.0 folds -0.0 into 0.0
        if tolerance > 0.0 {
            let bucket = (self.top / tolerance).round();
            if bucket.is_finite() {
                return ScaleKey::Quantized((bucket + 0.0).to_bits());
            }
        }
        ScaleKey::Exact((self.top + 0.0).to_bits())
    }
}

/// Kind-specific part of a drawable marker
#[derive(Debug, Clone, PartialEq)]
pub enum DrawableKind {
    Connected,
    /// `anterior` is the state in effect when the period opens, if any
    Horizontal { anterior: Option<f64> },
    Event,
}

impl DrawableKind {
    pub fn marker_kind(&self) -> MarkerKind {
        match self {
            DrawableKind::Connected => MarkerKind::Connected,
            DrawableKind::Horizontal { .. } => MarkerKind::Horizontal,
            DrawableKind::Event => MarkerKind::Event,
        }
    }
}

/// One marker, ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableMarker {
    pub name: String,
    pub kind: DrawableKind,
    /// Explicit color from the configuration; `None` until allocated
    pub color: Option<String>,
    pub label_color: Option<String>,
    pub scale: Scale,
    pub label_offset: f64,
    /// In-period points; for horizontal markers, led by the carried-in state
    pub points: Vec<Measurement>,
    pub normal_range: Option<NormalRange>,
    pub target: TargetPolicy,
}

/// All markers of one graph plus the merged set of plotted dates
#[derive(Debug, Clone)]
pub struct Composition {
    pub graph: String,
    pub period: Option<Period>,
    pub markers: Vec<DrawableMarker>,
    /// Distinct plotted dates, ascending
    pub dates: Vec<NaiveDate>,
}

impl Composition {
    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn marker(&self, name: &str) -> Option<&DrawableMarker> {
        self.markers.iter().find(|m| m.name == name)
    }
}

/// Where marker series come from
pub trait SeriesSource {
    fn load(&self, marker: &MarkerConfig, kind: MarkerKind) -> ChartResult<Vec<Measurement>>;
}

/// Reads marker files relative to the configuration
pub struct FileSource<'a> {
    config: &'a ChartConfig,
}

impl<'a> FileSource<'a> {
    pub fn new(config: &'a ChartConfig) -> Self {
        Self { config }
    }
}

impl SeriesSource for FileSource<'_> {
    fn load(&self, marker: &MarkerConfig, kind: MarkerKind) -> ChartResult<Vec<Measurement>> {
        load_measurements(&self.config.resolve(&marker.file), kind == MarkerKind::Event)
    }
}

/// Compose a graph from the marker files named in the configuration
pub fn compose(config: &ChartConfig, graph: &str, period: Option<&Period>) -> ChartResult<Composition> {
    compose_with(&FileSource::new(config), config, graph, period)
}

/// Compose a graph, loading series through `source`
pub fn compose_with<S: SeriesSource>(
    source: &S,
    config: &ChartConfig,
    graph: &str,
    period: Option<&Period>,
) -> ChartResult<Composition> {
    match period {
        Some(period) => debug!(graph, %period, "composing"),
        None => debug!(graph, "composing over all dates"),
    }

    let mut markers = Vec::new();
    let mut earliest_connected: Option<NaiveDate> = None;

    for name in config.graph_markers(graph)? {
        let marker_config = config.marker(graph, name)?;
        let kind = marker_config.kind(name)?;
        let series = source.load(marker_config, kind)?;
        if series.is_empty() {
            return Err(ChartError::NoData {
                path: config.resolve(&marker_config.file),
            });
        }

        let (anterior, points) = match period {
            Some(period) => {
                let anterior = match kind {
                    MarkerKind::Horizontal => anterior_value(&series, period.start),
                    _ => None,
                };
                let points: Vec<Measurement> =
                    series.into_iter().filter(|m| period.contains(m.date)).collect();
                (anterior, points)
            }
            None => (None, series),
        };

        if points.is_empty() {
            debug!(graph, marker = %name, "no point in the selected period, marker dropped");
            continue;
        }

        if kind == MarkerKind::Connected {
            let first = points[0].date;
            earliest_connected = Some(earliest_connected.map_or(first, |e| e.min(first)));
        }

        let max = points.iter().map(|m| m.value).fold(f64::NEG_INFINITY, f64::max);
        let scale = Scale::for_kind(kind, max);
        let drawable_kind = match kind {
            MarkerKind::Connected => DrawableKind::Connected,
            MarkerKind::Horizontal => DrawableKind::Horizontal { anterior },
            MarkerKind::Event => DrawableKind::Event,
        };

        debug!(graph, marker = %name, points = points.len(), top = scale.top, ?anterior, "marker composed");
        markers.push(DrawableMarker {
            name: name.clone(),
            kind: drawable_kind,
            color: marker_config.color.clone(),
            label_color: marker_config.label_color.clone(),
            scale,
            label_offset: max * LABEL_OFFSET_RATIO,
            points,
            normal_range: marker_config.normal_range(name)?,
            target: marker_config.target,
        });
    }

    if markers.is_empty() {
        return Err(ChartError::NoDataInPeriod);
    }

    if let Some(period) = period {
        let anchor = earliest_connected.unwrap_or(period.start);
        for marker in &mut markers {
            // A zero state draws no segment and is not carried in
            if let DrawableKind::Horizontal {
                anterior: Some(value),
            } = marker.kind
                && value != 0.0
            {
                marker.points.insert(0, Measurement::new(anchor, value));
            }
        }
    }

    let dates: BTreeSet<NaiveDate> = markers
        .iter()
        .flat_map(|m| m.points.iter().map(|p| p.date))
        .collect();

    Ok(Composition {
        graph: graph.to_string(),
        period: period.copied(),
        markers,
        dates: dates.into_iter().collect(),
    })
}

/// Last value dated strictly before `start`, scanning in series order and
/// stopping at the first date on or after `start`
pub fn anterior_value(series: &[Measurement], start: NaiveDate) -> Option<f64> {
    series
        .iter()
        .take_while(|m| m.date < start)
        .last()
        .map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// In-memory series keyed by their configured file name
    struct MemorySource(HashMap<PathBuf, Vec<Measurement>>);

    impl SeriesSource for MemorySource {
        fn load(&self, marker: &MarkerConfig, _kind: MarkerKind) -> ChartResult<Vec<Measurement>> {
            Ok(self.0.get(&marker.file).cloned().unwrap_or_default())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn m(y: i32, mo: u32, d: u32, v: f64) -> Measurement {
        Measurement::new(date(y, mo, d), v)
    }

    const DOC: &str = r#"
Graphs:
  Mixed:
    markers: [Iron, Treatment, Pills]
  Ghost:
    markers: [Iron, Missing]
Markers:
  Iron:
    file: iron.txt
    color: navy
  Treatment:
    file: treatment.txt
    horizontal: true
  Pills:
    file: pills.txt
    event: true
"#;

    fn source() -> MemorySource {
        MemorySource(HashMap::from([
            (
                PathBuf::from("iron.txt"),
                vec![m(2024, 2, 10, 10.0), m(2024, 4, 5, 20.0), m(2024, 7, 1, 15.0)],
            ),
            (
                PathBuf::from("treatment.txt"),
                vec![m(2024, 1, 1, 1.0), m(2024, 6, 1, 2.0)],
            ),
            (
                PathBuf::from("pills.txt"),
                vec![m(2024, 3, 3, 2.0), m(2024, 5, 5, 1.0)],
            ),
        ]))
    }

    fn config() -> ChartConfig {
        ChartConfig::from_yaml_str(DOC, "").unwrap()
    }

    #[test]
    fn test_scales_and_offsets() {
        let composition = compose_with(&source(), &config(), "Mixed", None).unwrap();
        let iron = composition.marker("Iron").unwrap();
        assert_relative_eq!(iron.scale.top, 20.668, epsilon = 1e-9);
        assert_relative_eq!(iron.label_offset, 0.32, epsilon = 1e-12);
        assert_eq!(iron.color.as_deref(), Some("navy"));

        let pills = composition.marker("Pills").unwrap();
        assert_eq!(pills.kind, DrawableKind::Event);
        assert_relative_eq!(pills.scale.top, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_period_keeps_everything() {
        let composition = compose_with(&source(), &config(), "Mixed", None).unwrap();
        assert_eq!(composition.markers.len(), 3);
        assert_eq!(composition.dates.len(), 7);
        assert_eq!(composition.first_date(), date(2024, 1, 1));
        assert_eq!(composition.last_date(), date(2024, 7, 1));

        let treatment = composition.marker("Treatment").unwrap();
        assert_eq!(treatment.kind, DrawableKind::Horizontal { anterior: None });
        assert_eq!(treatment.points.len(), 2);
    }

    #[test]
    fn test_state_is_carried_into_the_period() {
        let period = Period::new(date(2024, 3, 1), Period::UNBOUNDED_END);
        let composition = compose_with(&source(), &config(), "Mixed", Some(&period)).unwrap();

        let treatment = composition.marker("Treatment").unwrap();
        assert_eq!(treatment.kind, DrawableKind::Horizontal { anterior: Some(1.0) });
        // Anchored on the first in-period point of the connected marker
        assert_eq!(
            treatment.points,
            vec![m(2024, 4, 5, 1.0), m(2024, 6, 1, 2.0)]
        );
        assert_eq!(composition.first_date(), date(2024, 3, 3));
    }

    #[test]
    fn test_carry_in_falls_back_to_period_start() {
        let doc = "Graphs:\n  G:\n    markers: [Treatment]\nMarkers:\n  Treatment:\n    file: treatment.txt\n    horizontal: true\n";
        let config = ChartConfig::from_yaml_str(doc, "").unwrap();
        let period = Period::new(date(2024, 3, 1), Period::UNBOUNDED_END);

        let composition = compose_with(&source(), &config, "G", Some(&period)).unwrap();
        let treatment = composition.marker("Treatment").unwrap();
        assert_eq!(treatment.points[0], m(2024, 3, 1, 1.0));
        assert_eq!(composition.first_date(), date(2024, 3, 1));
    }

    #[test]
    fn test_zero_state_is_not_carried_in() {
        let doc = "Graphs:\n  G:\n    markers: [Iron, Treatment]\nMarkers:\n  Iron:\n    file: iron.txt\n  Treatment:\n    file: treatment.txt\n    horizontal: true\n";
        let config = ChartConfig::from_yaml_str(doc, "").unwrap();
        let source = MemorySource(HashMap::from([
            (PathBuf::from("iron.txt"), vec![m(2024, 4, 5, 20.0)]),
            (
                PathBuf::from("treatment.txt"),
                vec![m(2024, 1, 1, 1.0), m(2024, 2, 1, 0.0), m(2024, 6, 1, 2.0)],
            ),
        ]));
        let period = Period::new(date(2024, 3, 1), Period::UNBOUNDED_END);

        let composition = compose_with(&source, &config, "G", Some(&period)).unwrap();
        let treatment = composition.marker("Treatment").unwrap();
        assert_eq!(treatment.kind, DrawableKind::Horizontal { anterior: Some(0.0) });
        assert_eq!(treatment.points, vec![m(2024, 6, 1, 2.0)]);
        assert_eq!(composition.first_date(), date(2024, 4, 5));
    }

    #[test]
    fn test_markers_outside_the_period_are_dropped() {
        let period = Period::new(date(2024, 6, 15), date(2024, 12, 31));
        let composition = compose_with(&source(), &config(), "Mixed", Some(&period)).unwrap();

        let names: Vec<_> = composition.markers.iter().map(|m| m.name.as_str()).collect();
        // Treatment has no in-period point; its carried-in state does not revive it
        assert_eq!(names, vec!["Iron"]);
        assert_eq!(composition.dates, vec![date(2024, 7, 1)]);
    }

    #[test]
    fn test_empty_period_is_fatal() {
        let period = Period::new(date(2030, 1, 1), date(2030, 12, 31));
        assert!(matches!(
            compose_with(&source(), &config(), "Mixed", Some(&period)),
            Err(ChartError::NoDataInPeriod)
        ));
    }

    #[test]
    fn test_unknown_marker_is_fatal() {
        let err = compose_with(&source(), &config(), "Ghost", None).unwrap_err();
        assert!(matches!(err, ChartError::UnknownMarker { ref marker, .. } if marker == "Missing"));
    }

    #[test]
    fn test_empty_series_is_fatal() {
        let empty = MemorySource(HashMap::new());
        assert!(matches!(
            compose_with(&empty, &config(), "Mixed", None),
            Err(ChartError::NoData { .. })
        ));
    }

    #[test]
    fn test_anterior_value_scan() {
        let series = [m(2024, 1, 1, 1.0), m(2024, 2, 1, 3.0), m(2024, 6, 1, 2.0)];
        assert_eq!(anterior_value(&series, date(2024, 3, 1)), Some(3.0));
        assert_eq!(anterior_value(&series, date(2024, 1, 1)), None);
        assert_eq!(anterior_value(&series, date(2025, 1, 1)), Some(2.0));
    }

    #[test]
    fn test_anterior_value_is_per_marker() {
        let doc = r#"
Graphs:
  G:
    markers: [A, B]
Markers:
  A:
    file: a.txt
    horizontal: true
  B:
    file: b.txt
    horizontal: true
"#;
        let config = ChartConfig::from_yaml_str(doc, "").unwrap();
        let source = MemorySource(HashMap::from([
            (PathBuf::from("a.txt"), vec![m(2024, 1, 1, 5.0), m(2024, 4, 1, 6.0)]),
            (PathBuf::from("b.txt"), vec![m(2024, 4, 2, 7.0)]),
        ]));
        let period = Period::new(date(2024, 3, 1), Period::UNBOUNDED_END);

        let composition = compose_with(&source, &config, "G", Some(&period)).unwrap();
        assert_eq!(
            composition.marker("B").unwrap().kind,
            DrawableKind::Horizontal { anterior: None }
        );
        assert_eq!(composition.marker("B").unwrap().points.len(), 1);
    }

    #[test]
    fn test_scale_key_tolerance() {
        let a = Scale { top: 10.000_000_000_01 };
        let b = Scale { top: 10.0 };
        assert_ne!(a.key(0.0), b.key(0.0));
        assert_eq!(a.key(1e-9), b.key(1e-9));
        assert_eq!(Scale { top: 0.0 }.key(0.0), Scale { top: -0.0 }.key(0.0));
        assert_eq!(Scale { top: 0.0 }.key(1e-9), Scale { top: -0.0 }.key(1e-9));
    }

    #[test]
    fn test_scale_key_does_not_saturate() {
        let a = Scale { top: 2.5e11 };
        let b = Scale { top: 1.4e10 };
        assert_ne!(a.key(1e-9), b.key(1e-9));
        assert_eq!(Scale { top: 1e300 }.key(1e-9), Scale { top: 1e300 }.key(0.0));
    }
}
