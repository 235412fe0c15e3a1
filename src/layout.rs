//! Value-label placement and X-axis ticks

use crate::compositor::{DrawableKind, DrawableMarker};
use crate::period::{Period, monday_of};
use chrono::{Datelike, Duration, NaiveDate};
use health_charts_visualization::{LabelAnchor, TimeTick, ValueLabel};

/// Longest period, in days, that still gets weekly ticks
pub const WEEKLY_TICKS_MAX_DAYS: i64 = 365;

/// Label text of a value: shortest round-trip form, always with a decimal part
pub fn format_value(value: f64) -> String {
    format!("{value:?}")
}

/// Value labels of one marker.
///
/// A connected point whose successor is lower gets its label above, any other
/// point gets it below. Event markers and zero values get no label.
pub fn value_labels(marker: &DrawableMarker, axis: usize, line_color: &str) -> Vec<ValueLabel> {
    if marker.kind == DrawableKind::Event {
        return Vec::new();
    }

    let color = marker.label_color.as_deref().unwrap_or(line_color);
    let points = &marker.points;
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| point.value != 0.0)
        .map(|(i, point)| {
            let falls_next = matches!(marker.kind, DrawableKind::Connected)
                && points.get(i + 1).is_some_and(|next| next.value < point.value);
            let (anchor, value) = if falls_next {
                (LabelAnchor::Above, point.value + marker.label_offset)
            } else {
                (LabelAnchor::Below, point.value - marker.label_offset)
            };
            ValueLabel {
                date: point.date,
                value,
                axis,
                text: format_value(point.value),
                color: color.to_string(),
                anchor,
            }
        })
        .collect()
}

/// Tick dates for the X axis.
///
/// With a period whose plotted span is at most a year, one tick per Monday
/// from the week of the first date to the week of the last; otherwise one
/// tick per plotted date.
pub fn tick_dates(dates: &[NaiveDate], period: Option<&Period>) -> Vec<NaiveDate> {
    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return Vec::new();
    };

    if period.is_some() && (last - first).num_days() <= WEEKLY_TICKS_MAX_DAYS {
        let last_monday = monday_of(last);
        let mut ticks = Vec::new();
        let mut current = monday_of(first);
        while current <= last_monday {
            ticks.push(current);
            current += Duration::days(7);
        }
        ticks
    } else {
        dates.to_vec()
    }
}

/// Tick labels: the full date when the year differs from the previous tick,
/// month and day otherwise
pub fn tick_labels(ticks: &[NaiveDate]) -> Vec<String> {
    let mut previous_year = None;
    ticks
        .iter()
        .map(|tick| {
            if previous_year == Some(tick.year()) {
                tick.format("%m-%d").to_string()
            } else {
                previous_year = Some(tick.year());
                tick.format("%Y-%m-%d").to_string()
            }
        })
        .collect()
}

/// Labelled ticks for the plotted dates.
///
/// Ticks outside the plotted range are dropped before labelling, so the
/// first visible tick always shows its year.
pub fn time_ticks(dates: &[NaiveDate], period: Option<&Period>) -> Vec<TimeTick> {
    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return Vec::new();
    };
    let ticks: Vec<NaiveDate> = tick_dates(dates, period)
        .into_iter()
        .filter(|tick| first <= *tick && *tick <= last)
        .collect();
    let labels = tick_labels(&ticks);
    ticks
        .into_iter()
        .zip(labels)
        .map(|(date, label)| TimeTick { date, label })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::Scale;
    use crate::types::{Measurement, TargetPolicy};
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn marker(kind: DrawableKind, values: &[f64]) -> DrawableMarker {
        DrawableMarker {
            name: "M".to_string(),
            kind,
            color: None,
            label_color: None,
            scale: Scale { top: 10.0 },
            label_offset: 0.5,
            points: values
                .iter()
                .enumerate()
                .map(|(i, &v)| Measurement::new(date(2025, 1, 1 + i as u32), v))
                .collect(),
            normal_range: None,
            target: TargetPolicy::None,
        }
    }

    #[test]
    fn test_connected_labels_avoid_the_line() {
        let labels = value_labels(&marker(DrawableKind::Connected, &[5.0, 3.0, 3.0, 4.0]), 1, "red");
        let anchors: Vec<_> = labels.iter().map(|l| l.anchor).collect();
        assert_eq!(
            anchors,
            vec![
                LabelAnchor::Above,
                LabelAnchor::Below,
                LabelAnchor::Below,
                LabelAnchor::Below
            ]
        );
        assert_relative_eq!(labels[0].value, 5.5);
        assert_relative_eq!(labels[1].value, 2.5);
        assert_eq!(labels[0].text, "5.0");
        assert!(labels.iter().all(|l| l.axis == 1 && l.color == "red"));
    }

    #[test]
    fn test_horizontal_labels_are_below() {
        let labels = value_labels(
            &marker(DrawableKind::Horizontal { anterior: None }, &[5.0, 3.0]),
            0,
            "red",
        );
        assert!(labels.iter().all(|l| l.anchor == LabelAnchor::Below));
        assert_relative_eq!(labels[0].value, 4.5);
    }

    #[test]
    fn test_no_labels_for_zeros_and_events() {
        let labels = value_labels(&marker(DrawableKind::Connected, &[0.0, 2.0]), 0, "red");
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].date, date(2025, 1, 2));

        assert!(value_labels(&marker(DrawableKind::Event, &[1.0, 2.0]), 0, "red").is_empty());
    }

    #[test]
    fn test_label_color_override() {
        let mut m = marker(DrawableKind::Connected, &[1.0]);
        m.label_color = Some("black".to_string());
        assert_eq!(value_labels(&m, 0, "red")[0].color, "black");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(5.0), "5.0");
        assert_eq!(format_value(12.25), "12.25");
        assert_eq!(format_value(0.1), "0.1");
    }

    #[test]
    fn test_year_elision() {
        let labels = tick_labels(&[date(2024, 12, 30), date(2025, 1, 2), date(2025, 1, 15)]);
        assert_eq!(labels, vec!["2024-12-30", "2025-01-02", "01-15"]);
    }

    #[test]
    fn test_data_ticks_without_period() {
        let dates = [date(2025, 1, 2), date(2025, 1, 9)];
        assert_eq!(tick_dates(&dates, None), dates.to_vec());
    }

    #[test]
    fn test_weekly_ticks_within_a_year() {
        let period = Period::new(date(2025, 1, 1), date(2025, 1, 31));
        // Wednesday 2025-01-01 to Friday 2025-01-24
        let dates = [date(2025, 1, 1), date(2025, 1, 24)];
        assert_eq!(
            tick_dates(&dates, Some(&period)),
            vec![
                date(2024, 12, 30),
                date(2025, 1, 6),
                date(2025, 1, 13),
                date(2025, 1, 20)
            ]
        );
    }

    #[test]
    fn test_long_period_uses_data_ticks() {
        let period = Period::new(date(2023, 1, 1), date(2025, 12, 31));
        let dates = [date(2023, 1, 2), date(2025, 1, 9)];
        assert_eq!(tick_dates(&dates, Some(&period)), dates.to_vec());
    }

    #[test]
    fn test_hidden_weekly_tick_does_not_take_the_year() {
        let period = Period::new(date(2025, 3, 1), date(2025, 3, 31));
        // Wednesday 2025-03-05 to Monday 2025-03-24; the Monday 03-03 is not plotted
        let ticks = time_ticks(&[date(2025, 3, 5), date(2025, 3, 24)], Some(&period));
        let labels: Vec<_> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["2025-03-10", "03-17", "03-24"]);
    }

    #[test]
    fn test_time_ticks_pair_labels() {
        let ticks = time_ticks(&[date(2025, 3, 4), date(2025, 3, 8)], None);
        assert_eq!(ticks[0].label, "2025-03-04");
        assert_eq!(ticks[1].label, "03-08");
        assert!(time_ticks(&[], None).is_empty());
    }
}
