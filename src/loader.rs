//! Series loading from line-oriented text files
//!
//! Marker files hold one `DD/MM/YYYY <value>` pair per line; event files only
//! need the date column; the modification file holds
//! `DD/MM/YYYY <problem> <free text label>`. Blank lines and lines starting
//! with `#` are ignored. A line that fails to parse is logged and skipped;
//! it never aborts the load.

use crate::error::{ChartError, ChartResult};
use crate::types::{Measurement, Modification};
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Parse a day-first `DD/MM/YYYY` date with a four-digit year
pub fn parse_date(token: &str) -> Option<NaiveDate> {
    let year = token.rsplit('/').next()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(token, "%d/%m/%Y").ok()
}

/// Load the measurements of one marker file.
///
/// In event mode every retained line counts one occurrence of its date and
/// the result holds one measurement per distinct date, in order of first
/// appearance, valued with the occurrence count.
pub fn load_measurements(path: &Path, is_event: bool) -> ChartResult<Vec<Measurement>> {
    let file = File::open(path).map_err(|e| ChartError::from_io(path, e))?;
    let measurements = read_measurements(BufReader::new(file), path, is_event)?;
    if measurements.is_empty() {
        return Err(ChartError::NoData {
            path: path.to_path_buf(),
        });
    }
    debug!(file = %path.display(), points = measurements.len(), "measurements loaded");
    Ok(measurements)
}

/// Parse measurements from any reader; `source` only names it in diagnostics
pub fn read_measurements<R: BufRead>(
    reader: R,
    source: &Path,
    is_event: bool,
) -> ChartResult<Vec<Measurement>> {
    let mut measurements = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ChartError::from_io(source, e))?;
        let Some(mut tokens) = content_tokens(&line) else {
            continue;
        };
        let line_no = index + 1;

        let Some(date) = tokens.next().and_then(parse_date) else {
            warn!(file = %source.display(), line = line_no, content = %line.trim(), "invalid date, line skipped");
            continue;
        };

        if is_event {
            measurements.push(Measurement::new(date, 1.0));
            continue;
        }

        match tokens.next().map(str::parse::<f64>) {
            Some(Ok(value)) if value.is_finite() => measurements.push(Measurement::new(date, value)),
            _ => {
                warn!(file = %source.display(), line = line_no, content = %line.trim(), "invalid value, line skipped");
            }
        }
    }

    if is_event {
        measurements = count_events(&measurements);
    }
    Ok(measurements)
}

/// Collapse repeated dates into one measurement per date valued with its count
pub fn count_events(occurrences: &[Measurement]) -> Vec<Measurement> {
    let mut counts: IndexMap<NaiveDate, usize> = IndexMap::new();
    for occurrence in occurrences {
        *counts.entry(occurrence.date).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| Measurement::new(date, count as f64))
        .collect()
}

/// Load the shared modification file
pub fn load_modifications(path: &Path) -> ChartResult<Vec<Modification>> {
    let file = File::open(path).map_err(|e| ChartError::from_io(path, e))?;
    let modifications = read_modifications(BufReader::new(file), path)?;
    debug!(file = %path.display(), count = modifications.len(), "modifications loaded");
    Ok(modifications)
}

pub fn read_modifications<R: BufRead>(reader: R, source: &Path) -> ChartResult<Vec<Modification>> {
    let mut modifications = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ChartError::from_io(source, e))?;
        let Some(mut tokens) = content_tokens(&line) else {
            continue;
        };

        let date = tokens.next().and_then(parse_date);
        let problem = tokens.next();
        let (Some(date), Some(problem)) = (date, problem) else {
            warn!(file = %source.display(), line = index + 1, content = %line.trim(), "invalid modification, line skipped");
            continue;
        };

        modifications.push(Modification {
            date,
            problem: problem.to_string(),
            label: tokens.collect::<Vec<_>>().join(" "),
        });
    }

    Ok(modifications)
}

/// Whitespace tokens of a line, or `None` for blank and comment lines
fn content_tokens(line: &str) -> Option<std::str::SplitWhitespace<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        None
    } else {
        Some(trimmed.split_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn read(text: &str, is_event: bool) -> Vec<Measurement> {
        read_measurements(Cursor::new(text), Path::new("test.txt"), is_event).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("05/03/2025"), Some(date(2025, 3, 5)));
        assert_eq!(parse_date("5/3/2025"), Some(date(2025, 3, 5)));
        assert_eq!(parse_date("05/03/25"), None);
        assert_eq!(parse_date("2025-03-05"), None);
        assert_eq!(parse_date("31/02/2025"), None);
    }

    #[test]
    fn test_skips_comments_blanks_and_bad_lines() {
        let text = "# header\n\n01/01/2025 4.2\n   # indented comment\nnot-a-date 3\n02/01/2025 abc\n03/01/2025\n04/01/2025 5 extra\n";
        assert_eq!(
            read(text, false),
            vec![
                Measurement::new(date(2025, 1, 1), 4.2),
                Measurement::new(date(2025, 1, 4), 5.0),
            ]
        );
    }

    #[test]
    fn test_keeps_file_order() {
        let text = "03/01/2025 1\n01/01/2025 2\n";
        let dates: Vec<_> = read(text, false).iter().map(|m| m.date).collect();
        assert_eq!(dates, vec![date(2025, 1, 3), date(2025, 1, 1)]);
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        assert!(read("01/01/2025 nan\n02/01/2025 inf\n", false).is_empty());
    }

    #[test]
    fn test_event_mode_counts_dates() {
        let text = "01/01/2025\n01/01/2025 ignored\n02/01/2025\n";
        assert_eq!(
            read(text, true),
            vec![
                Measurement::new(date(2025, 1, 1), 2.0),
                Measurement::new(date(2025, 1, 2), 1.0),
            ]
        );
    }

    #[test]
    fn test_event_counts_follow_first_appearance() {
        let text = "05/01/2025\n02/01/2025\n05/01/2025\n";
        assert_eq!(
            read(text, true),
            vec![
                Measurement::new(date(2025, 1, 5), 2.0),
                Measurement::new(date(2025, 1, 2), 1.0),
            ]
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_measurements(Path::new("/nonexistent/marker.txt"), false).unwrap_err();
        assert!(matches!(err, ChartError::FileNotFound { .. }));
    }

    #[test]
    fn test_empty_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "# nothing yet\n").unwrap();

        let err = load_measurements(&path, false).unwrap_err();
        assert!(matches!(err, ChartError::NoData { .. }));
        assert!(err.to_string().contains("empty.txt"));
    }

    #[test]
    fn test_modifications() {
        let text = "10/02/2025 kidney Started   new treatment\n11/02/2025\nbad kidney x\n12/02/2025 heart\n";
        let mods = read_modifications(Cursor::new(text), Path::new("mods.txt")).unwrap();
        assert_eq!(
            mods,
            vec![
                Modification {
                    date: date(2025, 2, 10),
                    problem: "kidney".to_string(),
                    label: "Started new treatment".to_string(),
                },
                Modification {
                    date: date(2025, 2, 12),
                    problem: "heart".to_string(),
                    label: String::new(),
                },
            ]
        );
    }
}
