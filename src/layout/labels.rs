use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::model::{ClockTime, DayHeader, TextBox, TimeLabel, Weekday};

/// `9`, `9am`, `9:15`, `9:15 pm`; input is already trimmed and lowercased.
static CLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(am|pm)?$").expect("valid regex"));

/// Same shape with the meridiem required. Used to recognize axis labels
/// without swallowing bare numbers that appear inside event text.
static EXPLICIT_CLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?\s*(am|pm)$").expect("valid regex"));

const DAY_VOCABULARY: &[(&str, Weekday)] = &[
    ("monday", Weekday::Monday),
    ("mon", Weekday::Monday),
    ("tuesday", Weekday::Tuesday),
    ("tue", Weekday::Tuesday),
    ("tues", Weekday::Tuesday),
    ("wednesday", Weekday::Wednesday),
    ("wed", Weekday::Wednesday),
    ("thursday", Weekday::Thursday),
    ("thu", Weekday::Thursday),
    ("thur", Weekday::Thursday),
    ("thurs", Weekday::Thursday),
    ("friday", Weekday::Friday),
    ("fri", Weekday::Friday),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

pub fn day_for_text(text: &str) -> Option<Weekday> {
    let key = text.trim().to_lowercase();
    DAY_VOCABULARY
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, day)| *day)
}

pub fn is_explicit_time_label(text: &str) -> bool {
    EXPLICIT_CLOCK_PATTERN.is_match(text.trim())
}

/// Finds clock-time labels on the vertical axis.
///
/// Boxes are visited top to bottom so that a label without a meridiem
/// inherits the last explicit one above it (`11am, 12pm, 1, 2` reads as
/// afternoon). Before any explicit marker, `am` is assumed. Out-of-range
/// hours or minutes are skipped as OCR noise. When the same time is found
/// twice, only the top-most label is kept.
pub fn detect_time_labels(boxes: &[TextBox]) -> Vec<TimeLabel> {
    let mut sorted: Vec<&TextBox> = boxes.iter().collect();
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut current: Option<Meridiem> = None;
    let mut labels = Vec::new();

    for text_box in sorted {
        let raw = text_box.trimmed().to_lowercase();
        let Some(caps) = CLOCK_PATTERN.captures(&raw) else {
            continue;
        };

        let Ok(hour) = caps[1].parse::<u32>() else {
            continue;
        };
        let minute = match caps.get(2) {
            Some(m) => match m.as_str().parse::<u32>() {
                Ok(value) => value,
                Err(_) => continue,
            },
            None => 0,
        };
        if !(1..=12).contains(&hour) || minute >= 60 {
            continue;
        }

        match caps.get(3).map(|m| m.as_str()) {
            Some("am") => current = Some(Meridiem::Am),
            Some("pm") => current = Some(Meridiem::Pm),
            _ => {}
        }

        let hour24 = match current.unwrap_or(Meridiem::Am) {
            Meridiem::Am => hour % 12,
            Meridiem::Pm => hour % 12 + 12,
        };
        let Some(time) = ClockTime::from_hm(hour24, minute) else {
            continue;
        };

        labels.push(TimeLabel {
            time,
            y: text_box.center_y(),
            text: text_box.trimmed().to_string(),
        });
    }

    labels.sort_by(|a, b| a.y.total_cmp(&b.y));
    let mut seen = HashSet::new();
    labels.retain(|label| seen.insert(label.time));
    labels
}

/// Finds weekday column headers, ordered left to right by center.
/// Several headers for the same day are all returned.
pub fn detect_day_headers(boxes: &[TextBox]) -> Vec<DayHeader> {
    let mut headers: Vec<DayHeader> = boxes
        .iter()
        .filter_map(|text_box| {
            day_for_text(&text_box.text).map(|day| DayHeader {
                day,
                x: text_box.center_x(),
                text: text_box.trimmed().to_string(),
            })
        })
        .collect();
    headers.sort_by(|a, b| a.x.total_cmp(&b.x));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn label(text: &str, y: f32) -> TextBox {
        TextBox::new(text, 10.0, y, 40.0, 20.0)
    }

    fn times(labels: &[TimeLabel]) -> Vec<String> {
        labels.iter().map(|l| l.time.to_string()).collect()
    }

    #[test]
    fn normalizes_clock_formats() {
        let labels = detect_time_labels(&[label("9am", 0.0), label("9:15am", 50.0)]);
        assert_eq!(times(&labels), vec!["09:00", "09:15"]);

        let labels = detect_time_labels(&[label("8am", 0.0), label("9:15", 50.0)]);
        assert_eq!(times(&labels), vec!["08:00", "09:15"]);
    }

    #[test]
    fn handles_noon_and_midnight() {
        assert_eq!(times(&detect_time_labels(&[label("12am", 0.0)])), vec!["00:00"]);
        assert_eq!(times(&detect_time_labels(&[label("12pm", 0.0)])), vec!["12:00"]);
        assert_eq!(times(&detect_time_labels(&[label("12:30 PM", 0.0)])), vec!["12:30"]);
    }

    #[test]
    fn inherits_meridiem_from_label_above() {
        let boxes = vec![
            label("2", 300.0),
            label("11am", 0.0),
            label("12pm", 100.0),
            label("1", 200.0),
        ];
        assert_eq!(
            times(&detect_time_labels(&boxes)),
            vec!["11:00", "12:00", "13:00", "14:00"]
        );
    }

    #[test]
    fn defaults_to_morning_without_any_marker() {
        assert_eq!(times(&detect_time_labels(&[label("9", 0.0)])), vec!["09:00"]);
    }

    #[test]
    fn skips_out_of_range_values() {
        let boxes = vec![label("13", 0.0), label("0am", 10.0), label("9:75", 20.0), label("61B", 30.0)];
        assert!(detect_time_labels(&boxes).is_empty());
    }

    #[test]
    fn keeps_topmost_duplicate() {
        let boxes = vec![label("10am", 300.0), label("10am", 100.0)];
        let labels = detect_time_labels(&boxes);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].y, 110.0);
    }

    #[test]
    fn detects_headers_sorted_by_center() {
        let boxes = vec![
            TextBox::new("Wed", 480.0, 0.0, 40.0, 20.0),
            TextBox::new("MONDAY", 70.0, 0.0, 60.0, 20.0),
            TextBox::new(" tues ", 280.0, 0.0, 40.0, 20.0),
            TextBox::new("Weekend", 600.0, 0.0, 40.0, 20.0),
        ];
        let headers = detect_day_headers(&boxes);
        let days: Vec<_> = headers.iter().map(|h| h.day).collect();
        assert_eq!(days, vec![Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday]);
        assert_eq!(headers[0].x, 100.0);
        assert_eq!(headers[1].text, "tues");
    }

    #[test]
    fn explicit_pattern_requires_meridiem() {
        assert!(is_explicit_time_label(" 9 AM "));
        assert!(is_explicit_time_label("10:30pm"));
        assert!(!is_explicit_time_label("10:30"));
        assert!(!is_explicit_time_label("306"));
    }
}
