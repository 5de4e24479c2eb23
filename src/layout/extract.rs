use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::LayoutConfig;
use crate::core::model::{ClassBlock, TextBox};
use crate::layout::calibrate::{DayAxis, TimeAxis};

/// Building name followed by a room number, e.g. `Soda 306`.
static LOCATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+\s+\d+$").expect("valid regex"));
static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,}$").expect("valid regex"));
static BARE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").expect("valid regex"));
static SPACED_HYPHEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+-\s+|\s+-|-\s+").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static TIME_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d{1,2}:\d{2}\s*(am|pm)?$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct BlockFields {
    pub title: String,
    pub location: String,
    pub instructors: Option<String>,
}

/// Turns one cluster into a class block, or `None` when the cluster has no
/// usable column, title or time span.
pub fn extract_block(
    cluster: &[TextBox],
    times: &TimeAxis,
    days: &DayAxis,
    config: &LayoutConfig,
) -> Option<ClassBlock> {
    let mut sorted: Vec<&TextBox> = cluster.iter().collect();
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
    let first = sorted.first()?;
    let day = days.day_at(first.center_x())?;

    let top = sorted.iter().map(|b| b.y).fold(f32::INFINITY, f32::min);
    let bottom = sorted.iter().map(|b| b.bottom()).fold(f32::NEG_INFINITY, f32::max);

    let raw_start = times.time_at(top);
    let raw_end = times.time_at(bottom).add_minutes(config.end_padding_minutes);
    let start_time = raw_start.round_to_half_hour();
    let end_time = raw_end.round_to_half_hour();

    let lines = reconstruct_lines(&sorted, config.row_tolerance, config.line_height);
    let fields = split_fields(&lines, config.max_title_lines)?;
    if TIME_ONLY.is_match(&fields.title) {
        debug!(title = %fields.title, "dropping cluster whose title is a time");
        return None;
    }

    debug!(
        title = %fields.title,
        top,
        bottom,
        %raw_start,
        %raw_end,
        %start_time,
        %end_time,
        "extracted class block"
    );

    if end_time <= start_time {
        warn!(
            title = %fields.title,
            %start_time,
            %end_time,
            "dropping block without a positive duration"
        );
        return None;
    }

    let suffix = Uuid::new_v4().simple().to_string();
    Some(ClassBlock {
        id: format!("{day}-{start_time}-{}", &suffix[..9]),
        title: fields.title,
        location: fields.location,
        instructors: fields.instructors,
        day_of_week: day,
        start_time,
        end_time,
        enabled: true,
        color_id: None,
    })
}

/// Rebuilds text lines from boxes already sorted by `y`.
///
/// Boxes whose tops lie within `row_tolerance` of a row's first box share a
/// visual row and are read left to right. A new line starts when a box sits
/// more than `line_height` away from the current line's first box.
pub fn reconstruct_lines(sorted: &[&TextBox], row_tolerance: f32, line_height: f32) -> Vec<String> {
    let mut rows: Vec<Vec<&TextBox>> = Vec::new();
    for &text_box in sorted {
        let new_row = rows
            .last()
            .map_or(true, |row| (text_box.y - row[0].y).abs() >= row_tolerance);
        if new_row {
            rows.push(vec![text_box]);
        } else if let Some(row) = rows.last_mut() {
            row.push(text_box);
        }
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut anchor: Option<f32> = None;

    for text_box in rows.into_iter().flatten() {
        let text = text_box.trimmed();
        if text.is_empty() {
            continue;
        }
        match anchor {
            Some(y) if (text_box.y - y).abs() <= line_height => {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(text);
            }
            _ => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current.push_str(text);
                anchor = Some(text_box.y);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn is_location(line: &str) -> bool {
    LOCATION_PATTERN.is_match(line)
}

fn is_room_number(line: &str) -> bool {
    BARE_NUMBER.is_match(line)
}

fn starts_split_location(lines: &[String], idx: usize) -> bool {
    BARE_WORD.is_match(&lines[idx]) && lines.get(idx + 1).is_some_and(|next| is_room_number(next))
}

fn normalize_title(raw: &str) -> String {
    let joined = SPACED_HYPHEN.replace_all(raw, "-");
    WHITESPACE.replace_all(&joined, " ").trim().to_string()
}

/// Splits reconstructed lines into title, location and instructors.
///
/// The first line always opens the title, which then takes up to
/// `max_title_lines` lines and stops early at anything that looks like a
/// room: `Building 123`, a bare number, or a building word directly above a
/// bare number. The first room found after
/// the title is the location; without one, the line after the title is used.
/// Remaining lines become a comma-separated instructor list.
pub fn split_fields(lines: &[String], max_title_lines: usize) -> Option<BlockFields> {
    if lines.is_empty() {
        return None;
    }

    let mut title_end = 0;
    for (idx, line) in lines.iter().enumerate().take(max_title_lines.max(1)) {
        if idx > 0
            && (is_location(line) || is_room_number(line) || starts_split_location(lines, idx))
        {
            break;
        }
        title_end = idx + 1;
    }

    let title = normalize_title(&lines[..title_end].join(" "));
    if title.is_empty() {
        return None;
    }

    let mut location = String::new();
    let mut rest_start = title_end;
    for idx in title_end..lines.len() {
        if is_location(&lines[idx]) {
            location = lines[idx].clone();
            rest_start = idx + 1;
            break;
        }
        if is_room_number(&lines[idx]) && idx > title_end && BARE_WORD.is_match(&lines[idx - 1]) {
            location = format!("{} {}", lines[idx - 1], lines[idx]);
            rest_start = idx + 1;
            break;
        }
    }
    if location.is_empty() && lines.len() > title_end {
        location = lines[title_end].clone();
        rest_start = title_end + 1;
    }

    let instructors = lines[rest_start.min(lines.len())..]
        .iter()
        .filter(|line| !line.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    Some(BlockFields {
        title,
        location,
        instructors: (!instructors.is_empty()).then_some(instructors),
    })
}
