use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::geometry::BBox;

const MINUTES_PER_DAY: i64 = 24 * 60;
const LAST_HALF_HOUR: u16 = 23 * 60 + 30;

/// One recognized text fragment as delivered by the OCR engine.
/// `x`/`y` is the top-left corner in image pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextBox {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TextBox {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
        }
    }

    pub fn bbox(&self) -> BBox {
        BBox::from_origin(self.x, self.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "MO")]
    Monday,
    #[serde(rename = "TU")]
    Tuesday,
    #[serde(rename = "WE")]
    Wednesday,
    #[serde(rename = "TH")]
    Thursday,
    #[serde(rename = "FR")]
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Weekday::Monday => "MO",
            Weekday::Tuesday => "TU",
            Weekday::Wednesday => "WE",
            Weekday::Thursday => "TH",
            Weekday::Friday => "FR",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Time of day at minute resolution, always inside `00:00..=23:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self((hour * 60 + minute) as u16))
    }

    /// Builds a time from a possibly fractional or out-of-range minute count.
    /// Fractions are floored; values outside the day are clamped into it.
    pub fn from_minutes_clamped(minutes: f64) -> Self {
        if !minutes.is_finite() {
            return Self(0);
        }
        // float noise just under a whole minute still counts as that minute
        let whole = ((minutes + 1e-6).floor() as i64).clamp(0, MINUTES_PER_DAY - 1);
        Self(whole as u16)
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    /// Saturates at 23:59 instead of wrapping past midnight.
    pub fn add_minutes(&self, minutes: u16) -> Self {
        Self::from_minutes_clamped(f64::from(self.0) + f64::from(minutes))
    }

    /// Nearest half hour, halfway points round up; never later than 23:30.
    pub fn round_to_half_hour(&self) -> Self {
        let rounded = ((self.0 + 15) / 30) * 30;
        Self(rounded.min(LAST_HALF_HOUR))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| anyhow!("expected HH:MM, got {s:?}"))?;
        let hour: u32 = h.parse().map_err(|_| anyhow!("invalid hour in {s:?}"))?;
        let minute: u32 = m.parse().map_err(|_| anyhow!("invalid minute in {s:?}"))?;
        ClockTime::from_hm(hour, minute).ok_or_else(|| anyhow!("time out of range: {s:?}"))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeLabel {
    pub time: ClockTime,
    /// Vertical center of the source box.
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayHeader {
    pub day: Weekday,
    /// Horizontal center of the source box.
    pub x: f32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassBlock {
    pub id: String,
    pub title: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructors: Option<String>,
    pub day_of_week: Weekday,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// Text boxes believed to belong to one meeting, all from one weekday column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cluster {
    pub day: Weekday,
    pub bbox: BBox,
    pub boxes: Vec<TextBox>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDebug {
    pub time_labels: Vec<TimeLabel>,
    pub day_headers: Vec<DayHeader>,
    /// Mean vertical distance between consecutive time labels.
    pub slot_height: Option<f32>,
    pub candidate_count: usize,
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleLayout {
    pub class_blocks: Vec<ClassBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<LayoutDebug>,
}

impl ScheduleLayout {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.class_blocks.is_empty()
    }

    pub fn enabled_blocks(&self) -> impl Iterator<Item = &ClassBlock> {
        self.class_blocks.iter().filter(|block| block.enabled)
    }
}

/// A layout together with the screenshot it was recovered from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDocument {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub layout: ScheduleLayout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clock_time_formats_and_parses() {
        let t = ClockTime::from_hm(9, 5).unwrap();
        assert_eq!(t.to_string(), "09:05");
        assert_eq!("09:05".parse::<ClockTime>().unwrap(), t);
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("noon".parse::<ClockTime>().is_err());
    }

    #[test]
    fn rounds_to_nearest_half_hour() {
        let round = |h, m| ClockTime::from_hm(h, m).unwrap().round_to_half_hour().to_string();
        assert_eq!(round(10, 14), "10:00");
        assert_eq!(round(10, 15), "10:30");
        assert_eq!(round(10, 44), "10:30");
        assert_eq!(round(10, 45), "11:00");
        assert_eq!(round(23, 50), "23:30");
    }

    #[test]
    fn arithmetic_saturates_inside_the_day() {
        let late = ClockTime::from_hm(23, 40).unwrap();
        assert_eq!(late.add_minutes(45).to_string(), "23:59");
        assert_eq!(ClockTime::from_minutes_clamped(-30.0).to_string(), "00:00");
        assert_eq!(ClockTime::from_minutes_clamped(601.9).to_string(), "10:01");
        assert_eq!(ClockTime::from_minutes_clamped(f64::NAN).to_string(), "00:00");
    }

    #[test]
    fn class_block_serializes_with_camel_case_keys() {
        let block = ClassBlock {
            id: "TU-10:00-abc".to_string(),
            title: "CS 61B".to_string(),
            location: "Soda 306".to_string(),
            instructors: None,
            day_of_week: Weekday::Tuesday,
            start_time: ClockTime::from_hm(10, 0).unwrap(),
            end_time: ClockTime::from_hm(11, 30).unwrap(),
            enabled: true,
            color_id: Some("1".to_string()),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["dayOfWeek"], "TU");
        assert_eq!(json["startTime"], "10:00");
        assert_eq!(json["endTime"], "11:30");
        assert_eq!(json["colorId"], "1");
        assert!(json.get("instructors").is_none());

        let back: ClassBlock = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn enabled_blocks_skips_disabled_entries() {
        let mut block = ClassBlock {
            id: "MO-09:00-x".to_string(),
            title: "Math 1A".to_string(),
            location: String::new(),
            instructors: None,
            day_of_week: Weekday::Monday,
            start_time: ClockTime::from_hm(9, 0).unwrap(),
            end_time: ClockTime::from_hm(10, 0).unwrap(),
            enabled: true,
            color_id: None,
        };
        let enabled = block.clone();
        block.enabled = false;
        let layout = ScheduleLayout {
            class_blocks: vec![enabled, block],
            debug: None,
        };
        assert_eq!(layout.enabled_blocks().count(), 1);
    }
}
