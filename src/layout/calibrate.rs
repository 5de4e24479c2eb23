use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::model::{ClockTime, DayHeader, TimeLabel, Weekday};

const FALLBACK_MINUTES: f64 = 9.0 * 60.0;

/// Linear map from a pixel row to minutes since midnight: `minutes = slope * y + intercept`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeAxis {
    pub slope: f64,
    pub intercept: f64,
}

impl TimeAxis {
    pub fn constant(time: ClockTime) -> Self {
        Self {
            slope: 0.0,
            intercept: f64::from(time.minutes()),
        }
    }

    /// Least-squares fit over all labels. Fewer than two labels yield a
    /// constant axis (the single label's time, or 09:00 with none); labels
    /// sharing one row yield slope 0 through the mean time.
    pub fn fit(labels: &[TimeLabel]) -> Self {
        match labels {
            [] => Self {
                slope: 0.0,
                intercept: FALLBACK_MINUTES,
            },
            [only] => Self::constant(only.time),
            _ => {
                let n = labels.len() as f64;
                let (mut sum_y, mut sum_t, mut sum_yy, mut sum_yt) = (0.0, 0.0, 0.0, 0.0);
                for label in labels {
                    let y = f64::from(label.y);
                    let t = f64::from(label.time.minutes());
                    sum_y += y;
                    sum_t += t;
                    sum_yy += y * y;
                    sum_yt += y * t;
                }
                let denom = n * sum_yy - sum_y * sum_y;
                let slope = if denom.abs() < f64::EPSILON {
                    0.0
                } else {
                    (n * sum_yt - sum_y * sum_t) / denom
                };
                let intercept = (sum_t - slope * sum_y) / n;
                debug!(slope, intercept, labels = labels.len(), "fitted time axis");
                Self { slope, intercept }
            }
        }
    }

    pub fn minutes_at(&self, y: f32) -> f64 {
        self.slope * f64::from(y) + self.intercept
    }

    pub fn time_at(&self, y: f32) -> ClockTime {
        ClockTime::from_minutes_clamped(self.minutes_at(y))
    }
}

/// Nearest-header column lookup with a tolerance band around each header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayAxis {
    headers: Vec<DayHeader>,
    tolerance_factor: f32,
}

impl DayAxis {
    /// Keeps one header per weekday: the leftmost occurrence wins, later
    /// repeats of the same day are discarded.
    pub fn new(mut headers: Vec<DayHeader>, tolerance_factor: f32) -> Self {
        headers.sort_by(|a, b| a.x.total_cmp(&b.x));
        let mut seen = BTreeSet::new();
        headers.retain(|header| seen.insert(header.day));
        Self {
            headers,
            tolerance_factor,
        }
    }

    /// Headers actually used for lookup, left to right.
    pub fn headers(&self) -> &[DayHeader] {
        &self.headers
    }

    /// Resolves a pixel column to the closest header's day. A hit must lie
    /// within `tolerance_factor` times the half gap to the nearest neighbor
    /// header; a lone header accepts every column. On equal distance the
    /// header that comes first in left-to-right order wins.
    pub fn day_at(&self, x: f32) -> Option<Weekday> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, header) in self.headers.iter().enumerate() {
            let distance = (x - header.x).abs();
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((idx, distance));
            }
        }
        let (idx, distance) = best?;

        let here = self.headers[idx].x;
        let mut half_gap = f32::INFINITY;
        if idx > 0 {
            half_gap = half_gap.min((here - self.headers[idx - 1].x) / 2.0);
        }
        if let Some(next) = self.headers.get(idx + 1) {
            half_gap = half_gap.min((next.x - here) / 2.0);
        }

        (distance <= half_gap * self.tolerance_factor).then_some(self.headers[idx].day)
    }
}

/// Mean spacing between consecutive labels, if there are at least two.
pub fn slot_height(labels: &[TimeLabel]) -> Option<f32> {
    if labels.len() < 2 {
        return None;
    }
    let total: f32 = labels.windows(2).map(|pair| pair[1].y - pair[0].y).sum();
    Some(total / (labels.len() - 1) as f32)
}
