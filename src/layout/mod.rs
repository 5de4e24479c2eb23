pub mod calibrate;
pub mod cluster;
pub mod color;
pub mod extract;
pub mod filter;
pub mod labels;

use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::core::model::{LayoutDebug, ScheduleLayout, TextBox};

pub use calibrate::{DayAxis, TimeAxis};
pub use filter::GridRegion;

pub trait LayoutEngine {
    fn build_layout(&self, boxes: &[TextBox]) -> ScheduleLayout;
}

/// Recovers a weekly schedule from the text boxes of one screenshot.
#[derive(Debug, Clone, Default)]
pub struct GridLayoutEngine {
    config: LayoutConfig,
    debug: bool,
}

impl GridLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            debug: false,
        }
    }

    /// Attach detected labels, headers and clusters to the result.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl LayoutEngine for GridLayoutEngine {
    fn build_layout(&self, boxes: &[TextBox]) -> ScheduleLayout {
        let time_labels = labels::detect_time_labels(boxes);
        let day_headers = labels::detect_day_headers(boxes);
        let mut trace = self.debug.then(|| LayoutDebug {
            time_labels: time_labels.clone(),
            day_headers: day_headers.clone(),
            slot_height: calibrate::slot_height(&time_labels),
            ..LayoutDebug::default()
        });

        if time_labels.is_empty() || day_headers.is_empty() {
            info!(
                time_labels = time_labels.len(),
                day_headers = day_headers.len(),
                "grid axes not found, no classes recovered"
            );
            return ScheduleLayout {
                class_blocks: Vec::new(),
                debug: trace,
            };
        }

        let times = TimeAxis::fit(&time_labels);
        let days = DayAxis::new(day_headers, self.config.day_tolerance_factor);

        let region = GridRegion::from_boxes(boxes);
        let candidates = filter::filter_candidates(boxes, &region, &self.config);
        let clusters = cluster::cluster_event_boxes(&candidates, &days, &self.config);
        debug!(
            candidates = candidates.len(),
            clusters = clusters.len(),
            header_bottom = region.header_bottom,
            gutter_right = region.gutter_right,
            "clustered event candidates"
        );

        let mut blocks: Vec<_> = clusters
            .iter()
            .filter_map(|cluster| extract::extract_block(&cluster.boxes, &times, &days, &self.config))
            .collect();
        blocks.sort_by(|a, b| {
            (a.day_of_week, a.start_time, a.end_time, &a.title)
                .cmp(&(b.day_of_week, b.start_time, b.end_time, &b.title))
        });
        let class_blocks = color::assign_colors(blocks);
        info!(blocks = class_blocks.len(), "recovered class blocks");

        if let Some(trace) = trace.as_mut() {
            trace.day_headers = days.headers().to_vec();
            trace.candidate_count = candidates.len();
            trace.clusters = clusters;
        }

        ScheduleLayout {
            class_blocks,
            debug: trace,
        }
    }
}

/// Runs the default engine over `boxes`.
pub fn build_layout(boxes: &[TextBox]) -> ScheduleLayout {
    GridLayoutEngine::default().build_layout(boxes)
}
