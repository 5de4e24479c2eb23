use crate::config::LayoutConfig;
use crate::core::model::TextBox;
use crate::layout::labels::{day_for_text, is_explicit_time_label};

/// The part of the screenshot that holds meetings: below the weekday header
/// row and right of the time-label gutter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRegion {
    pub header_bottom: f32,
    pub gutter_right: f32,
}

impl GridRegion {
    pub fn from_boxes(boxes: &[TextBox]) -> Self {
        let header_bottom = boxes
            .iter()
            .filter(|b| day_for_text(&b.text).is_some())
            .map(TextBox::bottom)
            .fold(0.0_f32, f32::max);
        let gutter_right = boxes
            .iter()
            .filter(|b| is_explicit_time_label(&b.text))
            .map(TextBox::right)
            .fold(0.0_f32, f32::max);
        Self {
            header_bottom,
            gutter_right,
        }
    }

    pub fn contains(&self, text_box: &TextBox) -> bool {
        text_box.y >= self.header_bottom && text_box.x >= self.gutter_right
    }
}

fn is_chrome(text: &str, chrome_words: &[String]) -> bool {
    chrome_words
        .iter()
        .any(|word| !word.is_empty() && text.contains(word.to_lowercase().as_str()))
}

/// Keeps the boxes that may belong to a meeting, dropping axis labels,
/// page chrome, anything outside the grid region and very short noise.
pub fn filter_candidates<'a>(
    boxes: &'a [TextBox],
    region: &GridRegion,
    config: &LayoutConfig,
) -> Vec<&'a TextBox> {
    boxes
        .iter()
        .filter(|text_box| {
            let text = text_box.trimmed().to_lowercase();
            !is_explicit_time_label(&text)
                && day_for_text(&text).is_none()
                && !is_chrome(&text, &config.chrome_words)
                && region.contains(text_box)
                && text.chars().count() >= config.min_candidate_chars
        })
        .collect()
}
