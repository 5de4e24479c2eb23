pub mod bridge;

pub use bridge::{load_text_boxes, parse_text_boxes, probe_image, OcrBridge};

use anyhow::Result;
use std::path::Path;

use crate::core::model::TextBox;

/// Anything that turns a screenshot into positioned text fragments.
pub trait OcrEngine {
    fn detect(&self, image: &Path) -> Result<Vec<TextBox>>;
}
