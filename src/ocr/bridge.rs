use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::core::model::TextBox;
use crate::ocr::OcrEngine;

/// Token as printed by the OCR bridge script: corner coordinates `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrToken {
    pub text: String,
    pub bbox: [f32; 4],
}

impl From<OcrToken> for TextBox {
    fn from(token: OcrToken) -> Self {
        let [x0, y0, x1, y1] = token.bbox;
        TextBox::new(token.text, x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum BoxRecord {
    Box(TextBox),
    Token(OcrToken),
}

impl From<BoxRecord> for TextBox {
    fn from(record: BoxRecord) -> Self {
        match record {
            BoxRecord::Box(mut text_box) => {
                text_box.width = text_box.width.max(0.0);
                text_box.height = text_box.height.max(0.0);
                text_box
            }
            BoxRecord::Token(token) => token.into(),
        }
    }
}

/// Parses a JSON array whose entries are either `{text, x, y, width, height}`
/// boxes or `{text, bbox: [x0, y0, x1, y1]}` tokens.
pub fn parse_text_boxes(json: &str) -> Result<Vec<TextBox>> {
    let records: Vec<BoxRecord> =
        serde_json::from_str(json).with_context(|| "failed to parse OCR box JSON")?;
    Ok(records.into_iter().map(TextBox::from).collect())
}

pub fn load_text_boxes(path: &Path) -> Result<Vec<TextBox>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read OCR boxes: {}", path.display()))?;
    parse_text_boxes(&raw).with_context(|| format!("in {}", path.display()))
}

/// Pixel size of a screenshot, read from its header.
pub fn probe_image(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path)
        .with_context(|| format!("failed to read image dimensions: {}", path.display()))
}

#[derive(Debug, Clone)]
pub struct OcrBridge {
    script_path: PathBuf,
}

impl Default for OcrBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBridge {
    pub fn new() -> Self {
        Self {
            script_path: PathBuf::from("ocr/bridge/ocr_bridge.py"),
        }
    }

    pub fn with_script(mut self, script_path: PathBuf) -> Self {
        self.script_path = script_path;
        self
    }

    pub fn run(&self, image_path: &Path) -> Result<Vec<TextBox>> {
        info!(image = %image_path.display(), script = %self.script_path.display(), "running OCR bridge");
        let output = Command::new("python3")
            .arg(&self.script_path)
            .arg("--image")
            .arg(image_path)
            .output()
            .with_context(|| "failed to invoke python OCR bridge")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("OCR bridge failed: {stderr}");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let boxes = parse_text_boxes(&stdout)?;
        debug!(boxes = boxes.len(), "OCR bridge returned");
        Ok(boxes)
    }
}

impl OcrEngine for OcrBridge {
    fn detect(&self, image: &Path) -> Result<Vec<TextBox>> {
        self.run(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_boxes_and_tokens() {
        let json = r#"[
            {"text": "Mon", "x": 90, "y": 10, "width": 20, "height": 12},
            {"text": "CS 61B", "bbox": [170, 100, 230, 120], "confidence": 0.93},
            {"text": "skewed", "bbox": [50, 50, 40, 60]}
        ]"#;
        let boxes = parse_text_boxes(json).unwrap();
        assert_eq!(boxes[0], TextBox::new("Mon", 90.0, 10.0, 20.0, 12.0));
        assert_eq!(boxes[1], TextBox::new("CS 61B", 170.0, 100.0, 60.0, 20.0));
        assert_eq!(boxes[2].width, 0.0);
        assert_eq!(boxes[2].height, 10.0);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_text_boxes("{\"text\": 1}").is_err());
        assert!(parse_text_boxes("[{\"x\": 1}]").is_err());
    }

    #[test]
    fn loads_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("boxes.json");
        fs::write(&path, r#"[{"text": "Tue", "x": 1, "y": 2, "width": 3, "height": 4}]"#)?;
        let boxes = load_text_boxes(&path)?;
        assert_eq!(boxes.len(), 1);
        assert!(load_text_boxes(&dir.path().join("missing.json")).is_err());
        Ok(())
    }
}
