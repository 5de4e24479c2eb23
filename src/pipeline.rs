use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::LayoutConfig;
use crate::core::model::{ScheduleDocument, TextBox};
use crate::export::html_debug_export::HtmlDebugExporter;
use crate::export::json_export::JsonExporter;
use crate::export::text_export::TextExporter;
use crate::export::Exporter;
use crate::layout::{GridLayoutEngine, LayoutEngine};
use crate::ocr::{load_text_boxes, probe_image, OcrEngine};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub layout: LayoutConfig,
    pub debug: bool,
}

impl PipelineConfig {
    pub fn new(input: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            output,
            layout: LayoutConfig::default(),
            debug: false,
        }
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn engine(&self) -> GridLayoutEngine {
        GridLayoutEngine::new(self.layout.clone()).with_debug(self.debug)
    }
}

fn assemble(config: &PipelineConfig, boxes: &[TextBox], size: Option<(u32, u32)>) -> ScheduleDocument {
    let layout = config.engine().build_layout(boxes);
    ScheduleDocument {
        source: config.input.display().to_string(),
        width: size.map(|(w, _)| w),
        height: size.map(|(_, h)| h),
        layout,
    }
}

/// Builds a schedule from a JSON file of already recognized text boxes.
pub fn build_schedule(config: &PipelineConfig) -> Result<ScheduleDocument> {
    let boxes = load_text_boxes(&config.input)?;
    info!(boxes = boxes.len(), input = %config.input.display(), "loaded OCR boxes");
    Ok(assemble(config, &boxes, None))
}

/// Runs OCR on a screenshot and builds a schedule from its text boxes.
pub fn scan_schedule(config: &PipelineConfig, ocr: &impl OcrEngine) -> Result<ScheduleDocument> {
    let size = probe_image(&config.input)?;
    let boxes = ocr
        .detect(&config.input)
        .with_context(|| format!("OCR failed for {}", config.input.display()))?;
    info!(boxes = boxes.len(), width = size.0, height = size.1, "recognized screenshot text");
    Ok(assemble(config, &boxes, Some(size)))
}

pub fn export_schedule(document: &ScheduleDocument, output: &Path, debug: bool) -> Result<()> {
    let json_exporter = JsonExporter::new(output.to_path_buf());
    json_exporter.export(document)?;

    let text_exporter = TextExporter::new(output.to_path_buf());
    text_exporter.export(document)?;

    if debug {
        let html_exporter = HtmlDebugExporter::new(output.join("debug"));
        html_exporter.export(document)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::core::model::ScheduleLayout;

    struct FixedOcr(Vec<TextBox>);

    impl OcrEngine for FixedOcr {
        fn detect(&self, _image: &Path) -> Result<Vec<TextBox>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn builds_from_box_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("boxes.json");
        fs::write(
            &input,
            r#"[
                {"text": "Mon", "x": 80, "y": 10, "width": 40, "height": 20},
                {"text": "Tue", "x": 180, "y": 10, "width": 40, "height": 20},
                {"text": "9am", "x": 0, "y": 40, "width": 40, "height": 20},
                {"text": "10am", "x": 0, "y": 90, "width": 40, "height": 20},
                {"text": "Philosophy 25A", "bbox": [170, 90, 250, 110]}
            ]"#,
        )?;
        let config = PipelineConfig::new(input, dir.path().join("out")).with_debug(true);
        let document = build_schedule(&config)?;
        assert_eq!(document.layout.class_blocks.len(), 1);
        assert_eq!(document.layout.class_blocks[0].title, "Philosophy 25A");
        assert!(document.layout.debug.is_some());
        assert!(document.width.is_none());
        Ok(())
    }

    #[test]
    fn scan_requires_a_readable_image() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::new(dir.path().join("missing.png"), dir.path().join("out"));
        assert!(scan_schedule(&config, &FixedOcr(vec![])).is_err());
    }

    #[test]
    fn scan_records_image_size() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("week.png");
        image::RgbImage::new(640, 480).save(&input)?;

        let ocr = FixedOcr(vec![TextBox::new("Mon", 80.0, 10.0, 40.0, 20.0)]);
        let config = PipelineConfig::new(input, dir.path().join("out"));
        let document = scan_schedule(&config, &ocr)?;
        assert_eq!((document.width, document.height), (Some(640), Some(480)));
        assert!(document.layout.is_empty());
        Ok(())
    }

    #[test]
    fn export_writes_outputs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let document = ScheduleDocument {
            source: "week.png".to_string(),
            width: None,
            height: None,
            layout: ScheduleLayout::empty(),
        };

        export_schedule(&document, dir.path(), true)?;

        assert!(dir.path().join("schedule.json").exists());
        assert!(dir.path().join("schedule.txt").exists());
        assert!(dir.path().join("debug/layout.html").exists());
        Ok(())
    }
}
