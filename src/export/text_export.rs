use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::{ClassBlock, ScheduleDocument, Weekday};
use crate::export::Exporter;

#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn format_block(block: &ClassBlock) -> String {
        let mut line = format!("  {}-{}  {}", block.start_time, block.end_time, block.title);
        if !block.location.is_empty() {
            line.push_str(&format!(" @ {}", block.location));
        }
        if let Some(instructors) = &block.instructors {
            line.push_str(&format!(" ({instructors})"));
        }
        if !block.enabled {
            line.push_str(" [disabled]");
        }
        line
    }

    pub fn render(document: &ScheduleDocument) -> String {
        let mut text = format!("=== {} ===\n", document.source);
        if document.layout.is_empty() {
            text.push_str("\nNo classes recognized.\n");
            return text;
        }
        for day in Weekday::ALL {
            let blocks: Vec<&ClassBlock> = document
                .layout
                .class_blocks
                .iter()
                .filter(|block| block.day_of_week == day)
                .collect();
            if blocks.is_empty() {
                continue;
            }
            text.push_str(&format!("\n{}\n", day.name()));
            for block in blocks {
                text.push_str(&Self::format_block(block));
                text.push('\n');
            }
        }
        text
    }
}

impl Exporter for TextExporter {
    fn export(&self, document: &ScheduleDocument) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join("schedule.txt"), Self::render(document))?;
        Ok(())
    }
}
