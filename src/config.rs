use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunable thresholds of the layout engine. All distances are image pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal slack when growing an event cluster.
    pub cluster_margin_x: f32,
    /// Vertical slack when growing an event cluster.
    pub cluster_margin_y: f32,
    /// Boxes whose tops are this close share a visual row.
    pub row_tolerance: f32,
    /// A box further than this from the current line's anchor starts a new line.
    pub line_height: f32,
    pub end_padding_minutes: u16,
    pub max_title_lines: usize,
    pub min_candidate_chars: usize,
    /// A lone box survives clustering only with more characters than this.
    pub min_single_box_chars: usize,
    /// Multiplier on the half gap to the nearest neighboring header.
    pub day_tolerance_factor: f32,
    pub chrome_words: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cluster_margin_x: 50.0,
            cluster_margin_y: 80.0,
            row_tolerance: 20.0,
            line_height: 25.0,
            end_padding_minutes: 45,
            max_title_lines: 3,
            min_candidate_chars: 2,
            min_single_box_chars: 8,
            day_tolerance_factor: 1.5,
            chrome_words: ["schedule", "planner", "help", "sign", "out"]
                .iter()
                .map(|word| word.to_string())
                .collect(),
        }
    }
}

impl LayoutConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).with_context(|| "failed to parse layout config")
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout config: {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = LayoutConfig::from_toml_str(
            "cluster_margin_y = 60.0\nchrome_words = [\"menu\"]\n",
        )
        .unwrap();
        assert_eq!(config.cluster_margin_y, 60.0);
        assert_eq!(config.chrome_words, vec!["menu".to_string()]);
        assert_eq!(config.cluster_margin_x, 50.0);
        assert_eq!(config.end_padding_minutes, 45);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(LayoutConfig::from_toml_str("line_height = \"tall\"").is_err());
    }
}
