use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use crate::core::model::ClassBlock;

/// Calendar color identifiers handed out in order.
pub const PALETTE: [&str; 11] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11"];

/// Grouping key for titles: compatibility-normalized, lowercased, single spaced.
pub fn normalize_title(title: &str) -> String {
    title
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Gives every block a color, the same one for blocks whose titles normalize
/// equally. New titles claim palette slots in block order, wrapping after the
/// last slot, so the result depends on the order of `blocks`.
pub fn assign_colors(blocks: Vec<ClassBlock>) -> Vec<ClassBlock> {
    let mut by_title: HashMap<String, &'static str> = HashMap::new();
    blocks
        .into_iter()
        .map(|mut block| {
            let next = by_title.len();
            let color = *by_title
                .entry(normalize_title(&block.title))
                .or_insert(PALETTE[next % PALETTE.len()]);
            block.color_id = Some(color.to_string());
            block
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ClockTime, Weekday};
    use pretty_assertions::assert_eq;

    fn block(title: &str) -> ClassBlock {
        ClassBlock {
            id: title.to_string(),
            title: title.to_string(),
            location: String::new(),
            instructors: None,
            day_of_week: Weekday::Monday,
            start_time: ClockTime::from_hm(9, 0).unwrap(),
            end_time: ClockTime::from_hm(10, 0).unwrap(),
            enabled: true,
            color_id: None,
        }
    }

    fn colors(blocks: &[ClassBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.color_id.as_deref().unwrap_or("")).collect()
    }

    #[test]
    fn same_course_shares_a_color() {
        let blocks = assign_colors(vec![block("CS 61B"), block("Math 54"), block("cs 61b  ")]);
        assert_eq!(colors(&blocks), vec!["1", "2", "1"]);
    }

    #[test]
    fn palette_wraps_after_eleven_titles() {
        let titles: Vec<String> = (0..12).map(|i| format!("Course {i}")).collect();
        let blocks = assign_colors(titles.iter().map(|t| block(t)).collect());
        assert_eq!(blocks[10].color_id.as_deref(), Some("11"));
        assert_eq!(blocks[11].color_id.as_deref(), Some("1"));
    }

    #[test]
    fn normalizes_width_and_spacing() {
        assert_eq!(normalize_title("  ＣＳ\t61B "), "cs 61b");
    }
}
