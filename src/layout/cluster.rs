use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::core::model::{Cluster, TextBox, Weekday};
use crate::layout::calibrate::DayAxis;

/// Groups event candidates into per-meeting clusters.
///
/// Every candidate is first assigned to a weekday column by its horizontal
/// center; candidates outside every column are dropped. Inside a column a
/// cluster starts from the first unused box and keeps absorbing boxes that
/// touch its bounding rectangle grown by the configured margins, until a
/// full pass adds nothing. Columns are visited Monday first, boxes in input
/// order, so the same input always yields the same clusters.
pub fn cluster_event_boxes(
    candidates: &[&TextBox],
    days: &DayAxis,
    config: &LayoutConfig,
) -> Vec<Cluster> {
    let mut by_day: BTreeMap<Weekday, Vec<&TextBox>> = BTreeMap::new();
    for &text_box in candidates {
        if let Some(day) = days.day_at(text_box.center_x()) {
            by_day.entry(day).or_default().push(text_box);
        }
    }

    let mut clusters = Vec::new();
    for (day, column) in by_day {
        clusters.extend(
            grow_column(&column, config)
                .into_iter()
                .filter(|members| keep_cluster(members, config))
                .map(|members| {
                    let bbox = members
                        .iter()
                        .skip(1)
                        .fold(members[0].bbox(), |acc, b| acc.union(&b.bbox()));
                    Cluster {
                        day,
                        bbox,
                        boxes: members.into_iter().cloned().collect(),
                    }
                }),
        );
    }
    clusters
}

fn grow_column<'a>(column: &[&'a TextBox], config: &LayoutConfig) -> Vec<Vec<&'a TextBox>> {
    let mut used = vec![false; column.len()];
    let mut groups = Vec::new();

    for seed in 0..column.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut members = vec![column[seed]];
        let mut bounds = column[seed].bbox();

        let mut changed = true;
        while changed {
            changed = false;
            for (idx, candidate) in column.iter().enumerate() {
                if used[idx] {
                    continue;
                }
                let reach = bounds.expanded(config.cluster_margin_x, config.cluster_margin_y);
                if reach.intersects(&candidate.bbox()) {
                    used[idx] = true;
                    members.push(*candidate);
                    bounds = bounds.union(&candidate.bbox());
                    changed = true;
                }
            }
        }
        groups.push(members);
    }
    groups
}

fn keep_cluster(members: &[&TextBox], config: &LayoutConfig) -> bool {
    match members {
        [] => false,
        [single] => single.trimmed().chars().count() > config.min_single_box_chars,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::DayHeader;
    use pretty_assertions::assert_eq;

    fn axis() -> DayAxis {
        let headers = [(Weekday::Monday, 100.0), (Weekday::Tuesday, 300.0), (Weekday::Wednesday, 500.0)]
            .into_iter()
            .map(|(day, x)| DayHeader {
                day,
                x,
                text: day.name().to_string(),
            })
            .collect();
        DayAxis::new(headers, 1.5)
    }

    fn texts(cluster: &Cluster) -> Vec<&str> {
        cluster.boxes.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn groups_nearby_boxes_per_column() {
        let boxes = vec![
            TextBox::new("CS 61B", 270.0, 100.0, 60.0, 20.0),
            TextBox::new("Math 54", 70.0, 100.0, 60.0, 20.0),
            TextBox::new("Soda 306", 270.0, 130.0, 60.0, 20.0),
            TextBox::new("Evans 10", 70.0, 130.0, 60.0, 20.0),
            TextBox::new("Lab", 270.0, 400.0, 40.0, 20.0),
            TextBox::new("Long seminar title", 240.0, 600.0, 120.0, 20.0),
        ];
        let refs: Vec<&TextBox> = boxes.iter().collect();
        let clusters = cluster_event_boxes(&refs, &axis(), &LayoutConfig::default());

        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].day, Weekday::Monday);
        assert_eq!(texts(&clusters[0]), vec!["Math 54", "Evans 10"]);
        assert_eq!(clusters[1].day, Weekday::Tuesday);
        assert_eq!(texts(&clusters[1]), vec!["CS 61B", "Soda 306"]);
        assert_eq!(texts(&clusters[2]), vec!["Long seminar title"]);
        assert_eq!(clusters[1].bbox.y1, 150.0);
    }

    #[test]
    fn absorbs_chains_through_growing_bounds() {
        let boxes = vec![
            TextBox::new("Bottom line", 280.0, 270.0, 60.0, 20.0),
            TextBox::new("Top line", 280.0, 100.0, 60.0, 20.0),
            TextBox::new("Middle line", 280.0, 190.0, 60.0, 20.0),
        ];
        let refs: Vec<&TextBox> = boxes.iter().collect();
        let clusters = cluster_event_boxes(&refs, &axis(), &LayoutConfig::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].boxes.len(), 3);
    }

    #[test]
    fn drops_boxes_outside_columns() {
        let boxes = vec![
            TextBox::new("Footer text here", 900.0, 100.0, 100.0, 20.0),
            TextBox::new("More footer", 900.0, 120.0, 100.0, 20.0),
        ];
        let refs: Vec<&TextBox> = boxes.iter().collect();
        assert!(cluster_event_boxes(&refs, &axis(), &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn clustering_is_repeatable() {
        let boxes = vec![
            TextBox::new("EE 16A", 480.0, 100.0, 50.0, 20.0),
            TextBox::new("Cory 277", 480.0, 125.0, 60.0, 20.0),
            TextBox::new("Discussion section", 470.0, 400.0, 90.0, 20.0),
            TextBox::new("Stray", 90.0, 700.0, 30.0, 20.0),
        ];
        let refs: Vec<&TextBox> = boxes.iter().collect();
        let first = cluster_event_boxes(&refs, &axis(), &LayoutConfig::default());
        let second = cluster_event_boxes(&refs, &axis(), &LayoutConfig::default());
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
