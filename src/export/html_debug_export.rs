use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::{ClassBlock, Cluster, DayHeader, ScheduleDocument, TimeLabel};
use crate::export::Exporter;

/// Writes `layout.html`: the screenshot with the detected axes and clusters
/// drawn on top, plus the recovered blocks in a side panel.
#[derive(Debug, Clone)]
pub struct HtmlDebugExporter {
    out_dir: PathBuf,
}

impl HtmlDebugExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn label_to_div(label: &TimeLabel) -> String {
        format!(
            r#"<div class='axis time' style='top:{y}px;' data-text='{text}'>{time}</div>"#,
            y = label.y,
            text = html_escape::encode_single_quoted_attribute(&label.text),
            time = label.time,
        )
    }

    fn header_to_div(header: &DayHeader) -> String {
        format!(
            r#"<div class='axis day' style='left:{x}px;' data-text='{text}'>{day}</div>"#,
            x = header.x,
            text = html_escape::encode_single_quoted_attribute(&header.text),
            day = header.day,
        )
    }

    fn cluster_to_div(cluster: &Cluster) -> String {
        let text = cluster
            .boxes
            .iter()
            .map(|b| b.trimmed())
            .collect::<Vec<_>>()
            .join(" | ");
        format!(
            r#"<div class='bbox cluster' style='left:{x0}px; top:{y0}px; width:{w}px; height:{h}px;' data-day='{day}' data-text='{text}'></div>"#,
            x0 = cluster.bbox.x0,
            y0 = cluster.bbox.y0,
            w = cluster.bbox.width(),
            h = cluster.bbox.height(),
            day = cluster.day,
            text = html_escape::encode_single_quoted_attribute(&text),
        )
    }

    fn block_to_row(block: &ClassBlock) -> String {
        format!(
            "<tr><td>{day}</td><td>{start}-{end}</td><td>{title}</td><td>{location}</td><td>{instructors}</td><td>{color}</td></tr>",
            day = block.day_of_week,
            start = block.start_time,
            end = block.end_time,
            title = html_escape::encode_text(&block.title),
            location = html_escape::encode_text(&block.location),
            instructors = html_escape::encode_text(block.instructors.as_deref().unwrap_or("")),
            color = block.color_id.as_deref().unwrap_or(""),
        )
    }

    pub fn render(document: &ScheduleDocument) -> String {
        let mut overlay = String::new();
        if let Some(debug) = &document.layout.debug {
            for label in &debug.time_labels {
                overlay.push_str(&Self::label_to_div(label));
            }
            for header in &debug.day_headers {
                overlay.push_str(&Self::header_to_div(header));
            }
            for cluster in &debug.clusters {
                overlay.push_str(&Self::cluster_to_div(cluster));
            }
        }
        let rows: String = document
            .layout
            .class_blocks
            .iter()
            .map(Self::block_to_row)
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset='utf-8'>
<title>schedgrid debug: {title}</title>
<style>
body {{ margin: 0; font-family: Arial, sans-serif; }}
#canvas {{ position: relative; width: {width}; height: {height}; }}
#canvas img {{ display: block; }}
.bbox {{ position: absolute; border: 2px solid rgba(0,128,0,0.6); background: rgba(0,200,0,0.08); box-sizing: border-box; }}
.axis {{ position: absolute; font-size: 11px; color: #c00; }}
.axis.time {{ left: 0; right: 0; border-top: 1px dashed rgba(255,0,0,0.6); }}
.axis.day {{ top: 0; bottom: 0; border-left: 1px dashed rgba(0,0,255,0.6); color: #00c; }}
#info {{ position: fixed; right: 10px; top: 10px; background: #fff; padding: 10px; border: 1px solid #ddd; max-width: 300px; }}
#blocks {{ position: fixed; right: 10px; bottom: 10px; background: #fff; padding: 10px; border: 1px solid #ddd; font-size: 12px; }}
</style>
</head>
<body>
<div id='info'>Click a cluster to inspect.</div>
<div id='blocks'><table><tr><th>Day</th><th>Time</th><th>Title</th><th>Location</th><th>Instructors</th><th>Color</th></tr>{rows}</table></div>
<div id='canvas'>
<img src='{image}' />
{overlay}
</div>
<script>
const info = document.getElementById('info');
for (const el of document.querySelectorAll('.bbox')) {{
  el.addEventListener('click', () => {{
    info.innerHTML = `day: ${{el.dataset.day}}<br/>text: ${{el.dataset.text}}`;
  }});
}}
</script>
</body>
</html>"#,
            title = html_escape::encode_text(&document.source),
            width = document.width.map(|w| format!("{w}px")).unwrap_or_else(|| "auto".to_string()),
            height = document.height.map(|h| format!("{h}px")).unwrap_or_else(|| "auto".to_string()),
            image = html_escape::encode_single_quoted_attribute(&document.source),
            rows = rows,
            overlay = overlay,
        )
    }
}

impl Exporter for HtmlDebugExporter {
    fn export(&self, document: &ScheduleDocument) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join("layout.html"), Self::render(document))?;
        Ok(())
    }
}
