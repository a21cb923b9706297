use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;

use crate::core::geometry::BBox;
use crate::core::model::{FusedObject, Provenance};
use crate::error::{FuseError, Result};
use crate::export::Exporter;
use crate::pipeline::{FuseRequest, FuseResponse};

pub const OVERLAY_FILE: &str = "overlay.html";
const SCREENSHOT_STEM: &str = "screenshot";

/// Overlay of fused boxes, optionally drawn over the frame screenshot.
#[derive(Debug, Clone)]
pub struct HtmlDebugExporter {
    out_dir: PathBuf,
    screenshot: Option<PathBuf>,
}

impl HtmlDebugExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            out_dir,
            screenshot: None,
        }
    }

    pub fn with_screenshot(mut self, screenshot: Option<PathBuf>) -> Self {
        self.screenshot = screenshot;
        self
    }

    fn object_to_div(object: &FusedObject) -> String {
        let bbox = object.bbox;
        let meta = object.dom.clone().unwrap_or_default();
        format!(
            r#"<div class='bbox {layer}' style='left:{x}px; top:{y}px; width:{w}px; height:{h}px;' data-id='{id}' data-label='{label}' data-score='{score:.3}' data-provenance='{layer}' data-tag='{tag}' data-text='{text}' data-iou='{iou}'><span class='caption'>{caption}</span></div>"#,
            layer = provenance_class(object.source),
            x = bbox.x1,
            y = bbox.y1,
            w = bbox.width().max(1.0),
            h = bbox.height().max(1.0),
            id = html_escape::encode_single_quoted_attribute(&object.id),
            label = html_escape::encode_single_quoted_attribute(&object.label),
            score = object.score,
            tag = html_escape::encode_single_quoted_attribute(meta.tag.as_deref().unwrap_or("")),
            text = html_escape::encode_single_quoted_attribute(meta.text.as_deref().unwrap_or("")),
            iou = meta.iou.map(|value| format!("{value:.3}")).unwrap_or_default(),
            caption = html_escape::encode_text(&object.caption()),
        )
    }

    fn element_to_div(bbox: &BBox, tag: &str) -> String {
        format!(
            r#"<div class='bbox input' style='left:{x}px; top:{y}px; width:{w}px; height:{h}px;' data-tag='{tag}'></div>"#,
            x = bbox.x1,
            y = bbox.y1,
            w = bbox.width(),
            h = bbox.height(),
            tag = html_escape::encode_single_quoted_attribute(tag),
        )
    }

    /// Copies the screenshot next to the overlay so the page can load it by file name.
    fn stage_screenshot(&self, path: &Path) -> Result<String> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "png".to_string());
        let name = format!("{SCREENSHOT_STEM}.{extension}");
        let target = self.out_dir.join(&name);
        // copying a file onto itself would truncate it
        let same_file = match (fs::canonicalize(path), fs::canonicalize(&target)) {
            (Ok(src), Ok(dst)) => src == dst,
            _ => false,
        };
        if !same_file {
            fs::copy(path, &target).map_err(|err| FuseError::io(path, err))?;
        }
        Ok(name)
    }

    fn canvas_size(&self, request: &FuseRequest, response: &FuseResponse) -> Result<(u32, u32)> {
        if let Some(path) = &self.screenshot {
            return screenshot_dimensions(path);
        }
        if let Some(viewport) = request.viewport {
            return Ok((to_px(viewport.width), to_px(viewport.height)));
        }
        let extent = response
            .objects
            .iter()
            .map(|object| object.bbox)
            .reduce(|acc, bbox| acc.union(&bbox));
        Ok(extent
            .map(|bbox| (to_px(bbox.x2), to_px(bbox.y2)))
            .unwrap_or((1, 1)))
    }
}

fn screenshot_dimensions(path: &Path) -> Result<(u32, u32)> {
    let reader = ImageReader::open(path).map_err(|err| FuseError::io(path, err))?;
    Ok(reader.into_dimensions()?)
}

fn to_px(value: f64) -> u32 {
    if value.is_finite() {
        value.ceil().clamp(1.0, u32::MAX as f64) as u32
    } else {
        1
    }
}

fn provenance_class(prov: Provenance) -> &'static str {
    match prov {
        Provenance::DetectorStructural => "fused",
        Provenance::DetectorOnly => "detector",
        Provenance::StructuralOnly => "structural",
    }
}

impl Exporter for HtmlDebugExporter {
    fn export(&self, request: &FuseRequest, response: &FuseResponse) -> Result<()> {
        fs::create_dir_all(&self.out_dir).map_err(|err| FuseError::io(&self.out_dir, err))?;
        let (width, height) = self.canvas_size(request, response)?;

        let mut boxes_html = String::new();
        for element in &request.dom {
            if let Some(corners) = element.corners() {
                boxes_html.push_str(&HtmlDebugExporter::element_to_div(&corners, &element.tag));
            }
        }
        for object in &response.objects {
            boxes_html.push_str(&HtmlDebugExporter::object_to_div(object));
        }

        let background = match &self.screenshot {
            Some(path) => {
                let name = self.stage_screenshot(path)?;
                format!(
                    "<img src='{}' />",
                    html_escape::encode_single_quoted_attribute(&name)
                )
            }
            None => String::new(),
        };

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset='utf-8'>
<title>uifuse overlay ({count} objects, {ms} ms)</title>
<style>
body {{ margin: 0; font-family: ui-sans-serif, Arial, sans-serif; background: #1a1b26; }}
#canvas {{ position: relative; width: {width}px; height: {height}px; }}
#canvas img {{ display: block; position: absolute; left: 0; top: 0; }}
.bbox {{ position: absolute; border: 2px solid; box-sizing: border-box; }}
.bbox.fused {{ border-color: #9ece6a; }}
.bbox.structural {{ border-color: #ff9e64; }}
.bbox.detector {{ border-color: #7aa2f7; }}
.bbox.input {{ border: 1px dashed rgba(200,200,200,0.3); display: none; }}
body.show-input .bbox.input {{ display: block; }}
.caption {{ position: absolute; left: -2px; top: -18px; white-space: nowrap; font-size: 12px; padding: 0 4px; background: rgba(0,0,0,0.6); color: #e7e7e7; }}
#info {{ position: fixed; right: 10px; top: 10px; background: #fff; padding: 10px; border: 1px solid #ddd; max-width: 300px; font-size: 12px; }}
#legend {{ position: fixed; right: 10px; bottom: 10px; background: #fff; padding: 10px; border: 1px solid #ddd; font-size: 12px; }}
.legend-item {{ margin: 5px 0; }}
.legend-box {{ display: inline-block; width: 20px; height: 15px; border: 2px solid; vertical-align: middle; margin-right: 5px; }}
</style>
</head>
<body>
<div id='info'>Click a box to inspect.</div>
<div id='legend'>
<div class='legend-item'><span class='legend-box' style='border-color: #9ece6a;'></span>yolo+dom</div>
<div class='legend-item'><span class='legend-box' style='border-color: #7aa2f7;'></span>yolo</div>
<div class='legend-item'><span class='legend-box' style='border-color: #ff9e64;'></span>dom</div>
<div class='legend-item'><label><input type='checkbox' id='toggle-input' /> raw dom boxes</label></div>
</div>
<div id='canvas'>
{background}
{boxes}
</div>
<script>
const info = document.getElementById('info');
document.getElementById('toggle-input').addEventListener('change', (ev) => {{
  document.body.classList.toggle('show-input', ev.target.checked);
}});
for (const el of document.querySelectorAll('.bbox:not(.input)')) {{
  el.addEventListener('click', () => {{
    info.innerHTML = `id: ${{el.dataset.id}}<br/>label: ${{el.dataset.label}}<br/>score: ${{el.dataset.score}}<br/>provenance: ${{el.dataset.provenance}}<br/>tag: ${{el.dataset.tag}}<br/>text: ${{el.dataset.text}}<br/>iou: ${{el.dataset.iou}}`;
  }});
}}
</script>
</body>
</html>"#,
            count = response.objects.len(),
            ms = response.ms,
            width = width,
            height = height,
            background = background,
            boxes = boxes_html,
        );
        let path = self.out_dir.join(OVERLAY_FILE);
        fs::write(&path, html).map_err(|err| FuseError::io(&path, err))?;
        Ok(())
    }
}
