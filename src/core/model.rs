use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::geometry::{BBox, XywhRect};

/// Where a fused object came from. Wire tokens follow the vision service protocol.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Provenance {
    #[serde(rename = "yolo+dom")]
    DetectorStructural,
    #[serde(rename = "yolo")]
    DetectorOnly,
    #[serde(rename = "dom")]
    StructuralOnly,
}

impl Provenance {
    /// Primary ranking key: higher sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Provenance::DetectorStructural => 2,
            Provenance::DetectorOnly => 1,
            Provenance::StructuralOnly => 0,
        }
    }
}

/// One output of the external object detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub label: String,
    #[serde(alias = "confidence")]
    pub score: f64,
    pub bbox: BBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f64, bbox: BBox) -> Self {
        Self {
            label: label.into(),
            score,
            bbox,
        }
    }
}

/// One node of the interface tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructuralElement {
    pub node_id: i64,
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Option<Vec<String>>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attrs: Option<BTreeMap<String, String>>,
    /// Absent when the node has no visible geometry.
    #[serde(default)]
    pub bbox: Option<XywhRect>,
}

impl StructuralElement {
    pub fn new(node_id: i64, tag: impl Into<String>) -> Self {
        Self {
            node_id,
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_bbox(mut self, x: f64, y: f64, w: f64, h: f64) -> Self {
        self.bbox = Some(XywhRect::new(x, y, w, h));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Corner-form rectangle, or `None` when the node has no geometry.
    pub fn corners(&self) -> Option<BBox> {
        self.bbox.map(|rect| rect.to_corners())
    }

    /// Metadata carried onto a fused object; `iou` is set only for matched pairs.
    pub fn meta(&self, iou: Option<f64>) -> StructuralMeta {
        StructuralMeta {
            tag: Some(self.tag.clone()),
            text: self.text.clone(),
            id: self.id.clone(),
            classes: self.classes.clone(),
            attrs: self.attrs.clone(),
            iou,
        }
    }
}

/// Interface-tree metadata attached to a fused object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StructuralMeta {
    pub tag: Option<String>,
    pub text: Option<String>,
    pub id: Option<String>,
    pub classes: Option<Vec<String>>,
    pub attrs: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iou: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FusedObject {
    pub id: String,
    pub label: String,
    pub score: f64,
    pub bbox: BBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom: Option<StructuralMeta>,
    pub source: Provenance,
}

impl FusedObject {
    pub fn rank(&self) -> u8 {
        self.source.rank()
    }

    /// Overlap recorded by the matcher, only present for matched pairs.
    pub fn matched_iou(&self) -> Option<f64> {
        self.dom.as_ref().and_then(|meta| meta.iou)
    }

    /// Text shown next to the box in overlays: the label, then the element text if any.
    pub fn caption(&self) -> String {
        match self.dom.as_ref().and_then(|meta| meta.text.as_deref()) {
            Some(text) if !text.is_empty() => format!("{} — {}", self.label, text),
            _ => self.label.clone(),
        }
    }
}
