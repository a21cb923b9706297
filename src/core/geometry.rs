use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in corner form: top-left `(x1, y1)`, bottom-right `(x2, y2)`.
///
/// On the wire this is a plain `[x1, y1, x2, y2]` array.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Rectangle in origin/size form, as reported by the interface tree.
///
/// On the wire this is a plain `[x, y, w, h]` array.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct XywhRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    pub fn iou(&self, other: &Self) -> f64 {
        overlap_fraction(self, other)
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }
}

impl XywhRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn to_corners(&self) -> BBox {
        BBox::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }
}

impl From<[f64; 4]> for BBox {
    fn from(v: [f64; 4]) -> Self {
        BBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

impl From<[f64; 4]> for XywhRect {
    fn from(v: [f64; 4]) -> Self {
        XywhRect::new(v[0], v[1], v[2], v[3])
    }
}

impl From<XywhRect> for [f64; 4] {
    fn from(r: XywhRect) -> Self {
        [r.x, r.y, r.w, r.h]
    }
}

/// Intersection-over-Union of two corner-form rectangles.
///
/// Total over all inputs: degenerate, inverted or non-finite rectangles
/// yield `0.0`, and the result always lies in `[0, 1]`. An empty
/// intersection short-circuits before the union is computed.
pub fn overlap_fraction(a: &BBox, b: &BBox) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return 0.0;
    }

    let iw = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let ih = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let inter = iw * ih;
    if inter <= 0.0 {
        return 0.0;
    }

    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        return 0.0;
    }

    let ratio = inter / union;
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}
