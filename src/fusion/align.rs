use crate::core::geometry::{overlap_fraction, BBox};
use crate::core::model::StructuralElement;

/// Best-overlapping interface element for one detector box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome<'a> {
    pub element: Option<&'a StructuralElement>,
    pub iou: f64,
}

impl MatchOutcome<'_> {
    /// The matcher never filters by threshold; callers decide acceptance here.
    pub fn accepted(&self, threshold: f64) -> bool {
        self.element.is_some() && self.iou >= threshold
    }
}

/// Scans every element with geometry and keeps the strictly greatest overlap.
///
/// Ties keep the first element seen. Returns no element with `iou == 0.0`
/// when nothing overlaps at all.
pub fn best_match<'a>(bbox: &BBox, elements: &'a [StructuralElement]) -> MatchOutcome<'a> {
    let mut best = None;
    let mut best_iou = 0.0;

    for element in elements {
        let Some(corners) = element.corners() else {
            continue;
        };
        let iou = overlap_fraction(bbox, &corners);
        if iou > best_iou {
            best_iou = iou;
            best = Some(element);
        }
    }

    MatchOutcome {
        element: best,
        iou: best_iou,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_highest_overlap() {
        let elements = vec![
            StructuralElement::new(1, "div").with_bbox(0.0, 0.0, 100.0, 100.0),
            StructuralElement::new(2, "button").with_bbox(10.0, 10.0, 40.0, 40.0),
            StructuralElement::new(3, "span").with_bbox(12.0, 12.0, 20.0, 20.0),
        ];
        let outcome = best_match(&BBox::new(10.0, 10.0, 50.0, 50.0), &elements);
        assert_eq!(outcome.element.map(|e| e.node_id), Some(2));
        assert_eq!(outcome.iou, 1.0);
    }

    #[test]
    fn ties_keep_first_seen() {
        let elements = vec![
            StructuralElement::new(1, "a").with_bbox(0.0, 0.0, 10.0, 10.0),
            StructuralElement::new(2, "b").with_bbox(0.0, 0.0, 10.0, 10.0),
        ];
        let outcome = best_match(&BBox::new(0.0, 0.0, 10.0, 10.0), &elements);
        assert_eq!(outcome.element.map(|e| e.node_id), Some(1));
    }

    #[test]
    fn skips_elements_without_geometry() {
        let elements = vec![
            StructuralElement::new(1, "head"),
            StructuralElement::new(2, "p").with_bbox(0.0, 0.0, 10.0, 20.0),
        ];
        let outcome = best_match(&BBox::new(0.0, 0.0, 10.0, 10.0), &elements);
        assert_eq!(outcome.element.map(|e| e.node_id), Some(2));
        assert_eq!(outcome.iou, 0.5);
    }

    #[test]
    fn no_overlap_means_no_match() {
        let elements = vec![StructuralElement::new(1, "p").with_bbox(100.0, 100.0, 10.0, 10.0)];
        let outcome = best_match(&BBox::new(0.0, 0.0, 10.0, 10.0), &elements);
        assert!(outcome.element.is_none());
        assert_eq!(outcome.iou, 0.0);

        let empty = best_match(&BBox::new(0.0, 0.0, 10.0, 10.0), &[]);
        assert!(empty.element.is_none());
        assert_eq!(empty.iou, 0.0);
    }

    #[test]
    fn returns_sub_threshold_matches_unfiltered() {
        let elements = vec![StructuralElement::new(1, "p").with_bbox(5.0, 5.0, 10.0, 10.0)];
        let outcome = best_match(&BBox::new(0.0, 0.0, 10.0, 10.0), &elements);
        assert_eq!(outcome.element.map(|e| e.node_id), Some(1));
        assert!(outcome.iou < 0.25);
        assert!(!outcome.accepted(0.25));
        assert!(outcome.accepted(0.1));
    }
}
