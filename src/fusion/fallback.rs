use crate::core::geometry::overlap_fraction;
use crate::core::ident::IdGenerator;
use crate::core::model::{FusedObject, Provenance, StructuralElement};

#[derive(Debug, Clone, Copy)]
pub struct FallbackParams {
    pub cap: usize,
    pub score: f64,
    pub dedup_threshold: f64,
}

/// Appends structural-only entries for leading elements nobody represents yet.
///
/// Only the first `cap` elements are scanned. Each candidate is checked
/// against every object in `accepted`, including fallbacks appended earlier
/// in this scan, so the loop has to stay sequential. Returns how many
/// entries were appended.
pub fn append_fallbacks(
    accepted: &mut Vec<FusedObject>,
    elements: &[StructuralElement],
    params: FallbackParams,
    ids: &mut IdGenerator,
) -> usize {
    let before = accepted.len();

    for element in elements.iter().take(params.cap) {
        let Some(corners) = element.corners() else {
            continue;
        };
        let represented = accepted
            .iter()
            .any(|object| overlap_fraction(&object.bbox, &corners) > params.dedup_threshold);
        if represented {
            continue;
        }
        accepted.push(FusedObject {
            id: ids.next_id(),
            label: element.tag.clone(),
            score: params.score,
            bbox: corners,
            dom: Some(element.meta(None)),
            source: Provenance::StructuralOnly,
        });
    }

    accepted.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use pretty_assertions::assert_eq;

    const PARAMS: FallbackParams = FallbackParams {
        cap: 40,
        score: 0.5,
        dedup_threshold: 0.5,
    };

    fn detector_object(bbox: BBox) -> FusedObject {
        FusedObject {
            id: "det".to_string(),
            label: "button".to_string(),
            score: 0.8,
            bbox,
            dom: None,
            source: Provenance::DetectorOnly,
        }
    }

    #[test]
    fn suppresses_already_represented_elements() {
        let mut accepted = vec![detector_object(BBox::new(0.0, 0.0, 10.0, 10.0))];
        let elements = vec![
            StructuralElement::new(1, "button").with_bbox(0.0, 0.0, 10.0, 10.0),
            StructuralElement::new(2, "a").with_bbox(50.0, 50.0, 10.0, 10.0),
        ];
        let added = append_fallbacks(&mut accepted, &elements, PARAMS, &mut IdGenerator::new());

        assert_eq!(added, 1);
        assert_eq!(accepted[1].label, "a");
        assert_eq!(accepted[1].score, 0.5);
        assert_eq!(accepted[1].source, Provenance::StructuralOnly);
        assert_eq!(accepted[1].bbox, BBox::new(50.0, 50.0, 60.0, 60.0));
        assert_eq!(accepted[1].matched_iou(), None);
    }

    #[test]
    fn dedup_threshold_is_exclusive() {
        // element 10x10 inside a 10x20 object: overlap exactly 0.5, kept
        let mut accepted = vec![detector_object(BBox::new(0.0, 0.0, 10.0, 20.0))];
        let elements = vec![StructuralElement::new(1, "li").with_bbox(0.0, 0.0, 10.0, 10.0)];
        let added = append_fallbacks(&mut accepted, &elements, PARAMS, &mut IdGenerator::new());
        assert_eq!(added, 1);
    }

    #[test]
    fn earlier_fallbacks_suppress_later_duplicates() {
        let mut accepted = Vec::new();
        let elements = vec![
            StructuralElement::new(1, "div").with_bbox(0.0, 0.0, 10.0, 10.0),
            StructuralElement::new(2, "span").with_bbox(0.0, 0.0, 10.0, 10.0),
        ];
        let added = append_fallbacks(&mut accepted, &elements, PARAMS, &mut IdGenerator::new());
        assert_eq!(added, 1);
        assert_eq!(accepted[0].label, "div");
    }

    #[test]
    fn cap_bounds_the_scanned_prefix() {
        let elements: Vec<StructuralElement> = (0..10)
            .map(|i| {
                if i < 2 {
                    StructuralElement::new(i, "meta")
                } else {
                    StructuralElement::new(i, "p").with_bbox(i as f64 * 20.0, 0.0, 10.0, 10.0)
                }
            })
            .collect();
        let mut accepted = Vec::new();
        let params = FallbackParams { cap: 5, ..PARAMS };
        let added = append_fallbacks(&mut accepted, &elements, params, &mut IdGenerator::new());

        // geometry-less elements still count against the cap
        assert_eq!(added, 3);
        let origins: Vec<f64> = accepted.iter().map(|o| o.bbox.x1).collect();
        assert_eq!(origins, vec![40.0, 60.0, 80.0]);
    }

    #[test]
    fn degenerate_elements_are_never_deduplicated() {
        let mut accepted = vec![detector_object(BBox::new(0.0, 0.0, 10.0, 10.0))];
        let elements = vec![StructuralElement::new(1, "hr").with_bbox(0.0, 5.0, 10.0, 0.0)];
        let added = append_fallbacks(&mut accepted, &elements, PARAMS, &mut IdGenerator::new());
        assert_eq!(added, 1);
    }
}
