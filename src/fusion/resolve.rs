use crate::core::ident::IdGenerator;
use crate::core::model::{Detection, FusedObject, Provenance, StructuralElement};
use crate::fusion::align::best_match;

/// Turns every detection into exactly one fused object.
///
/// A detection whose best element overlaps by at least `match_threshold`
/// carries that element's metadata; elements are not consumed, so several
/// detections may adopt the same element.
pub fn resolve_detections(
    detections: &[Detection],
    elements: &[StructuralElement],
    match_threshold: f64,
    ids: &mut IdGenerator,
) -> Vec<FusedObject> {
    detections
        .iter()
        .map(|detection| {
            let outcome = best_match(&detection.bbox, elements);
            let (dom, source) = match outcome.element {
                Some(element) if outcome.accepted(match_threshold) => (
                    Some(element.meta(Some(outcome.iou))),
                    Provenance::DetectorStructural,
                ),
                _ => (None, Provenance::DetectorOnly),
            };
            FusedObject {
                id: ids.next_id(),
                label: detection.label.clone(),
                score: detection.score,
                bbox: detection.bbox,
                dom,
                source,
            }
        })
        .collect()
}
