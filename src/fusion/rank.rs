use std::cmp::Ordering;

use crate::core::model::FusedObject;

/// Descending by provenance rank, then by score.
///
/// `sort_by` is stable, so objects with equal keys keep their insertion
/// order: detections before fallbacks, each group in input order.
pub fn rank_objects(objects: &mut [FusedObject]) {
    objects.sort_by(compare_desc);
}

fn compare_desc(a: &FusedObject, b: &FusedObject) -> Ordering {
    b.rank()
        .cmp(&a.rank())
        .then_with(|| b.score.total_cmp(&a.score))
}

/// True when every adjacent pair respects the ranking order.
pub fn is_ranked(objects: &[FusedObject]) -> bool {
    objects
        .windows(2)
        .all(|pair| compare_desc(&pair[0], &pair[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use crate::core::model::Provenance;
    use pretty_assertions::assert_eq;

    fn object(id: &str, source: Provenance, score: f64) -> FusedObject {
        FusedObject {
            id: id.to_string(),
            label: id.to_string(),
            score,
            bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
            dom: None,
            source,
        }
    }

    fn ids(objects: &[FusedObject]) -> Vec<&str> {
        objects.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn provenance_outranks_score() {
        let mut objects = vec![
            object("dom", Provenance::StructuralOnly, 0.99),
            object("plain", Provenance::DetectorOnly, 0.1),
            object("fused", Provenance::DetectorStructural, 0.2),
            object("plain-high", Provenance::DetectorOnly, 0.8),
        ];
        rank_objects(&mut objects);
        assert_eq!(ids(&objects), vec!["fused", "plain-high", "plain", "dom"]);
        assert!(is_ranked(&objects));
    }

    #[test]
    fn equal_keys_keep_insertion_order() {
        let mut objects = vec![
            object("a", Provenance::DetectorOnly, 0.5),
            object("b", Provenance::StructuralOnly, 0.5),
            object("c", Provenance::DetectorOnly, 0.5),
            object("d", Provenance::StructuralOnly, 0.5),
            object("e", Provenance::DetectorOnly, 0.5),
        ];
        rank_objects(&mut objects);
        assert_eq!(ids(&objects), vec!["a", "c", "e", "b", "d"]);
    }

    #[test]
    fn nan_scores_do_not_panic() {
        let mut objects = vec![
            object("a", Provenance::DetectorOnly, 0.3),
            object("b", Provenance::DetectorOnly, f64::NAN),
            object("c", Provenance::DetectorOnly, 0.9),
        ];
        rank_objects(&mut objects);
        assert_eq!(objects.len(), 3);
        assert!(is_ranked(&objects));
    }

    #[test]
    fn detects_unranked_sequences() {
        let objects = vec![
            object("low", Provenance::DetectorOnly, 0.1),
            object("high", Provenance::DetectorOnly, 0.9),
        ];
        assert!(!is_ranked(&objects));
    }
}
