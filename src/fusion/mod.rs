pub mod align;
pub mod fallback;
pub mod rank;
pub mod resolve;

use tracing::debug;

use crate::config::FusionConfig;
use crate::core::ident::IdGenerator;
use crate::core::model::{Detection, FusedObject, StructuralElement};
use crate::fusion::fallback::FallbackParams;

pub trait FusionEngine {
    /// Fuses detector boxes with interface-tree elements into a ranked list.
    ///
    /// Never fails: bad geometry only lowers overlaps, and empty inputs give
    /// a correspondingly smaller result.
    fn fuse(&self, detections: &[Detection], elements: &[StructuralElement]) -> Vec<FusedObject>;
}

#[derive(Debug, Clone, Default)]
pub struct SimpleFusionEngine {
    config: FusionConfig,
}

impl SimpleFusionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }
}

impl FusionEngine for SimpleFusionEngine {
    fn fuse(&self, detections: &[Detection], elements: &[StructuralElement]) -> Vec<FusedObject> {
        let mut ids = IdGenerator::new();

        let mut objects =
            resolve::resolve_detections(detections, elements, self.config.match_threshold, &mut ids);

        let fallbacks = fallback::append_fallbacks(
            &mut objects,
            elements,
            FallbackParams {
                cap: self.config.fallback_cap,
                score: self.config.fallback_score,
                dedup_threshold: self.config.dedup_threshold,
            },
            &mut ids,
        );
        debug!(
            detections = detections.len(),
            elements = elements.len(),
            fallbacks,
            "fused detector and structural boxes"
        );

        rank::rank_objects(&mut objects);
        objects
    }
}
