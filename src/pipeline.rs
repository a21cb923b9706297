use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::FusionConfig;
use crate::core::model::{Detection, FusedObject, Provenance, StructuralElement};
use crate::error::{FuseError, Result};
use crate::export::html_debug_export::HtmlDebugExporter;
use crate::export::json_export::JsonExporter;
use crate::export::Exporter;
use crate::fusion::{FusionEngine, SimpleFusionEngine};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_dpr")]
    pub dpr: f64,
}

fn default_dpr() -> f64 {
    1.0
}

/// One frame's worth of detector output and interface-tree nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuseRequest {
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub dom: Vec<StructuralElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuseResponse {
    pub objects: Vec<FusedObject>,
    /// Wall time of the whole fuse call.
    pub ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuseSummary {
    pub fused: usize,
    pub detector_only: usize,
    pub structural_only: usize,
}

impl FuseSummary {
    pub fn of(objects: &[FusedObject]) -> Self {
        objects.iter().fold(Self::default(), |mut acc, object| {
            match object.source {
                Provenance::DetectorStructural => acc.fused += 1,
                Provenance::DetectorOnly => acc.detector_only += 1,
                Provenance::StructuralOnly => acc.structural_only += 1,
            }
            acc
        })
    }

    pub fn detections(&self) -> usize {
        self.fused + self.detector_only
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub fusion: FusionConfig,
    /// Write the HTML overlay next to the JSON response.
    pub debug: bool,
    /// Background image for the overlay.
    pub screenshot: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(input: PathBuf, output: PathBuf, fusion: FusionConfig) -> Self {
        Self {
            input,
            output,
            fusion,
            debug: false,
            screenshot: None,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_screenshot(mut self, screenshot: Option<PathBuf>) -> Self {
        self.screenshot = screenshot;
        self
    }
}

pub fn load_request(path: &Path) -> Result<FuseRequest> {
    let data = fs::read_to_string(path).map_err(|err| FuseError::io(path, err))?;
    let request = serde_json::from_str(&data)?;
    Ok(request)
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Runs the engine and times it; timing belongs to the caller, not the engine.
pub fn run_request(engine: &impl FusionEngine, request: &FuseRequest) -> FuseResponse {
    let started = Instant::now();
    let objects = engine.fuse(&request.detections, &request.dom);
    let ms = elapsed_ms(started.elapsed());

    let summary = FuseSummary::of(&objects);
    info!(
        fused = summary.fused,
        detector_only = summary.detector_only,
        structural_only = summary.structural_only,
        ms,
        "fused {} objects",
        objects.len()
    );

    FuseResponse { objects, ms }
}

pub fn build_response(config: &PipelineConfig) -> Result<(FuseRequest, FuseResponse)> {
    config.fusion.validate()?;
    let request = load_request(&config.input)?;
    info!(
        input = %config.input.display(),
        detections = request.detections.len(),
        elements = request.dom.len(),
        "loaded request"
    );
    let engine = SimpleFusionEngine::with_config(config.fusion);
    let response = run_request(&engine, &request);
    Ok((request, response))
}

pub fn export_response(
    request: &FuseRequest,
    response: &FuseResponse,
    config: &PipelineConfig,
) -> Result<()> {
    let json_exporter = JsonExporter::new(config.output.clone());
    json_exporter.export(request, response)?;

    if config.debug {
        let html_exporter = HtmlDebugExporter::new(config.output.join("debug"))
            .with_screenshot(config.screenshot.clone());
        html_exporter.export(request, response)?;
    }

    Ok(())
}
