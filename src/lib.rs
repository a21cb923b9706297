pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod fusion;
pub mod pipeline;

pub use config::FusionConfig;
pub use crate::core::model::{Detection, FusedObject, Provenance, StructuralElement};
pub use error::FuseError;
pub use fusion::{FusionEngine, SimpleFusionEngine};
pub use pipeline::{FuseRequest, FuseResponse};
