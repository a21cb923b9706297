pub mod html_debug_export;
pub mod json_export;

use crate::error::Result;
use crate::pipeline::{FuseRequest, FuseResponse};

pub use html_debug_export::HtmlDebugExporter;
pub use json_export::JsonExporter;

pub trait Exporter {
    fn export(&self, request: &FuseRequest, response: &FuseResponse) -> Result<()>;
}
