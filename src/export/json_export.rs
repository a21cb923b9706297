use std::fs;
use std::path::PathBuf;

use crate::error::{FuseError, Result};
use crate::export::Exporter;
use crate::pipeline::{FuseRequest, FuseResponse};

pub const RESPONSE_FILE: &str = "objects.json";

#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, _request: &FuseRequest, response: &FuseResponse) -> Result<()> {
        fs::create_dir_all(&self.out_dir).map_err(|err| FuseError::io(&self.out_dir, err))?;
        let path = self.out_dir.join(RESPONSE_FILE);
        let data = serde_json::to_string_pretty(response)?;
        fs::write(&path, data).map_err(|err| FuseError::io(&path, err))?;
        Ok(())
    }
}
