use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FuseError, Result};

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.25;
pub const DEFAULT_FALLBACK_CAP: usize = 40;
pub const DEFAULT_FALLBACK_SCORE: f64 = 0.5;
pub const DEFAULT_DEDUP_THRESHOLD: f64 = 0.5;

/// Tuning constants of the fusion engine.
///
/// Every key is optional in TOML; missing keys keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Minimum overlap (inclusive) for a detection to adopt an element's metadata.
    pub match_threshold: f64,
    /// How many leading interface-tree elements are considered for fallback entries.
    pub fallback_cap: usize,
    /// Score given to structural-only entries.
    pub fallback_score: f64,
    /// Overlap (exclusive) above which a fallback element counts as already represented.
    pub dedup_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            fallback_cap: DEFAULT_FALLBACK_CAP,
            fallback_score: DEFAULT_FALLBACK_SCORE,
            dedup_threshold: DEFAULT_DEDUP_THRESHOLD,
        }
    }
}

impl FusionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FusionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| FuseError::io(path, err))?;
        Self::from_toml_str(&content)
    }

    pub fn with_match_threshold(mut self, value: f64) -> Self {
        self.match_threshold = value;
        self
    }

    pub fn with_fallback_cap(mut self, value: usize) -> Self {
        self.fallback_cap = value;
        self
    }

    pub fn with_fallback_score(mut self, value: f64) -> Self {
        self.fallback_score = value;
        self
    }

    pub fn with_dedup_threshold(mut self, value: f64) -> Self {
        self.dedup_threshold = value;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_unit("match_threshold", self.match_threshold)?;
        check_unit("fallback_score", self.fallback_score)?;
        check_unit("dedup_threshold", self.dedup_threshold)?;
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FuseError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_service_constants() {
        let config = FusionConfig::default();
        assert_eq!(config.match_threshold, 0.25);
        assert_eq!(config.fallback_cap, 40);
        assert_eq!(config.fallback_score, 0.5);
        assert_eq!(config.dedup_threshold, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = FusionConfig::from_toml_str("fallback_cap = 10\nmatch_threshold = 0.4\n").unwrap();
        assert_eq!(
            config,
            FusionConfig::default()
                .with_fallback_cap(10)
                .with_match_threshold(0.4)
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = FusionConfig::from_toml_str("dedup_threshold = 1.5").unwrap_err();
        assert!(matches!(err, FuseError::InvalidConfig(_)));
        assert!(FusionConfig::default().with_fallback_score(f64::NAN).validate().is_err());
        assert!(FusionConfig::default().with_match_threshold(-0.1).validate().is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = FusionConfig::from_toml_str("fallback_cap = \"many\"").unwrap_err();
        assert!(matches!(err, FuseError::Toml(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fusion.toml");
        fs::write(&path, "fallback_score = 0.3\n").unwrap();
        let config = FusionConfig::from_file(&path).unwrap();
        assert_eq!(config.fallback_score, 0.3);

        let missing = FusionConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, FuseError::Io { .. }));
    }
}
