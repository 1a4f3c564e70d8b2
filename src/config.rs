use crate::error::{EngineError, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Tunable constants of the safety heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Deletable files older than this are recommended for deletion, younger ones for cleaning.
    pub delete_after_days: u64,
    /// Age at which the age penalty stops growing.
    pub age_floor_days: u64,
    pub max_age_penalty: u8,
    pub small_file_bytes: u64,
    pub small_file_penalty: u8,
    pub hidden_penalty: u8,
    pub cache_location_penalty: u8,
    pub user_document_bonus: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            delete_after_days: 30,
            age_floor_days: 180,
            max_age_penalty: 25,
            small_file_bytes: 1_024,
            small_file_penalty: 10,
            hidden_penalty: 5,
            cache_location_penalty: 20,
            user_document_bonus: 15,
        }
    }
}

/// Engine-wide settings. Every field has a default, so a partial document
/// deserializes into a complete config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for the plugin pool; `None` uses every available core.
    pub workers: Option<usize>,
    /// Length of every top-N list in the report.
    pub top_n: usize,
    /// Maximum walk depth below each root; `None` is unbounded.
    pub max_depth: Option<usize>,
    /// Roots a path must lie under to be analyzed; empty allows the whole filesystem.
    pub allowed_roots: Vec<PathBuf>,
    /// Extra protected prefixes on top of the built-in list.
    pub protected_paths: Vec<PathBuf>,
    pub old_file_days: u64,
    pub old_file_min_bytes: u64,
    pub scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            top_n: 20,
            max_depth: None,
            allowed_roots: Vec::new(),
            protected_paths: Vec::new(),
            old_file_days: 180,
            old_file_min_bytes: 10 * 1_048_576,
            scoring: ScoringConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(EngineError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.top_n == 0 {
            return Err(EngineError::InvalidConfig("top_n must be at least 1".into()));
        }
        if self.scoring.age_floor_days == 0 {
            return Err(EngineError::InvalidConfig(
                "scoring.age_floor_days must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Worker count actually used for the pool.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"top_n": 5, "scoring": {"hidden_penalty": 9}}"#).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.scoring.hidden_penalty, 9);
        assert_eq!(config.scoring.delete_after_days, 30);
        assert_eq!(config.old_file_days, 180);
    }

    #[test]
    fn rejects_zero_workers_and_empty_lists() {
        let config = EngineConfig {
            workers: Some(0),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        let config = EngineConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(EngineConfig::default().validate().is_ok());
    }
}
