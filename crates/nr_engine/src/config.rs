use nr_core::Result;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MATCH_THRESHOLD: u8 = 80;
pub const DEFAULT_RATING_SAMPLES: usize = 200;
pub const DEFAULT_MAX_USER_ID: u32 = 100;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of articles returned by each recommender
    pub top_k: usize,
    /// Minimum fuzzy ratio (0-100) for a title query to resolve
    pub match_threshold: u8,
    pub rating_samples: usize,
    pub max_user_id: u32,
    pub test_fraction: f64,
    pub seed: Option<u64>,
    pub build_timeout_secs: Option<u64>,
    pub svd: SvdParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            rating_samples: DEFAULT_RATING_SAMPLES,
            max_user_id: DEFAULT_MAX_USER_ID,
            test_fraction: 0.2,
            seed: None,
            build_timeout_secs: None,
            svd: SvdParams::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    fn validate(self) -> Result<Self> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(nr_core::Error::InvalidInput(format!(
                "test_fraction must be in [0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.match_threshold > 100 {
            return Err(nr_core::Error::InvalidInput(format!(
                "match_threshold must be at most 100, got {}",
                self.match_threshold
            )));
        }
        if self.max_user_id == 0 {
            return Err(nr_core::Error::InvalidInput("max_user_id must be positive".to_string()));
        }
        Ok(self)
    }
}

/// Hyper-parameters of the latent factor model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SvdParams {
    pub n_factors: usize,
    pub n_epochs: usize,
    pub lr: f64,
    pub reg: f64,
    pub init_mean: f64,
    pub init_std: f64,
    pub rating_min: f64,
    pub rating_max: f64,
    /// Clip predictions to the rating scale
    pub clip: bool,
}

impl Default for SvdParams {
    fn default() -> Self {
        Self {
            n_factors: 100,
            n_epochs: 20,
            lr: 0.005,
            reg: 0.02,
            init_mean: 0.0,
            init_std: 0.1,
            rating_min: 1.0,
            rating_max: 5.0,
            clip: true,
        }
    }
}
