//! Engine configuration.
//!
//! All options have serving-ready defaults; deployments override them via
//! a TOML file and/or `BAZAARI_`-prefixed environment variables (file
//! first, environment on top).

use crate::blend::BlendWeights;
use crate::collab::CollabConfig;
use crate::eligibility::DEFAULT_KIDS_AGE_CUTOFF;
use crate::error::{Error, Result};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Blend-layer options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Weight for demographic (segment-popularity) candidates.
    pub weight_demographic: u32,
    /// Weight for content-similarity candidates.
    pub weight_content: u32,
    /// Weight for collaborative candidates.
    pub weight_collaborative: u32,
    /// Whether the warm path runs the three-way blend. When false the
    /// engine uses the two-way demographic+content variant.
    pub enable_collaborative: bool,
}

impl Default for BlendConfig {
    fn default() -> Self {
        let weights = BlendWeights::default();
        Self {
            weight_demographic: weights.demographic,
            weight_content: weights.content,
            weight_collaborative: weights.collaborative,
            enable_collaborative: true,
        }
    }
}

impl BlendConfig {
    /// The configured weights as the blender's input type.
    #[must_use]
    pub fn weights(&self) -> BlendWeights {
        BlendWeights {
            demographic: self.weight_demographic,
            content: self.weight_content,
            collaborative: self.weight_collaborative,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoConfig {
    /// Number of demographic segments (k-means cluster count).
    pub num_segments: usize,
    /// Seed shared by all stochastic model initialization.
    pub seed: u64,
    /// Popularity entries precomputed per segment.
    pub top_n_per_segment: usize,
    /// Age at or below which a user shops the Kids range.
    pub kids_age_cutoff: u32,
    /// Default page size for recommendation lists.
    pub items_per_page: usize,
    /// Blend weights and the two-/three-way switch.
    pub blend: BlendConfig,
    /// Collaborative-estimator hyperparameters.
    pub collab: CollabConfig,
}

impl Default for RecoConfig {
    fn default() -> Self {
        Self {
            num_segments: 5,
            seed: 42,
            top_n_per_segment: 10,
            kids_age_cutoff: DEFAULT_KIDS_AGE_CUTOFF,
            items_per_page: 20,
            blend: BlendConfig::default(),
            collab: CollabConfig::default(),
        }
    }
}

impl RecoConfig {
    /// Loads configuration from a TOML file, with `BAZAARI_`-prefixed
    /// environment variables overriding file values (nested keys separated
    /// by `__`, e.g. `BAZAARI_BLEND__WEIGHT_CONTENT=4`). A missing file is
    /// not an error; defaults fill every gap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file is malformed or the merged
    /// configuration fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("BAZAARI_").split("__"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants the rest of the engine assumes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending option.
    pub fn validate(&self) -> Result<()> {
        if self.num_segments == 0 {
            return Err(Error::Config("num_segments must be at least 1".to_string()));
        }
        if self.items_per_page == 0 {
            return Err(Error::Config(
                "items_per_page must be at least 1".to_string(),
            ));
        }
        if self.top_n_per_segment == 0 {
            return Err(Error::Config(
                "top_n_per_segment must be at least 1".to_string(),
            ));
        }
        if self.collab.latent_factors == 0 {
            return Err(Error::Config(
                "collab.latent_factors must be at least 1".to_string(),
            ));
        }
        let (min, max) = self.collab.rating_scale;
        if min.partial_cmp(&max) != Some(std::cmp::Ordering::Less) {
            return Err(Error::Config(format!(
                "collab.rating_scale min must be below max (got {min}..{max})"
            )));
        }
        let blend = &self.blend;
        if blend.weight_demographic == 0 && blend.weight_content == 0 {
            return Err(Error::Config(
                "at least one of weight_demographic/weight_content must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
