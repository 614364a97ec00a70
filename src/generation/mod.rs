//! # Generation Module
//!
//! Procedural world generation.
//!
//! Generators are pure functions of a [`GenerationConfig`] and a seeded
//! random number generator, so the same seed and feature flags always yield
//! the same map.

pub mod terrain;

pub use terrain::*;

use crate::constants::{DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH};
use crate::TerraResult;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// # Examples
///
/// ```
/// use terratile::GenerationConfig;
///
/// let config = GenerationConfig::new(7, 80, 40);
/// assert!(config.rivers && config.grass && config.trees && config.rocks);
/// assert!(config.tree_min <= config.tree_max);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    pub rivers: bool,
    pub grass: bool,
    pub trees: bool,
    pub rocks: bool,
    /// Number of grass clusters grown from river cells
    pub grass_bundles: u32,
    /// Target number of grass cells per cluster
    pub patch_size: u32,
    pub tree_min: u32,
    pub tree_max: u32,
    pub rock_min: u32,
    pub rock_max: u32,
    /// Marks plain floor with visible dots
    pub debug: bool,
}

impl GenerationConfig {
    /// Full-featured configuration for a world of the given size.
    pub fn new(seed: u64, width: i32, height: i32) -> Self {
        Self {
            seed,
            width,
            height,
            rivers: true,
            grass: true,
            trees: true,
            rocks: true,
            grass_bundles: 6,
            patch_size: 40,
            tree_min: 15,
            tree_max: 30,
            rock_min: 8,
            rock_max: 15,
            debug: false,
        }
    }

    /// Small world with few features, quick to generate in tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            grass_bundles: 2,
            patch_size: 12,
            tree_min: 2,
            tree_max: 4,
            rock_min: 1,
            rock_max: 3,
            ..Self::new(seed, 30, 20)
        }
    }

    /// Disables every optional feature.
    pub fn bare(mut self) -> Self {
        self.rivers = false;
        self.grass = false;
        self.trees = false;
        self.rocks = false;
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42, DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> TerraResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> TerraResult<()>;

    /// Seeds a generator from the config, generates and validates.
    fn generate_seeded(&self, config: &GenerationConfig) -> TerraResult<T> {
        let mut rng = create_rng(config);
        let content = self.generate(config, &mut rng)?;
        self.validate(&content, config)?;
        Ok(content)
    }
}

/// Creates a seeded random number generator from the config.
pub fn create_rng(config: &GenerationConfig) -> StdRng {
    StdRng::seed_from_u64(config.seed)
}
