//! Scene configuration
//!
//! Defaults reproduce the stock tree. Any field may be overridden from JSON;
//! omitted fields keep their default.

use crate::constants::*;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tree height must be positive and finite, got {0}")]
    InvalidHeight(f32),

    #[error("tree base radius must be non-negative and finite, got {0}")]
    InvalidRadius(f32),

    #[error("tree y offset must be finite, got {0}")]
    InvalidOffset(f32),

    #[error("chaos radius must be positive and finite, got {0}")]
    InvalidChaosRadius(f32),

    #[error("photo card {field} must be finite, got {value}")]
    InvalidCardLayout { field: &'static str, value: f32 },

    #[error("{count} photo cards requested but the image pool is empty")]
    EmptyImagePool { count: usize },

    #[error("particle counts exceed the limit of {limit}")]
    TooManyParticles { limit: usize },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Cone the formed configuration sits on
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreeShape {
    pub height: f32,
    pub radius_bottom: f32,
    pub y_offset: f32,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            height: TREE_HEIGHT,
            radius_bottom: TREE_RADIUS_BOTTOM,
            y_offset: TREE_Y_OFFSET,
        }
    }
}

impl TreeShape {
    /// Vertical coordinate at a height ratio (0 = base, 1 = apex)
    pub fn y_at(&self, height_ratio: f32) -> f32 {
        self.y_offset + height_ratio * self.height
    }

    /// Nominal cone radius at a height ratio
    pub fn radius_at(&self, height_ratio: f32) -> f32 {
        (1.0 - height_ratio) * self.radius_bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParticleCounts {
    pub foliage: usize,
    pub ornaments: usize,
    pub photo_cards: usize,
}

impl Default for ParticleCounts {
    fn default() -> Self {
        Self {
            foliage: FOLIAGE_COUNT,
            ornaments: ORNAMENT_COUNT,
            photo_cards: PHOTO_CARD_COUNT,
        }
    }
}

impl ParticleCounts {
    /// Sum of all classes, `None` on overflow
    pub fn total(&self) -> Option<usize> {
        self.foliage
            .checked_add(self.ornaments)?
            .checked_add(self.photo_cards)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub tree: TreeShape,
    pub counts: ParticleCounts,
    pub chaos_radius: f32,
    pub card_surface_offset: f32,
    pub card_spiral_turns: f32,
    /// Fixed generation seed; `None` draws one from the OS
    pub seed: Option<u64>,
    pub photo_images: Vec<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tree: TreeShape::default(),
            counts: ParticleCounts::default(),
            chaos_radius: CHAOS_RADIUS,
            card_surface_offset: CARD_SURFACE_OFFSET,
            card_spiral_turns: CARD_SPIRAL_TURNS,
            seed: None,
            photo_images: PHOTO_IMAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tree = &self.tree;
        if !(tree.height.is_finite() && tree.height > 0.0) {
            return Err(ConfigError::InvalidHeight(tree.height));
        }
        if !(tree.radius_bottom.is_finite() && tree.radius_bottom >= 0.0) {
            return Err(ConfigError::InvalidRadius(tree.radius_bottom));
        }
        if !tree.y_offset.is_finite() {
            return Err(ConfigError::InvalidOffset(tree.y_offset));
        }
        if !(self.chaos_radius.is_finite() && self.chaos_radius > 0.0) {
            return Err(ConfigError::InvalidChaosRadius(self.chaos_radius));
        }
        if !self.card_surface_offset.is_finite() {
            return Err(ConfigError::InvalidCardLayout {
                field: "surface offset",
                value: self.card_surface_offset,
            });
        }
        if !self.card_spiral_turns.is_finite() {
            return Err(ConfigError::InvalidCardLayout {
                field: "spiral turns",
                value: self.card_spiral_turns,
            });
        }
        if !self.counts.total().is_some_and(|total| total <= MAX_PARTICLES) {
            return Err(ConfigError::TooManyParticles {
                limit: MAX_PARTICLES,
            });
        }
        if self.counts.photo_cards > 0 && self.photo_images.is_empty() {
            return Err(ConfigError::EmptyImagePool {
                count: self.counts.photo_cards,
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
