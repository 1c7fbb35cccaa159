//! One-shot construction of the full particle set
//!
//! Ids are assigned in generation order: foliage first, then ornaments, then
//! photo cards, so they stay unique for any configured counts.

use crate::config::{ConfigError, SceneConfig};
use crate::constants::*;
use crate::particle::{OrnamentGroup, Particle, ParticleError, ParticleKind};
use crate::sampler::{sample_cone_surface, sample_filled_sphere, spiral_point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Particle(#[from] ParticleError),
}

/// The four disjoint particle collections of a scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSet {
    pub foliage: Vec<Particle>,
    pub ornaments_red: Vec<Particle>,
    pub ornaments_gold: Vec<Particle>,
    pub photo_cards: Vec<Particle>,
}

impl ParticleSet {
    /// Build from the configured seed, or from OS entropy when none is set.
    ///
    /// Without a seed every build produces a different layout. That is
    /// acceptable for the visuals; set `seed` when reproducibility matters.
    pub fn build(config: &SceneConfig) -> Result<Self, BuildError> {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        log::debug!("Particle generation seed: {}", seed);
        Self::build_seeded(config, seed)
    }

    pub fn build_seeded(config: &SceneConfig, seed: u64) -> Result<Self, BuildError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::build_with_rng(config, &mut rng)
    }

    pub fn build_with_rng<R: Rng + ?Sized>(
        config: &SceneConfig,
        rng: &mut R,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        let counts = &config.counts;

        let mut set = ParticleSet {
            foliage: Vec::with_capacity(counts.foliage),
            ornaments_red: Vec::with_capacity(counts.ornaments.div_ceil(2)),
            ornaments_gold: Vec::with_capacity(counts.ornaments / 2),
            photo_cards: Vec::with_capacity(counts.photo_cards),
        };
        let mut next_id = 0u32;

        // Foliage
        for _ in 0..counts.foliage {
            let h = rng.random::<f32>();
            set.foliage.push(Particle::new(
                next_id,
                sample_filled_sphere(rng, config.chaos_radius),
                sample_cone_surface(rng, &config.tree, h),
                rng.random::<f32>() * FOLIAGE_SIZE_SPAN + FOLIAGE_SIZE_MIN,
                rng.random::<f32>() * FOLIAGE_SPEED_SPAN + FOLIAGE_SPEED_MIN,
                ParticleKind::Leaf,
            )?);
            next_id += 1;
        }

        // Ornaments
        for i in 0..counts.ornaments {
            let h = rng.random::<f32>();
            let group = OrnamentGroup::from_index(i);
            let particle = Particle::new(
                next_id,
                sample_filled_sphere(rng, config.chaos_radius),
                sample_cone_surface(rng, &config.tree, h),
                rng.random::<f32>() * ORNAMENT_SIZE_SPAN + ORNAMENT_SIZE_MIN,
                rng.random::<f32>() * ORNAMENT_SPEED_SPAN + ORNAMENT_SPEED_MIN,
                ParticleKind::Ornament { group },
            )?;
            match group {
                OrnamentGroup::RedVelvet => set.ornaments_red.push(particle),
                OrnamentGroup::Gold => set.ornaments_gold.push(particle),
            }
            next_id += 1;
        }

        // Photo cards on a rising spiral
        for i in 0..counts.photo_cards {
            let h = i as f32 / counts.photo_cards as f32;
            let image = config.photo_images[i % config.photo_images.len()].clone();
            set.photo_cards.push(Particle::new(
                next_id,
                sample_filled_sphere(rng, config.chaos_radius),
                spiral_point(
                    &config.tree,
                    h,
                    config.card_surface_offset,
                    config.card_spiral_turns,
                ),
                PHOTO_CARD_SIZE,
                PHOTO_CARD_SPEED,
                ParticleKind::PhotoCard { image },
            )?);
            next_id += 1;
        }

        log::info!(
            "✓ Built {} foliage, {} + {} ornaments, {} photo cards from {} images",
            set.foliage.len(),
            set.ornaments_red.len(),
            set.ornaments_gold.len(),
            set.photo_cards.len(),
            config.photo_images.len()
        );

        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.foliage.len()
            + self.ornaments_red.len()
            + self.ornaments_gold.len()
            + self.photo_cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All particles in id order
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        let mut ornaments: Vec<&Particle> = self
            .ornaments_red
            .iter()
            .chain(self.ornaments_gold.iter())
            .collect();
        ornaments.sort_by_key(|p| p.id());

        self.foliage
            .iter()
            .chain(ornaments)
            .chain(self.photo_cards.iter())
    }
}
