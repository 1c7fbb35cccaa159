//! Particle records for the tree scene
//!
//! Every particle carries two fixed resting positions: one in the scattered
//! sphere and one on the tree. Records are validated once at construction and
//! never change afterwards; the runtime position lives in the simulation.

use glam::Vec3;
use thiserror::Error;

/// Errors raised while constructing a particle record
#[derive(Debug, Error, PartialEq)]
pub enum ParticleError {
    #[error("particle {id}: size must be positive and finite, got {size}")]
    InvalidSize { id: u32, size: f32 },

    #[error("particle {id}: speed must be positive and finite, got {speed}")]
    InvalidSpeed { id: u32, speed: f32 },

    #[error("particle {id}: {which} position is not finite")]
    NonFinitePosition { id: u32, which: &'static str },
}

/// Which of the two ornament colour groups an ornament belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrnamentGroup {
    RedVelvet,
    Gold,
}

impl OrnamentGroup {
    /// Even ornament indices are red, odd ones gold
    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 {
            OrnamentGroup::RedVelvet
        } else {
            OrnamentGroup::Gold
        }
    }
}

/// Class-specific data for a particle
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleKind {
    Leaf,
    Ornament { group: OrnamentGroup },
    PhotoCard { image: String },
}

/// Particle class without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleClass {
    Leaf,
    Ornament,
    PhotoCard,
}

impl ParticleKind {
    pub fn class(&self) -> ParticleClass {
        match self {
            ParticleKind::Leaf => ParticleClass::Leaf,
            ParticleKind::Ornament { .. } => ParticleClass::Ornament,
            ParticleKind::PhotoCard { .. } => ParticleClass::PhotoCard,
        }
    }
}

/// Immutable particle record
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    id: u32,
    chaos_position: Vec3,
    target_position: Vec3,
    size: f32,
    speed: f32,
    kind: ParticleKind,
}

impl Particle {
    pub fn new(
        id: u32,
        chaos_position: Vec3,
        target_position: Vec3,
        size: f32,
        speed: f32,
        kind: ParticleKind,
    ) -> Result<Self, ParticleError> {
        if !(size.is_finite() && size > 0.0) {
            return Err(ParticleError::InvalidSize { id, size });
        }
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ParticleError::InvalidSpeed { id, speed });
        }
        if !chaos_position.is_finite() {
            return Err(ParticleError::NonFinitePosition { id, which: "chaos" });
        }
        if !target_position.is_finite() {
            return Err(ParticleError::NonFinitePosition { id, which: "target" });
        }

        Ok(Self {
            id,
            chaos_position,
            target_position,
            size,
            speed,
            kind,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Resting position in the scattered configuration
    pub fn chaos_position(&self) -> Vec3 {
        self.chaos_position
    }

    /// Resting position on the tree
    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Convergence speed multiplier, always > 0
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn kind(&self) -> &ParticleKind {
        &self.kind
    }

    pub fn class(&self) -> ParticleClass {
        self.kind.class()
    }

    /// Image reference, present only for photo cards
    pub fn image(&self) -> Option<&str> {
        match &self.kind {
            ParticleKind::PhotoCard { image } => Some(image),
            _ => None,
        }
    }
}
