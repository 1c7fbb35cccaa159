//! Scene constants for the holiday tree
//!
//! Dimensions are in world units. The tree is a cone standing on the XZ plane
//! with its base at `TREE_Y_OFFSET` and its apex `TREE_HEIGHT` above that.

/// Height of the cone from base to apex
pub const TREE_HEIGHT: f32 = 18.0;

/// Radius of the cone at its base
pub const TREE_RADIUS_BOTTOM: f32 = 8.0;

/// Vertical position of the cone base
pub const TREE_Y_OFFSET: f32 = -8.0;

/// Radius of the filled sphere particles scatter into
pub const CHAOS_RADIUS: f32 = 35.0;

// Particle counts
pub const FOLIAGE_COUNT: usize = 4500;
pub const ORNAMENT_COUNT: usize = 150;
pub const PHOTO_CARD_COUNT: usize = 12;

/// Upper bound on the particles of one scene, across all classes
pub const MAX_PARTICLES: usize = 1_000_000;

/// How far photo cards stick out past the cone surface
pub const CARD_SURFACE_OFFSET: f32 = 0.5;

/// Full turns the photo card spiral makes from base to apex
pub const CARD_SPIRAL_TURNS: f32 = 3.0;

/// Foliage sprite size: `U[0,1) * FOLIAGE_SIZE_SPAN + FOLIAGE_SIZE_MIN`
pub const FOLIAGE_SIZE_MIN: f32 = 0.05;
pub const FOLIAGE_SIZE_SPAN: f32 = 0.15;

/// Foliage is light and responds fast: speed in [0.5, 1.5)
pub const FOLIAGE_SPEED_MIN: f32 = 0.5;
pub const FOLIAGE_SPEED_SPAN: f32 = 1.0;

/// Ornament radius: `U[0,1) * ORNAMENT_SIZE_SPAN + ORNAMENT_SIZE_MIN`
pub const ORNAMENT_SIZE_MIN: f32 = 0.2;
pub const ORNAMENT_SIZE_SPAN: f32 = 0.3;

/// Ornaments are heavier: speed in [0.2, 0.7)
pub const ORNAMENT_SPEED_MIN: f32 = 0.2;
pub const ORNAMENT_SPEED_SPAN: f32 = 0.5;

/// Photo cards share a fixed scale and speed
pub const PHOTO_CARD_SIZE: f32 = 1.0;
pub const PHOTO_CARD_SPEED: f32 = 0.8;

/// Default photo pool, cycled through by card index
pub const PHOTO_IMAGES: [&str; 12] = [
    "https://picsum.photos/id/10/200/200",
    "https://picsum.photos/id/15/200/200",
    "https://picsum.photos/id/25/200/200",
    "https://picsum.photos/id/42/200/200",
    "https://picsum.photos/id/56/200/200",
    "https://picsum.photos/id/102/200/200",
    "https://picsum.photos/id/106/200/200",
    "https://picsum.photos/id/111/200/200",
    "https://picsum.photos/id/146/200/200",
    "https://picsum.photos/id/158/200/200",
    "https://picsum.photos/id/184/200/200",
    "https://picsum.photos/id/211/200/200",
];

// Palette (sRGB hex)
pub const EMERALD_DEEP: u32 = 0x002816;
pub const GOLD_HIGH: u32 = 0xFFD700;
pub const GOLD_MUTED: u32 = 0xC5A000;
pub const RED_VELVET: u32 = 0x800020;
pub const CARD_WHITE: u32 = 0xFFFFFF;
pub const BACKGROUND: u32 = 0x010502;
