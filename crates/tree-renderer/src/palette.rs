//! Per-batch colours and sprite treatment

use tree_particles::{BACKGROUND, CARD_WHITE, EMERALD_DEEP, GOLD_HIGH, GOLD_MUTED, RED_VELVET};
use tree_simulation::BatchKind;

/// How the shader draws an instance
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    /// Round sparkle, gold centre fading to the base colour
    Sparkle = 0,
    /// Shaded sphere with a spinning accent band
    Sphere = 1,
    /// Oriented frame with a photo area in the accent colour
    Card = 2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStyle {
    pub color: [f32; 4],
    pub accent: [f32; 4],
    pub sprite: SpriteKind,
}

impl BatchStyle {
    pub fn for_batch(kind: BatchKind) -> Self {
        match kind {
            BatchKind::Foliage => Self {
                color: hex_to_linear(EMERALD_DEEP),
                accent: hex_to_linear(GOLD_HIGH),
                sprite: SpriteKind::Sparkle,
            },
            BatchKind::OrnamentsRed => Self {
                color: hex_to_linear(RED_VELVET),
                accent: hex_to_linear(GOLD_HIGH),
                sprite: SpriteKind::Sphere,
            },
            BatchKind::OrnamentsGold => Self {
                color: hex_to_linear(GOLD_HIGH),
                accent: hex_to_linear(GOLD_MUTED),
                sprite: SpriteKind::Sphere,
            },
            BatchKind::PhotoCards => Self {
                color: hex_to_linear(CARD_WHITE),
                accent: hex_to_linear(GOLD_MUTED),
                sprite: SpriteKind::Card,
            },
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// `0xRRGGBB` sRGB to linear RGBA with full alpha
pub fn hex_to_linear(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xFF) as f32 / 255.0);
    [channel(16), channel(8), channel(0), 1.0]
}

pub fn clear_color() -> wgpu::Color {
    let [r, g, b, a] = hex_to_linear(BACKGROUND);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_linear() {
        let close = |a: [f32; 4], b: [f32; 4]| a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-3);

        assert!(close(hex_to_linear(0xFFFFFF), [1.0, 1.0, 1.0, 1.0]));
        assert_eq!(hex_to_linear(0x000000), [0.0, 0.0, 0.0, 1.0]);

        // #FFD700: green 215/255 is about 0.6795 in linear
        let gold = hex_to_linear(GOLD_HIGH);
        assert!(close(gold, [1.0, 0.6795, 0.0, 1.0]), "{gold:?}");
    }

    #[test]
    fn each_batch_has_its_treatment() {
        assert_eq!(BatchStyle::for_batch(BatchKind::Foliage).sprite, SpriteKind::Sparkle);
        assert_eq!(BatchStyle::for_batch(BatchKind::OrnamentsGold).sprite, SpriteKind::Sphere);
        assert_eq!(BatchStyle::for_batch(BatchKind::PhotoCards).sprite, SpriteKind::Card);
        assert_ne!(
            BatchStyle::for_batch(BatchKind::OrnamentsRed).color,
            BatchStyle::for_batch(BatchKind::OrnamentsGold).color
        );
    }
}
