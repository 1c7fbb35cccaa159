//! Convergence parameters for runtime tuning

use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvergenceParams {
    // Base rates per class, multiplied by frame delta and particle speed
    pub foliage_rate: f32,
    pub ornament_rate: f32,
    pub card_rate: f32,

    /// Longest frame delta fed to the update, in seconds
    pub max_frame_delta: f32,

    /// Ornament spin around X and Y, radians per second
    pub ornament_spin: f32,

    /// Photo card tumble around X and Z while scattered, radians per second
    pub card_tumble: f32,
}

impl Default for ConvergenceParams {
    fn default() -> Self {
        Self {
            foliage_rate: 0.03 * 60.0,
            ornament_rate: 2.0,
            card_rate: 1.5,
            max_frame_delta: 0.1,
            ornament_spin: 0.5,
            card_tumble: 1.0,
        }
    }
}

impl ConvergenceParams {
    /// Same base rate for every class
    pub fn uniform(rate: f32) -> Self {
        Self {
            foliage_rate: rate,
            ornament_rate: rate,
            card_rate: rate,
            ..Self::default()
        }
    }

    /// Sanitise a raw frame delta: negatives and NaN become 0, large
    /// stalls are capped so particles don't pop.
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            dt.min(self.max_frame_delta)
        } else {
            0.0
        }
    }
}

/// Lerp factor for one step, kept in [0, 1] so a step never overshoots
pub fn convergence_factor(dt: f32, rate: f32, speed: f32) -> f32 {
    (dt * rate * speed).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_delta_handles_stalls_and_garbage() {
        let params = ConvergenceParams::default();
        assert_eq!(params.clamp_delta(0.016), 0.016);
        assert_eq!(params.clamp_delta(3.0), 0.1);
        assert_eq!(params.clamp_delta(-1.0), 0.0);
        assert_eq!(params.clamp_delta(f32::NAN), 0.0);
        assert_eq!(params.clamp_delta(f32::INFINITY), 0.0);
    }

    #[test]
    fn factor_never_exceeds_one() {
        assert_eq!(convergence_factor(0.1, 100.0, 1.5), 1.0);
        assert_eq!(convergence_factor(0.0, 2.0, 0.7), 0.0);
        assert!((convergence_factor(0.1, 2.0, 0.5) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn foliage_rate_matches_sixty_hz_lerp() {
        let params = ConvergenceParams::default();
        assert!((params.foliage_rate - 1.8).abs() < 1e-6);
    }
}
