//! Application configuration loaded from `TREE_CONFIG`

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;
use tree_control::ControlConfig;
use tree_particles::SceneConfig;
use tree_simulation::ConvergenceParams;

/// Env var naming an optional JSON config file
pub const CONFIG_ENV: &str = "TREE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scene: SceneConfig,
    pub convergence: ConvergenceParams,
    pub control: ControlConfig,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json).context("malformed config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scene.validate()?;

        let c = &self.convergence;
        for (name, rate) in [
            ("foliage_rate", c.foliage_rate),
            ("ornament_rate", c.ornament_rate),
            ("card_rate", c.card_rate),
        ] {
            ensure!(
                rate.is_finite() && rate >= 0.0,
                "convergence {name} must be non-negative, got {rate}"
            );
        }
        ensure!(
            c.max_frame_delta.is_finite() && c.max_frame_delta > 0.0,
            "max_frame_delta must be positive, got {}",
            c.max_frame_delta
        );
        ensure!(
            c.ornament_spin.is_finite() && c.card_tumble.is_finite(),
            "rotation speeds must be finite"
        );
        Ok(())
    }

    /// Read the file named by `TREE_CONFIG`. Unset or missing file gives the
    /// defaults; a file that exists but does not parse is an error.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!("Config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config =
            Self::from_json_str(&text).with_context(|| format!("invalid config {}", path.display()))?;
        log::info!("✓ Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_control::BackendChoice;
    use tree_simulation::TreeState;

    #[test]
    fn empty_document_is_all_defaults() {
        assert_eq!(AppConfig::from_json_str("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn sections_override_independently() {
        let config = AppConfig::from_json_str(
            r#"{
                "scene": { "seed": 7, "counts": { "foliage": 100 } },
                "convergence": { "ornament_rate": 4.0 },
                "control": { "backend": "none", "initial_state": "CHAOS" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.scene.seed, Some(7));
        assert_eq!(config.scene.counts.foliage, 100);
        assert_eq!(config.scene.counts.ornaments, 150);
        assert_eq!(config.convergence.ornament_rate, 4.0);
        assert_eq!(config.convergence.card_rate, 1.5);
        assert_eq!(config.control.backend, BackendChoice::None);
        assert_eq!(config.control.initial_state, TreeState::Chaos);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::from_json_str(r#"{ "scene": { "chaos_radius": -1.0 } }"#).is_err());
        assert!(
            AppConfig::from_json_str(r#"{ "convergence": { "max_frame_delta": 0.0 } }"#).is_err()
        );
        assert!(AppConfig::from_json_str(r#"{ "scene": "#).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_path(Path::new("/definitely/not/here/tree.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
