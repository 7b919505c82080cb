use bevy::{color::HexColorError, prelude::*};
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

use crate::{sampler::SphereSampling, tween::Ease};

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid color: {0}")]
    Color(#[from] HexColorError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything tunable about the morph. Every field has a default so a config
/// file only needs to name what it changes.
#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct MorphConfig {
    pub(crate) particle_count: usize,
    /// Edge length of the cube the scattered set is drawn from
    pub(crate) scatter_extent: f32,
    pub(crate) sphere_radius: f32,
    pub(crate) sphere_sampling: SphereSampling,
    /// Fixed seed for reproducible layouts, OS entropy otherwise
    pub(crate) seed: Option<u64>,
    pub(crate) morph_duration: f32,
    pub(crate) ease: Ease,
    /// Height of the virtual scroll container in logical pixels
    pub(crate) content_height: f32,
    /// Pixels scrolled per wheel "line"
    pub(crate) line_height: f32,
    /// Radians around Y per frame
    pub(crate) spin_speed: f32,
    pub(crate) point_color: String,
    pub(crate) clear_color: String,
    pub(crate) camera_distance: f32,
    pub(crate) fov_degrees: f32,
    /// Let the timeline play on its own instead of waiting for scroll input
    pub(crate) autoplay: bool,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            particle_count: 5000,
            scatter_extent: 5.0,
            sphere_radius: 1.0,
            sphere_sampling: SphereSampling::Polar,
            seed: None,
            morph_duration: 1.0,
            ease: Ease::Power3Out,
            content_height: 3.0 * 1080.0,
            line_height: 40.0,
            spin_speed: 0.01,
            point_color: "#1113DB".to_string(),
            clear_color: "#FFFFFF".to_string(),
            camera_distance: 3.0,
            fov_degrees: 75.0,
            autoplay: false,
        }
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be a finite positive number, got {value}"
        )))
    }
}

impl MorphConfig {
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub(crate) fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::Invalid(
                "particle_count must be at least 1".to_string(),
            ));
        }
        positive("scatter_extent", self.scatter_extent)?;
        positive("sphere_radius", self.sphere_radius)?;
        positive("morph_duration", self.morph_duration)?;
        positive("line_height", self.line_height)?;
        positive("camera_distance", self.camera_distance)?;
        positive("fov_degrees", self.fov_degrees)?;
        if !self.content_height.is_finite() || self.content_height < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "content_height must be finite and non-negative, got {}",
                self.content_height
            )));
        }
        self.point_color()?;
        self.clear_color()?;
        Ok(())
    }

    pub(crate) fn point_color(&self) -> Result<Color, ConfigError> {
        Ok(Srgba::hex(&self.point_color)?.into())
    }

    pub(crate) fn clear_color(&self) -> Result<Color, ConfigError> {
        Ok(Srgba::hex(&self.clear_color)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MorphConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_count, 5000);
        assert_eq!(config.sphere_sampling, SphereSampling::Polar);
        assert_eq!(config.ease, Ease::Power3Out);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = MorphConfig::from_json(
            r#"{ "particle_count": 12, "sphere_sampling": "uniform", "seed": 7 }"#,
        )
        .unwrap();
        assert_eq!(config.particle_count, 12);
        assert_eq!(config.sphere_sampling, SphereSampling::Uniform);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.scatter_extent, 5.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            MorphConfig::from_json(r#"{ "particle_count": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            MorphConfig::from_json(r#"{ "sphere_radius": -1.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            MorphConfig::from_json(r#"{ "point_color": "not a color" }"#),
            Err(ConfigError::Color(_))
        ));
        assert!(matches!(
            MorphConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            MorphConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
