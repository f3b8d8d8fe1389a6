//! Loading and validating [`FusionSettings`] from TOML

use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;
use crate::types::FusionSettings;

impl FusionSettings {
    /// Parse settings from a TOML document
    ///
    /// Missing keys fall back to their defaults. The result is validated.
    ///
    /// # Example
    /// ```
    /// use heading_fusion::{CompassMode, FusionSettings};
    ///
    /// let settings = FusionSettings::from_toml_str(r#"
    ///     compass_mode = "planar"
    ///     complementary_weight = 0.9
    ///
    ///     [sensor_rates]
    ///     gyroscope_ms = 10
    /// "#).unwrap();
    ///
    /// assert_eq!(settings.compass_mode, CompassMode::Planar);
    /// assert_eq!(settings.magnetic_smoothing, 0.15);
    /// assert_eq!(settings.sensor_rates.gyroscope_ms, 10);
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings: FusionSettings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&contents)?;
        debug!(?path, ?settings, "Loaded fusion settings");
        Ok(settings)
    }

    /// Check every tunable against its valid range
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_smoothing("magnetic_smoothing", self.magnetic_smoothing)?;
        check_smoothing("planar_smoothing", self.planar_smoothing)?;

        let weight = self.complementary_weight;
        if !(0.0..=1.0).contains(&weight) {
            return Err(ConfigError::OutOfRange {
                field: "complementary_weight",
                value: weight,
                expected: "[0, 1]",
            });
        }
        Ok(())
    }
}

fn check_smoothing(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "(0, 1]",
        })
    }
}
