//! Error types for sample handling and configuration

use core::time::Duration;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Sensor;

/// Reasons a sample is rejected
///
/// A rejected sample leaves every filter state exactly as it was, so one bad
/// reading can never poison later blends.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SampleError {
    #[error("{0} sample has a non-finite component")]
    NonFinite(Sensor),

    #[error("gyroscope timestamp went back by {0:?}")]
    TimestampRegression(Duration),
}

/// A non-finite value offered as a heading
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{0} is not a finite heading")]
pub struct InvalidHeading(pub f32);

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} = {value} is outside {expected}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
}
