//! Core types and settings for the heading engine

use core::fmt;
use core::time::Duration;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::InvalidHeading;
use crate::math::{DEG_TO_RAD, normalize};

/// Default smoothing factor for the tilt-compensated magnetic heading
pub const MAGNETIC_SMOOTHING: f32 = 0.15;
/// Default smoothing factor for the planar compass
pub const PLANAR_SMOOTHING: f32 = 0.2;
/// Default gyroscope weight in the complementary filter
pub const COMPLEMENTARY_WEIGHT: f32 = 0.98;

/// Compass heading in degrees, always inside `[0, 360)`
///
/// # Example
/// ```
/// use heading_fusion::Heading;
///
/// let heading = Heading::new(-30.0);
/// assert_eq!(heading.degrees(), 330.0);
/// assert_eq!(Heading::new(359.6).rounded(), 0);
/// assert!(Heading::try_from(f32::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Heading(f32);

impl Heading {
    /// Due north
    pub const NORTH: Heading = Heading(0.0);

    /// Create a heading, wrapping `degrees` into `[0, 360)`
    ///
    /// Non-finite input has no direction and yields [`Heading::NORTH`]; use
    /// `Heading::try_from` to reject it instead.
    pub fn new(degrees: f32) -> Self {
        Self::try_from(degrees).unwrap_or(Self::NORTH)
    }

    /// Heading value in degrees
    pub fn degrees(self) -> f32 {
        self.0
    }

    /// Heading value in radians
    pub fn radians(self) -> f32 {
        self.0 * DEG_TO_RAD
    }

    /// Whole-degree display value in `0..360`
    pub fn rounded(self) -> u16 {
        (self.0.round() as u16) % 360
    }
}

impl TryFrom<f32> for Heading {
    type Error = InvalidHeading;

    fn try_from(degrees: f32) -> Result<Self, Self::Error> {
        if degrees.is_finite() {
            Ok(Self(normalize(degrees)))
        } else {
            Err(InvalidHeading(degrees))
        }
    }
}

impl From<Heading> for f32 {
    fn from(heading: Heading) -> Self {
        heading.0
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.rounded())
    }
}

/// Sample time on a monotonic clock with an arbitrary origin
///
/// Only differences between timestamps are meaningful, so any consistent
/// origin works: boot time, process start, or the first sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn from_micros(micros: u64) -> Self {
        Self(Duration::from_micros(micros))
    }

    /// Timestamp from fractional seconds, `None` if negative, non-finite or
    /// too large for a `Duration`
    pub fn from_secs_f64(seconds: f64) -> Option<Self> {
        Duration::try_from_secs_f64(seconds).ok().map(Self)
    }

    /// Time since the origin
    pub fn as_duration(self) -> Duration {
        self.0
    }

    /// Elapsed time since `earlier`, or `None` if `earlier` is later than `self`
    pub fn checked_since(self, earlier: Timestamp) -> Option<Duration> {
        self.0.checked_sub(earlier.0)
    }
}

impl From<Duration> for Timestamp {
    fn from(since_origin: Duration) -> Self {
        Self(since_origin)
    }
}

/// Gyroscope reading tagged with its arrival time
///
/// Angular rate is in radians per second. Only the `z` component, the rate
/// around the vertical axis of a device held flat, feeds the heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroSample {
    pub rate: Vector3<f32>,
    pub timestamp: Timestamp,
}

impl GyroSample {
    pub fn new(rate: Vector3<f32>, timestamp: Timestamp) -> Self {
        Self { rate, timestamp }
    }

    /// Sample carrying only the vertical-axis rate
    pub fn vertical(rate_z: f32, timestamp: Timestamp) -> Self {
        Self::new(Vector3::new(0.0, 0.0, rate_z), timestamp)
    }
}

/// Heading report from the platform positioning service
///
/// Platforms report a negative value or nothing when a heading is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadingReport {
    /// Heading relative to geographic north, in degrees
    pub true_heading: Option<f32>,
    /// Heading relative to magnetic north, in degrees
    pub magnetic_heading: Option<f32>,
}

/// Position fix from the platform positioning service
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionReport {
    /// Course over ground in degrees; negative while the device is stationary
    pub course: Option<f32>,
}

/// Inbound sample sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    Accelerometer,
    Magnetometer,
    Gyroscope,
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sensor::Accelerometer => "accelerometer",
            Sensor::Magnetometer => "magnetometer",
            Sensor::Gyroscope => "gyroscope",
        };
        f.write_str(name)
    }
}

/// How raw magnetometer vectors are turned into a heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompassMode {
    /// Project the field onto the plane normal to gravity before `atan2`
    ///
    /// Holds its heading while the device is tilted. Needs accelerometer data.
    #[default]
    TiltCompensated,
    /// Use the raw X/Y field components, offset by 90°
    ///
    /// Only valid with the device held flat, but needs no accelerometer.
    Planar,
}

/// Nominal sensor update intervals in milliseconds
///
/// The engine does not time anything itself; these are handed to whatever
/// drives the sensors so it can configure their sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorRates {
    pub magnetometer_ms: u64,
    pub accelerometer_ms: u64,
    pub gyroscope_ms: u64,
    /// Interval used when running the planar compass on its own
    pub planar_compass_ms: u64,
}

impl SensorRates {
    pub fn magnetometer(&self) -> Duration {
        Duration::from_millis(self.magnetometer_ms)
    }

    pub fn accelerometer(&self) -> Duration {
        Duration::from_millis(self.accelerometer_ms)
    }

    pub fn gyroscope(&self) -> Duration {
        Duration::from_millis(self.gyroscope_ms)
    }

    pub fn planar_compass(&self) -> Duration {
        Duration::from_millis(self.planar_compass_ms)
    }
}

impl Default for SensorRates {
    fn default() -> Self {
        Self {
            magnetometer_ms: 100,
            accelerometer_ms: 100,
            gyroscope_ms: 20,
            planar_compass_ms: 200,
        }
    }
}

/// Heading engine settings
///
/// # Example
/// ```
/// use heading_fusion::{CompassMode, FusionSettings};
///
/// let settings = FusionSettings {
///     compass_mode: CompassMode::Planar,
///     complementary_weight: 0.95,     // lean harder on the magnetometer
///     ..Default::default()
/// };
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionSettings {
    /// Magnetometer heading computation
    pub compass_mode: CompassMode,
    /// Low-pass factor for the tilt-compensated magnetic heading, in `(0, 1]`
    ///
    /// Smaller values reject more jitter but lag further behind rotation.
    pub magnetic_smoothing: f32,
    /// Low-pass factor for the planar compass, in `(0, 1]`
    pub planar_smoothing: f32,
    /// Gyroscope weight in the complementary filter, in `[0, 1]`
    ///
    /// Close to 1 follows the gyroscope for fast turns; lower values pull
    /// harder toward the magnetic reference.
    pub complementary_weight: f32,
    /// Nominal sensor update intervals
    pub sensor_rates: SensorRates,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            compass_mode: CompassMode::default(),
            magnetic_smoothing: MAGNETIC_SMOOTHING,
            planar_smoothing: PLANAR_SMOOTHING,
            complementary_weight: COMPLEMENTARY_WEIGHT,
            sensor_rates: SensorRates::default(),
        }
    }
}
