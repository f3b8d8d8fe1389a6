//! Single-owner heading engine wiring the filters together

use nalgebra::Vector3;
use tracing::{debug, trace, warn};

use crate::aggregator::{HeadingAggregator, HeadingSnapshot};
use crate::compass::{PlanarCompass, TiltCompensatedFilter};
use crate::complementary::ComplementaryFilter;
use crate::error::{ConfigError, SampleError};
use crate::gravity::GravityTracker;
use crate::types::{
    CompassMode, FusionSettings, GyroSample, Heading, HeadingReport, PositionReport,
};

/// Heading engine
///
/// Owns every piece of filter state. Each handler is the only writer of the
/// state it touches: accelerometer samples write gravity, magnetometer
/// samples write the magnetic reference, gyroscope samples write the
/// calculated heading. Cross-filter reads go through accessors.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use heading_fusion::{GyroSample, HeadingEngine, Timestamp};
///
/// let mut engine = HeadingEngine::new();
///
/// engine.on_accelerometer(Vector3::new(0.0, 0.0, 1.0)).unwrap();
/// engine.on_magnetometer(Vector3::new(-1.0, 0.0, 0.0)).unwrap();
/// engine.on_gyroscope(GyroSample::vertical(0.0, Timestamp::from_millis(0))).unwrap();
///
/// let headings = engine.snapshot();
/// assert!(headings.magnetic.degrees() > 0.0);
/// assert_eq!(headings.satellite, None);
/// ```
#[derive(Debug, Clone)]
pub struct HeadingEngine {
    settings: FusionSettings,
    gravity: GravityTracker,
    tilt_compass: TiltCompensatedFilter,
    planar_compass: PlanarCompass,
    fusion: ComplementaryFilter,
    headings: HeadingAggregator,
}

impl HeadingEngine {
    /// Create an engine with default settings
    pub fn new() -> Self {
        Self::build(FusionSettings::default())
    }

    /// Create an engine with the given settings, validating them first
    pub fn with_settings(settings: FusionSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: FusionSettings) -> Self {
        debug!(?settings, "Creating heading engine");
        Self {
            settings,
            gravity: GravityTracker::new(),
            tilt_compass: TiltCompensatedFilter::with_smoothing(settings.magnetic_smoothing),
            planar_compass: PlanarCompass::with_smoothing(settings.planar_smoothing),
            fusion: ComplementaryFilter::with_weight(settings.complementary_weight),
            headings: HeadingAggregator::new(),
        }
    }

    /// Return every filter to its initial state
    pub fn reset(&mut self) {
        debug!("Resetting heading engine");
        self.gravity.reset();
        self.tilt_compass.reset();
        self.planar_compass.reset();
        self.fusion.reset();
        self.headings.reset();
    }

    /// Get current engine settings
    pub fn settings(&self) -> FusionSettings {
        self.settings
    }

    /// Replace the settings, keeping the current headings
    ///
    /// Switching `compass_mode` seeds the newly active magnetic filter with
    /// the current magnetic reference, so neither the magnetic heading nor
    /// the calculated heading anchored to it jumps.
    pub fn set_settings(&mut self, settings: FusionSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        if settings.compass_mode != self.settings.compass_mode {
            let reference = self.magnetic_reference();
            match settings.compass_mode {
                CompassMode::TiltCompensated => self.tilt_compass.rebase(reference),
                CompassMode::Planar => self.planar_compass.rebase(reference),
            }
            debug!(
                mode = ?settings.compass_mode,
                reference = reference.degrees(),
                "Compass mode switched"
            );
        }
        self.settings = settings;
        self.tilt_compass.set_smoothing(settings.magnetic_smoothing);
        self.planar_compass.set_smoothing(settings.planar_smoothing);
        self.fusion.set_weight(settings.complementary_weight);
        Ok(())
    }

    /// Record an accelerometer sample (g) as the current gravity direction
    pub fn on_accelerometer(&mut self, accelerometer: Vector3<f32>) -> Result<(), SampleError> {
        self.gravity.update(accelerometer).inspect_err(|err| {
            warn!(%err, ?accelerometer, "Rejected accelerometer sample");
        })
    }

    /// Update the magnetic heading from a magnetometer sample
    pub fn on_magnetometer(&mut self, magnetometer: Vector3<f32>) -> Result<Heading, SampleError> {
        let result = match self.settings.compass_mode {
            CompassMode::TiltCompensated => {
                self.tilt_compass.update(self.gravity.gravity(), magnetometer)
            }
            CompassMode::Planar => self.planar_compass.update(magnetometer),
        };

        let heading = result.inspect_err(|err| {
            warn!(%err, ?magnetometer, "Rejected magnetometer sample");
        })?;
        self.headings.update_magnetic(heading);
        trace!(magnetic = heading.degrees(), "Magnetic heading updated");
        Ok(heading)
    }

    /// Update the calculated heading from a gyroscope sample
    ///
    /// Uses the vertical rate (`z`) and the current magnetic reference.
    pub fn on_gyroscope(&mut self, sample: GyroSample) -> Result<Heading, SampleError> {
        let reference = self.magnetic_reference();
        let heading = self
            .fusion
            .update(sample.rate.z, sample.timestamp, reference)
            .inspect_err(|err| {
                warn!(%err, rate_z = sample.rate.z, "Rejected gyroscope sample");
            })?;

        self.headings.update_calculated(heading);
        trace!(calculated = heading.degrees(), "Calculated heading updated");
        Ok(heading)
    }

    /// Pass a positioning heading report through to the true-north heading
    pub fn on_heading_report(&mut self, report: HeadingReport) -> Heading {
        let heading = self.headings.update_true_north(&report);
        trace!(true_north = heading.degrees(), "True-north heading updated");
        heading
    }

    /// Pass a position fix through to the satellite heading
    ///
    /// Returns the satellite heading, which stays `None` until the first
    /// fix with a valid course.
    pub fn on_position_report(&mut self, report: PositionReport) -> Option<Heading> {
        if self.headings.update_satellite(&report) {
            trace!(course = ?report.course, "Satellite heading updated");
        }
        self.headings.snapshot().satellite
    }

    /// Current gravity estimate
    pub fn gravity(&self) -> Vector3<f32> {
        self.gravity.gravity()
    }

    /// Smoothed magnetic heading used to anchor the calculated heading
    pub fn magnetic_reference(&self) -> Heading {
        match self.settings.compass_mode {
            CompassMode::TiltCompensated => self.tilt_compass.heading(),
            CompassMode::Planar => self.planar_compass.heading(),
        }
    }

    /// Latest values of all four headings
    pub fn snapshot(&self) -> HeadingSnapshot {
        self.headings.snapshot()
    }
}

impl Default for HeadingEngine {
    fn default() -> Self {
        Self::new()
    }
}
