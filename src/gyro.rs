//! Vertical-axis gyroscope integration

use crate::error::SampleError;
use crate::math::RAD_TO_DEG;
use crate::types::{Heading, Sensor, Timestamp};

/// Integrates angular rate around the vertical axis into a heading
///
/// The step size comes from the gap between consecutive sample timestamps.
/// The first sample only seeds the clock, since a rate over an unknown
/// interval says nothing about rotation. Integration drifts without bound;
/// [`ComplementaryFilter`](crate::ComplementaryFilter) corrects it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GyroIntegrator {
    heading: Heading,
    last_timestamp: Option<Timestamp>,
}

impl GyroIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate one angular rate sample (rad/s) taken at `now`
    ///
    /// Returns the integrated heading. Non-finite rates and timestamps
    /// earlier than the previous sample are rejected without touching the
    /// state.
    ///
    /// # Example
    /// ```
    /// use heading_fusion::{GyroIntegrator, Timestamp};
    ///
    /// let mut gyro = GyroIntegrator::new();
    /// let quarter_turn = core::f32::consts::FRAC_PI_2;
    ///
    /// gyro.integrate(quarter_turn, Timestamp::from_millis(0)).unwrap();
    /// let heading = gyro.integrate(quarter_turn, Timestamp::from_millis(1_000)).unwrap();
    /// assert!((heading.degrees() - 90.0).abs() < 1e-3);
    /// ```
    pub fn integrate(&mut self, rate_z: f32, now: Timestamp) -> Result<Heading, SampleError> {
        if !rate_z.is_finite() {
            return Err(SampleError::NonFinite(Sensor::Gyroscope));
        }

        let delta_time = match self.last_timestamp {
            Some(last) => now
                .checked_since(last)
                .ok_or_else(|| {
                    SampleError::TimestampRegression(last.as_duration() - now.as_duration())
                })?
                .as_secs_f32(),
            None => 0.0,
        };

        let delta = rate_z * RAD_TO_DEG * delta_time;
        self.heading = Heading::new(self.heading.degrees() + delta);
        self.last_timestamp = Some(now);
        Ok(self.heading)
    }

    /// Current integrated heading
    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// Timestamp of the last accepted sample
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.last_timestamp
    }

    /// Continue integrating from `heading`, keeping the sample clock
    pub fn rebase(&mut self, heading: Heading) {
        self.heading = heading;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
