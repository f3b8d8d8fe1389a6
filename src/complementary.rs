//! Complementary fusion of gyroscope and magnetic headings

use crate::error::SampleError;
use crate::gyro::GyroIntegrator;
use crate::math::shortest_delta;
use crate::types::{COMPLEMENTARY_WEIGHT, Heading, Timestamp};

/// Blend a gyro-integrated heading with the magnetic reference
///
/// `weight * gyro + (1 - weight) * (gyro - shortest_delta(gyro, magnetic))`
///
/// The second term is the magnetic reference unwrapped next to `gyro`, so
/// the pull toward it always takes the short way across north. A weight
/// near 1 follows the gyroscope through quick turns; lower weights anchor
/// harder to the magnetometer.
///
/// # Example
/// ```
/// use heading_fusion::{Heading, fuse};
///
/// let fused = fuse(Heading::new(10.0), Heading::new(350.0), 0.5);
/// assert!(fused.degrees().abs() < 1e-4 || (fused.degrees() - 360.0).abs() < 1e-4);
/// ```
pub fn fuse(gyro: Heading, magnetic: Heading, weight: f32) -> Heading {
    let gyro = gyro.degrees();
    let magnetic_near_gyro = gyro - shortest_delta(gyro, magnetic.degrees());
    Heading::new(weight * gyro + (1.0 - weight) * magnetic_near_gyro)
}

/// Drift-corrected heading from gyroscope samples and a magnetic reference
///
/// Each gyroscope sample is integrated from the previous fused heading and
/// then blended with the magnetic reference by [`fuse`]. Feeding the fused
/// value back into the integrator is what removes drift: with the device
/// still, every sample closes `1 - weight` of the remaining gap.
#[derive(Debug, Clone, Copy)]
pub struct ComplementaryFilter {
    weight: f32,
    integrator: GyroIntegrator,
}

impl ComplementaryFilter {
    pub fn new() -> Self {
        Self::with_weight(COMPLEMENTARY_WEIGHT)
    }

    /// Create a filter with the given gyroscope weight in `[0, 1]`
    pub fn with_weight(weight: f32) -> Self {
        Self {
            weight,
            integrator: GyroIntegrator::new(),
        }
    }

    /// Process one vertical-axis rate sample (rad/s) taken at `now`
    ///
    /// Returns the new calculated heading. Rejected samples leave both the
    /// heading and the sample clock unchanged.
    ///
    /// # Example
    /// ```
    /// use heading_fusion::{ComplementaryFilter, Heading, Timestamp};
    ///
    /// let mut filter = ComplementaryFilter::new();
    /// let magnetic = Heading::new(100.0);
    ///
    /// let heading = filter.update(0.0, Timestamp::from_millis(0), magnetic).unwrap();
    /// assert!((heading.degrees() - 2.0).abs() < 1e-3);
    /// ```
    pub fn update(
        &mut self,
        rate_z: f32,
        now: Timestamp,
        magnetic_reference: Heading,
    ) -> Result<Heading, SampleError> {
        let integrated = self.integrator.integrate(rate_z, now)?;
        let fused = fuse(integrated, magnetic_reference, self.weight);
        self.integrator.rebase(fused);
        Ok(fused)
    }

    /// Current calculated heading
    pub fn heading(&self) -> Heading {
        self.integrator.heading()
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub fn reset(&mut self) {
        self.integrator.reset();
    }
}

impl Default for ComplementaryFilter {
    fn default() -> Self {
        Self::new()
    }
}
