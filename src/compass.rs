//! Magnetometer heading filters
//!
//! Two ways of turning a raw magnetic field vector into a smoothed compass
//! heading:
//!
//! - [`TiltCompensatedFilter`] projects the field onto the plane normal to
//!   gravity first, so the heading holds while the device is tilted.
//! - [`PlanarCompass`] reads the X/Y field components directly and is only
//!   valid with the device held flat, but needs no accelerometer.
//!
//! Both smooth with [`circular_blend`](crate::circular_blend) so the reading
//! crosses north without swinging the long way round.

use nalgebra::Vector3;

use crate::error::SampleError;
use crate::math::{RAD_TO_DEG, Vector3Ext, circular_blend, normalize};
use crate::types::{Heading, MAGNETIC_SMOOTHING, PLANAR_SMOOTHING, Sensor};

/// Offset aligning the planar `atan2` reading with the tilt-compensated one
const PLANAR_OFFSET: f32 = 90.0;

/// Calculate the unsmoothed tilt-compensated heading in degrees
///
/// Gravity is normalised first; a zero vector (no accelerometer sample yet)
/// is divided by one instead, which leaves the projection degenerate until
/// real gravity data arrives. The horizontal components come from the cross
/// product of the field with gravity:
///
/// `hx = my*gz - mz*gy`, `hy = mz*gx - mx*gz`, heading `= atan2(hy, hx)`.
///
/// # Returns
/// Heading angle in degrees (range: 0° to 360°)
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use heading_fusion::compass::tilt_compensated_heading;
///
/// let gravity = Vector3::new(0.0, 0.0, 1.0);      // lying flat
/// let field = Vector3::new(1.0, 0.0, 0.0);
/// let heading = tilt_compensated_heading(gravity, field);
/// assert!((heading - 270.0).abs() < 1e-4);
/// ```
pub fn tilt_compensated_heading(gravity: Vector3<f32>, magnetometer: Vector3<f32>) -> f32 {
    let g = gravity / gravity.norm_or_one();
    let m = magnetometer;

    let hx = m.y * g.z - m.z * g.y;
    let hy = m.z * g.x - m.x * g.z;

    normalize(hy.atan2(hx) * RAD_TO_DEG)
}

/// Calculate the unsmoothed heading of a device held flat, in degrees
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use heading_fusion::compass::planar_heading;
///
/// let heading = planar_heading(Vector3::new(0.0, -1.0, 0.0));
/// assert!(heading_fusion::shortest_delta(heading, 0.0).abs() < 1e-4);
/// ```
pub fn planar_heading(magnetometer: Vector3<f32>) -> f32 {
    normalize(magnetometer.y.atan2(magnetometer.x) * RAD_TO_DEG + PLANAR_OFFSET)
}

/// Smoothed tilt-compensated magnetic heading
///
/// Holds the running heading that the complementary filter uses as its
/// magnetic reference.
#[derive(Debug, Clone, Copy)]
pub struct TiltCompensatedFilter {
    smoothing: f32,
    heading: Heading,
}

impl TiltCompensatedFilter {
    pub fn new() -> Self {
        Self::with_smoothing(MAGNETIC_SMOOTHING)
    }

    /// Create a filter with the given low-pass factor in `(0, 1]`
    pub fn with_smoothing(smoothing: f32) -> Self {
        Self {
            smoothing,
            heading: Heading::NORTH,
        }
    }

    /// Process one magnetometer sample against the current gravity estimate
    ///
    /// Returns the new smoothed heading. A non-finite field vector is rejected
    /// and the previous heading kept.
    ///
    /// # Example
    /// ```
    /// use nalgebra::Vector3;
    /// use heading_fusion::compass::TiltCompensatedFilter;
    ///
    /// let mut filter = TiltCompensatedFilter::new();
    /// let gravity = Vector3::new(0.0, 0.0, 1.0);
    /// let heading = filter.update(gravity, Vector3::new(1.0, 0.0, 0.0)).unwrap();
    ///
    /// // First step from north toward 270° along the short arc.
    /// assert!((heading.degrees() - 346.5).abs() < 1e-3);
    /// ```
    pub fn update(
        &mut self,
        gravity: Vector3<f32>,
        magnetometer: Vector3<f32>,
    ) -> Result<Heading, SampleError> {
        if !magnetometer.is_finite() {
            return Err(SampleError::NonFinite(Sensor::Magnetometer));
        }

        let raw = tilt_compensated_heading(gravity, magnetometer);
        self.heading = Heading::new(circular_blend(self.heading.degrees(), raw, self.smoothing));
        Ok(self.heading)
    }

    /// Current smoothed heading
    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing;
    }

    /// Continue smoothing from `heading`
    pub fn rebase(&mut self, heading: Heading) {
        self.heading = heading;
    }

    pub fn reset(&mut self) {
        self.heading = Heading::NORTH;
    }
}

impl Default for TiltCompensatedFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Smoothed heading from the horizontal field components only
#[derive(Debug, Clone, Copy)]
pub struct PlanarCompass {
    smoothing: f32,
    heading: Heading,
}

impl PlanarCompass {
    pub fn new() -> Self {
        Self::with_smoothing(PLANAR_SMOOTHING)
    }

    pub fn with_smoothing(smoothing: f32) -> Self {
        Self {
            smoothing,
            heading: Heading::NORTH,
        }
    }

    /// Process one magnetometer sample, returning the new smoothed heading
    pub fn update(&mut self, magnetometer: Vector3<f32>) -> Result<Heading, SampleError> {
        if !magnetometer.is_finite() {
            return Err(SampleError::NonFinite(Sensor::Magnetometer));
        }

        let raw = planar_heading(magnetometer);
        self.heading = Heading::new(circular_blend(self.heading.degrees(), raw, self.smoothing));
        Ok(self.heading)
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing;
    }

    /// Continue smoothing from `heading`
    pub fn rebase(&mut self, heading: Heading) {
        self.heading = heading;
    }

    pub fn reset(&mut self) {
        self.heading = Heading::NORTH;
    }
}

impl Default for PlanarCompass {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> Vector3<f32> {
        Vector3::new(0.0, 0.0, 1.0)
    }

    fn assert_heading(actual: f32, expected: f32, label: &str) {
        let error = crate::math::shortest_delta(actual, expected).abs();
        assert!(
            error < 1e-3,
            "{} heading should be ~{}°, got {}",
            label,
            expected,
            actual
        );
    }

    #[test]
    fn test_tilt_compensated_level_directions() {
        assert_heading(tilt_compensated_heading(level(), Vector3::new(0.0, 1.0, 0.0)), 0.0, "+Y");
        assert_heading(tilt_compensated_heading(level(), Vector3::new(-1.0, 0.0, 0.0)), 90.0, "-X");
        assert_heading(tilt_compensated_heading(level(), Vector3::new(0.0, -1.0, 0.0)), 180.0, "-Y");
        assert_heading(tilt_compensated_heading(level(), Vector3::new(1.0, 0.0, 0.0)), 270.0, "+X");
    }

    #[test]
    fn test_tilt_compensation() {
        // Field pointing along +Y with a downward dip.
        let field: Vector3<f32> = Vector3::new(0.0, 1.0, -0.5);
        let level_heading = tilt_compensated_heading(level(), field);

        let (sin, cos) = 30.0f32.to_radians().sin_cos();

        // 30° pitch about the X axis
        let pitched_gravity = Vector3::new(0.0, sin, cos);
        let pitched_field = Vector3::new(
            0.0,
            field.y * cos + field.z * sin,
            -field.y * sin + field.z * cos,
        );
        let pitched_heading = tilt_compensated_heading(pitched_gravity, pitched_field);

        // 30° roll about the Y axis
        let rolled_gravity = Vector3::new(-sin, 0.0, cos);
        let rolled_field = Vector3::new(
            field.x * cos - field.z * sin,
            field.y,
            field.x * sin + field.z * cos,
        );
        let rolled_heading = tilt_compensated_heading(rolled_gravity, rolled_field);

        assert_heading(level_heading, 0.0, "level");
        assert_heading(pitched_heading, level_heading, "pitched");
        assert_heading(rolled_heading, level_heading, "rolled");
    }

    #[test]
    fn test_gravity_magnitude_is_irrelevant() {
        let field = Vector3::new(0.3, -0.7, 0.2);
        let unit = tilt_compensated_heading(level(), field);
        let scaled = tilt_compensated_heading(Vector3::new(0.0, 0.0, 9.81), field);
        assert_heading(scaled, unit, "scaled gravity");
    }

    #[test]
    fn test_zero_gravity_does_not_divide_by_zero() {
        let heading = tilt_compensated_heading(Vector3::zeros(), Vector3::new(0.3, 0.4, 0.5));
        assert!(heading.is_finite());
        assert_eq!(heading, 0.0);
    }

    #[test]
    fn test_planar_directions() {
        assert_heading(planar_heading(Vector3::new(0.0, -1.0, 0.0)), 0.0, "-Y");
        assert_heading(planar_heading(Vector3::new(1.0, 0.0, 0.0)), 90.0, "+X");
        assert_heading(planar_heading(Vector3::new(0.0, 1.0, 0.0)), 180.0, "+Y");
        assert_heading(planar_heading(Vector3::new(-1.0, 0.0, 0.0)), 270.0, "-X");
    }

    #[test]
    fn test_heading_range() {
        for angle_deg in (0..360).step_by(15) {
            let angle_rad = (angle_deg as f32).to_radians();
            let field = Vector3::new(angle_rad.cos(), angle_rad.sin(), -0.4);

            let tilted = tilt_compensated_heading(Vector3::new(0.2, -0.1, 0.97), field);
            let planar = planar_heading(field);

            assert!((0.0..360.0).contains(&tilted), "{}° out of range", tilted);
            assert!((0.0..360.0).contains(&planar), "{}° out of range", planar);
        }
    }

    #[test]
    fn test_filter_converges_to_raw_heading() {
        let mut filter = TiltCompensatedFilter::new();
        let field = Vector3::new(-1.0, 0.0, 0.0);

        let mut previous_error = f32::MAX;
        for _ in 0..100 {
            let heading = filter.update(level(), field).unwrap();
            let error = crate::math::shortest_delta(heading.degrees(), 90.0).abs();
            assert!(error <= previous_error + 1e-4);
            previous_error = error;
        }
        assert!(previous_error < 0.01);
    }

    #[test]
    fn test_filter_crosses_north_on_short_arc() {
        let mut filter = TiltCompensatedFilter::with_smoothing(0.5);
        let slightly_west = Vector3::new(0.05, 1.0, 0.0); // raw heading just below 360°

        for _ in 0..20 {
            let heading = filter.update(level(), slightly_west).unwrap();
            let distance = crate::math::shortest_delta(heading.degrees(), 0.0).abs();
            assert!(distance < 5.0, "heading swung to {}", heading);
        }
    }

    #[test]
    fn test_filter_rejects_non_finite_field() {
        let mut filter = TiltCompensatedFilter::new();
        filter.update(level(), Vector3::new(-1.0, 0.0, 0.0)).unwrap();
        let before = filter.heading();

        let result = filter.update(level(), Vector3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(result, Err(SampleError::NonFinite(Sensor::Magnetometer)));
        assert_eq!(filter.heading(), before);

        let result = filter.update(level(), Vector3::new(0.0, f32::INFINITY, 0.0));
        assert!(result.is_err());
        assert_eq!(filter.heading(), before);
    }

    #[test]
    fn test_planar_compass_smoothing() {
        let mut compass = PlanarCompass::new();
        let heading = compass.update(Vector3::new(1.0, 0.0, 0.0)).unwrap();

        // 20% of the way from 0° toward 90°
        assert!((heading.degrees() - 18.0).abs() < 1e-3);

        compass.reset();
        assert_eq!(compass.heading(), Heading::NORTH);
    }
}
