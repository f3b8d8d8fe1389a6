//! Latest gravity estimate from the accelerometer

use nalgebra::Vector3;

use crate::error::SampleError;
use crate::math::Vector3Ext;
use crate::types::Sensor;

/// Holds the most recent accelerometer reading as the gravity direction
///
/// No filtering happens here. The magnetic heading is low-passed after tilt
/// compensation, which smooths accelerometer noise along with everything
/// else.
#[derive(Debug, Clone, Copy)]
pub struct GravityTracker {
    gravity: Vector3<f32>,
    has_sample: bool,
}

impl GravityTracker {
    /// Tracker with a zero gravity vector and no samples
    pub fn new() -> Self {
        Self {
            gravity: Vector3::zeros(),
            has_sample: false,
        }
    }

    /// Replace the gravity estimate with an accelerometer reading in g
    ///
    /// Non-finite readings are rejected and the previous estimate is kept.
    pub fn update(&mut self, accelerometer: Vector3<f32>) -> Result<(), SampleError> {
        if !accelerometer.is_finite() {
            return Err(SampleError::NonFinite(Sensor::Accelerometer));
        }
        self.gravity = accelerometer;
        self.has_sample = true;
        Ok(())
    }

    /// Latest gravity vector, zero until the first sample
    pub fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }

    /// Whether any accelerometer sample has been accepted
    pub fn has_sample(&self) -> bool {
        self.has_sample
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for GravityTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let tracker = GravityTracker::new();
        assert_eq!(tracker.gravity(), Vector3::zeros());
        assert!(!tracker.has_sample());
    }

    #[test]
    fn test_latest_sample_wins() {
        let mut tracker = GravityTracker::new();
        tracker.update(Vector3::new(0.1, 0.0, 0.9)).unwrap();
        tracker.update(Vector3::new(0.0, 0.0, 1.0)).unwrap();

        assert_eq!(tracker.gravity(), Vector3::new(0.0, 0.0, 1.0));
        assert!(tracker.has_sample());
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut tracker = GravityTracker::new();
        tracker.update(Vector3::new(0.0, 0.0, 1.0)).unwrap();

        let result = tracker.update(Vector3::new(f32::NAN, 0.0, 1.0));
        assert_eq!(result, Err(SampleError::NonFinite(Sensor::Accelerometer)));
        assert_eq!(tracker.gravity(), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_reset() {
        let mut tracker = GravityTracker::new();
        tracker.update(Vector3::new(0.0, 0.0, 1.0)).unwrap();
        tracker.reset();
        assert_eq!(tracker.gravity(), Vector3::zeros());
        assert!(!tracker.has_sample());
    }
}
