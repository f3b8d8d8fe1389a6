//! Circular arithmetic and nalgebra extensions used by every heading filter

use nalgebra::Vector3;

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Full turn in degrees
pub const FULL_TURN: f32 = 360.0;

/// Wrap an angle in degrees into `[0, 360)`
///
/// Works for any finite input, negative or several turns away from zero.
///
/// # Example
/// ```
/// use heading_fusion::normalize;
///
/// assert_eq!(normalize(-90.0), 270.0);
/// assert_eq!(normalize(725.0), 5.0);
/// ```
pub fn normalize(angle: f32) -> f32 {
    ((angle % FULL_TURN) + FULL_TURN) % FULL_TURN
}

/// Signed shortest angular path from `b` to `a`, in degrees
///
/// The result lies in `(-180, 180]`. A half-turn separation, where both
/// directions are equally short, is reported as `+180`.
///
/// # Example
/// ```
/// use heading_fusion::shortest_delta;
///
/// assert_eq!(shortest_delta(1.0, 359.0), 2.0);
/// assert_eq!(shortest_delta(359.0, 1.0), -2.0);
/// ```
pub fn shortest_delta(a: f32, b: f32) -> f32 {
    let delta = normalize(a - b + 540.0) - 180.0;
    if delta <= -180.0 { delta + FULL_TURN } else { delta }
}

/// Circular low-pass step from `previous` toward `raw`
///
/// `alpha` in `(0, 1]` sets how far along the shortest arc the result moves:
/// `1` jumps straight to `raw`, small values smooth harder and lag more.
///
/// # Example
/// ```
/// use heading_fusion::circular_blend;
///
/// // Crosses north along the 2° arc instead of swinging back through south.
/// let blended = circular_blend(359.0, 1.0, 0.2);
/// assert!((blended - 359.4).abs() < 1e-3);
/// ```
pub fn circular_blend(previous: f32, raw: f32, alpha: f32) -> f32 {
    normalize(previous + shortest_delta(raw, previous) * alpha)
}

/// Extension trait for Vector3 sample checks
pub trait Vector3Ext {
    /// True when every component is a finite number
    fn is_finite(&self) -> bool;

    /// Euclidean norm, substituting `1` for a zero-length vector
    fn norm_or_one(&self) -> f32;
}

impl Vector3Ext for Vector3<f32> {
    fn is_finite(&self) -> bool {
        self.iter().all(|component| component.is_finite())
    }

    fn norm_or_one(&self) -> f32 {
        let norm = self.norm();
        if norm == 0.0 { 1.0 } else { norm }
    }
}
