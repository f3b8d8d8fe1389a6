//! Heading Fusion - a compass heading engine for phones and other handheld devices
//!
//! Fuses a triaxial magnetometer, accelerometer and gyroscope into a stable
//! compass heading, and passes the platform's true-north and satellite
//! headings through alongside it.
//!
//! Four headings are published, each in degrees inside `[0, 360)`:
//!
//! - **Magnetic**: tilt-compensated magnetometer heading with a circular
//!   low-pass filter.
//! - **True north**: as reported by the positioning service.
//! - **Satellite**: course over ground, absent until the first valid fix.
//! - **Calculated**: gyroscope integration pulled toward the magnetic heading
//!   by a complementary filter, so it turns smoothly without drifting.
//!
//! # Features
//!
//! - Circular smoothing that never jumps across the 0°/360° seam
//! - Tilt compensation by projecting the field onto the horizontal plane
//! - Time-step aware gyroscope integration with drift correction
//! - Planar compass mode for devices without an accelerometer
//! - Non-finite samples rejected without disturbing filter state
//! - Thread-safe service with per-sensor subscriptions and a `watch` channel
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use heading_fusion::{GyroSample, HeadingEngine, Timestamp};
//!
//! let mut engine = HeadingEngine::new();
//!
//! // Sensor readings
//! let accelerometer = Vector3::new(0.0, 0.0, 1.0);  // g
//! let magnetometer = Vector3::new(-20.0, 0.0, -40.0); // µT
//! let gyroscope = GyroSample::vertical(0.01, Timestamp::from_millis(20)); // rad/s
//!
//! engine.on_accelerometer(accelerometer).unwrap();
//! engine.on_magnetometer(magnetometer).unwrap();
//! engine.on_gyroscope(gyroscope).unwrap();
//!
//! let headings = engine.snapshot();
//! println!("magnetic {} calculated {}", headings.magnetic, headings.calculated);
//! ```

mod aggregator;
pub mod compass;
mod complementary;
mod config;
mod engine;
mod error;
mod gravity;
mod gyro;
mod math;
mod service;
mod stream;
mod types;

// Re-export all public types and functions
pub use aggregator::{HeadingAggregator, HeadingSnapshot};
pub use compass::{PlanarCompass, TiltCompensatedFilter};
pub use complementary::{ComplementaryFilter, fuse};
pub use engine::HeadingEngine;
pub use error::{ConfigError, InvalidHeading, SampleError};
pub use gravity::GravityTracker;
pub use gyro::GyroIntegrator;
pub use math::{
    DEG_TO_RAD, FULL_TURN, RAD_TO_DEG, Vector3Ext, circular_blend, normalize, shortest_delta,
};
pub use service::{HeadingService, SensorSubscriptions, SensorSuite};
pub use stream::{SensorStream, Subscription};
pub use types::*;
