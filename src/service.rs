//! Thread-safe heading service fed by sensor streams

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nalgebra::Vector3;
use tokio::sync::watch;

use crate::aggregator::HeadingSnapshot;
use crate::engine::HeadingEngine;
use crate::error::ConfigError;
use crate::stream::{SensorStream, Subscription};
use crate::types::{FusionSettings, GyroSample, HeadingReport, PositionReport};

/// The five inbound sample streams
///
/// Owned by whatever drives the sensors; the service only registers
/// listeners on them.
pub struct SensorSuite {
    pub accelerometer: SensorStream<Vector3<f32>>,
    pub magnetometer: SensorStream<Vector3<f32>>,
    pub gyroscope: SensorStream<GyroSample>,
    pub heading_reports: SensorStream<HeadingReport>,
    pub position_reports: SensorStream<PositionReport>,
}

impl SensorSuite {
    pub fn new() -> Self {
        Self {
            accelerometer: SensorStream::new("accelerometer"),
            magnetometer: SensorStream::new("magnetometer"),
            gyroscope: SensorStream::new("gyroscope"),
            heading_reports: SensorStream::new("heading_reports"),
            position_reports: SensorStream::new("position_reports"),
        }
    }
}

impl Default for SensorSuite {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscription per stream, each removable on its own
#[derive(Debug)]
pub struct SensorSubscriptions {
    pub accelerometer: Subscription,
    pub magnetometer: Subscription,
    pub gyroscope: Subscription,
    pub heading_reports: Subscription,
    pub position_reports: Subscription,
}

/// Heading engine shared between sensor threads
///
/// Every sample is processed to completion under a short-lived lock; nothing
/// in the sample path waits on anything else. Headings are published through
/// a `watch` channel, so a slow reader only ever sees the latest snapshot.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use heading_fusion::{HeadingService, SensorSuite};
///
/// let sensors = SensorSuite::new();
/// let service = HeadingService::new();
/// let subscriptions = service.attach_all(&sensors);
/// let headings = service.subscribe();
///
/// sensors.accelerometer.emit(Vector3::new(0.0, 0.0, 1.0));
/// sensors.magnetometer.emit(Vector3::new(-1.0, 0.0, 0.0));
/// assert!(headings.borrow().magnetic.degrees() > 0.0);
///
/// // Stop listening to the magnetometer only.
/// subscriptions.magnetometer.remove();
/// let frozen = service.snapshot().magnetic;
/// sensors.magnetometer.emit(Vector3::new(-1.0, 0.0, 0.0));
/// assert_eq!(service.snapshot().magnetic, frozen);
/// ```
#[derive(Clone)]
pub struct HeadingService {
    engine: Arc<Mutex<HeadingEngine>>,
    publisher: Arc<watch::Sender<HeadingSnapshot>>,
}

impl HeadingService {
    /// Create a service with default settings
    pub fn new() -> Self {
        Self::from_engine(HeadingEngine::new())
    }

    pub fn with_settings(settings: FusionSettings) -> Result<Self, ConfigError> {
        Ok(Self::from_engine(HeadingEngine::with_settings(settings)?))
    }

    fn from_engine(engine: HeadingEngine) -> Self {
        let (publisher, _) = watch::channel(engine.snapshot());
        Self {
            engine: Arc::new(Mutex::new(engine)),
            publisher: Arc::new(publisher),
        }
    }

    /// Receive every published snapshot, latest value wins
    pub fn subscribe(&self) -> watch::Receiver<HeadingSnapshot> {
        self.publisher.subscribe()
    }

    /// Latest headings
    pub fn snapshot(&self) -> HeadingSnapshot {
        *self.publisher.borrow()
    }

    /// Restart every filter from its initial state
    pub fn reset(&self) {
        let mut engine = lock(&self.engine);
        engine.reset();
        self.publisher.send_replace(engine.snapshot());
    }

    /// Feed accelerometer samples into the gravity estimate
    pub fn attach_accelerometer(&self, stream: &SensorStream<Vector3<f32>>) -> Subscription {
        let engine = Arc::clone(&self.engine);
        stream.add_listener(move |sample| {
            // Rejections are logged by the engine.
            let _ = lock(&engine).on_accelerometer(sample);
        })
    }

    /// Feed magnetometer samples into the magnetic heading
    pub fn attach_magnetometer(&self, stream: &SensorStream<Vector3<f32>>) -> Subscription {
        self.attach_publishing(stream, |engine, sample| engine.on_magnetometer(sample).is_ok())
    }

    /// Feed gyroscope samples into the calculated heading
    pub fn attach_gyroscope(&self, stream: &SensorStream<GyroSample>) -> Subscription {
        self.attach_publishing(stream, |engine, sample| engine.on_gyroscope(sample).is_ok())
    }

    /// Feed positioning heading reports into the true-north heading
    pub fn attach_heading_reports(&self, stream: &SensorStream<HeadingReport>) -> Subscription {
        self.attach_publishing(stream, |engine, report| {
            engine.on_heading_report(report);
            true
        })
    }

    /// Feed position fixes into the satellite heading
    pub fn attach_position_reports(&self, stream: &SensorStream<PositionReport>) -> Subscription {
        self.attach_publishing(stream, |engine, report| {
            let before = engine.snapshot().satellite;
            engine.on_position_report(report) != before
        })
    }

    /// Attach to every stream of a suite
    pub fn attach_all(&self, sensors: &SensorSuite) -> SensorSubscriptions {
        SensorSubscriptions {
            accelerometer: self.attach_accelerometer(&sensors.accelerometer),
            magnetometer: self.attach_magnetometer(&sensors.magnetometer),
            gyroscope: self.attach_gyroscope(&sensors.gyroscope),
            heading_reports: self.attach_heading_reports(&sensors.heading_reports),
            position_reports: self.attach_position_reports(&sensors.position_reports),
        }
    }

    /// Register a listener that publishes a snapshot when `handle` reports a change
    fn attach_publishing<T, F>(&self, stream: &SensorStream<T>, handle: F) -> Subscription
    where
        T: Copy + 'static,
        F: Fn(&mut HeadingEngine, T) -> bool + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let publisher = Arc::clone(&self.publisher);
        stream.add_listener(move |sample| {
            let mut engine = lock(&engine);
            if handle(&mut *engine, sample) {
                publisher.send_replace(engine.snapshot());
            }
        })
    }
}

impl Default for HeadingService {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(engine: &Mutex<HeadingEngine>) -> MutexGuard<'_, HeadingEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}
