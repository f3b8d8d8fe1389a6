use heading_fusion::{
    GyroSample, HeadingService, PositionReport, SensorRates, SensorSuite, Timestamp,
};
use nalgebra::Vector3;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const RUN_TIME: Duration = Duration::from_secs(3);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let rates = SensorRates::default();
    let sensors = Arc::new(SensorSuite::new());
    let service = HeadingService::new();
    let subscriptions = service.attach_all(&sensors);
    let mut headings = service.subscribe();

    let start = Instant::now();
    let running = Arc::new(AtomicBool::new(true));

    // Each sensor gets its own thread, like platform sensor callbacks would
    let spawn_sensor = |period: Duration, emit: Box<dyn Fn(&SensorSuite, Timestamp) + Send>| {
        let sensors = Arc::clone(&sensors);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                emit(&sensors, Timestamp::from(start.elapsed()));
                thread::sleep(period);
            }
        })
    };

    let threads = [
        spawn_sensor(
            rates.accelerometer(),
            Box::new(|sensors: &SensorSuite, _: Timestamp| {
                sensors.accelerometer.emit(Vector3::new(0.0, 0.02, 0.99))
            }),
        ),
        spawn_sensor(
            rates.magnetometer(),
            Box::new(|sensors: &SensorSuite, _: Timestamp| {
                sensors.magnetometer.emit(Vector3::new(-15.0, 26.0, -24.0))
            }),
        ),
        spawn_sensor(
            rates.gyroscope(),
            Box::new(|sensors: &SensorSuite, now: Timestamp| {
                sensors.gyroscope.emit(GyroSample::vertical(0.001, now))
            }),
        ),
        spawn_sensor(
            Duration::from_secs(1),
            Box::new(|sensors: &SensorSuite, _: Timestamp| {
                sensors.position_reports.emit(PositionReport { course: Some(-1.0) })
            }),
        ),
    ];

    while start.elapsed() < RUN_TIME {
        if headings.has_changed().unwrap_or(false) {
            let snapshot = *headings.borrow_and_update();
            println!(
                "Magnetic: {}, Calculated: {}, Satellite: {:?}",
                snapshot.magnetic,
                snapshot.calculated,
                snapshot.satellite.map(|heading| heading.rounded())
            );
        }
        thread::sleep(Duration::from_millis(250));
    }

    // Detach the engine first, then stop the producers
    drop(subscriptions);
    running.store(false, Ordering::Relaxed);
    for handle in threads {
        handle.join().unwrap();
    }

    println!("Final: {:?}", service.snapshot());
}
