use heading_fusion::{GyroSample, HeadingEngine, Timestamp};
use nalgebra::Vector3;
use std::f32::consts::PI;

const GYROSCOPE_PERIOD_MS: u64 = 20; // 50 Hz
const MAGNETOMETER_EVERY: u64 = 5; // 10 Hz

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut engine = HeadingEngine::new();
    let turn_rate = PI / 4.0; // 45°/s, replace with actual gyroscope data in rad/s

    for step in 0..100u64 {
        // this loop should repeat each time new gyroscope data is available
        let time = step as f32 * GYROSCOPE_PERIOD_MS as f32 / 1000.0;
        let heading = (turn_rate * time).min(PI / 2.0);

        if step % MAGNETOMETER_EVERY == 0 {
            let accelerometer = Vector3::new(0.0, 0.0, 1.0); // replace with actual accelerometer data in g
            let magnetometer = Vector3::new(-30.0 * heading.sin(), 30.0 * heading.cos(), -24.0); // µT

            engine.on_accelerometer(accelerometer).unwrap();
            engine.on_magnetometer(magnetometer).unwrap();
        }

        let rate = if heading < PI / 2.0 { turn_rate } else { 0.0 };
        let timestamp = Timestamp::from_millis(step * GYROSCOPE_PERIOD_MS);
        engine.on_gyroscope(GyroSample::vertical(rate, timestamp)).unwrap();

        let headings = engine.snapshot();
        println!(
            "Magnetic: {:6.2}, Calculated: {:6.2}",
            headings.magnetic.degrees(),
            headings.calculated.degrees()
        );
    }
}
