//! The four published headings

use serde::Serialize;

use crate::types::{Heading, HeadingReport, PositionReport};

/// Latest value of every published heading
///
/// `satellite` stays `None` until the positioning service reports a valid
/// course, which most platforms only do while the device is moving.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HeadingSnapshot {
    pub magnetic: Heading,
    pub true_north: Heading,
    pub satellite: Option<Heading>,
    pub calculated: Heading,
}

/// Holds the headings handed to the presentation layer
///
/// Magnetic and calculated headings come from the filters; true north and
/// satellite course pass straight through from positioning reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingAggregator {
    snapshot: HeadingSnapshot,
}

impl HeadingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_magnetic(&mut self, heading: Heading) {
        self.snapshot.magnetic = heading;
    }

    pub fn update_calculated(&mut self, heading: Heading) {
        self.snapshot.calculated = heading;
    }

    /// Take the true-north heading from a positioning report
    ///
    /// Falls back to the report's magnetic heading, then to the current
    /// magnetic heading, when the platform cannot resolve true north.
    /// Negative values mean "unknown" and are skipped like missing ones.
    pub fn update_true_north(&mut self, report: &HeadingReport) -> Heading {
        let heading = valid_angle(report.true_heading)
            .or_else(|| valid_angle(report.magnetic_heading))
            .map(Heading::new)
            .unwrap_or(self.snapshot.magnetic);

        self.snapshot.true_north = heading;
        heading
    }

    /// Take the satellite course from a position fix
    ///
    /// Returns `true` if the satellite heading changed. Missing or negative
    /// courses leave the previous value in place.
    pub fn update_satellite(&mut self, report: &PositionReport) -> bool {
        match valid_angle(report.course) {
            Some(course) => {
                self.snapshot.satellite = Some(Heading::new(course));
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> HeadingSnapshot {
        self.snapshot
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn valid_angle(angle: Option<f32>) -> Option<f32> {
    angle.filter(|degrees| degrees.is_finite() && *degrees >= 0.0)
}
