mod swerve;

use std::fmt::Debug;

use serde::Serialize;

use crate::loader::DriveType;

pub use swerve::SwerveSample;

/// A planar pose: position in meters and heading in radians, with 0 along +X.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pose2d {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose2d {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    pub fn distance_to(&self, other: &Pose2d) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// One timestamped kinematic snapshot of a trajectory.
///
/// Implemented once per drivetrain kind. `interpolate` and `offset_by` always
/// return the implementing type, so a `Trajectory<S>` never mixes sample kinds.
pub trait TrajectorySample: Clone + Debug {
    /// Drivetrain kind a project must declare for its files to hold this sample.
    const DRIVE_TYPE: DriveType;

    /// Seconds since the start of the trajectory.
    fn timestamp(&self) -> f64;

    fn pose(&self) -> Pose2d;

    /// Returns a copy with `timestamp += offset`; every other field is unchanged.
    fn offset_by(&self, offset: f64) -> Self;

    /// Linearly blends every field toward `ahead` using
    /// `scale = (timestamp - self.t) / (ahead.t - self.t)`.
    ///
    /// `timestamp` outside `[self.t, ahead.t]` extrapolates. Callers must not
    /// pass two samples with the same timestamp.
    fn interpolate(&self, ahead: &Self, timestamp: f64) -> Self;
}
