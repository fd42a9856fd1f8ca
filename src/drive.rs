//! Interfaces to the drivetrain and the pose estimator.
//!
//! Actuation and localization live outside this crate; these traits are the
//! seam through which playback output reaches hardware.

use crate::player::PlaybackSink;
use crate::sample::{Pose2d, SwerveSample};
use crate::trajectory::Trajectory;

/// Reports where the robot currently is.
pub trait Localizer {
    fn pose(&self) -> Pose2d;
}

/// A drivetrain that accepts a planar movement vector and a turn rate.
pub trait Driveable {
    /// `movement` is robot-relative: +X forward, +Y left.
    fn set(&mut self, movement: [f64; 2], turn: f64);

    /// Drives with a field-relative `movement`, given the robot's current heading.
    fn drive_field(&mut self, movement: [f64; 2], turn: f64, heading: f64) {
        let (sin, cos) = (-heading).sin_cos();
        let robot = [
            movement[0] * cos - movement[1] * sin,
            movement[0] * sin + movement[1] * cos,
        ];
        self.set(robot, turn);
    }
}

/// Feeds each sample's planned velocity straight to a drivetrain.
///
/// Open loop: no correction from the localizer beyond using its heading for
/// the field-to-robot rotation.
pub struct FeedforwardSink<D, L> {
    drive: D,
    localizer: L,
}

impl<D: Driveable, L: Localizer> FeedforwardSink<D, L> {
    pub fn new(drive: D, localizer: L) -> Self {
        Self { drive, localizer }
    }

    pub fn into_inner(self) -> (D, L) {
        (self.drive, self.localizer)
    }
}

impl<D: Driveable, L: Localizer> PlaybackSink<SwerveSample> for FeedforwardSink<D, L> {
    fn on_sample(&mut self, sample: &SwerveSample) {
        let heading = self.localizer.pose().heading;
        self.drive.drive_field([sample.vx, sample.vy], sample.omega, heading);
    }

    fn on_finish(&mut self, _trajectory: &Trajectory<SwerveSample>, _completed: bool) {
        self.drive.set([0.0, 0.0], 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[derive(Default)]
    struct RecordingDrive {
        commands: Vec<([f64; 2], f64)>,
    }

    impl Driveable for RecordingDrive {
        fn set(&mut self, movement: [f64; 2], turn: f64) {
            self.commands.push((movement, turn));
        }
    }

    struct FixedLocalizer(Pose2d);

    impl Localizer for FixedLocalizer {
        fn pose(&self) -> Pose2d {
            self.0
        }
    }

    #[test]
    fn test_drive_field_rotates_into_robot_frame() {
        let mut drive = RecordingDrive::default();
        drive.drive_field([1.0, 0.0], 0.5, FRAC_PI_2);

        let (movement, turn) = drive.commands[0];
        // Facing +Y, a field +X move is to the robot's right.
        assert_relative_eq!(movement[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(movement[1], -1.0, epsilon = 1e-12);
        assert_relative_eq!(turn, 0.5);
    }

    #[test]
    fn test_drive_field_identity_at_zero_heading() {
        let mut drive = RecordingDrive::default();
        drive.drive_field([0.3, -0.4], 0.0, 0.0);
        assert_eq!(drive.commands[0], ([0.3, -0.4], 0.0));
    }

    #[test]
    fn test_feedforward_sink_forwards_velocity_and_stops() {
        let localizer = FixedLocalizer(Pose2d::new(0.0, 0.0, 0.0));
        let mut sink = FeedforwardSink::new(RecordingDrive::default(), localizer);
        let sample = SwerveSample::at(0.5, 1.0, 1.0, 0.0).with_velocity(2.0, 1.0, 0.25);
        let trajectory = Trajectory::new("t", vec![sample], Vec::new(), Vec::new());

        sink.on_sample(&sample);
        sink.on_finish(&trajectory, true);

        let (drive, _) = sink.into_inner();
        assert_eq!(drive.commands.len(), 2);
        assert_relative_eq!(drive.commands[0].0[0], 2.0);
        assert_relative_eq!(drive.commands[0].0[1], 1.0);
        assert_relative_eq!(drive.commands[0].1, 0.25);
        assert_eq!(drive.commands[1], ([0.0, 0.0], 0.0));
    }
}
