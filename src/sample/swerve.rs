use serde::{Deserialize, Deserializer, Serialize};

use super::{Pose2d, TrajectorySample};
use crate::loader::DriveType;

const EMPTY_MODULE_FORCES: [f64; 4] = [0.0; 4];

/// A single swerve drive sample.
///
/// Module forces are ordered front-left, front-right, back-left, back-right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwerveSample {
    /// Seconds since the start of the trajectory.
    pub t: f64,
    pub x: f64,
    pub y: f64,
    /// Radians, 0 along +X.
    pub heading: f64,
    /// Field-relative velocity in m/s.
    pub vx: f64,
    pub vy: f64,
    /// Angular velocity in rad/s.
    pub omega: f64,
    /// Field-relative acceleration in m/s².
    pub ax: f64,
    pub ay: f64,
    /// Angular acceleration in rad/s².
    pub alpha: f64,
    #[serde(default, deserialize_with = "module_forces")]
    fx: [f64; 4],
    #[serde(default, deserialize_with = "module_forces")]
    fy: [f64; 4],
}

impl SwerveSample {
    /// A stationary sample at the given pose with zero derivatives and forces.
    pub fn at(t: f64, x: f64, y: f64, heading: f64) -> Self {
        Self {
            t,
            x,
            y,
            heading,
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64, omega: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self.omega = omega;
        self
    }

    pub fn with_acceleration(mut self, ax: f64, ay: f64, alpha: f64) -> Self {
        self.ax = ax;
        self.ay = ay;
        self.alpha = alpha;
        self
    }

    pub fn with_module_forces(mut self, fx: [f64; 4], fy: [f64; 4]) -> Self {
        self.fx = fx;
        self.fy = fy;
        self
    }

    /// Module forces along X in Newtons, [FL, FR, BL, BR].
    pub fn module_forces_x(&self) -> [f64; 4] {
        self.fx
    }

    /// Module forces along Y in Newtons, [FL, FR, BL, BR].
    pub fn module_forces_y(&self) -> [f64; 4] {
        self.fy
    }
}

impl TrajectorySample for SwerveSample {
    const DRIVE_TYPE: DriveType = DriveType::Swerve;

    fn timestamp(&self) -> f64 {
        self.t
    }

    fn pose(&self) -> Pose2d {
        Pose2d::new(self.x, self.y, self.heading)
    }

    fn offset_by(&self, offset: f64) -> Self {
        Self {
            t: self.t + offset,
            ..*self
        }
    }

    fn interpolate(&self, ahead: &Self, timestamp: f64) -> Self {
        let scale = (timestamp - self.t) / (ahead.t - self.t);
        let lerp = |from: f64, to: f64| from + (to - from) * scale;
        let lerp4 = |from: [f64; 4], to: [f64; 4]| {
            [
                lerp(from[0], to[0]),
                lerp(from[1], to[1]),
                lerp(from[2], to[2]),
                lerp(from[3], to[3]),
            ]
        };

        Self {
            t: timestamp,
            x: lerp(self.x, ahead.x),
            y: lerp(self.y, ahead.y),
            heading: lerp(self.heading, ahead.heading),
            vx: lerp(self.vx, ahead.vx),
            vy: lerp(self.vy, ahead.vy),
            omega: lerp(self.omega, ahead.omega),
            ax: lerp(self.ax, ahead.ax),
            ay: lerp(self.ay, ahead.ay),
            alpha: lerp(self.alpha, ahead.alpha),
            fx: lerp4(self.fx, ahead.fx),
            fy: lerp4(self.fy, ahead.fy),
        }
    }
}

/// Reads a module force array, treating anything but four numbers as all-zero.
fn module_forces<'de, D>(deserializer: D) -> Result<[f64; 4], D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(forces_from_value)
        .unwrap_or(EMPTY_MODULE_FORCES))
}

fn forces_from_value(value: &serde_json::Value) -> Option<[f64; 4]> {
    let items = value.as_array()?;
    if items.len() != 4 {
        return None;
    }
    let mut forces = EMPTY_MODULE_FORCES;
    for (slot, item) in forces.iter_mut().zip(items) {
        *slot = item.as_f64()?;
    }
    Some(forces)
}
