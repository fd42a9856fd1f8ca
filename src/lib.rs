//! Loads planner-generated robot trajectories and samples them at control-loop rate.
//!
//! A deploy directory holds one `.chor` project file and any number of
//! `.traj` trajectory files. [`loader::Loader`] turns those into
//! [`trajectory::Trajectory`] values, [`cache::TrajectoryCache`] keeps each one
//! loaded exactly once, and [`player::Player`] replays one against the clock.

pub mod cache;
pub mod config;
pub mod drive;
pub mod loader;
pub mod player;
pub mod sample;
pub mod trajectory;

pub use cache::TrajectoryCache;
pub use loader::{LoadError, Loader};
pub use sample::{Pose2d, SwerveSample, TrajectorySample};
pub use trajectory::{EventMarker, Trajectory};
