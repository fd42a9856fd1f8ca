use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("player already running")]
    AlreadyRunning,
    #[error("trajectory {0} has no samples")]
    EmptyTrajectory(String),
}
