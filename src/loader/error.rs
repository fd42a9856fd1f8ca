use std::path::PathBuf;

use thiserror::Error;

use crate::loader::DriveType;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no .chor project file found in {0}")]
    NoProjectFile(PathBuf),
    #[error("found {count} .chor project files in {dir}, expected exactly one")]
    MultipleProjectFiles { dir: PathBuf, count: usize },
    #[error("could not read project file: {0}")]
    ProjectRead(#[source] std::io::Error),
    #[error("could not parse project file: {0}")]
    ProjectParse(#[source] serde_json::Error),
    #[error("{file}: wrong version {found}, expected {expected}")]
    VersionMismatch {
        file: String,
        found: String,
        expected: &'static str,
    },
    #[error("{0} samples are not supported")]
    UnsupportedDriveType(DriveType),
    #[error("unknown project type: {0}")]
    UnknownDriveType(String),
    #[error("project declares {project} samples but {requested} samples were requested")]
    SampleTypeMismatch {
        project: DriveType,
        requested: DriveType,
    },
    #[error("trajectory file not found: {0}")]
    TrajectoryNotFound(PathBuf),
    #[error("could not read trajectory file {path}: {source}")]
    TrajectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse trajectory {name}: {source}")]
    TrajectoryParse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Fatal errors mean the deployment itself is misconfigured; retrying
    /// cannot help. Everything else concerns a single trajectory file.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            LoadError::TrajectoryNotFound(_)
                | LoadError::TrajectoryRead { .. }
                | LoadError::TrajectoryParse { .. }
        )
    }
}
