use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::de::DeserializeOwned;

use crate::loader::{parse_trajectory, LoadError, ProjectFile};
use crate::sample::TrajectorySample;
use crate::trajectory::Trajectory;

pub const TRAJECTORY_FILE_EXTENSION: &str = ".traj";

/// Drops a trailing `.traj` from a trajectory name, if present.
pub fn strip_extension(name: &str) -> &str {
    name.strip_suffix(TRAJECTORY_FILE_EXTENSION).unwrap_or(name)
}

/// Reads trajectories out of a deploy directory.
///
/// The directory's project file is parsed on first use and kept for the
/// lifetime of the loader; later edits to it are not picked up.
pub struct Loader {
    dir: PathBuf,
    project: OnceLock<ProjectFile>,
}

impl Loader {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            project: OnceLock::new(),
        }
    }

    /// A loader that skips project discovery and uses `project` as given.
    pub fn with_project(dir: PathBuf, project: ProjectFile) -> Self {
        Self {
            dir,
            project: OnceLock::from(project),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The deployment's project file. Every error here is fatal.
    pub fn project(&self) -> Result<&ProjectFile, LoadError> {
        if let Some(project) = self.project.get() {
            return Ok(project);
        }
        let project = ProjectFile::discover(&self.dir)?;
        Ok(self.project.get_or_init(|| project))
    }

    pub fn trajectory_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", strip_extension(name), TRAJECTORY_FILE_EXTENSION))
    }

    /// Loads `name` (with or without its `.traj` extension).
    ///
    /// A missing or unreadable file is logged and reported as `Ok(None)`;
    /// configuration problems such as a version mismatch are returned as errors.
    pub fn load_trajectory<S>(&self, name: &str) -> Result<Option<Trajectory<S>>, LoadError>
    where
        S: TrajectorySample + DeserializeOwned,
    {
        match self.try_load_trajectory(name) {
            Ok(trajectory) => Ok(Some(trajectory)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                log::error!("Failed to load trajectory {}: {}", name, e);
                Ok(None)
            }
        }
    }

    /// Like [`Loader::load_trajectory`] but returns every failure as an error.
    pub fn try_load_trajectory<S>(&self, name: &str) -> Result<Trajectory<S>, LoadError>
    where
        S: TrajectorySample + DeserializeOwned,
    {
        let path = self.trajectory_path(name);
        log::info!("Loading trajectory {}", path.display());

        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoadError::TrajectoryNotFound(path.clone()),
            _ => LoadError::TrajectoryRead {
                path: path.clone(),
                source: e,
            },
        })?;

        parse_trajectory(&content, self.project()?)
    }
}
