use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::loader::{LoadError, FORMAT_VERSION};

pub const PROJECT_FILE_EXTENSION: &str = "chor";

/// The drivetrain kind a project plans for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DriveType {
    Swerve,
    Differential,
    Unknown(String),
}

impl From<String> for DriveType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Swerve" => DriveType::Swerve,
            "Differential" => DriveType::Differential,
            _ => DriveType::Unknown(value),
        }
    }
}

impl From<DriveType> for String {
    fn from(value: DriveType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DriveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveType::Swerve => f.write_str("Swerve"),
            DriveType::Differential => f.write_str("Differential"),
            DriveType::Unknown(other) => f.write_str(other),
        }
    }
}

/// Deployment-wide metadata shared by every trajectory in a directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default)]
    pub name: Option<String>,
    pub version: String,
    #[serde(rename = "type")]
    pub drive_type: DriveType,
}

impl ProjectFile {
    /// Finds and parses the single `.chor` file in `dir`.
    pub fn discover(dir: &Path) -> Result<Self, LoadError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LoadError::NoProjectFile(dir.to_path_buf()))
            }
            Err(e) => return Err(LoadError::ProjectRead(e)),
        };

        let mut candidates: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry.map_err(LoadError::ProjectRead)?.path();
            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == PROJECT_FILE_EXTENSION)
            {
                candidates.push(path);
            }
        }

        match candidates.as_slice() {
            [] => Err(LoadError::NoProjectFile(dir.to_path_buf())),
            [path] => {
                log::info!("Loading project file {}", path.display());
                let content = fs::read_to_string(path).map_err(LoadError::ProjectRead)?;
                Self::from_str(&content)
            }
            _ => Err(LoadError::MultipleProjectFiles {
                dir: dir.to_path_buf(),
                count: candidates.len(),
            }),
        }
    }

    pub fn from_str(json: &str) -> Result<Self, LoadError> {
        let project: ProjectFile = serde_json::from_str(json).map_err(LoadError::ProjectParse)?;
        if project.version != FORMAT_VERSION {
            return Err(LoadError::VersionMismatch {
                file: ".chor project file".to_string(),
                found: project.version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(project)
    }
}
