mod error;
mod parsing;
mod project;
mod trajectory_loader;

/// The only file format version this crate reads.
pub const FORMAT_VERSION: &str = "v2025.0.0";

pub use error::LoadError;
pub use parsing::parse_trajectory;
pub use project::{DriveType, ProjectFile, PROJECT_FILE_EXTENSION};
pub use trajectory_loader::{strip_extension, Loader, TRAJECTORY_FILE_EXTENSION};
