//! Typed view of the native Xcode project
//!
//! The rest of the crate only sees targets, build configurations and their
//! settings through [`BuildSettings`]. [`XcodeProject`] implements it on top
//! of a lossless project.pbxproj document.

mod xcode;

pub use xcode::XcodeProject;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::definitions::SettingValue;

/// File extension of an Xcode project bundle.
pub const XCODEPROJ_EXTENSION: &str = "xcodeproj";

/// A native build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub id: String,
    pub name: String,
}

/// A named build variant (Debug, Release, ...) of a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    pub id: String,
    pub name: String,
}

/// Errors from locating, reading, or writing the project
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Couldn't find Xcode project in {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: pbxproj::ParseError,
    },

    #[error("Invalid project structure: {0}")]
    Structure(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Operations the hook needs from a project model.
pub trait BuildSettings {
    /// The first native target of the project.
    fn first_target(&self) -> Result<Target, ProjectError>;

    /// Every build configuration in the target's configuration list, in list order.
    fn configurations_of(&self, target: &Target) -> Result<Vec<BuildConfiguration>, ProjectError>;

    /// Raw value of a setting in a configuration's `buildSettings`.
    fn setting(&self, config: &BuildConfiguration, key: &str) -> Result<SettingValue, ProjectError>;

    /// Overwrite a setting with a list, creating it when missing.
    fn set_setting(
        &mut self,
        config: &BuildConfiguration,
        key: &str,
        values: Vec<String>,
    ) -> Result<(), ProjectError>;
}

/// Find the project in `project_dir` and return its name (the bundle's file stem).
///
/// When several bundles exist the first one by file name wins.
pub fn locate(project_dir: &Path) -> Result<String, ProjectError> {
    let entries = match std::fs::read_dir(project_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ProjectError::NotFound(project_dir.to_path_buf()))
        }
        Err(e) => {
            return Err(ProjectError::Read {
                path: project_dir.to_path_buf(),
                source: e,
            })
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ProjectError::Read {
            path: project_dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(XCODEPROJ_EXTENSION) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();

    if names.len() > 1 {
        tracing::warn!(candidates = ?names, "multiple Xcode projects found, using the first");
    }

    names
        .into_iter()
        .next()
        .ok_or_else(|| ProjectError::NotFound(project_dir.to_path_buf()))
}
