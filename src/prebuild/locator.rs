//! Targets file discovery
//!
//! A solution `C:\src\App.sln` is customized by `C:\src\after.App.sln.targets`.
//! The path is derived and probed fresh on every build cycle since the open
//! solution can change between builds.

use crate::fs::FileSystem;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const TARGETS_FILE_PREFIX: &str = "after.";
pub const TARGETS_FILE_SUFFIX: &str = ".targets";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocateError {
    #[error("Unexpected solution path {path:?}: {reason}")]
    UnexpectedState { path: PathBuf, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetsDefinition {
    pub path: PathBuf,
    pub exists: bool,
}

/// `after.<solution file name>.targets`
pub fn targets_file_name(solution_file_name: &std::ffi::OsStr) -> OsString {
    let mut name = OsString::from(TARGETS_FILE_PREFIX);
    name.push(solution_file_name);
    name.push(TARGETS_FILE_SUFFIX);
    name
}

/// Derives the targets path for `solution_path`.
///
/// `Ok(None)` when the solution has no directory component; an error when the
/// path cannot be split into directory and file name at all.
pub fn derive_targets_path(solution_path: &Path) -> Result<Option<PathBuf>, LocateError> {
    let folder = solution_path
        .parent()
        .ok_or_else(|| LocateError::UnexpectedState {
            path: solution_path.to_path_buf(),
            reason: "no parent directory",
        })?;
    let file_name = solution_path
        .file_name()
        .ok_or_else(|| LocateError::UnexpectedState {
            path: solution_path.to_path_buf(),
            reason: "no file name",
        })?;

    if folder.as_os_str().is_empty() {
        return Ok(None);
    }

    Ok(Some(folder.join(targets_file_name(file_name))))
}

#[derive(Clone)]
pub struct TargetsLocator {
    fs: Arc<dyn FileSystem>,
}

impl TargetsLocator {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Derives the targets path and probes whether the file is there.
    pub fn describe(&self, solution_path: &Path) -> Result<Option<TargetsDefinition>, LocateError> {
        Ok(derive_targets_path(solution_path)?.map(|path| {
            let exists = self.fs.is_file(&path);
            TargetsDefinition { path, exists }
        }))
    }

    /// Returns the definition only when the derived file exists.
    pub fn locate(&self, solution_path: &Path) -> Result<Option<TargetsDefinition>, LocateError> {
        Ok(self.describe(solution_path)?.filter(|d| d.exists))
    }
}
