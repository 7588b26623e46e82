//! FileSystem trait definition

use anyhow::Result;
use std::path::Path;

/// Abstraction over the file probes the pre-build step performs.
///
/// The locator checks for the targets file once per build cycle and the
/// built-in engine reads it; both go through this trait so tests can run
/// against an in-memory tree.
pub trait FileSystem: Send + Sync {
    /// Check if path is a regular file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;
}
