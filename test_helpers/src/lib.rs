//! Test infrastructure shared by the sky chart crates.
//!
//! Rendering tests produce artifacts (composed SVG documents, rasterized
//! previews) that are worth keeping for manual inspection. This crate finds
//! the workspace root from wherever `cargo test` was launched and provides a
//! `test_output/` directory under it.
//!
//! ```text
//! test_output/
//! ├── paris_2025-01-15.svg
//! └── themes/
//!     └── sepia.svg
//! ```
//!
//! # Example
//! ```rust
//! use test_helpers::{find_project_root, output_path};
//!
//! let root = find_project_root().expect("Failed to find project");
//! assert!(root.join("Cargo.toml").exists());
//!
//! let svg = output_path("doctest_chart.svg");
//! assert!(svg.starts_with(root.join("test_output")));
//! ```

use once_cell::sync::Lazy;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors from test infrastructure setup.
#[derive(thiserror::Error, Debug)]
pub enum TestHelperError {
    /// No `Cargo.toml` with a `[workspace]` section above the working directory
    #[error("Failed to find project root: {0}")]
    ProjectRootNotFound(String),
}

/// Locate the workspace root.
///
/// Walks up from the current directory until a `Cargo.toml` containing a
/// `[workspace]` section is found.
///
/// # Returns
/// * `Ok(PathBuf)` - Absolute path to the workspace root
/// * `Err(TestHelperError)` - No workspace above the working directory
pub fn find_project_root() -> Result<PathBuf, TestHelperError> {
    let mut current_dir = env::current_dir().map_err(|e| {
        TestHelperError::ProjectRootNotFound(format!("Failed to get current directory: {}", e))
    })?;

    loop {
        let cargo_toml = current_dir.join("Cargo.toml");
        if cargo_toml.exists() {
            let content = fs::read_to_string(&cargo_toml).map_err(|e| {
                TestHelperError::ProjectRootNotFound(format!("Failed to read Cargo.toml: {}", e))
            })?;

            if content.contains("[workspace]") {
                return Ok(current_dir);
            }
        }

        if !current_dir.pop() {
            break;
        }
    }

    Err(TestHelperError::ProjectRootNotFound(
        "Workspace root not found".to_string(),
    ))
}

static PROJECT_ROOT: Lazy<PathBuf> =
    Lazy::new(|| find_project_root().expect("Failed to find project root directory"));

/// The `test_output/` directory under the workspace root, created on demand
pub fn get_output_dir() -> PathBuf {
    let output_dir = PROJECT_ROOT.join("test_output");
    fs::create_dir_all(&output_dir).expect("Failed to create test output directory");
    output_dir
}

/// Path for a named artifact under `test_output/`.
///
/// Parent directories inside `test_output/` are created so nested names such
/// as `"themes/sepia.svg"` work directly.
pub fn output_path(filename: impl AsRef<Path>) -> PathBuf {
    let path = get_output_dir().join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create artifact directory");
    }
    path
}

/// Write an artifact under `test_output/` and return where it went
pub fn write_artifact(filename: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
    let path = output_path(filename);
    fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root_is_workspace() {
        let root = find_project_root().unwrap();
        let manifest = fs::read_to_string(root.join("Cargo.toml")).unwrap();
        assert!(manifest.contains("[workspace]"));
        assert!(root.join("test_helpers").is_dir());
    }

    #[test]
    fn test_nested_output_path() {
        let path = output_path("nested/helpers_check.txt");
        assert!(path.parent().unwrap().is_dir());
        assert!(path.starts_with(get_output_dir()));
    }

    #[test]
    fn test_write_artifact_roundtrip() {
        let path = write_artifact("helpers_artifact.txt", "chart").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "chart");
    }
}
