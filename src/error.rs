//! Error handling module: defines unified error types for dirtree.
//!
//! This module provides a hierarchical error type system covering:
//!
//! - **CLI parsing errors**: argument format, unknown or duplicate options
//! - **Configuration errors**: re-exported from `config`, surfaced as `CliError::InvalidConfig`
//! - **Render errors**: invalid root, traversal failures, cancellation
//! - **Output errors**: file writing and stdout failures
//!
//! A render failure and a write failure are distinct variants so callers can
//! tell "the tree could not be produced" apart from "the tree could not be saved".
//!
//! File: src/error.rs
//! Author: WaterRun
//! Date: 2026-10-18

#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use crate::config::ConfigError;

/// Top-level error type for dirtree.
///
/// Aggregates all sub-module errors as the unified error return type for the
/// program's main entry point.
///
/// # Examples
///
/// ```
/// use dirtree::error::{DirtreeError, RenderError};
/// use std::path::PathBuf;
///
/// let err = RenderError::InvalidRoot {
///     path: PathBuf::from("/missing"),
///     reason: "path does not exist".to_string(),
/// };
/// let top: DirtreeError = err.into();
/// assert!(matches!(top, DirtreeError::Render(_)));
/// ```
#[derive(Debug, Error)]
pub enum DirtreeError {
    /// CLI parsing error.
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Tree rendering error.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Output error.
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// CLI argument parsing errors.
///
/// # Examples
///
/// ```
/// use dirtree::error::CliError;
///
/// let err = CliError::MissingValue {
///     option: "--indent".to_string(),
/// };
/// assert!(err.to_string().contains("--indent"));
/// assert!(err.to_string().contains("requires a value"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Unknown option was provided.
    #[error("Unknown option: {option}")]
    UnknownOption {
        /// The unrecognized option name.
        option: String,
    },

    /// Option is missing its required value.
    #[error("Option {option} requires a value.")]
    MissingValue {
        /// The option name.
        option: String,
    },

    /// Option value has invalid format.
    #[error("Invalid value '{value}' for option {option}: {reason}")]
    InvalidValue {
        /// The option name.
        option: String,
        /// The provided value.
        value: String,
        /// The reason for invalidity.
        reason: String,
    },

    /// Option was specified more than once.
    #[error("Option {option} was specified more than once.")]
    DuplicateOption {
        /// The option name.
        option: String,
    },

    /// Multiple paths were specified when only one is allowed.
    #[error("Only one path can be specified, but multiple were provided: {paths:?}")]
    MultiplePaths {
        /// All discovered paths.
        paths: Vec<String>,
    },

    /// Configuration assembled from the arguments failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Tree rendering errors.
///
/// Rendering is all-or-nothing: any of these aborts the whole render and no
/// partial output is returned.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use dirtree::error::RenderError;
///
/// let err = RenderError::InvalidRoot {
///     path: PathBuf::from("/nonexistent"),
///     reason: "path does not exist".to_string(),
/// };
/// assert!(err.to_string().contains("nonexistent"));
/// assert!(err.to_string().contains("Invalid root"));
/// ```
#[derive(Debug, Error)]
pub enum RenderError {
    /// The root path does not exist or is not a directory.
    #[error("Invalid root '{path}': {reason}")]
    InvalidRoot {
        /// The rejected root path.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// An I/O failure happened while walking the tree.
    #[error("Traversal failed at {path}: {source}")]
    Traversal {
        /// The entry being visited when the failure happened.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Component-derived depth disagrees with the walk depth.
    #[error("Depth mismatch at {path}: walk depth {walk_depth}, path depth {path_depth}")]
    DepthMismatch {
        /// The offending entry.
        path: PathBuf,
        /// Depth reported by the walker.
        walk_depth: usize,
        /// Depth computed from path components relative to the root.
        path_depth: usize,
    },

    /// The indentation width exceeds the supported maximum.
    #[error("Indent width {width} exceeds the maximum of {max}")]
    IndentTooWide {
        /// Requested width.
        width: usize,
        /// Largest accepted width.
        max: usize,
    },

    /// The render was cancelled before it finished.
    #[error("Render cancelled")]
    Cancelled,
}

impl From<walkdir::Error> for RenderError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        let message = err.to_string();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| io::Error::other(message));
        Self::Traversal { path, source }
    }
}

/// Output errors.
///
/// # Examples
///
/// ```
/// use std::io;
/// use std::path::PathBuf;
/// use dirtree::error::OutputError;
///
/// let err = OutputError::WriteFailed {
///     path: PathBuf::from("tree.txt"),
///     source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
/// };
/// assert!(err.to_string().contains("tree.txt"));
/// ```
#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to write the output file.
    #[error("Failed to write file: {path}")]
    WriteFailed {
        /// Target file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to stdout.
    #[error("Failed to write to stdout")]
    StdoutFailed {
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl From<io::Error> for OutputError {
    fn from(err: io::Error) -> Self {
        Self::StdoutFailed { source: err }
    }
}

/// Converts a path to a displayable string.
///
/// Paths with invalid UTF-8 are converted lossily so output is always possible.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dirtree::error::path_display;
///
/// assert_eq!(path_display(Path::new("/home/user/file.txt")), "/home/user/file.txt");
/// ```
#[must_use]
pub fn path_display(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}
