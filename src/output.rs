//! Output module: persists a rendered tree.
//!
//! The renderer only produces a string; this module decides where it goes:
//!
//! - **stdout** when `--stdout` is given
//! - an **explicit file** when `--output` is given
//! - otherwise a **synthesized file** `{basename}_tree_{timestamp}.{ext}`
//!   inside the rendered root directory
//!
//! File: src/output.rs
//! Author: WaterRun
//! Date: 2026-10-18

#![forbid(unsafe_code)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::config::{Config, OutputFormat};
use crate::error::OutputError;
use crate::render::RenderResult;
use crate::walk::root_name;

/// Timestamp layout used in synthesized file names.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Name used when the root has no usable name, e.g. `/` or `C:\`.
const UNNAMED_ROOT: &str = "root";

/// Where a rendered tree ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Printed to standard output.
    Stdout,
    /// Written to the given file.
    File(PathBuf),
}

/// Builds the default output file name for a root and format.
///
/// Path separators and drive colons in the root name are dropped so the
/// result is always a single path component.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use chrono::{Local, TimeZone};
/// use dirtree::config::OutputFormat;
/// use dirtree::output::default_file_name;
///
/// let at = Local.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
/// let name = default_file_name(Path::new("/work/project"), OutputFormat::Markdown, &at);
/// assert_eq!(name, "project_tree_20260314_150926.markdown");
/// ```
#[must_use]
pub fn default_file_name(root: &Path, format: OutputFormat, at: &DateTime<Local>) -> String {
    format!(
        "{}_tree_{}.{}",
        file_stem(root),
        at.format(TIMESTAMP_FORMAT),
        format.extension()
    )
}

/// Root name reduced to characters that are valid inside one file name.
fn file_stem(root: &Path) -> String {
    let name = root_name(root);
    let parts: Vec<&str> = name
        .split(['/', '\\', ':'])
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        UNNAMED_ROOT.to_string()
    } else {
        parts.join("_")
    }
}

/// Resolves the destination for a validated configuration.
///
/// An explicit `--output` wins; otherwise a file name is synthesized inside
/// the root directory.
#[must_use]
pub fn resolve_target(config: &Config, at: &DateTime<Local>) -> OutputTarget {
    if config.output.to_stdout {
        return OutputTarget::Stdout;
    }
    match &config.output.output_path {
        Some(path) => OutputTarget::File(path.clone()),
        None => OutputTarget::File(config.root_path.join(default_file_name(
            &config.root_path,
            config.render.format,
            at,
        ))),
    }
}

/// Writes content to a file, replacing any existing file.
///
/// # Errors
///
/// Returns `OutputError::WriteFailed` if the file cannot be written.
pub fn write_file(content: &str, path: &Path) -> Result<(), OutputError> {
    fs::write(path, content).map_err(|source| OutputError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = content.len(), "tree written");
    Ok(())
}

/// Prints content to stdout followed by a newline.
///
/// # Errors
///
/// Returns `OutputError::StdoutFailed` if stdout cannot be written.
pub fn print_stdout(content: &str) -> Result<(), OutputError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{content}")?;
    handle.flush()?;
    Ok(())
}

/// Sends a render result to its configured destination.
///
/// # Errors
///
/// Returns an `OutputError` if writing to the file or stdout fails.
pub fn execute_output(result: &RenderResult, config: &Config) -> Result<OutputTarget, OutputError> {
    let target = resolve_target(config, &Local::now());
    match &target {
        OutputTarget::Stdout => print_stdout(&result.content)?,
        OutputTarget::File(path) => write_file(&result.content, path)?,
    }
    Ok(target)
}
