//! Rendering module: walks a root directory and formats it as a tree.
//!
//! This module turns the `DirectoryEntry` stream from the `walk` module into
//! one of three textual formats:
//!
//! - **Text**: `__name/` for directories and `__name` for files
//! - **Markdown**: `- name/` and `- name` list items
//! - **Html**: one `<div>` per entry with a `margin-left` indent, wrapped in
//!   a minimal `<html><body>` document
//!
//! Indentation is `depth * indent_width` spaces (pixels for Html). Rendering
//! is all-or-nothing: any failure while walking discards the accumulated
//! lines and returns an error. An optional progress callback receives the
//! fraction of entries processed, and an optional cancel flag is checked
//! once per directory.
//!
//! File: src/render.rs
//! Author: WaterRun
//! Date: 2026-10-18

#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::config::{MAX_INDENT_WIDTH, OutputFormat, RenderOptions};
use crate::error::RenderError;
use crate::walk::{DirectoryEntry, EntryKind, TreeWalker, count_entries};

// ============================================================================
// Constants
// ============================================================================

/// Opening of the Html document shell.
const HTML_HEADER: &str = "<html><body>\n";

/// Closing of the Html document shell.
const HTML_FOOTER: &str = "\n</body></html>";

// ============================================================================
// Render Result
// ============================================================================

/// Result of a successful render.
///
/// # Examples
///
/// ```
/// use dirtree::render::RenderResult;
///
/// let result = RenderResult {
///     content: "__root/\n    __a.txt".to_string(),
///     directory_count: 0,
///     file_count: 1,
/// };
/// assert!(result.content.contains("a.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered text content.
    pub content: String,
    /// Number of directories below the root.
    pub directory_count: usize,
    /// Number of files in the tree.
    pub file_count: usize,
}

// ============================================================================
// Line Formatter
// ============================================================================

/// Formats single entries and assembles the final document.
///
/// A pure function of `(depth, name, kind, options)`; holds no state beyond
/// the options it was built from.
///
/// Html output escapes `& < > " '` in names, so a name is shown as text
/// rather than interpreted as markup. Text and Markdown keep names verbatim.
/// Widths above [`MAX_INDENT_WIDTH`] are clamped to it.
///
/// # Examples
///
/// ```
/// use dirtree::config::{OutputFormat, RenderOptions};
/// use dirtree::render::LineFormatter;
/// use dirtree::walk::{DirectoryEntry, EntryKind};
///
/// let formatter = LineFormatter::new(&RenderOptions::with_format(OutputFormat::Markdown));
/// let line = formatter.format_entry(&DirectoryEntry::new(2, "lib.rs", EntryKind::File));
/// assert_eq!(line, "        - lib.rs");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LineFormatter {
    format: OutputFormat,
    indent_width: usize,
}

impl LineFormatter {
    /// Creates a formatter from render options.
    #[must_use]
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            format: options.format,
            indent_width: options.indent_width.get().min(MAX_INDENT_WIDTH),
        }
    }

    /// Indentation amount for an entry at `depth`.
    #[must_use]
    pub const fn indent(&self, depth: usize) -> usize {
        depth.saturating_mul(self.indent_width)
    }

    /// Formats one entry as a single output line.
    #[must_use]
    pub fn format_entry(&self, entry: &DirectoryEntry) -> String {
        let indent = self.indent(entry.depth);
        let name = entry.name.as_str();

        match (self.format, entry.kind) {
            (OutputFormat::Text, EntryKind::Directory) => format!("{:indent$}__{name}/", ""),
            (OutputFormat::Text, EntryKind::File) => format!("{:indent$}__{name}", ""),
            (OutputFormat::Markdown, EntryKind::Directory) => format!("{:indent$}- {name}/", ""),
            (OutputFormat::Markdown, EntryKind::File) => format!("{:indent$}- {name}", ""),
            (OutputFormat::Html, EntryKind::Directory) => format!(
                "<div style='margin-left: {indent}px;'>{}/</div>",
                escape_html(name)
            ),
            (OutputFormat::Html, EntryKind::File) => format!(
                "<div style='margin-left: {indent}px;'>- {}</div>",
                escape_html(name)
            ),
        }
    }

    /// Joins rendered lines into the final document.
    #[must_use]
    pub fn assemble(&self, lines: &[String]) -> String {
        let body = lines.join("\n");
        match self.format {
            OutputFormat::Html => format!("{HTML_HEADER}{body}{HTML_FOOTER}"),
            OutputFormat::Text | OutputFormat::Markdown => body,
        }
    }
}

/// Escapes the characters that are significant inside Html text.
///
/// # Examples
///
/// ```
/// use dirtree::render::escape_html;
///
/// assert_eq!(escape_html("plain.txt"), "plain.txt");
/// assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
/// ```
#[must_use]
pub fn escape_html(name: &str) -> Cow<'_, str> {
    if !name.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(name);
    }

    let mut escaped = String::with_capacity(name.len() + 8);
    for ch in name.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

// ============================================================================
// Progress
// ============================================================================

/// Progress bookkeeping for one render call.
///
/// Reported fractions are clamped to `[0, 1]` and never decrease; `finish`
/// guarantees the last reported value is exactly `1.0`.
struct ProgressTracker<'a> {
    callback: Option<&'a mut dyn FnMut(f64)>,
    total: usize,
    processed: usize,
    last: Option<f64>,
}

impl<'a> ProgressTracker<'a> {
    fn new(callback: Option<&'a mut dyn FnMut(f64)>, total: usize) -> Self {
        Self {
            callback,
            total,
            processed: 0,
            last: None,
        }
    }

    /// Records one emitted non-root entry; reports after file lines.
    fn advance(&mut self, kind: EntryKind) {
        self.processed += 1;
        if kind == EntryKind::File {
            let fraction = if self.total == 0 {
                1.0
            } else {
                self.processed as f64 / self.total as f64
            };
            self.report(fraction);
        }
    }

    fn finish(&mut self) {
        if self.last != Some(1.0) {
            self.report(1.0);
        }
    }

    fn report(&mut self, fraction: f64) {
        let Some(callback) = self.callback.as_mut() else {
            return;
        };
        let mut value = fraction.clamp(0.0, 1.0);
        if let Some(last) = self.last {
            value = value.max(last);
        }
        callback(value);
        self.last = Some(value);
    }
}

// ============================================================================
// Tree Renderer
// ============================================================================

/// Walks a root directory and renders it in the configured format.
///
/// Holds no state across calls; every `render` is independent.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use std::sync::Arc;
/// use std::sync::atomic::AtomicBool;
/// use dirtree::config::RenderOptions;
/// use dirtree::render::TreeRenderer;
///
/// let cancel = Arc::new(AtomicBool::new(false));
/// let renderer = TreeRenderer::new(RenderOptions::default()).with_cancel_flag(cancel);
/// let mut report = |fraction: f64| eprintln!("{:.0}%", fraction * 100.0);
/// let result = renderer.render(Path::new("."), Some(&mut report)).expect("render failed");
/// println!("{}", result.content);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TreeRenderer {
    options: RenderOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl TreeRenderer {
    /// Creates a renderer with the given options.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            cancel: None,
        }
    }

    /// Attaches a cancel flag, checked once per directory visited.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Render options in use.
    #[must_use]
    pub const fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders the tree rooted at `root`.
    ///
    /// # Errors
    ///
    /// - `RenderError::IndentTooWide` if the indent width exceeds
    ///   `MAX_INDENT_WIDTH`; nothing is traversed.
    /// - `RenderError::InvalidRoot` if `root` is missing or not a directory;
    ///   nothing is traversed.
    /// - `RenderError::Traversal` / `RenderError::DepthMismatch` on any
    ///   failure during the walk; no partial output is returned.
    /// - `RenderError::Cancelled` if the cancel flag was raised.
    pub fn render(
        &self,
        root: &Path,
        on_progress: Option<&mut dyn FnMut(f64)>,
    ) -> Result<RenderResult, RenderError> {
        if !self.options.indent_in_range() {
            return Err(RenderError::IndentTooWide {
                width: self.options.indent_width.get(),
                max: MAX_INDENT_WIDTH,
            });
        }
        check_root(root)?;
        debug!(
            root = %root.display(),
            format = self.options.format.name(),
            indent = self.options.indent_width.get(),
            "render start"
        );

        let total = if on_progress.is_some() {
            let total = count_entries(root).inspect_err(|e| warn!("count failed: {e}"))?;
            debug!(total, "entries counted");
            total
        } else {
            0
        };

        let formatter = LineFormatter::new(&self.options);
        let walker = TreeWalker::new(root, self.options.sort_entries);
        let mut progress = ProgressTracker::new(on_progress, total);
        let mut lines = Vec::new();
        let mut directory_count = 0;
        let mut file_count = 0;

        for item in walker.entries() {
            let entry = item.inspect_err(|e| warn!("render aborted: {e}"))?;

            if entry.is_dir() {
                self.check_cancelled()?;
            }
            lines.push(formatter.format_entry(&entry));

            if entry.depth == 0 {
                continue;
            }
            match entry.kind {
                EntryKind::Directory => directory_count += 1,
                EntryKind::File => file_count += 1,
            }
            progress.advance(entry.kind);
        }
        progress.finish();

        debug!(directory_count, file_count, "render done");
        Ok(RenderResult {
            content: formatter.assemble(&lines),
            directory_count,
            file_count,
        })
    }

    fn check_cancelled(&self) -> Result<(), RenderError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => Err(RenderError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Renders the tree rooted at `root` with `options`.
///
/// Convenience wrapper over [`TreeRenderer::render`] without cancellation.
///
/// # Errors
///
/// See [`TreeRenderer::render`].
///
/// # Examples
///
/// ```
/// use dirtree::config::RenderOptions;
/// use dirtree::error::RenderError;
/// use dirtree::render::render;
/// use std::path::Path;
///
/// let err = render(Path::new("/definitely/not/here"), &RenderOptions::default(), None).unwrap_err();
/// assert!(matches!(err, RenderError::InvalidRoot { .. }));
/// ```
pub fn render(
    root: &Path,
    options: &RenderOptions,
    on_progress: Option<&mut dyn FnMut(f64)>,
) -> Result<RenderResult, RenderError> {
    TreeRenderer::new(*options).render(root, on_progress)
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Verifies the root is an existing directory.
fn check_root(root: &Path) -> Result<(), RenderError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(RenderError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "path is not a directory".to_string(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(RenderError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "path does not exist".to_string(),
        }),
        Err(e) => Err(RenderError::InvalidRoot {
            path: root.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
