//! dirtree: render a directory hierarchy as an indented text, Markdown or
//! HTML tree.
//!
//! The pipeline is `cli` -> `config` -> `render` (driving `walk`) -> `output`.
//! Library users usually only need [`render::render`]:
//!
//! ```no_run
//! use dirtree::config::{OutputFormat, RenderOptions};
//! use dirtree::render::render;
//! use std::path::Path;
//!
//! let options = RenderOptions::with_format(OutputFormat::Markdown);
//! let result = render(Path::new("."), &options, None)?;
//! println!("{}", result.content);
//! # Ok::<(), dirtree::error::RenderError>(())
//! ```
//!
//! File: src/lib.rs
//! Author: WaterRun
//! Date: 2026-10-18

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod render;
pub mod walk;
