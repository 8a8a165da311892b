//! Core library for the gradebook-extract command line application.
//!
//! The library walks a tree of per-class, per-subject workbooks and turns
//! them into a single JSON document. IO adapters live under [`io`] (directory
//! walk, workbook parsing, JSON output), data representations inside
//! [`model`], merging in [`aggregate`], and the end-to-end run in
//! [`pipeline`]. [`metrics`] and [`report`] derive per-student views from an
//! extracted document.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod io;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod report;

pub use config::Config;
pub use error::{Result, ToolError};
