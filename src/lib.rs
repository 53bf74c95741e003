//! Core library for the vibe-sheets command line application.
//!
//! The modules keep responsibilities narrow and composable: the workbook
//! model lives in [`model`], file IO adapters under [`io`], value pasting in
//! [`copy`], sheet duplication in [`sheets`], chart sheets in [`chart`], and
//! the end-to-end workflows in [`sync`] and [`average`]. [`layout`] holds the
//! sheet names and ranges those workflows are driven by.

pub mod average;
pub mod chart;
pub mod copy;
pub mod error;
pub mod io;
pub mod layout;
pub mod model;
pub mod sheets;
pub mod sync;

pub use error::{Result, ToolError};
