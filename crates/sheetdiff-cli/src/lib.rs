//! Command-line front end for sheetdiff.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod progress;
pub mod summary;
