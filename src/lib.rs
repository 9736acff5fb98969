//! neardupe - Near-Duplicate Filename Finder
//!
//! A CLI tool that finds files whose names are near-duplicates (the same
//! recording saved twice under cosmetically different filenames), asks the
//! user to confirm each candidate pair, and moves confirmed spares to trash.
//! Detection works on filename similarity, size proximity, and modification
//! time only - file contents are never read.

pub mod actions;
pub mod app;
pub mod cache;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod stats;

pub use app::run_app;
