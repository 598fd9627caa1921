//! # hdlgrade
//!
//! An autograder for nand2tetris hardware projects. A submission is copied
//! into a private workspace, its chip sources are flattened and renamed to
//! their canonical spelling, the course's test fixtures are injected, and each
//! requested chip is run through the hardware simulator while every other
//! chip of the project is kept out of the simulator's sight.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Settings injected into every grading stage
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Reading submitted sources that may not be UTF-8
pub mod decode;
/// For all things related to grading
pub mod grade;
/// Chip sources, projects, visibility, and the simulator toolchain
pub mod hdl;
/// For all parsers used
pub mod parsers;
/// Running external tools as child processes
pub mod process;
/// Utility functions for convenience
pub mod util;
/// Per-request staging directories
pub mod workspace;

pub use config::GraderConfig;
pub use grade::{GradeReport, GradeRequest, GradingError};
