//! xcgen - Xcode project generation from multi-configuration build graphs
//!
//! This crate provides the core library functionality for xcgen, including
//! target consolidation, naming, dependency resolution and document output.

pub mod core;
pub mod generator;
pub mod ops;
pub mod util;

/// Test utilities for xcgen unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides builders for targets and projects.
#[cfg(test)]
pub mod test_support;

pub use core::{BuildTarget, Project, TargetId, Targets};
pub use generator::{GenerateError, Generator};
