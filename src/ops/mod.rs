//! High-level operations.
//!
//! This module contains the implementation of xcgen commands.

pub mod generate;

pub use generate::{
    describe_targets, diagnose, generate, load_project, GenerateOptions, GenerateResult, TargetSummary,
};
