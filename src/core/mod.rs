//! Core data structures for xcgen.
//!
//! This module contains the build-graph model the generator consumes:
//! - Target identifiers and BuildTargets
//! - Platforms, product types and file references
//! - The project description and its validation

pub mod file_path;
pub mod platform;
pub mod product_type;
pub mod project;
pub mod target;
pub mod target_id;

pub use file_path::{FileKind, FilePath};
pub use platform::{Os, Platform, PlatformVariant};
pub use product_type::ProductType;
pub use project::{
    BuildMode, CustomLaunch, CustomScheme, Project, SchemeAutogenerationMode, TargetNameMode,
};
pub use target::{BuildTarget, TargetInputs, TargetOutputs, Targets};
pub use target_id::TargetId;
