//! Xcode project generation.
//!
//! Turns a validated build graph into a project document in stages:
//! - Generated-file classification
//! - Target consolidation and naming
//! - Dependency resolution, including the infrastructure target
//! - Document assembly, schemes and output
//!
//! `pipeline::Generator` drives the stages in order.

pub mod consolidate;
pub mod dependencies;
pub mod disambiguate;
pub mod document;
pub mod environment;
pub mod errors;
pub mod files;
pub mod generated_files;
mod graph;
pub mod infrastructure;
pub mod pipeline;
pub mod products;
pub mod schemes;
pub mod target_resolver;
pub mod targets;
pub mod writer;

pub use consolidate::{
    consolidate_targets, ConsolidatedTarget, ConsolidatedTargetKey, ConsolidatedTargets,
    ConsolidationKey,
};
pub use dependencies::{resolve_dependencies, DependencyEdge, GraphNode, TargetGraph};
pub use disambiguate::{disambiguate_targets, DisambiguatedTarget, DisambiguatedTargets};
pub use document::ProjectDocument;
pub use environment::Environment;
pub use errors::{ConfigurationError, GenerateError, NamingError, TargetGraphError};
pub use generated_files::{calculate_xcode_generated_files, XcodeGeneratedFiles};
pub use pipeline::{GenerationPlan, Generated, Generator};
pub use schemes::Scheme;
pub use target_resolver::{ResolvedTarget, TargetResolver};
