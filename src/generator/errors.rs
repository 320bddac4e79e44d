//! Generation error types and diagnostics.
//!
//! Every error is fatal: the run aborts before anything is written.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::{FilePath, TargetId};
use crate::util::diagnostic::Diagnostic;

/// Structural problems in the input build graph.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum TargetGraphError {
    #[error("target `{target}` is declared more than once")]
    #[diagnostic(code(xcgen::graph::duplicate_target))]
    DuplicateTarget { target: TargetId },

    #[error("target `{target}` depends on unknown target `{dependency}`")]
    #[diagnostic(code(xcgen::graph::unknown_dependency))]
    UnknownDependency {
        target: TargetId,
        dependency: TargetId,
    },

    #[error("dependency cycle detected: {}", .cycle.join(" → "))]
    #[diagnostic(
        code(xcgen::graph::cycle),
        help("Xcode targets cannot depend on each other cyclically")
    )]
    DependencyCycle { cycle: Vec<String> },

    #[error("targets {} of `{name}` share configuration `{configuration}`", format_ids(.targets))]
    #[diagnostic(code(xcgen::graph::duplicate_configuration))]
    DuplicateConfiguration {
        name: String,
        configuration: String,
        targets: Vec<TargetId>,
    },

    #[error("target `{target}` does not declare its product output")]
    #[diagnostic(code(xcgen::graph::missing_outputs))]
    MissingOutputs { target: TargetId },

    #[error("generated file `{path}` is claimed by {}", format_ids(.targets))]
    #[diagnostic(code(xcgen::graph::conflicting_generated_file))]
    ConflictingGeneratedFile {
        path: FilePath,
        targets: Vec<TargetId>,
    },
}

/// Internal-invariant violations in target disambiguation.
///
/// Consolidation guarantees distinct targets differ in some qualifying
/// attribute, so these indicate a defect rather than bad input.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum NamingError {
    #[error("targets {} and {} are structurally identical", format_ids(.first), format_ids(.second))]
    #[diagnostic(code(xcgen::naming::identical_targets))]
    IdenticalTargets {
        first: Vec<TargetId>,
        second: Vec<TargetId>,
    },

    #[error("could not assign unique names to: {}", .names.join(", "))]
    #[diagnostic(code(xcgen::naming::unresolvable))]
    Unresolvable { names: Vec<String> },
}

/// Missing or inconsistent configuration data.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigurationError {
    #[error("no build configurations are declared")]
    #[diagnostic(code(xcgen::config::no_configurations))]
    NoConfigurations,

    #[error("build configuration `{name}` is declared more than once")]
    #[diagnostic(code(xcgen::config::duplicate_configuration))]
    DuplicateConfiguration { name: String },

    #[error("default configuration `{default}` is not one of: {}", .available.join(", "))]
    #[diagnostic(code(xcgen::config::missing_default))]
    MissingDefaultConfiguration {
        default: String,
        available: Vec<String>,
    },

    #[error("target `{target}` uses undeclared configuration `{configuration}`")]
    #[diagnostic(code(xcgen::config::unknown_target_configuration))]
    UnknownTargetConfiguration {
        target: TargetId,
        configuration: String,
    },

    #[error("target `{target}` names unknown host `{host}`")]
    #[diagnostic(code(xcgen::config::unknown_host))]
    UnknownHost { target: TargetId, host: TargetId },

    #[error("`{host}` is not a declared host of `{target}`")]
    #[diagnostic(code(xcgen::config::undeclared_host))]
    UndeclaredHost { target: TargetId, host: TargetId },

    #[error("{context} references unknown target `{target}`")]
    #[diagnostic(code(xcgen::config::unknown_target))]
    UnknownTargetReference { context: String, target: TargetId },

    #[error("scheme `{name}` is declared more than once")]
    #[diagnostic(code(xcgen::config::duplicate_scheme))]
    DuplicateSchemeName { name: String },

    #[error("schemes `{first}` and `{second}` would both be written to `{file_name}`")]
    #[diagnostic(code(xcgen::config::conflicting_scheme_files))]
    ConflictingSchemeFiles {
        first: String,
        second: String,
        file_name: String,
    },

    #[error("scheme `{scheme}` uses undeclared configuration `{configuration}`")]
    #[diagnostic(code(xcgen::config::unknown_scheme_configuration))]
    UnknownSchemeConfiguration {
        scheme: String,
        configuration: String,
    },
}

/// Any error that aborts a generation run.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum GenerateError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    TargetGraph(#[from] TargetGraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Naming(#[from] NamingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("failed to write `{}`", .path.display())]
    #[diagnostic(code(xcgen::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize project document")]
    #[diagnostic(code(xcgen::serialize))]
    Serialize(#[from] serde_json::Error),

    #[error("failed to start worker pool")]
    #[diagnostic(code(xcgen::thread_pool))]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

fn format_ids(ids: &[TargetId]) -> String {
    ids.iter()
        .map(|id| format!("`{}`", id))
        .collect::<Vec<_>>()
        .join(", ")
}

impl TargetGraphError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            TargetGraphError::DuplicateTarget { .. } => diag
                .with_suggestion("Ensure the build graph emits each target identifier once"),
            TargetGraphError::UnknownDependency { dependency, .. } => diag
                .with_context(format!("`{}` is not part of the build graph", dependency))
                .with_suggestion("Include the dependency in the project description"),
            TargetGraphError::DependencyCycle { cycle } => diag
                .with_context(format!("cycle: {}", cycle.join(" -> ")))
                .with_suggestion("Break the cycle by removing or restructuring dependencies"),
            TargetGraphError::DuplicateConfiguration { targets, .. } => {
                let mut diag = diag;
                for target in targets {
                    diag = diag.with_context(format!("`{}`", target));
                }
                diag.with_suggestion(
                    "Give each variant of a target a distinct configuration name",
                )
            }
            TargetGraphError::MissingOutputs { .. } => {
                diag.with_suggestion("Declare `outputs.product` for every target")
            }
            TargetGraphError::ConflictingGeneratedFile { targets, .. } => {
                let mut diag = diag;
                for target in targets {
                    diag = diag.with_context(format!("produced by `{}`", target));
                }
                diag.with_suggestion("Ensure each generated file has a single producing target")
            }
        }
    }
}

impl NamingError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string())
            .with_context("this is an internal error in target consolidation")
            .with_suggestion("Report the project description that triggered it")
    }
}

impl ConfigurationError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ConfigurationError::MissingDefaultConfiguration { .. } => diag
                .with_suggestion("Set `default_configuration` to one of the declared configurations"),
            ConfigurationError::UnknownTargetConfiguration { .. }
            | ConfigurationError::UnknownSchemeConfiguration { .. } => {
                diag.with_suggestion("Add the configuration to `configurations`")
            }
            ConfigurationError::DuplicateSchemeName { .. }
            | ConfigurationError::ConflictingSchemeFiles { .. } => diag.with_suggestion(
                "Rename one of the targets, or declare custom schemes with distinct names",
            ),
            ConfigurationError::UndeclaredHost { target, .. } => {
                diag.with_suggestion(format!("Add the host to `hosts` of `{}`", target))
            }
            _ => diag,
        }
    }
}

impl GenerateError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenerateError::TargetGraph(e) => e.to_diagnostic(),
            GenerateError::Naming(e) => e.to_diagnostic(),
            GenerateError::Configuration(e) => e.to_diagnostic(),
            GenerateError::Io { source, .. } => {
                Diagnostic::error(self.to_string()).with_context(source.to_string())
            }
            GenerateError::Serialize(e) => {
                Diagnostic::error(self.to_string()).with_context(e.to_string())
            }
            GenerateError::ThreadPool(e) => Diagnostic::error(self.to_string())
                .with_context(e.to_string())
                .with_suggestion("Lower `--jobs` or unset `generate.jobs` in the config"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_diagnostic() {
        let err = TargetGraphError::DependencyCycle {
            cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert_eq!(err.to_string(), "dependency cycle detected: A → B → A");

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("cycle: A -> B -> A"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_conflicting_generated_file_names_targets() {
        let err = TargetGraphError::ConflictingGeneratedFile {
            path: FilePath::generated("bin/libCore.a"),
            targets: vec![TargetId::new("core-a"), TargetId::new("core-b")],
        };
        let message = err.to_string();
        assert!(message.contains("generated/bin/libCore.a"));
        assert!(message.contains("`core-a`, `core-b`"));
    }

    #[test]
    fn test_generate_error_wraps_stage_errors() {
        let err: GenerateError = ConfigurationError::NoConfigurations.into();
        assert_eq!(err.to_string(), "no build configurations are declared");
        assert!(err.to_diagnostic().format(false).starts_with("error: "));
    }
}
