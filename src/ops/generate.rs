//! Implementation of `xcgen generate` and `xcgen targets`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::{Os, Project, SchemeAutogenerationMode, TargetNameMode};
use crate::generator::{GenerateError, GenerationPlan, Generator, GraphNode};
use crate::util::diagnostic::Diagnostic;

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Path to the project description (JSON)
    pub project_path: PathBuf,

    /// Directory for the `.xcodeproj` (default: next to the description)
    pub output_dir: Option<PathBuf>,

    /// Number of worker threads
    pub jobs: Option<usize>,

    /// Overrides the description's target name mode
    pub target_name_mode: Option<TargetNameMode>,

    /// Overrides the description's scheme autogeneration mode
    pub scheme_autogeneration_mode: Option<SchemeAutogenerationMode>,

    /// Run every stage but write nothing
    pub dry_run: bool,
}

impl GenerateOptions {
    fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self
                .project_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

/// Result of a generate run.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// Written `.xcodeproj`, or None for a dry run
    pub path: Option<PathBuf>,
    pub targets: usize,
    pub schemes: usize,
}

/// One named target, as shown by `xcgen targets`.
#[derive(Debug, Clone, Serialize)]
pub struct TargetSummary {
    pub name: String,
    pub product_type: String,
    pub platform: Os,
    pub configurations: Vec<String>,
    pub members: Vec<String>,
    pub dependencies: Vec<String>,
}

/// Load the description and apply command-line overrides.
pub fn load_project(opts: &GenerateOptions) -> Result<Project> {
    let mut project = Project::load(&opts.project_path)?;
    if let Some(mode) = opts.target_name_mode {
        project.target_name_mode = mode;
    }
    if let Some(mode) = opts.scheme_autogeneration_mode {
        project.scheme_autogeneration_mode = mode;
    }
    Ok(project)
}

/// Generate the project.
pub fn generate(opts: &GenerateOptions) -> Result<GenerateResult> {
    let project = load_project(opts)?;
    let generator = Generator::default().jobs(opts.jobs);

    if opts.dry_run {
        let plan = generator.plan(&project)?;
        return Ok(GenerateResult {
            path: None,
            targets: plan.document.targets.len(),
            schemes: plan.schemes.len(),
        });
    }

    let output_dir = opts.output_dir();
    let generated = generator
        .generate(&project, &output_dir)
        .with_context(|| format!("failed to generate `{}`", project.name))?;
    Ok(GenerateResult {
        path: Some(generated.path),
        targets: generated.plan.document.targets.len(),
        schemes: generated.plan.schemes.len(),
    })
}

/// Plan the project and summarize its named targets.
pub fn describe_targets(opts: &GenerateOptions) -> Result<Vec<TargetSummary>> {
    let project = load_project(opts)?;
    let plan = Generator::default().jobs(opts.jobs).plan(&project)?;
    Ok(summarize(&plan))
}

fn summarize(plan: &GenerationPlan) -> Vec<TargetSummary> {
    plan.targets
        .iter()
        .map(|named| {
            let dependencies = plan
                .graph
                .dependencies_of(named.key())
                .map(|node| match node {
                    GraphNode::Target(key) => plan
                        .targets
                        .name_of(key)
                        .map(String::from)
                        .unwrap_or_else(|| key.to_string()),
                    GraphNode::Infrastructure => node.to_string(),
                })
                .collect();

            TargetSummary {
                name: named.name.clone(),
                product_type: named.target.product_type().to_string(),
                platform: named.target.os(),
                configurations: named.target.configurations().map(String::from).collect(),
                members: named
                    .key()
                    .targets()
                    .iter()
                    .map(|id| id.to_string())
                    .collect(),
                dependencies,
            }
        })
        .collect()
}

/// Report for a failed command on the description at `project_path`.
pub fn diagnose(err: &anyhow::Error, project_path: Option<&Path>) -> Diagnostic {
    let diag = match err.downcast_ref::<GenerateError>() {
        Some(e) => e.to_diagnostic(),
        None => {
            let mut diag = Diagnostic::error(err.to_string());
            for cause in err.chain().skip(1) {
                diag = diag.with_context(cause.to_string());
            }
            let unreadable = err
                .chain()
                .any(|cause| cause.downcast_ref::<std::io::Error>().is_some());
            if unreadable {
                diag = diag.with_suggestion(
                    "Pass the path of the project description emitted by the build system",
                );
            }
            diag
        }
    };
    match project_path {
        Some(path) => diag.with_location(path),
        None => diag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerateError;
    use crate::test_support::{ProjectBuilder, TargetBuilder};
    use tempfile::TempDir;

    fn write_sample(dir: &Path) -> PathBuf {
        ProjectBuilder::new("Demo")
            .target(TargetBuilder::new("core", "Core").build())
            .target(TargetBuilder::new("app", "App").app().depends_on("core").build())
            .write_to(dir)
            .unwrap()
    }

    #[test]
    fn test_generate_writes_next_to_description() {
        let tmp = TempDir::new().unwrap();
        let opts = GenerateOptions {
            project_path: write_sample(tmp.path()),
            ..Default::default()
        };

        let result = generate(&opts).unwrap();
        assert_eq!(result.path, Some(tmp.path().join("Demo.xcodeproj")));
        assert_eq!(result.targets, 2);
        assert!(tmp.path().join("Demo.xcodeproj/project.json").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        let opts = GenerateOptions {
            project_path: write_sample(tmp.path()),
            output_dir: Some(out.clone()),
            dry_run: true,
            ..Default::default()
        };

        let result = generate(&opts).unwrap();
        assert!(result.path.is_none());
        assert!(!out.exists());
    }

    #[test]
    fn test_overrides_apply() {
        let tmp = TempDir::new().unwrap();
        let opts = GenerateOptions {
            project_path: write_sample(tmp.path()),
            target_name_mode: Some(TargetNameMode::Qualified),
            ..Default::default()
        };

        let names: Vec<_> = describe_targets(&opts)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert!(names.contains(&"Core (iOS)".to_string()));
    }

    #[test]
    fn test_describe_targets_lists_dependencies() {
        let tmp = TempDir::new().unwrap();
        let opts = GenerateOptions {
            project_path: write_sample(tmp.path()),
            ..Default::default()
        };

        let summaries = describe_targets(&opts).unwrap();
        let app = summaries.iter().find(|t| t.name == "App").unwrap();
        assert_eq!(app.dependencies, vec!["Core", "BuildSystemDependencies"]);
        assert_eq!(app.members, vec!["app"]);
    }

    #[test]
    fn test_generate_errors_downcast() {
        let tmp = TempDir::new().unwrap();
        let path = ProjectBuilder::new("Demo")
            .target(TargetBuilder::new("a", "A").depends_on("b").build())
            .target(TargetBuilder::new("b", "B").depends_on("a").build())
            .write_to(tmp.path())
            .unwrap();
        let opts = GenerateOptions {
            project_path: path,
            ..Default::default()
        };

        let err = generate(&opts).unwrap_err();
        assert!(err.downcast_ref::<GenerateError>().is_some());
    }

    #[test]
    fn test_missing_description() {
        let tmp = TempDir::new().unwrap();
        let opts = GenerateOptions {
            project_path: tmp.path().join("missing.json"),
            ..Default::default()
        };
        let err = generate(&opts).unwrap_err();
        assert!(err.to_string().contains("failed to read project description"));
    }

    #[test]
    fn test_diagnose_missing_description() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.json");
        let opts = GenerateOptions {
            project_path: path.clone(),
            ..Default::default()
        };

        let err = generate(&opts).unwrap_err();
        let output = diagnose(&err, Some(&path)).format(false);
        assert!(output.starts_with("error: failed to read project description"));
        assert!(output.contains(&format!("  --> {}", path.display())));
        assert!(output.contains("1. Pass the path of the project description"));
    }

    #[test]
    fn test_diagnose_generation_error() {
        let tmp = TempDir::new().unwrap();
        let path = ProjectBuilder::new("Demo")
            .target(TargetBuilder::new("a", "A").depends_on("b").build())
            .target(TargetBuilder::new("b", "B").depends_on("a").build())
            .write_to(tmp.path())
            .unwrap();
        let opts = GenerateOptions {
            project_path: path.clone(),
            ..Default::default()
        };

        let err = generate(&opts).unwrap_err();
        let diag = diagnose(&err, Some(&path));
        assert!(diag.message.starts_with("dependency cycle detected"));
        assert_eq!(diag.location, Some(path));
        assert!(!diag
            .suggestions
            .iter()
            .any(|s| s.contains("project description")));
    }
}
