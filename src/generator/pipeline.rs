//! Generation pipeline.
//!
//! The stage order is fixed here and nowhere else:
//!
//! ```text
//! files and groups ───────────────────────────────┐
//! generated files → consolidation ─┬─ disambiguation ─┬─ dependencies + resolver
//!                                  └─ products ───────┘        │
//!   project → main group → infrastructure → targets → configurations
//!     → dependencies → custom schemes → autogenerated schemes → write
//! ```
//!
//! Independent branches run concurrently on a dedicated rayon pool and are
//! joined before anything consumes them. The project document is only
//! mutated after every join, on the calling thread.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::{Project, Targets};
use crate::generator::dependencies::TargetGraph;
use crate::generator::disambiguate::DisambiguatedTargets;
use crate::generator::document::ProjectDocument;
use crate::generator::environment::Environment;
use crate::generator::errors::GenerateError;
use crate::generator::schemes::{check_scheme_files, Scheme};

/// Everything a run computes before writing.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub document: ProjectDocument,
    pub schemes: Vec<Scheme>,
    pub targets: DisambiguatedTargets,
    pub graph: TargetGraph,
}

/// A completed run.
#[derive(Debug, Clone)]
pub struct Generated {
    pub path: PathBuf,
    pub plan: GenerationPlan,
}

#[derive(Default)]
pub struct Generator {
    environment: Environment,
    jobs: Option<usize>,
}

impl Generator {
    pub fn new(environment: Environment) -> Self {
        Generator {
            environment,
            jobs: None,
        }
    }

    /// Worker threads for concurrent stages (None = one per CPU).
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Run every stage and write the project into `output_dir`.
    ///
    /// Nothing is written unless every stage succeeds.
    pub fn generate(&self, project: &Project, output_dir: &Path) -> Result<Generated, GenerateError> {
        let plan = self.plan(project)?;
        let path = (self.environment.write_project)(&plan.document, &plan.schemes, output_dir)?;
        Ok(Generated { path, plan })
    }

    /// Run every stage except writing.
    pub fn plan(&self, project: &Project) -> Result<GenerationPlan, GenerateError> {
        project.validate()?;
        let targets = Targets::new(project.targets.iter().cloned())?;

        tracing::info!(
            "Generating `{}` from {} target variant(s)",
            project.name,
            targets.len()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .thread_name(|i| format!("xcgen-{}", i))
            .build()?;

        pool.install(|| self.run(project, &targets))
    }

    fn run(&self, project: &Project, targets: &Targets) -> Result<GenerationPlan, GenerateError> {
        let env = &self.environment;

        let (files, consolidation) = rayon::join(
            || (env.create_files_and_groups)(project),
            || -> Result<_, GenerateError> {
                let generated = (env.calculate_xcode_generated_files)(project.build_mode, targets)?;
                let consolidated = (env.consolidate_targets)(targets, &generated)?;
                let (named, products) = rayon::join(
                    || (env.disambiguate_targets)(&consolidated, targets, project.target_name_mode),
                    || (env.create_products)(targets, &consolidated),
                );
                Ok((generated, named?, products))
            },
        );
        let (generated, named, products) = consolidation?;

        let has_build_scripts =
            project.pre_build_script.is_some() || project.post_build_script.is_some();
        let graph = (env.resolve_dependencies)(&named, has_build_scripts)?;
        let resolver = (env.create_target_resolver)(
            targets,
            &named,
            project.target_hosts(),
            project.extension_point_identifiers(),
        );

        let mut document = (env.create_project)(project);
        (env.set_additional_project_configuration)(&mut document, &files.resolved_repositories);
        (env.populate_main_group)(&mut document, &files, &products);
        (env.add_infrastructure_target)(&mut document, project, &graph, &generated);
        (env.add_targets)(&mut document, targets, &named, &products, &files)?;
        (env.set_target_configurations)(&mut document, project, targets, &named, &resolver)?;
        (env.set_target_dependencies)(&mut document, &graph, &resolver)?;

        let mut schemes = (env.create_custom_schemes)(project, &resolver)?;
        let custom_names: BTreeSet<String> = schemes.iter().map(|s| s.name.clone()).collect();
        schemes.extend((env.create_autogenerated_schemes)(
            project,
            &named,
            &resolver,
            &custom_names,
        )?);
        check_scheme_files(&schemes)?;

        tracing::info!(
            "Planned {} target(s) and {} scheme(s)",
            document.targets.len(),
            schemes.len()
        );

        Ok(GenerationPlan {
            document,
            schemes,
            targets: named,
            graph,
        })
    }
}
