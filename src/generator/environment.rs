//! Stage functions used by the generator.
//!
//! Each stage is a plain function over explicit inputs. The generator calls
//! them through an `Environment`, so tests can substitute any stage.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::core::{BuildMode, Project, TargetId, TargetNameMode, Targets};
use crate::generator::consolidate::{self, ConsolidatedTargets};
use crate::generator::dependencies::{self, TargetGraph};
use crate::generator::disambiguate::{self, DisambiguatedTargets};
use crate::generator::document::{self, ProjectDocument};
use crate::generator::errors::{ConfigurationError, GenerateError, NamingError, TargetGraphError};
use crate::generator::files::{self, FilesAndGroups, ResolvedRepository};
use crate::generator::generated_files::{self, XcodeGeneratedFiles};
use crate::generator::infrastructure;
use crate::generator::products::{self, Products};
use crate::generator::schemes::{self, Scheme};
use crate::generator::targets;
use crate::generator::target_resolver::TargetResolver;
use crate::generator::writer;

#[derive(Clone, Copy)]
pub struct Environment {
    pub calculate_xcode_generated_files:
        fn(BuildMode, &Targets) -> Result<XcodeGeneratedFiles, TargetGraphError>,
    pub create_files_and_groups: fn(&Project) -> FilesAndGroups,
    pub consolidate_targets:
        fn(&Targets, &XcodeGeneratedFiles) -> Result<ConsolidatedTargets, TargetGraphError>,
    pub disambiguate_targets: fn(
        &ConsolidatedTargets,
        &Targets,
        TargetNameMode,
    ) -> Result<DisambiguatedTargets, NamingError>,
    pub create_products: fn(&Targets, &ConsolidatedTargets) -> Products,
    pub resolve_dependencies:
        fn(&DisambiguatedTargets, bool) -> Result<TargetGraph, TargetGraphError>,
    pub create_target_resolver: fn(
        &Targets,
        &DisambiguatedTargets,
        BTreeMap<TargetId, Vec<TargetId>>,
        BTreeMap<TargetId, String>,
    ) -> TargetResolver,
    pub create_project: fn(&Project) -> ProjectDocument,
    pub set_additional_project_configuration: fn(&mut ProjectDocument, &[ResolvedRepository]),
    pub populate_main_group: fn(&mut ProjectDocument, &FilesAndGroups, &Products),
    pub add_infrastructure_target:
        fn(&mut ProjectDocument, &Project, &TargetGraph, &XcodeGeneratedFiles),
    pub add_targets: fn(
        &mut ProjectDocument,
        &Targets,
        &DisambiguatedTargets,
        &Products,
        &FilesAndGroups,
    ) -> Result<(), TargetGraphError>,
    pub set_target_configurations: fn(
        &mut ProjectDocument,
        &Project,
        &Targets,
        &DisambiguatedTargets,
        &TargetResolver,
    ) -> Result<(), ConfigurationError>,
    pub set_target_dependencies:
        fn(&mut ProjectDocument, &TargetGraph, &TargetResolver) -> Result<(), TargetGraphError>,
    pub create_custom_schemes:
        fn(&Project, &TargetResolver) -> Result<Vec<Scheme>, ConfigurationError>,
    pub create_autogenerated_schemes: fn(
        &Project,
        &DisambiguatedTargets,
        &TargetResolver,
        &BTreeSet<String>,
    ) -> Result<Vec<Scheme>, ConfigurationError>,
    pub write_project: fn(&ProjectDocument, &[Scheme], &Path) -> Result<PathBuf, GenerateError>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            calculate_xcode_generated_files: generated_files::calculate_xcode_generated_files,
            create_files_and_groups: files::create_files_and_groups,
            consolidate_targets: consolidate::consolidate_targets,
            disambiguate_targets: disambiguate::disambiguate_targets,
            create_products: products::create_products,
            resolve_dependencies: dependencies::resolve_dependencies,
            create_target_resolver: TargetResolver::new,
            create_project: document::create_project,
            set_additional_project_configuration: document::set_additional_project_configuration,
            populate_main_group: document::populate_main_group,
            add_infrastructure_target: infrastructure::add_infrastructure_target,
            add_targets: targets::add_targets,
            set_target_configurations: targets::set_target_configurations,
            set_target_dependencies: targets::set_target_dependencies,
            create_custom_schemes: schemes::create_custom_schemes,
            create_autogenerated_schemes: schemes::create_autogenerated_schemes,
            write_project: writer::write_project,
        }
    }
}
