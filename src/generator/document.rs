//! In-memory project document.
//!
//! Built up by the sequential pipeline stages and handed to the writer.
//! Only stages that run after all of their inputs are ready mutate it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::platform::short_version;
use crate::core::{BuildMode, Os, Project};
use crate::generator::consolidate::ConsolidatedTargetKey;
use crate::generator::files::{FileElement, FilesAndGroups, ResolvedRepository};
use crate::generator::infrastructure::InfrastructureTarget;
use crate::generator::products::Products;
use crate::util::hash::Fingerprint;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    pub name: String,
    pub build_settings: BTreeMap<String, String>,
}

/// Reference from a target to one it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDependency {
    pub name: String,
    pub object_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductReference {
    pub name: String,
    pub object_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeTarget {
    #[serde(skip)]
    pub key: ConsolidatedTargetKey,
    pub name: String,
    pub object_id: String,
    pub product_type: &'static str,
    pub platform: Os,
    pub product: ProductReference,
    /// File reference identifiers compiled or copied by this target.
    pub files: Vec<String>,
    pub build_configurations: Vec<BuildConfiguration>,
    pub dependencies: Vec<TargetDependency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDocument {
    pub name: String,
    pub object_id: String,
    pub build_mode: BuildMode,
    pub minimum_xcode_version: String,
    pub development_region: String,
    pub default_configuration: String,
    pub build_configurations: Vec<BuildConfiguration>,
    pub main_group: Vec<FileElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infrastructure_target: Option<InfrastructureTarget>,
    pub targets: Vec<NativeTarget>,
}

impl ProjectDocument {
    pub fn target_mut(&mut self, key: &ConsolidatedTargetKey) -> Option<&mut NativeTarget> {
        self.targets.iter_mut().find(|t| &t.key == key)
    }
}

/// Create the empty project document.
pub fn create_project(project: &Project) -> ProjectDocument {
    let mut fp = Fingerprint::new();
    fp.update_str("project").update_str(&project.name);

    let build_configurations = project
        .configurations
        .iter()
        .map(|name| BuildConfiguration {
            name: name.clone(),
            build_settings: BTreeMap::from([
                ("BUILD_MODE".to_string(), project.build_mode.to_string()),
                ("ONLY_ACTIVE_ARCH".to_string(), "YES".to_string()),
            ]),
        })
        .collect();

    ProjectDocument {
        name: project.name.clone(),
        object_id: fp.finish_object_id(),
        build_mode: project.build_mode,
        minimum_xcode_version: short_version(&project.minimum_xcode_version),
        development_region: project.development_region.clone(),
        default_configuration: project.default_configuration.clone(),
        build_configurations,
        main_group: Vec::new(),
        infrastructure_target: None,
        targets: Vec::new(),
    }
}

/// Record resolved external repositories as a project build setting.
pub fn set_additional_project_configuration(
    document: &mut ProjectDocument,
    resolved_repositories: &[ResolvedRepository],
) {
    if resolved_repositories.is_empty() {
        return;
    }

    let value = resolved_repositories
        .iter()
        .map(|r| format!("\"{}\" \"{}\"", r.name, r.path))
        .collect::<Vec<_>>()
        .join(" ");

    for configuration in &mut document.build_configurations {
        configuration
            .build_settings
            .insert("RESOLVED_REPOSITORIES".to_string(), value.clone());
    }
}

/// Root file elements followed by the products group.
pub fn populate_main_group(
    document: &mut ProjectDocument,
    files: &FilesAndGroups,
    products: &Products,
) {
    document.main_group = files.elements.clone();
    document.main_group.push(products.group());
}
