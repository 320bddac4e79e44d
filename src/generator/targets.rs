//! Native target assembly, build configurations and dependency wiring.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::platform::short_version;
use crate::core::{BuildTarget, FilePath, Os, PlatformVariant, ProductType, Project, Targets};
use crate::generator::consolidate::ConsolidatedTarget;
use crate::generator::dependencies::{GraphNode, TargetGraph};
use crate::generator::disambiguate::DisambiguatedTargets;
use crate::generator::document::{
    BuildConfiguration, NativeTarget, ProductReference, ProjectDocument, TargetDependency,
};
use crate::generator::errors::{ConfigurationError, TargetGraphError};
use crate::generator::files::FilesAndGroups;
use crate::generator::infrastructure::{infrastructure_object_id, INFRASTRUCTURE_TARGET_NAME};
use crate::generator::products::Products;
use crate::generator::target_resolver::{target_object_id, ResolvedTarget, TargetResolver};

/// Add one native target per named target, in naming order.
pub fn add_targets(
    document: &mut ProjectDocument,
    targets: &Targets,
    disambiguated: &DisambiguatedTargets,
    products: &Products,
    files: &FilesAndGroups,
) -> Result<(), TargetGraphError> {
    for named in disambiguated.iter() {
        let key = named.key();
        let product = products
            .get(key)
            .ok_or_else(|| TargetGraphError::MissingOutputs {
                target: key.first().clone(),
            })?;

        let inputs: BTreeSet<&FilePath> = named
            .target
            .member_targets(targets)
            .flat_map(|t| t.inputs.all())
            .collect();
        let mut file_ids: Vec<String> = inputs
            .into_iter()
            .filter_map(|path| files.file_id(path).map(String::from))
            .collect();

        let has_sources = named
            .target
            .member_targets(targets)
            .any(|t| !t.inputs.srcs.is_empty());
        if !has_sources {
            if let Some(stub) = files.compile_stub.as_ref().and_then(|s| files.file_id(s)) {
                file_ids.insert(0, stub.to_string());
            }
        }

        document.targets.push(NativeTarget {
            key: key.clone(),
            name: named.name.clone(),
            object_id: target_object_id(key),
            product_type: named.target.product_type().identifier(),
            platform: named.target.os(),
            product: ProductReference {
                name: product.name.clone(),
                object_id: product.object_id.clone(),
            },
            files: file_ids,
            build_configurations: Vec::new(),
            dependencies: Vec::new(),
        });
    }

    tracing::info!("Added {} target(s)", document.targets.len());
    Ok(())
}

/// The member whose settings `configuration` uses.
///
/// Falls back to the default configuration's member, then to the first.
fn member_for_configuration<'a>(
    target: &'a ConsolidatedTarget,
    targets: &'a Targets,
    configuration: &str,
    default_configuration: &str,
) -> Option<&'a BuildTarget> {
    target
        .member_for(targets, configuration)
        .or_else(|| target.member_for(targets, default_configuration))
        .or_else(|| target.member_targets(targets).next())
}

fn test_host_path(host: &ResolvedTarget) -> String {
    match host.os {
        Os::Macos => format!(
            "$(BUILT_PRODUCTS_DIR)/{}/Contents/MacOS/{}",
            host.product_file_name, host.product_name
        ),
        _ => format!(
            "$(BUILT_PRODUCTS_DIR)/{}/{}",
            host.product_file_name, host.product_name
        ),
    }
}

fn build_settings(
    member: &BuildTarget,
    supported_platforms: &str,
    resolver: &TargetResolver,
) -> Result<BTreeMap<String, String>, ConfigurationError> {
    let platform = &member.platform;
    let mut settings = member.build_settings.clone();

    settings.insert("PRODUCT_NAME".into(), member.product_name().to_string());
    settings.insert("SDKROOT".into(), platform.os.sdk(PlatformVariant::Device).into());
    settings.insert("SUPPORTED_PLATFORMS".into(), supported_platforms.to_string());
    settings.insert("ARCHS".into(), platform.arch.clone());
    settings.insert(
        platform.os.deployment_target_setting().into(),
        short_version(&platform.minimum_os_version),
    );
    settings.insert("TARGET_ID".into(), member.id.to_string());

    if member.product_type.is_test() {
        if let Some(host_id) = member.hosts.iter().min() {
            let host = resolver.resolve(host_id)?;
            settings.insert("TEST_HOST".into(), test_host_path(host));
            if member.product_type == ProductType::UnitTest {
                settings.insert("BUNDLE_LOADER".into(), "$(TEST_HOST)".into());
            }
        }
    }

    Ok(settings)
}

/// Give every native target one build configuration per project
/// configuration.
pub fn set_target_configurations(
    document: &mut ProjectDocument,
    project: &Project,
    targets: &Targets,
    disambiguated: &DisambiguatedTargets,
    resolver: &TargetResolver,
) -> Result<(), ConfigurationError> {
    for named in disambiguated.iter() {
        let sdks: BTreeSet<&str> = named
            .target
            .member_targets(targets)
            .map(|t| t.platform.sdk())
            .collect();
        let supported_platforms = sdks.into_iter().collect::<Vec<_>>().join(" ");

        let mut configurations = Vec::with_capacity(project.configurations.len());
        for configuration in &project.configurations {
            let Some(member) = member_for_configuration(
                &named.target,
                targets,
                configuration,
                &project.default_configuration,
            ) else {
                continue;
            };
            if !named.target.members.contains_key(configuration) {
                tracing::debug!(
                    "`{}` has no `{}` variant; using `{}`",
                    named.name,
                    configuration,
                    member.configuration
                );
            }
            configurations.push(BuildConfiguration {
                name: configuration.clone(),
                build_settings: build_settings(member, &supported_platforms, resolver)?,
            });
        }

        if let Some(target) = document.target_mut(named.key()) {
            target.build_configurations = configurations;
        }
    }
    Ok(())
}

/// Write the resolved dependency edges onto the native targets.
pub fn set_target_dependencies(
    document: &mut ProjectDocument,
    graph: &TargetGraph,
    resolver: &TargetResolver,
) -> Result<(), TargetGraphError> {
    for target in &mut document.targets {
        let mut dependencies = Vec::new();
        for node in graph.dependencies_of(&target.key) {
            let dependency = match node {
                GraphNode::Infrastructure => TargetDependency {
                    name: INFRASTRUCTURE_TARGET_NAME.to_string(),
                    object_id: infrastructure_object_id(),
                },
                GraphNode::Target(key) => {
                    let resolved = resolver.resolve_key(key).ok_or_else(|| {
                        TargetGraphError::UnknownDependency {
                            target: target.key.first().clone(),
                            dependency: key.first().clone(),
                        }
                    })?;
                    TargetDependency {
                        name: resolved.name.clone(),
                        object_id: resolved.object_id.clone(),
                    }
                }
            };
            dependencies.push(dependency);
        }
        target.dependencies = dependencies;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BuildMode, TargetId};
    use crate::generator::consolidate::consolidate_targets;
    use crate::generator::dependencies::resolve_dependencies;
    use crate::generator::disambiguate::disambiguate_targets;
    use crate::generator::document::create_project;
    use crate::generator::files::create_files_and_groups;
    use crate::generator::generated_files::calculate_xcode_generated_files;
    use crate::generator::products::create_products;
    use crate::test_support::{ProjectBuilder, TargetBuilder};

    fn assemble(project: &Project) -> ProjectDocument {
        let targets = Targets::new(project.targets.clone()).unwrap();
        let generated = calculate_xcode_generated_files(project.build_mode, &targets).unwrap();
        let consolidated = consolidate_targets(&targets, &generated).unwrap();
        let named = disambiguate_targets(&consolidated, &targets, project.target_name_mode).unwrap();
        let products = create_products(&targets, &consolidated);
        let files = create_files_and_groups(project);
        let graph = resolve_dependencies(&named, false).unwrap();
        let resolver = TargetResolver::new(
            &targets,
            &named,
            project.target_hosts(),
            project.extension_point_identifiers(),
        );

        let mut document = create_project(project);
        add_targets(&mut document, &targets, &named, &products, &files).unwrap();
        set_target_configurations(&mut document, project, &targets, &named, &resolver).unwrap();
        set_target_dependencies(&mut document, &graph, &resolver).unwrap();
        document
    }

    fn target<'a>(document: &'a ProjectDocument, name: &str) -> &'a NativeTarget {
        document.targets.iter().find(|t| t.name == name).unwrap()
    }

    #[test]
    fn test_configurations_fall_back_to_default_member() {
        let project = ProjectBuilder::new("App")
            .target(
                TargetBuilder::new("core", "Core")
                    .src(FilePath::project("Core.swift"))
                    .setting("SWIFT_VERSION", "5")
                    .build(),
            )
            .build();
        let document = assemble(&project);

        let core = target(&document, "Core");
        let names: Vec<_> = core.build_configurations.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Debug", "Release"]);

        let release = &core.build_configurations[1].build_settings;
        assert_eq!(release["TARGET_ID"], "core");
        assert_eq!(release["SWIFT_VERSION"], "5");
        assert_eq!(release["PRODUCT_NAME"], "Core");
        assert_eq!(release["IPHONEOS_DEPLOYMENT_TARGET"], "15.0");
        assert_eq!(core.files.len(), 1);
    }

    #[test]
    fn test_each_configuration_uses_its_member() {
        let project = ProjectBuilder::new("App")
            .target(TargetBuilder::new("core-debug", "Core").build())
            .target(
                TargetBuilder::new("core-release", "Core")
                    .configuration("Release")
                    .arch("x86_64")
                    .build(),
            )
            .build();
        let document = assemble(&project);

        let core = target(&document, "Core");
        let archs: Vec<_> = core
            .build_configurations
            .iter()
            .map(|c| c.build_settings["ARCHS"].as_str())
            .collect();
        assert_eq!(archs, vec!["arm64", "x86_64"]);
    }

    #[test]
    fn test_tests_get_test_host() {
        let project = ProjectBuilder::new("App")
            .target(TargetBuilder::new("app", "App").app().build())
            .target(
                TargetBuilder::new("tests", "AppTests")
                    .unit_test()
                    .hosted_by("app")
                    .depends_on("app")
                    .build(),
            )
            .build();
        let document = assemble(&project);

        let tests = target(&document, "AppTests");
        let settings = &tests.build_configurations[0].build_settings;
        assert_eq!(settings["TEST_HOST"], "$(BUILT_PRODUCTS_DIR)/App.app/App");
        assert_eq!(settings["BUNDLE_LOADER"], "$(TEST_HOST)");
    }

    #[test]
    fn test_sourceless_target_gets_compile_stub() {
        let project = ProjectBuilder::new("App")
            .target(TargetBuilder::new("res", "Resources").bundle().build())
            .build();
        let document = assemble(&project);
        assert_eq!(target(&document, "Resources").files.len(), 1);
    }

    #[test]
    fn test_dependencies_written_in_order() {
        let project = ProjectBuilder::new("App")
            .target(TargetBuilder::new("core", "Core").build())
            .target(TargetBuilder::new("app", "App").app().depends_on("core").build())
            .build();
        let document = assemble(&project);

        let app = target(&document, "App");
        let deps: Vec<_> = app.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(deps, vec!["Core", INFRASTRUCTURE_TARGET_NAME]);

        let core_id = target_object_id(&crate::generator::consolidate::ConsolidatedTargetKey::new([
            TargetId::new("core"),
        ]));
        assert_eq!(app.dependencies[0].object_id, core_id);
    }
}
