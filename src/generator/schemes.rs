//! Custom and autogenerated schemes.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::{CustomScheme, Project, SchemeAutogenerationMode, TargetId};
use crate::generator::disambiguate::{DisambiguatedTarget, DisambiguatedTargets};
use crate::generator::errors::ConfigurationError;
use crate::generator::target_resolver::{HostedTarget, ResolvedTarget, TargetResolver};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildableReference {
    pub name: String,
    pub object_id: String,
    pub buildable_name: String,
}

impl From<&ResolvedTarget> for BuildableReference {
    fn from(target: &ResolvedTarget) -> Self {
        BuildableReference {
            name: target.name.clone(),
            object_id: target.object_id.clone(),
            buildable_name: target.product_file_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchAction {
    pub target: BuildableReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<BuildableReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_point_identifier: Option<String>,
    pub configuration: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestAction {
    pub targets: Vec<BuildableReference>,
    pub configuration: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scheme {
    pub name: String,
    pub build_targets: Vec<BuildableReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch: Option<LaunchAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<TestAction>,
}

impl Scheme {
    /// File name under `xcshareddata/xcschemes`; path separators become `_`.
    pub fn file_name(&self) -> String {
        let sanitized: String = self
            .name
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                c => c,
            })
            .collect();
        format!("{}.json", sanitized)
    }
}

/// Reject schemes that would be written to the same file.
///
/// File names are compared case-insensitively, as on a default APFS volume.
pub fn check_scheme_files(schemes: &[Scheme]) -> Result<(), ConfigurationError> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for scheme in schemes {
        let file_name = scheme.file_name();
        if let Some(first) = seen.insert(file_name.to_lowercase(), &scheme.name) {
            if first == scheme.name {
                return Err(ConfigurationError::DuplicateSchemeName {
                    name: scheme.name.clone(),
                });
            }
            return Err(ConfigurationError::ConflictingSchemeFiles {
                first: first.to_string(),
                second: scheme.name.clone(),
                file_name,
            });
        }
    }
    Ok(())
}

/// Adds references, skipping targets already present.
#[derive(Default)]
struct BuildTargets {
    seen: BTreeSet<String>,
    references: Vec<BuildableReference>,
}

impl BuildTargets {
    fn push(&mut self, target: &ResolvedTarget) {
        if self.seen.insert(target.object_id.clone()) {
            self.references.push(target.into());
        }
    }
}

fn launch_action(
    hosted: HostedTarget<'_>,
    configuration: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
) -> LaunchAction {
    LaunchAction {
        target: hosted.target.into(),
        host: hosted.host.map(Into::into),
        extension_point_identifier: hosted.extension_point_identifier.map(String::from),
        configuration,
        args,
        env,
    }
}

fn custom_scheme(
    scheme: &CustomScheme,
    project: &Project,
    resolver: &TargetResolver,
) -> Result<Scheme, ConfigurationError> {
    let mut build = BuildTargets::default();
    for id in &scheme.build_targets {
        build.push(resolver.resolve(id)?);
    }

    let launch = match &scheme.launch {
        None => None,
        Some(launch) => {
            let hosted = resolver.resolve_hosted(&launch.target, launch.host.as_ref())?;
            if let Some(host) = hosted.host {
                build.push(host);
            }
            build.push(hosted.target);

            let args = if launch.args.is_empty() {
                project.args.get(&launch.target).cloned().unwrap_or_default()
            } else {
                launch.args.clone()
            };
            let mut env = project.envs.get(&launch.target).cloned().unwrap_or_default();
            env.extend(launch.env.clone());

            Some(launch_action(
                hosted,
                launch
                    .configuration
                    .clone()
                    .unwrap_or_else(|| project.default_configuration.clone()),
                args,
                env,
            ))
        }
    };

    let test = if scheme.test_targets.is_empty() {
        None
    } else {
        let mut tests = BuildTargets::default();
        let mut env = BTreeMap::new();
        let mut args = Vec::new();
        for id in &scheme.test_targets {
            let target = resolver.resolve(id)?;
            tests.push(target);
            build.push(target);
            if args.is_empty() {
                args = project.args.get(id).cloned().unwrap_or_default();
            }
            env.extend(project.envs.get(id).cloned().unwrap_or_default());
        }
        Some(TestAction {
            targets: tests.references,
            configuration: project.default_configuration.clone(),
            args,
            env,
        })
    };

    Ok(Scheme {
        name: scheme.name.clone(),
        build_targets: build.references,
        launch,
        test,
    })
}

/// Resolve every user-authored scheme, in declaration order.
pub fn create_custom_schemes(
    project: &Project,
    resolver: &TargetResolver,
) -> Result<Vec<Scheme>, ConfigurationError> {
    project
        .custom_schemes
        .iter()
        .map(|scheme| custom_scheme(scheme, project, resolver))
        .collect()
}

/// Launch arguments and environment declared for any member of a target.
fn target_launch_settings(
    project: &Project,
    named: &DisambiguatedTarget,
) -> (Vec<String>, BTreeMap<String, String>) {
    let ids = named.key().targets();
    let args = ids
        .iter()
        .find_map(|id| project.args.get(id))
        .cloned()
        .unwrap_or_default();
    let env = ids
        .iter()
        .find_map(|id| project.envs.get(id))
        .cloned()
        .unwrap_or_default();
    (args, env)
}

fn target_scheme(
    project: &Project,
    named: &DisambiguatedTarget,
    resolver: &TargetResolver,
    launch_member: &TargetId,
    host: Option<&TargetId>,
) -> Result<Scheme, ConfigurationError> {
    let hosted = resolver.resolve_hosted(launch_member, host)?;
    let target = hosted.target;
    let (args, env) = target_launch_settings(project, named);

    let mut build = BuildTargets::default();
    if let Some(host) = hosted.host {
        build.push(host);
    }
    build.push(target);

    let product_type = target.product_type;
    let launch = (product_type.is_launchable() || hosted.host.is_some()).then(|| {
        launch_action(
            hosted,
            project.default_configuration.clone(),
            args.clone(),
            env.clone(),
        )
    });
    let test = product_type.is_test().then(|| TestAction {
        targets: vec![target.into()],
        configuration: project.default_configuration.clone(),
        args,
        env,
    });

    let name = match hosted.host {
        Some(host) if product_type.is_extension() => format!("{} in {}", target.name, host.name),
        _ => target.name.clone(),
    };

    Ok(Scheme {
        name,
        build_targets: build.references,
        launch,
        test,
    })
}

/// One scheme per target, plus one per host of each extension.
///
/// Names already used by custom schemes are skipped.
pub fn create_autogenerated_schemes(
    project: &Project,
    disambiguated: &DisambiguatedTargets,
    resolver: &TargetResolver,
    custom_scheme_names: &BTreeSet<String>,
) -> Result<Vec<Scheme>, ConfigurationError> {
    let enabled = match project.scheme_autogeneration_mode {
        SchemeAutogenerationMode::None => false,
        SchemeAutogenerationMode::Auto => project.custom_schemes.is_empty(),
        SchemeAutogenerationMode::All => true,
    };
    if !enabled {
        return Ok(Vec::new());
    }

    let mut schemes = Vec::new();
    for named in disambiguated.iter() {
        let key = named.key();
        let hosts = if named.target.product_type().is_extension() {
            resolver.hosts_of(key)
        } else {
            Vec::new()
        };

        if hosts.is_empty() {
            schemes.push(target_scheme(project, named, resolver, key.first(), None)?);
        } else {
            for host in hosts {
                if let Some((member, host_id)) = resolver.hosted_member(key, &host.key) {
                    schemes.push(target_scheme(project, named, resolver, member, Some(host_id))?);
                }
            }
        }
    }

    schemes.retain(|scheme| {
        let taken = custom_scheme_names.contains(&scheme.name);
        if taken {
            tracing::debug!("Skipping autogenerated scheme `{}`: name is taken", scheme.name);
        }
        !taken
    });
    schemes.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(schemes)
}
