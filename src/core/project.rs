//! Project descriptions - everything one generation run consumes.
//!
//! A Project is the deserialized build-graph description handed over by the
//! external build system. It is validated once, before any stage runs.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::file_path::FilePath;
use crate::core::platform::{deserialize_lenient_version, serialize_version};
use crate::core::target::BuildTarget;
use crate::core::target_id::TargetId;
use crate::generator::errors::ConfigurationError;

/// Who compiles the targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Xcode compiles; the external build system only supplies inputs.
    #[default]
    Xcode,
    /// The external build system compiles; Xcode drives it.
    External,
}

/// How target display names are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetNameMode {
    /// Qualify names only when they collide.
    #[default]
    Auto,
    /// Always qualify names with the platform.
    Qualified,
    /// Start from the build-system label instead of the name.
    Label,
}

impl FromStr for TargetNameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(TargetNameMode::Auto),
            "qualified" => Ok(TargetNameMode::Qualified),
            "label" => Ok(TargetNameMode::Label),
            _ => Err(format!(
                "invalid target name mode '{}'; expected 'auto', 'qualified', or 'label'",
                s
            )),
        }
    }
}

/// Which schemes are generated automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeAutogenerationMode {
    None,
    /// Only when no custom schemes are declared.
    #[default]
    Auto,
    All,
}

impl FromStr for SchemeAutogenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SchemeAutogenerationMode::None),
            "auto" => Ok(SchemeAutogenerationMode::Auto),
            "all" => Ok(SchemeAutogenerationMode::All),
            _ => Err(format!(
                "invalid scheme autogeneration mode '{}'; expected 'none', 'auto', or 'all'",
                s
            )),
        }
    }
}

/// Launch action of a user-authored scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLaunch {
    pub target: TargetId,
    #[serde(default)]
    pub host: Option<TargetId>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub configuration: Option<String>,
}

/// A user-authored scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomScheme {
    pub name: String,
    #[serde(default)]
    pub build_targets: Vec<TargetId>,
    #[serde(default)]
    pub launch: Option<CustomLaunch>,
    #[serde(default)]
    pub test_targets: Vec<TargetId>,
}

impl CustomScheme {
    /// Every target this scheme references.
    pub fn referenced_targets(&self) -> impl Iterator<Item = &TargetId> {
        self.build_targets
            .iter()
            .chain(self.launch.iter().map(|l| &l.target))
            .chain(self.launch.iter().filter_map(|l| l.host.as_ref()))
            .chain(self.test_targets.iter())
    }
}

fn default_region() -> String {
    "en".to_string()
}

/// The full build-graph description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,

    #[serde(default)]
    pub build_mode: BuildMode,

    #[serde(
        serialize_with = "serialize_version",
        deserialize_with = "deserialize_lenient_version"
    )]
    pub minimum_xcode_version: Version,

    /// Ordered build configuration names.
    pub configurations: Vec<String>,

    pub default_configuration: String,

    #[serde(default)]
    pub target_name_mode: TargetNameMode,

    #[serde(default)]
    pub scheme_autogeneration_mode: SchemeAutogenerationMode,

    pub targets: Vec<BuildTarget>,

    #[serde(default)]
    pub custom_schemes: Vec<CustomScheme>,

    #[serde(default)]
    pub args: BTreeMap<TargetId, Vec<String>>,

    #[serde(default)]
    pub envs: BTreeMap<TargetId, BTreeMap<String, String>>,

    #[serde(default)]
    pub pre_build_script: Option<String>,

    #[serde(default)]
    pub post_build_script: Option<String>,

    #[serde(default)]
    pub extra_files: Vec<FilePath>,

    #[serde(default = "default_region")]
    pub development_region: String,
}

impl Project {
    /// Load a project description from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read project description: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse project description: {}", path.display()))
    }

    /// Check configuration data before any stage runs.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.configurations.is_empty() {
            return Err(ConfigurationError::NoConfigurations);
        }

        let mut seen = HashSet::new();
        for name in &self.configurations {
            if !seen.insert(name.as_str()) {
                return Err(ConfigurationError::DuplicateConfiguration { name: name.clone() });
            }
        }

        if !seen.contains(self.default_configuration.as_str()) {
            return Err(ConfigurationError::MissingDefaultConfiguration {
                default: self.default_configuration.clone(),
                available: self.configurations.clone(),
            });
        }

        let ids: BTreeSet<&TargetId> = self.targets.iter().map(|t| &t.id).collect();

        for target in &self.targets {
            if !seen.contains(target.configuration.as_str()) {
                return Err(ConfigurationError::UnknownTargetConfiguration {
                    target: target.id.clone(),
                    configuration: target.configuration.clone(),
                });
            }
            if let Some(host) = target.hosts.iter().find(|h| !ids.contains(h)) {
                return Err(ConfigurationError::UnknownHost {
                    target: target.id.clone(),
                    host: host.clone(),
                });
            }
        }

        for id in self.args.keys().chain(self.envs.keys()) {
            if !ids.contains(id) {
                return Err(ConfigurationError::UnknownTargetReference {
                    context: "launch arguments".to_string(),
                    target: id.clone(),
                });
            }
        }

        let mut scheme_names = HashSet::new();
        for scheme in &self.custom_schemes {
            if !scheme_names.insert(scheme.name.as_str()) {
                return Err(ConfigurationError::DuplicateSchemeName {
                    name: scheme.name.clone(),
                });
            }
            if let Some(id) = scheme.referenced_targets().find(|id| !ids.contains(id)) {
                return Err(ConfigurationError::UnknownTargetReference {
                    context: format!("scheme `{}`", scheme.name),
                    target: id.clone(),
                });
            }
            let launch_config = scheme.launch.as_ref().and_then(|l| l.configuration.as_ref());
            if let Some(config) = launch_config {
                if !seen.contains(config.as_str()) {
                    return Err(ConfigurationError::UnknownSchemeConfiguration {
                        scheme: scheme.name.clone(),
                        configuration: config.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Map from each target to the targets that host it.
    pub fn target_hosts(&self) -> BTreeMap<TargetId, Vec<TargetId>> {
        self.targets
            .iter()
            .filter(|t| !t.hosts.is_empty())
            .map(|t| {
                let mut hosts = t.hosts.clone();
                hosts.sort();
                hosts.dedup();
                (t.id.clone(), hosts)
            })
            .collect()
    }

    /// Map from each extension target to its extension point identifier.
    pub fn extension_point_identifiers(&self) -> BTreeMap<TargetId, String> {
        self.targets
            .iter()
            .filter_map(|t| {
                t.extension_point_identifier
                    .as_ref()
                    .map(|e| (t.id.clone(), e.clone()))
            })
            .collect()
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Xcode => write!(f, "xcode"),
            BuildMode::External => write!(f, "external"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ProjectBuilder, TargetBuilder};

    #[test]
    fn test_validate_ok() {
        let project = ProjectBuilder::new("App")
            .target(TargetBuilder::new("core-debug", "Core").build())
            .build();
        project.validate().unwrap();
    }

    #[test]
    fn test_validate_missing_default_configuration() {
        let mut project = ProjectBuilder::new("App").build();
        project.default_configuration = "Profile".to_string();
        let err = project.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingDefaultConfiguration { .. }
        ));
        assert!(err.to_string().contains("Profile"));
    }

    #[test]
    fn test_validate_empty_configurations() {
        let mut project = ProjectBuilder::new("App").build();
        project.configurations.clear();
        assert!(matches!(
            project.validate().unwrap_err(),
            ConfigurationError::NoConfigurations
        ));
    }

    #[test]
    fn test_validate_duplicate_configuration() {
        let mut project = ProjectBuilder::new("App").build();
        project.configurations.push("Debug".to_string());
        assert!(matches!(
            project.validate().unwrap_err(),
            ConfigurationError::DuplicateConfiguration { .. }
        ));
    }

    #[test]
    fn test_validate_unknown_target_configuration() {
        let project = ProjectBuilder::new("App")
            .target(TargetBuilder::new("core", "Core").configuration("Profile").build())
            .build();
        match project.validate().unwrap_err() {
            ConfigurationError::UnknownTargetConfiguration {
                target,
                configuration,
            } => {
                assert_eq!(target.as_str(), "core");
                assert_eq!(configuration, "Profile");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_custom_scheme_unknown_target() {
        let mut project = ProjectBuilder::new("App")
            .target(TargetBuilder::new("core", "Core").build())
            .build();
        project.custom_schemes.push(CustomScheme {
            name: "Everything".to_string(),
            build_targets: vec![TargetId::new("core"), TargetId::new("gone")],
            launch: None,
            test_targets: vec![],
        });
        let err = project.validate().unwrap_err();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_target_hosts_sorted_and_deduplicated() {
        let project = ProjectBuilder::new("App")
            .target(TargetBuilder::new("app-b", "B").build())
            .target(TargetBuilder::new("app-a", "A").build())
            .target(
                TargetBuilder::new("ext", "Widget")
                    .hosted_by("app-b")
                    .hosted_by("app-a")
                    .hosted_by("app-b")
                    .build(),
            )
            .build();
        let hosts = project.target_hosts();
        let ext_hosts: Vec<_> = hosts[&TargetId::new("ext")]
            .iter()
            .map(|h| h.as_str())
            .collect();
        assert_eq!(ext_hosts, vec!["app-a", "app-b"]);
    }

    #[test]
    fn test_name_mode_from_str() {
        assert_eq!("Label".parse::<TargetNameMode>().unwrap(), TargetNameMode::Label);
        assert!("fancy".parse::<TargetNameMode>().is_err());
    }
}
