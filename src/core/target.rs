//! Build-graph targets - one configuration/platform variant of a buildable unit.
//!
//! BuildTargets are produced by the external build system and are read-only
//! to the generator. `Targets` is the arena every stage looks them up in.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::core::file_path::FilePath;
use crate::core::platform::Platform;
use crate::core::product_type::ProductType;
use crate::core::target_id::TargetId;
use crate::generator::errors::TargetGraphError;

/// Source and resource files a target consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetInputs {
    pub srcs: Vec<FilePath>,
    pub hdrs: Vec<FilePath>,
    pub resources: Vec<FilePath>,
}

impl TargetInputs {
    /// All inputs, sources first.
    pub fn all(&self) -> impl Iterator<Item = &FilePath> {
        self.srcs
            .iter()
            .chain(self.hdrs.iter())
            .chain(self.resources.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.srcs.is_empty() && self.hdrs.is_empty() && self.resources.is_empty()
    }
}

/// Files a target declares it produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetOutputs {
    pub product: Option<FilePath>,
    pub swift_module: Option<FilePath>,
}

/// One variant emitted by the external build system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    pub id: TargetId,

    /// Build-system label, e.g. `//Core:Core`.
    pub label: String,

    /// Nominal (unqualified) name.
    pub name: String,

    pub product_type: ProductType,

    /// Defaults to `name`.
    #[serde(default)]
    pub product_name: Option<String>,

    pub platform: Platform,

    /// Xcode configuration this variant is built for.
    pub configuration: String,

    #[serde(default)]
    pub inputs: TargetInputs,

    #[serde(default)]
    pub outputs: TargetOutputs,

    #[serde(default)]
    pub dependencies: BTreeSet<TargetId>,

    /// Targets that embed or launch this one.
    #[serde(default)]
    pub hosts: Vec<TargetId>,

    #[serde(default)]
    pub extension_point_identifier: Option<String>,

    /// Builds without waiting on the infrastructure target.
    #[serde(default)]
    pub infrastructure_independent: bool,

    #[serde(default)]
    pub build_settings: BTreeMap<String, String>,
}

impl BuildTarget {
    /// Name of the built product, without extension.
    pub fn product_name(&self) -> &str {
        self.product_name.as_deref().unwrap_or(&self.name)
    }
}

/// Arena of every BuildTarget in a run, indexed by identifier.
#[derive(Debug, Clone, Default)]
pub struct Targets {
    targets: BTreeMap<TargetId, BuildTarget>,
}

impl Targets {
    /// Build the arena, rejecting duplicate identifiers and dangling
    /// dependency references.
    pub fn new(targets: impl IntoIterator<Item = BuildTarget>) -> Result<Self, TargetGraphError> {
        let mut map = BTreeMap::new();
        for target in targets {
            if let Some(existing) = map.insert(target.id.clone(), target) {
                return Err(TargetGraphError::DuplicateTarget { target: existing.id });
            }
        }

        for target in map.values() {
            if let Some(missing) = target.dependencies.iter().find(|d| !map.contains_key(*d)) {
                return Err(TargetGraphError::UnknownDependency {
                    target: target.id.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        Ok(Targets { targets: map })
    }

    pub fn get(&self, id: &TargetId) -> Option<&BuildTarget> {
        self.targets.get(id)
    }

    pub fn contains(&self, id: &TargetId) -> bool {
        self.targets.contains_key(id)
    }

    /// Iterate in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &BuildTarget> {
        self.targets.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &TargetId> {
        self.targets.keys()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Index<&TargetId> for Targets {
    type Output = BuildTarget;

    fn index(&self, id: &TargetId) -> &BuildTarget {
        &self.targets[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TargetBuilder;

    #[test]
    fn test_targets_rejects_duplicates() {
        let a = TargetBuilder::new("a", "A").build();
        let err = Targets::new(vec![a.clone(), a]).unwrap_err();
        assert!(matches!(err, TargetGraphError::DuplicateTarget { .. }));
    }

    #[test]
    fn test_targets_rejects_unknown_dependency() {
        let a = TargetBuilder::new("a", "A").depends_on("missing").build();
        let err = Targets::new(vec![a]).unwrap_err();
        match err {
            TargetGraphError::UnknownDependency { target, dependency } => {
                assert_eq!(target.as_str(), "a");
                assert_eq!(dependency.as_str(), "missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_build_target_deserialize_defaults() {
        let json = r#"{
            "id": "core-debug",
            "label": "//Core:Core",
            "name": "Core",
            "product_type": "static-library",
            "platform": {"os": "ios", "arch": "arm64", "minimum_os_version": "15"},
            "configuration": "Debug"
        }"#;
        let target: BuildTarget = serde_json::from_str(json).unwrap();
        assert_eq!(target.product_name(), "Core");
        assert!(target.dependencies.is_empty());
        assert!(!target.infrastructure_independent);
    }
}
