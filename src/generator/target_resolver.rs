//! Read-only lookup from build-graph identifiers to generated targets.
//!
//! Built once the dependency graph is final and shared by every stage that
//! turns a target reference into a concrete handle.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::{Os, ProductType, TargetId, Targets};
use crate::generator::consolidate::ConsolidatedTargetKey;
use crate::generator::disambiguate::DisambiguatedTargets;
use crate::generator::errors::ConfigurationError;
use crate::util::hash::Fingerprint;

/// Handle to one generated target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    pub key: ConsolidatedTargetKey,
    pub name: String,
    /// Stable project-document object identifier.
    pub object_id: String,
    pub product_type: ProductType,
    pub os: Os,
    pub product_name: String,
    /// File name of the built product, e.g. `App.app`.
    pub product_file_name: String,
}

/// A target resolved in the context of the target that hosts it.
#[derive(Debug, Clone, Copy)]
pub struct HostedTarget<'a> {
    pub target: &'a ResolvedTarget,
    pub host: Option<&'a ResolvedTarget>,
    pub extension_point_identifier: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct TargetResolver {
    targets: BTreeMap<ConsolidatedTargetKey, ResolvedTarget>,
    key_for_target: BTreeMap<TargetId, ConsolidatedTargetKey>,
    hosts: BTreeMap<TargetId, Vec<TargetId>>,
    extension_points: BTreeMap<TargetId, String>,
}

/// Object identifier for a generated target.
pub fn target_object_id(key: &ConsolidatedTargetKey) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str("target")
        .update_strs(key.targets().iter().map(|id| id.as_str()));
    fp.finish_object_id()
}

impl TargetResolver {
    pub fn new(
        targets: &Targets,
        disambiguated: &DisambiguatedTargets,
        hosts: BTreeMap<TargetId, Vec<TargetId>>,
        extension_points: BTreeMap<TargetId, String>,
    ) -> Self {
        let mut resolved = BTreeMap::new();
        let mut key_for_target = BTreeMap::new();

        for named in disambiguated.iter() {
            let key = named.key();
            for id in key.targets() {
                key_for_target.insert(id.clone(), key.clone());
            }

            let first = &targets[key.first()];
            resolved.insert(
                key.clone(),
                ResolvedTarget {
                    key: key.clone(),
                    name: named.name.clone(),
                    object_id: target_object_id(key),
                    product_type: named.target.product_type(),
                    os: named.target.os(),
                    product_name: first.product_name().to_string(),
                    product_file_name: first.product_type.product_file_name(first.product_name()),
                },
            );
        }

        TargetResolver {
            targets: resolved,
            key_for_target,
            hosts,
            extension_points,
        }
    }

    /// The generated target a BuildTarget ended up in.
    pub fn resolve(&self, id: &TargetId) -> Result<&ResolvedTarget, ConfigurationError> {
        self.key_for_target
            .get(id)
            .and_then(|key| self.targets.get(key))
            .ok_or_else(|| ConfigurationError::UnknownTargetReference {
                context: "target resolution".to_string(),
                target: id.clone(),
            })
    }

    pub fn resolve_key(&self, key: &ConsolidatedTargetKey) -> Option<&ResolvedTarget> {
        self.targets.get(key)
    }

    /// Resolve a target together with its host and extension point.
    ///
    /// `host` must be one of the target's declared hosts.
    pub fn resolve_hosted(
        &self,
        id: &TargetId,
        host: Option<&TargetId>,
    ) -> Result<HostedTarget<'_>, ConfigurationError> {
        let target = self.resolve(id)?;

        let host = match host {
            None => None,
            Some(host_id) => {
                let declared = self
                    .hosts
                    .get(id)
                    .is_some_and(|hosts| hosts.contains(host_id));
                if !declared {
                    return Err(ConfigurationError::UndeclaredHost {
                        target: id.clone(),
                        host: host_id.clone(),
                    });
                }
                Some(self.resolve(host_id)?)
            }
        };

        Ok(HostedTarget {
            target,
            host,
            extension_point_identifier: self.extension_points.get(id).map(|s| s.as_str()),
        })
    }

    /// Generated targets hosting any member of `key`, in name order.
    pub fn hosts_of(&self, key: &ConsolidatedTargetKey) -> Vec<&ResolvedTarget> {
        let host_keys: BTreeSet<&ConsolidatedTargetKey> = key
            .targets()
            .iter()
            .filter_map(|id| self.hosts.get(id))
            .flatten()
            .filter_map(|host| self.key_for_target.get(host))
            .collect();

        let mut hosts: Vec<&ResolvedTarget> = host_keys
            .into_iter()
            .filter_map(|k| self.targets.get(k))
            .collect();
        hosts.sort_by(|a, b| a.name.cmp(&b.name));
        hosts
    }

    /// Any member of `key` that declares `host`.
    pub fn hosted_member<'a>(
        &'a self,
        key: &'a ConsolidatedTargetKey,
        host: &ConsolidatedTargetKey,
    ) -> Option<(&'a TargetId, &'a TargetId)> {
        key.targets().iter().find_map(|id| {
            self.hosts.get(id)?.iter().find_map(move |h| {
                (self.key_for_target.get(h) == Some(host)).then_some((id, h))
            })
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedTarget> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BuildMode, TargetNameMode};
    use crate::generator::consolidate::consolidate_targets;
    use crate::generator::disambiguate::disambiguate_targets;
    use crate::generator::generated_files::calculate_xcode_generated_files;
    use crate::test_support::{ProjectBuilder, TargetBuilder};

    fn resolver() -> TargetResolver {
        let project = ProjectBuilder::new("App")
            .target(TargetBuilder::new("app-debug", "App").app().build())
            .target(
                TargetBuilder::new("app-release", "App")
                    .app()
                    .configuration("Release")
                    .build(),
            )
            .target(TargetBuilder::new("other", "Other").app().build())
            .target(
                TargetBuilder::new("widget", "Widget")
                    .app_extension()
                    .hosted_by("app-debug")
                    .extension_point("com.apple.widgetkit-extension")
                    .build(),
            )
            .build();

        let targets = Targets::new(project.targets.clone()).unwrap();
        let generated = calculate_xcode_generated_files(BuildMode::Xcode, &targets).unwrap();
        let consolidated = consolidate_targets(&targets, &generated).unwrap();
        let named = disambiguate_targets(&consolidated, &targets, TargetNameMode::Auto).unwrap();
        TargetResolver::new(
            &targets,
            &named,
            project.target_hosts(),
            project.extension_point_identifiers(),
        )
    }

    #[test]
    fn test_members_resolve_to_same_target() {
        let resolver = resolver();
        let debug = resolver.resolve(&TargetId::new("app-debug")).unwrap();
        let release = resolver.resolve(&TargetId::new("app-release")).unwrap();
        assert_eq!(debug, release);
        assert_eq!(debug.name, "App");
        assert_eq!(debug.product_file_name, "App.app");
        assert_eq!(debug.object_id.len(), 24);
    }

    #[test]
    fn test_unknown_target_is_an_error() {
        let err = resolver().resolve(&TargetId::new("missing")).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_resolve_hosted() {
        let resolver = resolver();
        let hosted = resolver
            .resolve_hosted(&TargetId::new("widget"), Some(&TargetId::new("app-debug")))
            .unwrap();
        assert_eq!(hosted.target.name, "Widget");
        assert_eq!(hosted.host.map(|h| h.name.as_str()), Some("App"));
        assert_eq!(
            hosted.extension_point_identifier,
            Some("com.apple.widgetkit-extension")
        );
    }

    #[test]
    fn test_undeclared_host_is_rejected() {
        let err = resolver()
            .resolve_hosted(&TargetId::new("widget"), Some(&TargetId::new("other")))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::UndeclaredHost { .. }));
    }

    #[test]
    fn test_hosts_of_extension() {
        let resolver = resolver();
        let widget = resolver.resolve(&TargetId::new("widget")).unwrap().key.clone();
        let hosts: Vec<_> = resolver.hosts_of(&widget).iter().map(|h| h.name.clone()).collect();
        assert_eq!(hosts, vec!["App"]);
    }

    #[test]
    fn test_hosted_member_borrows_from_key() {
        let resolver = resolver();
        let widget = resolver.resolve(&TargetId::new("widget")).unwrap().key.clone();
        let app = resolver.resolve(&TargetId::new("app-debug")).unwrap().key.clone();
        let other = resolver.resolve(&TargetId::new("other")).unwrap().key.clone();

        let (member, host) = resolver.hosted_member(&widget, &app).unwrap();
        assert_eq!(member.as_str(), "widget");
        assert_eq!(host.as_str(), "app-debug");
        assert!(resolver.hosted_member(&widget, &other).is_none());
    }

    #[test]
    fn test_object_ids_are_stable_and_distinct() {
        let a = ConsolidatedTargetKey::new([TargetId::new("a")]);
        let b = ConsolidatedTargetKey::new([TargetId::new("b")]);
        assert_eq!(target_object_id(&a), target_object_id(&a));
        assert_ne!(target_object_id(&a), target_object_id(&b));
    }
}
