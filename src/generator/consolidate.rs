//! Target consolidation.
//!
//! Groups BuildTarget variants that represent the same target across
//! configurations into ConsolidatedTargets. Xcode can vary build settings per
//! configuration but not dependency edges, so variants are only merged when
//! their dependencies consolidate to the same set of targets.
//!
//! Grouping is a partition refinement over the target arena: start from the
//! candidate groups (product type, name, platform family) and split any group
//! whose members map their dependencies to different groups, until nothing
//! changes. The fixed point is the coarsest stable partition, which is also
//! the unique grouping with the fewest ConsolidatedTargets.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Serialize, Serializer};

use crate::core::{BuildTarget, FilePath, Os, ProductType, TargetId, Targets};
use crate::generator::errors::TargetGraphError;
use crate::generator::generated_files::{OutputKind, XcodeGeneratedFiles};
use crate::generator::graph::find_cycle;

/// Attributes variants must share to be merge candidates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConsolidationKey {
    pub product_type: ProductType,
    pub name: String,
    pub os: Os,
}

impl ConsolidationKey {
    fn of(target: &BuildTarget) -> Self {
        ConsolidationKey {
            product_type: target.product_type,
            name: target.name.clone(),
            os: target.platform.os,
        }
    }
}

impl fmt::Display for ConsolidationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.product_type, self.os)
    }
}

/// Identifies a ConsolidatedTarget by the BuildTargets it merges.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConsolidatedTargetKey(BTreeSet<TargetId>);

impl ConsolidatedTargetKey {
    pub fn new(ids: impl IntoIterator<Item = TargetId>) -> Self {
        ConsolidatedTargetKey(ids.into_iter().collect())
    }

    pub fn targets(&self) -> &BTreeSet<TargetId> {
        &self.0
    }

    /// The lexically smallest member.
    pub fn first(&self) -> &TargetId {
        self.0
            .iter()
            .next()
            .expect("consolidated target keys are never empty")
    }

    pub fn contains(&self, id: &TargetId) -> bool {
        self.0.contains(id)
    }
}

impl fmt::Display for ConsolidatedTargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<_> = self.0.iter().map(|id| id.as_str()).collect();
        write!(f, "{}", ids.join(", "))
    }
}

impl Serialize for ConsolidatedTargetKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

/// BuildTargets Xcode represents as one target with several configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedTarget {
    pub key: ConsolidatedTargetKey,
    pub consolidation: ConsolidationKey,
    /// Label shared by the members.
    pub label: String,
    /// Configuration name → member.
    pub members: BTreeMap<String, TargetId>,
    pub dependencies: BTreeSet<ConsolidatedTargetKey>,
    /// True only when every member opts out of the infrastructure target.
    pub infrastructure_independent: bool,
}

impl ConsolidatedTarget {
    pub fn name(&self) -> &str {
        &self.consolidation.name
    }

    pub fn product_type(&self) -> ProductType {
        self.consolidation.product_type
    }

    pub fn os(&self) -> Os {
        self.consolidation.os
    }

    pub fn configurations(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(|c| c.as_str())
    }

    /// Members in configuration order.
    pub fn member_targets<'a>(
        &'a self,
        targets: &'a Targets,
    ) -> impl Iterator<Item = &'a BuildTarget> + 'a {
        self.members.values().map(move |id| &targets[id])
    }

    /// The member for `configuration`, if this target is built for it.
    pub fn member_for<'a>(&self, targets: &'a Targets, configuration: &str) -> Option<&'a BuildTarget> {
        self.members.get(configuration).map(|id| &targets[id])
    }

    /// Distinct architectures across members, sorted.
    pub fn archs(&self, targets: &Targets) -> Vec<String> {
        let archs: BTreeSet<&str> = self
            .member_targets(targets)
            .map(|t| t.platform.arch.as_str())
            .collect();
        archs.into_iter().map(String::from).collect()
    }
}

/// Result of consolidation, in deterministic output order.
#[derive(Debug, Clone, Default)]
pub struct ConsolidatedTargets {
    order: Vec<ConsolidatedTargetKey>,
    targets: BTreeMap<ConsolidatedTargetKey, ConsolidatedTarget>,
    key_for_target: BTreeMap<TargetId, ConsolidatedTargetKey>,
}

impl ConsolidatedTargets {
    /// Assemble from already-consolidated targets, keeping their order.
    #[cfg(test)]
    pub(crate) fn from_targets(targets: Vec<ConsolidatedTarget>) -> Self {
        let mut result = ConsolidatedTargets::default();
        for target in targets {
            for id in target.key.targets() {
                result.key_for_target.insert(id.clone(), target.key.clone());
            }
            result.order.push(target.key.clone());
            result.targets.insert(target.key.clone(), target);
        }
        result
    }

    /// Iterate in output order.
    pub fn iter(&self) -> impl Iterator<Item = &ConsolidatedTarget> {
        self.order.iter().map(move |k| &self.targets[k])
    }

    pub fn keys(&self) -> &[ConsolidatedTargetKey] {
        &self.order
    }

    pub fn get(&self, key: &ConsolidatedTargetKey) -> Option<&ConsolidatedTarget> {
        self.targets.get(key)
    }

    /// The ConsolidatedTarget a BuildTarget belongs to.
    pub fn key_for(&self, id: &TargetId) -> Option<&ConsolidatedTargetKey> {
        self.key_for_target.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Consolidate every BuildTarget into ConsolidatedTargets.
pub fn consolidate_targets(
    targets: &Targets,
    xcode_generated_files: &XcodeGeneratedFiles,
) -> Result<ConsolidatedTargets, TargetGraphError> {
    let arena = Arena::new(targets);

    arena.check_acyclic()?;

    let candidates = arena.candidate_groups()?;
    let classes = arena.refine(candidates);

    check_generated_files(&arena, &classes, xcode_generated_files)?;

    let consolidated = arena.into_consolidated(classes);

    tracing::info!(
        "Consolidated {} target(s) into {}",
        targets.len(),
        consolidated.len()
    );

    Ok(consolidated)
}

/// Targets indexed by position, in identifier order.
struct Arena<'a> {
    targets: Vec<&'a BuildTarget>,
    deps: Vec<Vec<usize>>,
}

impl<'a> Arena<'a> {
    fn new(targets: &'a Targets) -> Self {
        let targets: Vec<&BuildTarget> = targets.iter().collect();
        let index: HashMap<&TargetId, usize> = targets
            .iter()
            .enumerate()
            .map(|(i, t)| (&t.id, i))
            .collect();

        // `Targets` guarantees every dependency exists.
        let deps = targets
            .iter()
            .map(|t| {
                let mut deps: Vec<usize> = t.dependencies.iter().map(|d| index[d]).collect();
                deps.sort_unstable();
                deps
            })
            .collect();

        Arena { targets, deps }
    }

    fn len(&self) -> usize {
        self.targets.len()
    }

    fn check_acyclic(&self) -> Result<(), TargetGraphError> {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(self.len(), 0);
        let nodes: Vec<NodeIndex> = (0..self.len()).map(|i| graph.add_node(i)).collect();
        for (from, deps) in self.deps.iter().enumerate() {
            for &to in deps {
                graph.add_edge(nodes[from], nodes[to], ());
            }
        }

        match find_cycle(&graph) {
            None => Ok(()),
            Some(path) => Err(TargetGraphError::DependencyCycle {
                cycle: path
                    .into_iter()
                    .map(|n| self.targets[graph[n]].id.to_string())
                    .collect(),
            }),
        }
    }

    fn candidate_groups(&self) -> Result<Vec<Vec<usize>>, TargetGraphError> {
        let mut groups: BTreeMap<ConsolidationKey, Vec<usize>> = BTreeMap::new();
        for (i, target) in self.targets.iter().enumerate() {
            groups.entry(ConsolidationKey::of(target)).or_default().push(i);
        }

        for (key, members) in &groups {
            let mut by_configuration: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
            for &m in members {
                by_configuration
                    .entry(self.targets[m].configuration.as_str())
                    .or_default()
                    .push(m);
            }
            if let Some((configuration, dupes)) =
                by_configuration.into_iter().find(|(_, v)| v.len() > 1)
            {
                return Err(TargetGraphError::DuplicateConfiguration {
                    name: key.to_string(),
                    configuration: configuration.to_string(),
                    targets: dupes.iter().map(|&i| self.targets[i].id.clone()).collect(),
                });
            }
        }

        Ok(groups.into_values().collect())
    }

    /// Split classes until every member of a class depends on the same set
    /// of classes. Split parts are ordered by their smallest member.
    fn refine(&self, mut classes: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
        let mut class_of = vec![0usize; self.len()];

        loop {
            for (c, members) in classes.iter().enumerate() {
                for &m in members {
                    class_of[m] = c;
                }
            }

            let mut changed = false;
            let mut next = Vec::with_capacity(classes.len());

            for members in &classes {
                let mut by_signature: BTreeMap<BTreeSet<usize>, Vec<usize>> = BTreeMap::new();
                for &m in members {
                    let signature = self.deps[m].iter().map(|&d| class_of[d]).collect();
                    by_signature.entry(signature).or_default().push(m);
                }

                if by_signature.len() > 1 {
                    changed = true;
                    tracing::debug!(
                        "Splitting `{}` into {} targets: dependencies differ across configurations",
                        self.targets[members[0]].name,
                        by_signature.len()
                    );
                }

                let mut parts: Vec<Vec<usize>> = by_signature.into_values().collect();
                parts.sort_by_key(|p| p[0]);
                next.extend(parts);
            }

            classes = next;
            if !changed {
                return classes;
            }
        }
    }

    fn into_consolidated(self, classes: Vec<Vec<usize>>) -> ConsolidatedTargets {
        let keys: Vec<ConsolidatedTargetKey> = classes
            .iter()
            .map(|members| {
                ConsolidatedTargetKey::new(members.iter().map(|&m| self.targets[m].id.clone()))
            })
            .collect();

        let mut key_for_target = BTreeMap::new();
        for (members, key) in classes.iter().zip(&keys) {
            for &m in members {
                key_for_target.insert(self.targets[m].id.clone(), key.clone());
            }
        }

        let mut targets = BTreeMap::new();
        for (members, key) in classes.iter().zip(&keys) {
            let first = self.targets[members[0]];
            let dependencies = members
                .iter()
                .flat_map(|&m| self.deps[m].iter())
                .map(|&d| &key_for_target[&self.targets[d].id])
                .filter(|dep| *dep != key)
                .cloned()
                .collect();

            let consolidated = ConsolidatedTarget {
                key: key.clone(),
                consolidation: ConsolidationKey::of(first),
                label: first.label.clone(),
                members: members
                    .iter()
                    .map(|&m| (self.targets[m].configuration.clone(), self.targets[m].id.clone()))
                    .collect(),
                dependencies,
                infrastructure_independent: members
                    .iter()
                    .all(|&m| self.targets[m].infrastructure_independent),
            };
            targets.insert(key.clone(), consolidated);
        }

        let mut order = keys;
        order.sort_by(|a, b| {
            let (ta, tb) = (&targets[a], &targets[b]);
            ta.consolidation
                .cmp(&tb.consolidation)
                .then_with(|| ta.configurations().cmp(tb.configurations()))
                .then_with(|| a.cmp(b))
        });

        ConsolidatedTargets {
            order,
            targets,
            key_for_target,
        }
    }
}

/// Reject generated paths that would end up with two owners.
fn check_generated_files(
    arena: &Arena<'_>,
    classes: &[Vec<usize>],
    xcode_generated_files: &XcodeGeneratedFiles,
) -> Result<(), TargetGraphError> {
    let mut owners: BTreeMap<&FilePath, (usize, OutputKind, &TargetId)> = BTreeMap::new();

    for (class, members) in classes.iter().enumerate() {
        for &m in members {
            let id = &arena.targets[m].id;
            let Some(files) = xcode_generated_files.get(id) else {
                continue;
            };
            for (path, &kind) in &files.xcode_generated {
                match owners.get(path) {
                    Some(&(owner_class, owner_kind, owner))
                        if owner_class != class || owner_kind != kind =>
                    {
                        return Err(TargetGraphError::ConflictingGeneratedFile {
                            path: path.clone(),
                            targets: vec![owner.clone(), id.clone()],
                        });
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(path, (class, kind, id));
                    }
                }
            }
        }
    }

    Ok(())
}
