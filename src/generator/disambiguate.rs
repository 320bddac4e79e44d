//! Target name disambiguation.
//!
//! Every ConsolidatedTarget gets a display name unique across the project.
//! Colliding names are qualified step by step: platform, then architecture,
//! then product-type suffix, then a numeric counter. A qualifier is only
//! added to a collision group when it tells at least two members apart.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{TargetNameMode, Targets};
use crate::generator::consolidate::{ConsolidatedTarget, ConsolidatedTargetKey, ConsolidatedTargets};
use crate::generator::errors::NamingError;
use crate::generator::infrastructure::INFRASTRUCTURE_TARGET_NAME;

/// A ConsolidatedTarget with its final name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisambiguatedTarget {
    pub name: String,
    pub target: ConsolidatedTarget,
}

impl DisambiguatedTarget {
    pub fn key(&self) -> &ConsolidatedTargetKey {
        &self.target.key
    }
}

/// Named targets in consolidation order.
#[derive(Debug, Clone, Default)]
pub struct DisambiguatedTargets {
    order: Vec<ConsolidatedTargetKey>,
    targets: BTreeMap<ConsolidatedTargetKey, DisambiguatedTarget>,
}

impl DisambiguatedTargets {
    pub fn iter(&self) -> impl Iterator<Item = &DisambiguatedTarget> {
        self.order.iter().map(move |k| &self.targets[k])
    }

    pub fn get(&self, key: &ConsolidatedTargetKey) -> Option<&DisambiguatedTarget> {
        self.targets.get(key)
    }

    pub fn name_of(&self, key: &ConsolidatedTargetKey) -> Option<&str> {
        self.targets.get(key).map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Qualifier {
    Platform,
    Arch,
    ProductType,
}

const QUALIFIERS: [Qualifier; 3] = [Qualifier::Platform, Qualifier::Arch, Qualifier::ProductType];

/// Naming state of one target while collisions are resolved.
#[derive(Debug)]
struct Candidate {
    base: String,
    platform: String,
    arch: String,
    type_suffix: &'static str,
    with_platform: bool,
    with_arch: bool,
    with_type: bool,
    counter: Option<usize>,
    /// The reserved infrastructure name; never qualified.
    reserved: bool,
}

impl Candidate {
    fn has(&self, q: Qualifier) -> bool {
        match q {
            Qualifier::Platform => self.with_platform,
            Qualifier::Arch => self.with_arch,
            Qualifier::ProductType => self.with_type,
        }
    }

    fn apply(&mut self, q: Qualifier) {
        match q {
            Qualifier::Platform => self.with_platform = true,
            Qualifier::Arch => self.with_arch = true,
            Qualifier::ProductType => self.with_type = true,
        }
    }

    fn value(&self, q: Qualifier) -> &str {
        match q {
            Qualifier::Platform => &self.platform,
            Qualifier::Arch => &self.arch,
            Qualifier::ProductType => self.type_suffix,
        }
    }

    fn render(&self) -> String {
        let mut name = self.base.clone();
        if self.with_type && !self.type_suffix.is_empty() {
            name.push(' ');
            name.push_str(self.type_suffix);
        }
        if self.with_platform || self.with_arch {
            name.push_str(" (");
            name.push_str(&self.platform);
            if self.with_arch {
                name.push(' ');
                name.push_str(&self.arch);
            }
            name.push(')');
        }
        if let Some(n) = self.counter {
            name.push_str(&format!(" ({})", n));
        }
        name
    }
}

/// Assign a unique name to every ConsolidatedTarget.
pub fn disambiguate_targets(
    consolidated: &ConsolidatedTargets,
    targets: &Targets,
    mode: TargetNameMode,
) -> Result<DisambiguatedTargets, NamingError> {
    check_structurally_distinct(consolidated)?;

    let mut candidates: Vec<Candidate> = consolidated
        .iter()
        .map(|target| Candidate {
            base: match mode {
                TargetNameMode::Label => target.label.clone(),
                _ => target.name().to_string(),
            },
            platform: target.os().display_name().to_string(),
            arch: target.archs(targets).join(", "),
            type_suffix: target.product_type().name_suffix(),
            with_platform: mode == TargetNameMode::Qualified,
            with_arch: false,
            with_type: false,
            counter: None,
            reserved: false,
        })
        .collect();

    candidates.push(Candidate {
        base: INFRASTRUCTURE_TARGET_NAME.to_string(),
        platform: String::new(),
        arch: String::new(),
        type_suffix: "",
        with_platform: false,
        with_arch: false,
        with_type: false,
        counter: None,
        reserved: true,
    });

    resolve_collisions(&mut candidates)?;

    let mut order = Vec::with_capacity(consolidated.len());
    let mut named = BTreeMap::new();
    for (target, candidate) in consolidated.iter().zip(&candidates) {
        order.push(target.key.clone());
        named.insert(
            target.key.clone(),
            DisambiguatedTarget {
                name: candidate.render(),
                target: target.clone(),
            },
        );
    }

    tracing::info!("Named {} target(s)", order.len());

    Ok(DisambiguatedTargets {
        order,
        targets: named,
    })
}

/// Two ConsolidatedTargets with the same consolidation key and the same
/// dependencies would have been merged by consolidation.
fn check_structurally_distinct(consolidated: &ConsolidatedTargets) -> Result<(), NamingError> {
    let mut seen: BTreeMap<_, &ConsolidatedTarget> = BTreeMap::new();
    for target in consolidated.iter() {
        let identity = (&target.consolidation, &target.dependencies);
        if let Some(existing) = seen.insert(identity, target) {
            return Err(NamingError::IdenticalTargets {
                first: existing.key.targets().iter().cloned().collect(),
                second: target.key.targets().iter().cloned().collect(),
            });
        }
    }
    Ok(())
}

fn resolve_collisions(candidates: &mut [Candidate]) -> Result<(), NamingError> {
    let max_rounds = 2 * candidates.len() + QUALIFIERS.len() + 2;

    for _ in 0..max_rounds {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, candidate) in candidates.iter().enumerate() {
            groups.entry(candidate.render()).or_default().push(i);
        }

        let collisions: Vec<(String, Vec<usize>)> =
            groups.into_iter().filter(|(_, g)| g.len() > 1).collect();
        if collisions.is_empty() {
            return Ok(());
        }

        for (name, group) in collisions {
            qualify_group(candidates, &name, &group);
        }
    }

    let mut names: BTreeSet<String> = BTreeSet::new();
    let mut seen = BTreeSet::new();
    for candidate in candidates.iter() {
        let name = candidate.render();
        if !seen.insert(name.clone()) {
            names.insert(name);
        }
    }
    Err(NamingError::Unresolvable {
        names: names.into_iter().collect(),
    })
}

/// Advance one collision group by a single qualification step.
fn qualify_group(candidates: &mut [Candidate], name: &str, group: &[usize]) {
    let real: Vec<usize> = group
        .iter()
        .copied()
        .filter(|&i| !candidates[i].reserved)
        .collect();
    let shadows_reserved = real.len() < group.len();

    for q in QUALIFIERS {
        if real.iter().all(|&i| candidates[i].has(q)) {
            continue;
        }
        let values: BTreeSet<&str> = real.iter().map(|&i| candidates[i].value(q)).collect();
        if values.len() < 2 && !(shadows_reserved && !values.iter().all(|v| v.is_empty())) {
            continue;
        }

        tracing::debug!("Qualifying `{}` with {:?} for {} target(s)", name, q, real.len());
        for &i in &real {
            candidates[i].apply(q);
        }
        return;
    }

    let uncounted: Vec<usize> = real
        .iter()
        .copied()
        .filter(|&i| candidates[i].counter.is_none())
        .collect();

    tracing::debug!("Numbering {} target(s) named `{}`", real.len(), name);

    if uncounted.is_empty() {
        // Every member already carries a counter; move all but the first
        // past the group.
        let offset = real.len();
        for &i in real.iter().skip(1) {
            if let Some(n) = candidates[i].counter.as_mut() {
                *n += offset;
            }
        }
    } else {
        let start = real
            .iter()
            .filter_map(|&i| candidates[i].counter)
            .max()
            .unwrap_or(0);
        for (n, &i) in uncounted.iter().enumerate() {
            candidates[i].counter = Some(start + n + 1);
        }
    }
}
