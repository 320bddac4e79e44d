//! Dependency resolution between named targets.
//!
//! Turns the consolidated dependency sets into directed edges and adds the
//! synthetic infrastructure target every non-exempt target waits on.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::generator::consolidate::ConsolidatedTargetKey;
use crate::generator::disambiguate::DisambiguatedTargets;
use crate::generator::errors::TargetGraphError;
use crate::generator::graph::find_cycle;
use crate::generator::infrastructure::INFRASTRUCTURE_TARGET_NAME;

/// A node of the target graph.
///
/// Real targets sort before the infrastructure target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphNode {
    Target(ConsolidatedTargetKey),
    Infrastructure,
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphNode::Target(key) => write!(f, "{}", key),
            GraphNode::Infrastructure => f.write_str(INFRASTRUCTURE_TARGET_NAME),
        }
    }
}

/// `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DependencyEdge {
    pub from: GraphNode,
    pub to: GraphNode,
}

/// Final dependency edges, sorted by (from, to).
#[derive(Debug, Clone, Default)]
pub struct TargetGraph {
    edges: Vec<DependencyEdge>,
    infrastructure: bool,
}

impl TargetGraph {
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Whether the infrastructure target exists in this project.
    pub fn has_infrastructure_target(&self) -> bool {
        self.infrastructure
    }

    /// Direct dependencies of a target, sorted.
    pub fn dependencies_of<'a>(
        &'a self,
        key: &'a ConsolidatedTargetKey,
    ) -> impl Iterator<Item = &'a GraphNode> + 'a {
        self.edges
            .iter()
            .filter(move |e| matches!(&e.from, GraphNode::Target(k) if k == key))
            .map(|e| &e.to)
    }

    pub fn depends_on_infrastructure(&self, key: &ConsolidatedTargetKey) -> bool {
        self.dependencies_of(key)
            .any(|n| *n == GraphNode::Infrastructure)
    }
}

/// Build the dependency edges between named targets.
///
/// The infrastructure target is created when any target needs it or when
/// build scripts must run; targets whose members are all
/// infrastructure-independent get no edge to it.
pub fn resolve_dependencies(
    disambiguated: &DisambiguatedTargets,
    has_build_scripts: bool,
) -> Result<TargetGraph, TargetGraphError> {
    let needs_infrastructure = disambiguated
        .iter()
        .any(|t| !t.target.infrastructure_independent);
    let infrastructure = has_build_scripts || needs_infrastructure;

    let mut edges = BTreeSet::new();
    for named in disambiguated.iter() {
        let from = GraphNode::Target(named.key().clone());
        for dependency in &named.target.dependencies {
            if dependency == named.key() {
                continue;
            }
            edges.insert(DependencyEdge {
                from: from.clone(),
                to: GraphNode::Target(dependency.clone()),
            });
        }
        if infrastructure && !named.target.infrastructure_independent {
            edges.insert(DependencyEdge {
                from,
                to: GraphNode::Infrastructure,
            });
        } else if named.target.infrastructure_independent {
            tracing::debug!("`{}` does not depend on {}", named.name, INFRASTRUCTURE_TARGET_NAME);
        }
    }

    let edges: Vec<DependencyEdge> = edges.into_iter().collect();
    check_acyclic(disambiguated, &edges)?;

    tracing::info!(
        "Resolved {} dependency edge(s){}",
        edges.len(),
        if infrastructure {
            format!(" with {}", INFRASTRUCTURE_TARGET_NAME)
        } else {
            String::new()
        }
    );

    Ok(TargetGraph {
        edges,
        infrastructure,
    })
}

fn check_acyclic(
    disambiguated: &DisambiguatedTargets,
    edges: &[DependencyEdge],
) -> Result<(), TargetGraphError> {
    let mut graph: DiGraph<GraphNode, ()> = DiGraph::new();
    let mut nodes: BTreeMap<GraphNode, NodeIndex> = BTreeMap::new();
    let mut node = |graph: &mut DiGraph<GraphNode, ()>, n: &GraphNode| {
        *nodes
            .entry(n.clone())
            .or_insert_with(|| graph.add_node(n.clone()))
    };

    for edge in edges {
        let from = node(&mut graph, &edge.from);
        let to = node(&mut graph, &edge.to);
        graph.add_edge(from, to, ());
    }

    match find_cycle(&graph) {
        None => Ok(()),
        Some(path) => Err(TargetGraphError::DependencyCycle {
            cycle: path
                .into_iter()
                .map(|n| match &graph[n] {
                    GraphNode::Target(key) => disambiguated
                        .name_of(key)
                        .map(String::from)
                        .unwrap_or_else(|| key.to_string()),
                    GraphNode::Infrastructure => INFRASTRUCTURE_TARGET_NAME.to_string(),
                })
                .collect(),
        }),
    }
}
