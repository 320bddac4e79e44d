//! Graph helpers shared by consolidation and dependency resolution.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

/// Find a dependency cycle, if any.
///
/// Picks the strongly connected component containing the smallest node
/// weight and returns the shortest closed path through that node, following
/// neighbours in weight order. The result starts and ends at the same node.
pub(crate) fn find_cycle<N: Ord, E>(graph: &DiGraph<N, E>) -> Option<Vec<NodeIndex>> {
    let by_weight = |a: &NodeIndex, b: &NodeIndex| graph[*a].cmp(&graph[*b]);

    let mut component = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|mut scc| {
            scc.sort_by(by_weight);
            scc
        })
        .min_by(|a, b| by_weight(&a[0], &b[0]))?;

    let start = component[0];
    let members: HashSet<NodeIndex> = component.drain(..).collect();

    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        let mut next: Vec<NodeIndex> = graph
            .neighbors(node)
            .filter(|n| members.contains(n))
            .collect();
        next.sort_by(by_weight);
        next.dedup();

        for n in next {
            if n == start {
                let mut path = vec![start, node];
                let mut current = node;
                while current != start {
                    current = parent[&current];
                    path.push(current);
                }
                path.reverse();
                return Some(path);
            }
            if let std::collections::hash_map::Entry::Vacant(e) = parent.entry(n) {
                e.insert(node);
                queue.push_back(n);
            }
        }
    }

    None
}
