//! File and group tree construction.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::{FileKind, FilePath, Project};
use crate::util::hash::Fingerprint;

/// Placeholder source compiled by targets that have no sources of their own.
pub const COMPILE_STUB_PATH: &str = "xcgen/CompileStub.m";

/// A node of the project navigator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileElement {
    Group {
        name: String,
        object_id: String,
        children: Vec<FileElement>,
    },
    File {
        name: String,
        path: String,
        object_id: String,
    },
}

impl FileElement {
    pub fn name(&self) -> &str {
        match self {
            FileElement::Group { name, .. } | FileElement::File { name, .. } => name,
        }
    }

    pub fn object_id(&self) -> &str {
        match self {
            FileElement::Group { object_id, .. } | FileElement::File { object_id, .. } => {
                object_id
            }
        }
    }
}

/// An external repository whose files appear in the tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ResolvedRepository {
    pub name: String,
    pub path: String,
}

/// Output of file and group tree construction.
#[derive(Debug, Clone, Default)]
pub struct FilesAndGroups {
    /// Root-level elements of the main group.
    pub elements: Vec<FileElement>,
    /// File reference object identifier for every file in the tree.
    pub file_ids: BTreeMap<FilePath, String>,
    /// Present when some target has no sources.
    pub compile_stub: Option<FilePath>,
    pub resolved_repositories: Vec<ResolvedRepository>,
}

impl FilesAndGroups {
    pub fn file_id(&self, path: &FilePath) -> Option<&str> {
        self.file_ids.get(path).map(|s| s.as_str())
    }
}

pub(crate) fn file_object_id(path: &FilePath) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str("file").update_str(&path.to_string());
    fp.finish_object_id()
}

fn group_object_id(path: &str) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str("group").update_str(path);
    fp.finish_object_id()
}

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
    file: Option<FilePath>,
}

impl Node {
    fn insert(&mut self, components: &[&str], file: &FilePath) {
        match components {
            [] => {}
            [last] => {
                self.children.entry(last.to_string()).or_default().file = Some(file.clone());
            }
            [first, rest @ ..] => {
                self.children
                    .entry(first.to_string())
                    .or_default()
                    .insert(rest, file);
            }
        }
    }

    /// Groups first, then files, each by name.
    fn into_elements(self, prefix: &str) -> Vec<FileElement> {
        let mut groups = Vec::new();
        let mut files = Vec::new();

        for (name, node) in self.children {
            let path = format!("{}/{}", prefix, name);
            match node.file {
                Some(file) if node.children.is_empty() => files.push(FileElement::File {
                    object_id: file_object_id(&file),
                    path: file.to_string(),
                    name,
                }),
                _ => groups.push(FileElement::Group {
                    object_id: group_object_id(&path),
                    children: node.into_elements(&path),
                    name,
                }),
            }
        }

        groups.extend(files);
        groups
    }
}

/// Build the file tree from every target input and extra file.
pub fn create_files_and_groups(project: &Project) -> FilesAndGroups {
    let mut paths: BTreeSet<FilePath> = project
        .targets
        .iter()
        .flat_map(|t| t.inputs.all())
        .chain(project.extra_files.iter())
        .cloned()
        .collect();

    let needs_stub = project.targets.iter().any(|t| t.inputs.srcs.is_empty());
    let compile_stub = needs_stub.then(|| FilePath::generated(COMPILE_STUB_PATH));
    if let Some(stub) = &compile_stub {
        paths.insert(stub.clone());
    }

    let mut roots: BTreeMap<FileKind, Node> = BTreeMap::new();
    let mut repositories = BTreeSet::new();
    for path in &paths {
        let components: Vec<&str> = path.components().collect();
        roots.entry(path.kind).or_default().insert(&components, path);
        if let Some(repo) = path.repository() {
            repositories.insert(ResolvedRepository {
                name: repo.to_string(),
                path: format!("external/{}", repo),
            });
        }
    }

    let mut elements = Vec::new();
    for (kind, node) in roots {
        match kind {
            FileKind::Project => elements.extend(node.into_elements("")),
            FileKind::External => elements.push(FileElement::Group {
                name: "External".to_string(),
                object_id: group_object_id("external"),
                children: node.into_elements("external"),
            }),
            FileKind::Generated => elements.push(FileElement::Group {
                name: "Generated".to_string(),
                object_id: group_object_id("generated"),
                children: node.into_elements("generated"),
            }),
        }
    }

    let file_ids = paths
        .iter()
        .map(|p| (p.clone(), file_object_id(p)))
        .collect();

    tracing::debug!(
        "Built file tree with {} file(s) from {} repositor(ies)",
        paths.len(),
        repositories.len()
    );

    FilesAndGroups {
        elements,
        file_ids,
        compile_stub,
        resolved_repositories: repositories.into_iter().collect(),
    }
}
