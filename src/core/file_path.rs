//! File references as reported by the build graph.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a file lives relative to the build.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Checked into the project's source tree.
    #[default]
    Project,
    /// Inside an external repository (`<repository>/<path>`).
    External,
    /// Produced by a build action.
    Generated,
}

/// A file reference used by BuildTarget inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FilePath {
    #[serde(default)]
    pub kind: FileKind,
    pub path: String,
}

impl FilePath {
    pub fn project(path: impl Into<String>) -> Self {
        FilePath {
            kind: FileKind::Project,
            path: path.into(),
        }
    }

    pub fn external(path: impl Into<String>) -> Self {
        FilePath {
            kind: FileKind::External,
            path: path.into(),
        }
    }

    pub fn generated(path: impl Into<String>) -> Self {
        FilePath {
            kind: FileKind::Generated,
            path: path.into(),
        }
    }

    /// Path components, ignoring empty segments.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|c| !c.is_empty())
    }

    /// Last path component.
    pub fn file_name(&self) -> &str {
        self.components().last().unwrap_or("")
    }

    /// The external repository this file belongs to, if any.
    pub fn repository(&self) -> Option<&str> {
        match self.kind {
            FileKind::External => self.components().next(),
            _ => None,
        }
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FileKind::Project => write!(f, "{}", self.path),
            FileKind::External => write!(f, "external/{}", self.path),
            FileKind::Generated => write!(f, "generated/{}", self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository() {
        let ext = FilePath::external("swift_argument_parser/Sources/Parser.swift");
        assert_eq!(ext.repository(), Some("swift_argument_parser"));
        assert_eq!(ext.file_name(), "Parser.swift");
        assert_eq!(FilePath::project("Core/Core.swift").repository(), None);
    }

    #[test]
    fn test_kind_defaults_to_project() {
        let fp: FilePath = serde_json::from_str(r#"{"path": "App/main.swift"}"#).unwrap();
        assert_eq!(fp.kind, FileKind::Project);
    }
}
