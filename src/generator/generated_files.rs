//! Generated-file classification.
//!
//! Decides, per target, which output files the Xcode build itself produces
//! and which files must be treated as prebuilt inputs supplied by the
//! external build system. The consolidator uses this to refuse merges that
//! would give one generated path two owners.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::{BuildMode, FileKind, FilePath, TargetId, Targets};
use crate::generator::errors::TargetGraphError;

/// The rule a generated file is produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Product,
    SwiftModule,
}

/// Classification of one target's files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetGeneratedFiles {
    /// Outputs the Xcode build (re)generates.
    pub xcode_generated: BTreeMap<FilePath, OutputKind>,
    /// Generated files that must already exist before Xcode builds.
    pub prebuilt: BTreeSet<FilePath>,
}

/// Classification of every target in a run.
#[derive(Debug, Clone, Default)]
pub struct XcodeGeneratedFiles {
    by_target: BTreeMap<TargetId, TargetGeneratedFiles>,
}

impl XcodeGeneratedFiles {
    pub fn get(&self, id: &TargetId) -> Option<&TargetGeneratedFiles> {
        self.by_target.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TargetId, &TargetGeneratedFiles)> {
        self.by_target.iter()
    }

    /// Every prebuilt file, sorted and deduplicated.
    pub fn prebuilt(&self) -> Vec<FilePath> {
        let all: BTreeSet<&FilePath> = self
            .by_target
            .values()
            .flat_map(|files| files.prebuilt.iter())
            .collect();
        all.into_iter().cloned().collect()
    }
}

/// Classify the outputs of every target.
///
/// Fails only when a target does not declare its product output.
pub fn calculate_xcode_generated_files(
    build_mode: BuildMode,
    targets: &Targets,
) -> Result<XcodeGeneratedFiles, TargetGraphError> {
    let mut by_target = BTreeMap::new();

    for target in targets.iter() {
        let product = target
            .outputs
            .product
            .as_ref()
            .ok_or_else(|| TargetGraphError::MissingOutputs {
                target: target.id.clone(),
            })?;

        let mut files = TargetGeneratedFiles::default();
        let outputs = std::iter::once((product, OutputKind::Product)).chain(
            target
                .outputs
                .swift_module
                .iter()
                .map(|m| (m, OutputKind::SwiftModule)),
        );

        match build_mode {
            BuildMode::Xcode => files.xcode_generated.extend(outputs.map(|(p, k)| (p.clone(), k))),
            BuildMode::External => files.prebuilt.extend(outputs.map(|(p, _)| p.clone())),
        }

        by_target.insert(target.id.clone(), files);
    }

    let all_xcode_generated: BTreeSet<FilePath> = by_target
        .values()
        .flat_map(|f: &TargetGeneratedFiles| f.xcode_generated.keys().cloned())
        .collect();

    for target in targets.iter() {
        let prebuilt_inputs: Vec<FilePath> = target
            .inputs
            .all()
            .filter(|f| f.kind == FileKind::Generated && !all_xcode_generated.contains(*f))
            .cloned()
            .collect();
        if let Some(files) = by_target.get_mut(&target.id) {
            files.prebuilt.extend(prebuilt_inputs);
        }
    }

    tracing::debug!(
        "Classified {} Xcode-generated file(s) across {} target(s)",
        all_xcode_generated.len(),
        by_target.len()
    );

    Ok(XcodeGeneratedFiles { by_target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TargetBuilder;

    fn targets() -> Targets {
        Targets::new(vec![
            TargetBuilder::new("core", "Core").swift_module().build(),
            TargetBuilder::new("app", "App")
                .app()
                .depends_on("core")
                .src(FilePath::generated("bin/core/libCore.a"))
                .src(FilePath::generated("bin/App/Info.plist"))
                .build(),
        ])
        .unwrap()
    }

    #[test]
    fn test_xcode_mode_marks_products_generated() {
        let files = calculate_xcode_generated_files(BuildMode::Xcode, &targets()).unwrap();
        let core = files.get(&TargetId::new("core")).unwrap();
        assert_eq!(core.xcode_generated.len(), 2);
        assert!(core
            .xcode_generated
            .values()
            .any(|k| *k == OutputKind::SwiftModule));

        // The app's Info.plist is generated by the build system, not by Xcode.
        let app = files.get(&TargetId::new("app")).unwrap();
        let prebuilt: Vec<_> = app.prebuilt.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(prebuilt, vec!["bin/App/Info.plist"]);
    }

    #[test]
    fn test_external_mode_marks_everything_prebuilt() {
        let files = calculate_xcode_generated_files(BuildMode::External, &targets()).unwrap();
        for (_, target_files) in files.iter() {
            assert!(target_files.xcode_generated.is_empty());
        }
        let app = files.get(&TargetId::new("app")).unwrap();
        assert!(app.prebuilt.contains(&FilePath::generated("bin/core/libCore.a")));
    }

    #[test]
    fn test_missing_product_output_is_fatal() {
        let mut target = TargetBuilder::new("core", "Core").build();
        target.outputs.product = None;
        let targets = Targets::new(vec![target]).unwrap();
        let err = calculate_xcode_generated_files(BuildMode::Xcode, &targets).unwrap_err();
        assert!(matches!(err, TargetGraphError::MissingOutputs { .. }));
    }
}
