//! The synthetic infrastructure target.
//!
//! Represents build-system bootstrapping: running the pre-build script,
//! fetching external dependencies, running the post-build script. Every
//! non-exempt target depends on it; it depends on nothing.

use serde::Serialize;

use crate::core::{BuildMode, FilePath, Project};
use crate::generator::dependencies::TargetGraph;
use crate::generator::document::ProjectDocument;
use crate::generator::generated_files::XcodeGeneratedFiles;
use crate::util::hash::Fingerprint;

/// Display name of the infrastructure target; reserved for it.
pub const INFRASTRUCTURE_TARGET_NAME: &str = "BuildSystemDependencies";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptPhase {
    pub name: String,
    pub script: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfrastructureTarget {
    pub name: String,
    pub object_id: String,
    pub script_phases: Vec<ScriptPhase>,
    /// Files the fetch phase must produce before any target builds
    pub prebuilt_files: Vec<FilePath>,
}

pub fn infrastructure_object_id() -> String {
    let mut fp = Fingerprint::new();
    fp.update_str("infrastructure")
        .update_str(INFRASTRUCTURE_TARGET_NAME);
    fp.finish_object_id()
}

fn fetch_dependencies_script(build_mode: BuildMode) -> String {
    match build_mode {
        BuildMode::Xcode => {
            "\"$BUILD_SYSTEM_WRAPPER\" fetch --generated-inputs \"$GENERATED_INPUTS_LIST\"".to_string()
        }
        BuildMode::External => "\"$BUILD_SYSTEM_WRAPPER\" build --all-targets".to_string(),
    }
}

/// Add the infrastructure target when the dependency graph calls for one.
pub fn add_infrastructure_target(
    document: &mut ProjectDocument,
    project: &Project,
    graph: &TargetGraph,
    generated_files: &XcodeGeneratedFiles,
) {
    if !graph.has_infrastructure_target() {
        return;
    }

    let mut script_phases = Vec::new();
    if let Some(script) = &project.pre_build_script {
        script_phases.push(ScriptPhase {
            name: "Pre-build".to_string(),
            script: script.clone(),
        });
    }
    script_phases.push(ScriptPhase {
        name: "Fetch Dependencies".to_string(),
        script: fetch_dependencies_script(project.build_mode),
    });
    if let Some(script) = &project.post_build_script {
        script_phases.push(ScriptPhase {
            name: "Post-build".to_string(),
            script: script.clone(),
        });
    }

    let prebuilt_files = generated_files.prebuilt();
    tracing::debug!(
        "Adding {} with {} script phase(s) and {} prebuilt file(s)",
        INFRASTRUCTURE_TARGET_NAME,
        script_phases.len(),
        prebuilt_files.len()
    );

    document.infrastructure_target = Some(InfrastructureTarget {
        name: INFRASTRUCTURE_TARGET_NAME.to_string(),
        object_id: infrastructure_object_id(),
        script_phases,
        prebuilt_files,
    });
}
