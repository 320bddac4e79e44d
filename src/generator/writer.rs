//! Project document output.
//!
//! Everything is serialized before the filesystem is touched, then written
//! into a staging directory that replaces `<name>.xcodeproj` in one rename.

use std::path::{Path, PathBuf};

use crate::generator::document::ProjectDocument;
use crate::generator::errors::GenerateError;
use crate::generator::schemes::Scheme;
use crate::util::fs::{replace_dir, staging_dir_for, write_file};

const PROJECT_FILE: &str = "project.json";
const SCHEMES_DIR: &str = "xcshareddata/xcschemes";

/// Write the project document and its schemes, returning the
/// `.xcodeproj` path.
pub fn write_project(
    document: &ProjectDocument,
    schemes: &[Scheme],
    output_dir: &Path,
) -> Result<PathBuf, GenerateError> {
    let dest = output_dir.join(format!("{}.xcodeproj", document.name));

    let mut files = vec![(
        PathBuf::from(PROJECT_FILE),
        serde_json::to_string_pretty(document)?,
    )];
    for scheme in schemes {
        files.push((
            Path::new(SCHEMES_DIR).join(scheme.file_name()),
            serde_json::to_string_pretty(scheme)?,
        ));
    }

    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| GenerateError::Io { path, source }
    };

    let staged = staging_dir_for(&dest).map_err(io_error(&dest))?;
    for (relative, contents) in &files {
        let path = staged.path().join(relative);
        write_file(&path, contents).map_err(io_error(&dest.join(relative)))?;
    }
    replace_dir(staged, &dest).map_err(io_error(&dest))?;

    tracing::info!(
        "Wrote {} with {} scheme(s)",
        dest.display(),
        schemes.len()
    );

    Ok(dest)
}
