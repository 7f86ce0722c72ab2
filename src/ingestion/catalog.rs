//! Example dataset catalog: find ingestible files under a directory and load them all.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::IngestionResult;

use super::unified::{Dataset, IngestionOptions, IngestionRequest, ACCEPTED_EXTENSIONS};

/// Recursively list files under `dir` with an accepted extension, sorted by path.
pub fn discover_datasets(dir: impl AsRef<Path>) -> IngestionResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && has_accepted_extension(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Ingest every dataset under `dir`.
///
/// One file failing does not stop the others; each path is paired with its own result.
pub fn ingest_dir(
    dir: impl AsRef<Path>,
    options: &IngestionOptions,
) -> IngestionResult<Vec<(PathBuf, IngestionResult<Dataset>)>> {
    let paths = discover_datasets(dir)?;
    tracing::debug!(count = paths.len(), "ingesting catalog");
    Ok(paths
        .into_iter()
        .map(|path| {
            let request = IngestionRequest {
                path,
                options: options.clone(),
            };
            let result = request.run();
            (request.path, result)
        })
        .collect())
}

fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|a| a.eq_ignore_ascii_case(ext))
        })
}
