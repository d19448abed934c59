// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic directory listing for transfile discovery

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Regular files in `dir` whose name ends with one of `extensions`
///
/// An empty extension list matches every regular file. Files are ordered by
/// creation time ascending (modification time where the platform does not
/// report creation), ties broken by file name. The listing is not recursive.
pub fn find_files_with_extension<S: AsRef<str>>(
    dir: &Path,
    extensions: &[S],
) -> std::io::Result<Arc<[PathBuf]>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = match entry.metadata() {
            Ok(m) => m,
            // Removed between listing and stat
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            tracing::debug!(path = %entry.path().display(), "skipping non-UTF-8 file name");
            continue;
        };
        if !has_extension(name, extensions) {
            continue;
        }
        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((created, entry.path()));
    }
    Ok(sort_by_creation(found))
}

/// Whether `name` ends with one of `extensions`; an empty list matches all
pub fn has_extension<S: AsRef<str>>(name: &str, extensions: &[S]) -> bool {
    extensions.is_empty() || extensions.iter().any(|ext| name.ends_with(ext.as_ref()))
}

fn sort_by_creation(mut found: Vec<(SystemTime, PathBuf)>) -> Arc<[PathBuf]> {
    found.sort_by(|(a_time, a_path), (b_time, b_path)| {
        a_time
            .cmp(b_time)
            .then_with(|| a_path.file_name().cmp(&b_path.file_name()))
    });
    found.into_iter().map(|(_, path)| path).collect()
}

#[cfg(test)]
#[path = "finder_tests.rs"]
mod tests;
