//! Spec file discovery.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

/// File name suffix that marks a spec file.
pub const SPEC_SUFFIX: &str = "_spec.c";

/// Collect spec files from the given paths.
///
/// Files named explicitly are taken as they are; directories are walked
/// recursively for names ending in `suffix`, skipping hidden entries. The
/// result is sorted and free of duplicates so that output is stable.
pub fn discover_spec_files(paths: &[PathBuf], suffix: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for path in paths {
        if path.is_file() {
            found.push(path.clone());
        } else if path.is_dir() {
            walk_dir(path, suffix, &mut found);
        } else {
            warn!(path = %path.display(), "no such file or directory, skipped");
        }
    }

    found.sort();
    found.dedup();
    debug!(count = found.len(), "spec files discovered");
    found
}

fn walk_dir(root: &Path, suffix: &str, found: &mut Vec<PathBuf>) {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(true)
        .follow_links(true)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "cannot read directory entry");
                continue;
            }
        };
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if is_file && matches {
            found.push(normalize(entry.path()));
        }
    }
}

/// Drop a leading `./` so paths print the way users type them.
fn normalize(path: &Path) -> PathBuf {
    path.strip_prefix(".").unwrap_or(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_directories_for_spec_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("spec/nested")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::write(root.join("spec/b_spec.c"), "").unwrap();
        fs::write(root.join("spec/nested/a_spec.c"), "").unwrap();
        fs::write(root.join("spec/helper.c"), "").unwrap();
        fs::write(root.join(".hidden/c_spec.c"), "").unwrap();

        let found = discover_spec_files(&[root.to_path_buf()], SPEC_SUFFIX);
        assert_eq!(
            found,
            vec![root.join("spec/b_spec.c"), root.join("spec/nested/a_spec.c")]
        );
    }

    #[test]
    fn explicit_files_are_kept_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("odd.c");
        fs::write(&file, "").unwrap();
        let found = discover_spec_files(&[file.clone(), file.clone()], SPEC_SUFFIX);
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn missing_paths_are_skipped() {
        let found = discover_spec_files(&[PathBuf::from("/definitely/not/here")], SPEC_SUFFIX);
        assert!(found.is_empty());
    }
}
