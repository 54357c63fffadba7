//! Directory scanner feeding candidate files to identification.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use romid_core::Platform;

use crate::context::PluginRegistry;

/// Extensions worth identifying: the platform's own (or every registered
/// platform's) plus `zip`.
pub fn candidate_extensions(registry: &PluginRegistry, platform: Option<Platform>) -> HashSet<String> {
    let mut extensions: HashSet<String> = registry
        .plugins()
        .filter(|p| platform.is_none_or(|wanted| p.platform() == wanted))
        .flat_map(|p| p.list_extensions().iter().map(|e| e.to_lowercase()))
        .collect();
    extensions.insert("zip".to_string());
    extensions
}

/// Recursively collect files under `root` whose extension is in
/// `extensions`, sorted by path. Hidden directories are skipped.
pub fn scan_candidates(root: &Path, extensions: &HashSet<String>) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(root, extensions, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, extensions: &HashSet<String>, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut dir_entries: Vec<std::fs::DirEntry> = std::fs::read_dir(dir)?.flatten().collect();
    dir_entries.sort_by_key(|e| e.path());

    for entry in dir_entries {
        let path = entry.path();
        if path.is_dir() {
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if !hidden {
                if let Err(e) = walk(&path, extensions, found) {
                    log::warn!("Skipping {}: {}", path.display(), e);
                }
            }
        } else if path.is_file() && has_matching_extension(&path, extensions) {
            found.push(path);
        }
    }
    Ok(())
}

/// Check if a path has an extension in the allowed set.
fn has_matching_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase()))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
