//! Auxiliary explore discovery
//!
//! Walks a LookML project tree looking for explores that touch a given view,
//! so a view file can be translated together with the joins declared
//! elsewhere.

use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use crate::document::{ExploreDef, LookmlDocument};

/// File extensions considered while scanning
const SCANNED_EXTENSIONS: &[&str] = &["lookml", "json", "yaml", "yml"];

/// List the candidate document files under `root`, sorted by path
pub fn document_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            if let Some(ext) = entry.path().extension().and_then(|ext| ext.to_str()) {
                if SCANNED_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        }
    }

    files.sort();
    files
}

/// Find explores under `root` whose root view or joins reference `view`
///
/// Files that cannot be read or parsed are logged and skipped.
pub fn find_explores_including_view(root: &Path, view: &str) -> Vec<ExploreDef> {
    let mention = match Regex::new(&format!(r"\b{}\b", regex::escape(view))) {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::warn!("Cannot build a pattern for view '{}': {}", view, e);
            return Vec::new();
        }
    };

    let mut explores = Vec::new();

    for path in document_files(root) {
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Could not read {}: {}", path.display(), e);
                continue;
            }
        };

        if !mention.is_match(&contents) {
            continue;
        }

        let document = match LookmlDocument::from_file(&path) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Could not load or parse file {}: {}", path.display(), e);
                continue;
            }
        };

        for explore in document.explores {
            let touches_view = explore.root_view() == view
                || explore
                    .joins
                    .iter()
                    .any(|j| j.name == view || j.join_from.as_deref() == Some(view));

            if touches_view {
                tracing::debug!(
                    "Found explore '{}' referencing '{}' in {}",
                    explore.name,
                    view,
                    path.display()
                );
                explores.push(explore);
            }
        }
    }

    explores
}
