//! Recursive input discovery.

use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists files under `root` whose extension equals `extension`
/// (case-insensitive), sorted by path.
///
/// Unreadable directory entries are logged and skipped.
pub fn discover_documents(root: impl AsRef<Path>, extension: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root.as_ref()).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    "event=discover module=source status=skip error={}",
                    err
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|value| value.to_str())
            .is_some_and(|value| value.eq_ignore_ascii_case(extension));
        if matches {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    paths
}
