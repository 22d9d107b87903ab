use crate::info::push_unique;
use crate::progress::{CancelToken, ParseStatus, StatusSink};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Directories that never contain project sources.
const SKIPPED_DIRECTORIES: &[&str] = &[
    ".git", ".svn", ".hg", "build", "obj", "bin", "node_modules", "target",
];

/// Header extensions tried next to a matched source file.
const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hg", "hxx", "hpp"];

/// Suffixes harvested by the variable-reference fallback scan.
pub(crate) const SOURCE_SUFFIXES: &[&str] = &[".c", ".cpp", ".cc", ".cxx", ".ccg"];

/// Recursively collect files under `root` whose name ends with one of
/// `suffixes`, as paths relative to `root`.
///
/// A matched C/C++ source also contributes any sibling header sharing its
/// base name. The walk emits a [`ParseStatus::Directory`] event per visited
/// directory and stops early once `cancel` is observed.
pub(crate) fn directory_sources(
    root: &Path,
    suffixes: &[String],
    ignored: &[String],
    cancel: &CancelToken,
    status: &StatusSink,
) -> Vec<String> {
    let mut collected = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_type().is_dir() || !is_skipped(entry.file_name(), ignored)
        });

    for entry in walker {
        if cancel.is_canceled() {
            break;
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if entry.file_type().is_dir() {
            status.emit(ParseStatus::Directory {
                directory: entry.path().to_path_buf(),
            });
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())) {
            continue;
        }
        let Some(relative) = relative_to(root, entry.path()) else {
            continue;
        };
        push_unique(&mut collected, relative);
        if has_source_suffix(&name) {
            for header in sibling_headers(root, entry.path()) {
                push_unique(&mut collected, header);
            }
        }
    }

    collected
}

/// Names of the immediate sub-directories of `dir`, sorted for a
/// reproducible traversal order.
pub(crate) fn immediate_subdirectories(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    names
}

fn is_skipped(name: &std::ffi::OsStr, ignored: &[String]) -> bool {
    let Some(name) = name.to_str() else {
        return false;
    };
    SKIPPED_DIRECTORIES.contains(&name)
        || ignored
            .iter()
            .any(|entry| entry.eq_ignore_ascii_case(name))
}

fn has_source_suffix(name: &str) -> bool {
    SOURCE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn sibling_headers(root: &Path, source: &Path) -> Vec<String> {
    let mut headers = Vec::new();
    for extension in HEADER_EXTENSIONS {
        let candidate = source.with_extension(extension);
        if candidate.is_file() {
            if let Some(relative) = relative_to(root, &candidate) {
                headers.push(relative);
            }
        }
    }
    headers
}

fn relative_to(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|relative| relative.to_string_lossy().replace('\\', "/"))
}
