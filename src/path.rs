//! Path manipulation utilities for modrun
//!
//! Changed files arrive from git as repository-relative strings. Everything
//! in the mapper works on these strings in forward-slash form so results are
//! identical across platforms; only the module probe touches the real
//! filesystem.

use std::collections::BTreeSet;

/// Normalize a repository-relative path to forward-slash form
///
/// Backslashes become slashes, a leading `./` is dropped, repeated slashes
/// collapse and trailing slashes are removed. `"."` and `""` both normalize
/// to the empty string, which denotes the repository root.
pub fn normalize(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    replaced
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Join two normalized relative paths, treating an empty base as the root
pub fn join(base: &str, rel: &str) -> String {
    match (base.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{}/{}", base, rel),
    }
}

/// The directory containing `path`, or `""` for a top-level entry
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// The last segment of `path`
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

/// Strip `dir/` from the front of `path`
///
/// Returns `None` unless `path` lies strictly below `dir`. An empty `dir`
/// is the root, which contains everything.
pub fn strip_dir_prefix<'a>(path: &'a str, dir: &str) -> Option<&'a str> {
    if dir.is_empty() {
        return Some(path);
    }
    path.strip_prefix(dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
}

/// Whether any segment of `path` is one of the excluded directory names
pub fn has_excluded_segment(path: &str, excluded: &BTreeSet<String>) -> bool {
    path.split('/').any(|segment| excluded.contains(segment))
}
