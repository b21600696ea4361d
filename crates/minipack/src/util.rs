//! Path helpers shared by the resolver and the module builder.
//!
//! All path arithmetic here is lexical. Nothing touches the filesystem, so
//! canonical ids depend only on the project root handed in by the caller.

use std::path::{Component, Path, PathBuf};

use cow_utils::CowUtils;

/// Convert a path to a string with forward slashes.
pub fn to_unix_path(path: &Path) -> String {
    path.to_string_lossy().cow_replace("\\", "/").into_owned()
}

/// Collapse `.` and `..` components without consulting the filesystem.
///
/// `..` at the root of an absolute path is dropped; leading `..` of a
/// relative path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// POSIX-style relative path from `base` to `path`. Both must be normalized.
pub fn relative_path(base: &Path, path: &Path) -> String {
    let base_parts: Vec<_> = base.components().collect();
    let path_parts: Vec<_> = path.components().collect();
    let common = base_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    segments.extend(std::iter::repeat_n(
        "..".to_owned(),
        base_parts.len() - common,
    ));
    segments.extend(
        path_parts[common..]
            .iter()
            .map(|part| part.as_os_str().to_string_lossy().into_owned()),
    );
    to_unix_path(Path::new(&segments.join("/")))
}

/// Canonical module id: `./` followed by the root-relative POSIX path.
pub fn module_id(root: &Path, path: &Path) -> String {
    format!("./{}", relative_path(root, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_dots() {
        assert_eq!(
            normalize_path(Path::new("/project/src/./lib/../a.js")),
            PathBuf::from("/project/src/a.js")
        );
        assert_eq!(normalize_path(Path::new("/../a.js")), PathBuf::from("/a.js"));
        assert_eq!(
            normalize_path(Path::new("../../a.js")),
            PathBuf::from("../../a.js")
        );
    }

    #[test]
    fn test_module_id_inside_root() {
        let root = Path::new("/project");
        assert_eq!(
            module_id(root, Path::new("/project/src/index.js")),
            "./src/index.js"
        );
    }

    #[test]
    fn test_module_id_outside_root() {
        let root = Path::new("/project/app");
        assert_eq!(
            module_id(root, Path::new("/project/shared/util.js")),
            "./../shared/util.js"
        );
    }

    #[test]
    fn test_to_unix_path_converts_backslashes() {
        assert_eq!(to_unix_path(Path::new(r"src\lib\a.js")), "src/lib/a.js");
    }
}
