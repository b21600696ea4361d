//! Request resolution: maps a `require` string to a file on disk.

use std::path::{Path, PathBuf};

use log::trace;

use crate::{
    error::{BundleError, Result},
    util::normalize_path,
};

/// Suffix tried when the caller configures no extensions.
pub const DEFAULT_EXTENSION: &str = ".js";

/// Resolves requests relative to the directory of the requesting module.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    extensions: Vec<String>,
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ModuleResolver {
    /// An empty `extensions` list falls back to [`DEFAULT_EXTENSION`].
    pub fn new(extensions: Vec<String>) -> Self {
        let extensions = if extensions.is_empty() {
            vec![DEFAULT_EXTENSION.to_owned()]
        } else {
            extensions
        };
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Resolve `request` against `base_dir`.
    ///
    /// The literal path is tried first, then the literal path with each
    /// extension appended, in configured order. The first regular file wins.
    pub fn resolve(&self, base_dir: &Path, request: &str) -> Result<PathBuf> {
        let literal = normalize_path(&base_dir.join(request));
        let mut tried = Vec::with_capacity(self.extensions.len() + 1);

        for candidate in self.candidates(&literal) {
            trace!("Probing {}", candidate.display());
            if candidate.is_file() {
                return Ok(candidate);
            }
            tried.push(candidate);
        }

        Err(BundleError::Resolution {
            request: request.to_owned(),
            base_dir: base_dir.to_path_buf(),
            tried,
        })
    }

    fn candidates<'a>(&'a self, literal: &'a Path) -> impl Iterator<Item = PathBuf> + 'a {
        std::iter::once(literal.to_path_buf()).chain(self.extensions.iter().map(move |ext| {
            let mut with_ext = literal.as_os_str().to_owned();
            with_ext.push(ext);
            PathBuf::from(with_ext)
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_exact_match_wins_over_extensions() {
        let temp = TempDir::new().unwrap();
        let exact = touch(temp.path(), "a");
        touch(temp.path(), "a.js");

        let resolver = ModuleResolver::new(vec![".js".into()]);
        assert_eq!(resolver.resolve(temp.path(), "./a").unwrap(), exact);
    }

    #[test]
    fn test_extensions_tried_in_configured_order() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.js");
        let jsx = touch(temp.path(), "a.jsx");

        let resolver = ModuleResolver::new(vec![".jsx".into(), ".js".into()]);
        assert_eq!(resolver.resolve(temp.path(), "./a").unwrap(), jsx);
    }

    #[test]
    fn test_default_extension_is_js() {
        let temp = TempDir::new().unwrap();
        let js = touch(temp.path(), "b.js");

        let resolver = ModuleResolver::default();
        assert_eq!(resolver.extensions(), [".js".to_owned()]);
        assert_eq!(resolver.resolve(temp.path(), "./b").unwrap(), js);
    }

    #[test]
    fn test_parent_relative_request() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("lib")).unwrap();
        let util = touch(temp.path(), "util.js");

        let resolver = ModuleResolver::default();
        assert_eq!(
            resolver.resolve(&temp.path().join("lib"), "../util").unwrap(),
            util
        );
    }

    #[test]
    fn test_directory_is_not_a_candidate() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("lib")).unwrap();
        let file = touch(temp.path(), "lib.js");

        let resolver = ModuleResolver::default();
        assert_eq!(resolver.resolve(temp.path(), "./lib").unwrap(), file);
    }

    #[test]
    fn test_missing_file_reports_every_candidate() {
        let temp = TempDir::new().unwrap();
        let resolver = ModuleResolver::new(vec![".js".into(), ".mjs".into()]);

        let err = resolver.resolve(temp.path(), "./missing").unwrap_err();
        match err {
            BundleError::Resolution { request, tried, .. } => {
                assert_eq!(request, "./missing");
                assert_eq!(
                    tried,
                    vec![
                        temp.path().join("missing"),
                        temp.path().join("missing.js"),
                        temp.path().join("missing.mjs"),
                    ]
                );
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }
}
