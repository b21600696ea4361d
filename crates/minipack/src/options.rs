//! Build options consumed by the compiler.
//!
//! These are plain values assembled by the caller; see `config` for the TOML
//! file front end used by the binary.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    transform::{Rule, TransformChain},
    types::FxIndexMap,
};

/// Name given to the unit of a single-path entry.
pub const DEFAULT_ENTRY_NAME: &str = "main";

/// Placeholder substituted with the unit name in `output.filename`.
pub const NAME_PLACEHOLDER: &str = "[name]";

/// Traversal roots, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Single(PathBuf),
    Named(FxIndexMap<String, PathBuf>),
}

impl Entry {
    /// `(name, path)` pairs in declaration order.
    pub fn entries(&self) -> Vec<(&str, &Path)> {
        match self {
            Self::Single(path) => vec![(DEFAULT_ENTRY_NAME, path.as_path())],
            Self::Named(map) => map
                .iter()
                .map(|(name, path)| (name.as_str(), path.as_path()))
                .collect(),
        }
    }
}

impl<S: Into<String>, P: Into<PathBuf>> FromIterator<(S, P)> for Entry {
    fn from_iter<I: IntoIterator<Item = (S, P)>>(iter: I) -> Self {
        Self::Named(
            iter.into_iter()
                .map(|(name, path)| (name.into(), path.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Directory receiving the emitted units
    pub path: PathBuf,
    /// File name template containing [`NAME_PLACEHOLDER`]
    pub filename: String,
}

impl OutputOptions {
    pub fn filename_for(&self, unit_name: &str) -> String {
        self.filename.replace(NAME_PLACEHOLDER, unit_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModuleOptions {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Suffixes tried after the literal request, in order
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Absolute project root. Canonical ids are relative to it.
    pub root: PathBuf,
    pub entry: Entry,
    pub output: OutputOptions,
    pub module: ModuleOptions,
    pub resolve: ResolveOptions,
}

impl BuildOptions {
    /// Options with the defaults: output to `<root>/dist/[name].js`, no
    /// rules, `.js` resolution.
    pub fn new(root: impl Into<PathBuf>, entry: Entry) -> Self {
        let root = root.into();
        Self {
            output: OutputOptions {
                path: root.join("dist"),
                filename: format!("{NAME_PLACEHOLDER}.js"),
            },
            root,
            entry,
            module: ModuleOptions::default(),
            resolve: ResolveOptions::default(),
        }
    }

    pub(crate) fn transform_chain(&self) -> TransformChain {
        TransformChain::new(self.module.rules.clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_single_entry_is_named_main() {
        let entry = Entry::Single("./src/index.js".into());
        assert_eq!(entry.entries(), [("main", Path::new("./src/index.js"))]);
    }

    #[test]
    fn test_named_entries_keep_declaration_order() {
        let entry: Entry = [("main", "./main.js"), ("admin", "./admin.js")]
            .into_iter()
            .collect();
        let names: Vec<_> = entry.entries().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["main", "admin"]);
    }

    #[test]
    fn test_filename_template() {
        let output = OutputOptions {
            path: PathBuf::from("dist"),
            filename: "[name].bundle.js".to_owned(),
        };
        assert_eq!(output.filename_for("admin"), "admin.bundle.js");
    }
}
