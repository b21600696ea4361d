//! TOML configuration file front end.
//!
//! ```toml
//! entry = "./src/index.js"
//!
//! [output]
//! path = "dist"
//! filename = "[name].js"
//!
//! [resolve]
//! extensions = [".js"]
//!
//! [[module.rules]]
//! test = "\\.js$"
//! use = ["use-strict"]
//! ```
//!
//! Relative `root` and `output.path` are resolved against the directory that
//! holds the configuration file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::{
    hooks::{Plugin, builtin_plugin},
    options::{BuildOptions, Entry, ModuleOptions, NAME_PLACEHOLDER, OutputOptions, ResolveOptions},
    transform::{Rule, TransformRegistry},
    util::normalize_path,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub root: Option<PathBuf>,
    pub entry: Entry,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub module: ModuleConfig,
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub plugins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dist"),
            filename: format!("{NAME_PLACEHOLDER}.js"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Regular expression matched against the absolute module path
    pub test: String,
    /// Transform names, applied last to first
    #[serde(rename = "use", default)]
    pub transforms: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    pub extensions: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Turn the file into build options and plugin instances.
    ///
    /// `base_dir` anchors relative paths; `root_override` wins over the
    /// file's own `root`.
    pub fn into_build(
        self,
        base_dir: &Path,
        root_override: Option<&Path>,
        transforms: &TransformRegistry,
    ) -> Result<(BuildOptions, Vec<Box<dyn Plugin>>)> {
        let root = match (root_override, &self.root) {
            (Some(root), _) => base_dir.join(root),
            (None, Some(root)) => base_dir.join(root),
            (None, None) => base_dir.to_path_buf(),
        };

        let rules = self
            .module
            .rules
            .iter()
            .map(|rule| build_rule(rule, transforms))
            .collect::<Result<Vec<_>>>()?;

        let plugins = self
            .plugins
            .iter()
            .map(|name| builtin_plugin(name).ok_or_else(|| anyhow!("unknown plugin '{name}'")))
            .collect::<Result<Vec<_>>>()?;

        let options = BuildOptions {
            root: normalize_path(&root),
            entry: self.entry,
            output: OutputOptions {
                path: normalize_path(&base_dir.join(&self.output.path)),
                filename: self.output.filename,
            },
            module: ModuleOptions { rules },
            resolve: ResolveOptions {
                extensions: self.resolve.extensions,
            },
        };
        Ok((options, plugins))
    }
}

fn build_rule(rule: &RuleConfig, registry: &TransformRegistry) -> Result<Rule> {
    let transforms = rule
        .transforms
        .iter()
        .map(|name| {
            registry.get(name).ok_or_else(|| {
                anyhow!(
                    "unknown transform '{name}' (available: {})",
                    registry.names().collect::<Vec<_>>().join(", ")
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Rule::new(&rule.test, transforms).with_context(|| format!("invalid rule pattern '{}'", rule.test))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_single_entry_with_defaults() {
        let config = Config::parse(r#"entry = "./src/index.js""#).unwrap();
        assert_eq!(config.entry, Entry::Single("./src/index.js".into()));
        assert_eq!(config.output.filename, "[name].js");
        assert!(config.module.rules.is_empty());
    }

    #[test]
    fn test_into_build_resolves_paths_and_names() {
        let config = Config::parse(
            r#"
plugins = ["run-logger", "done-logger"]

[entry]
main = "./src/index.js"
admin = "./src/admin.js"

[output]
path = "build/out"
filename = "[name].bundle.js"

[resolve]
extensions = [".js", ".cjs"]

[[module.rules]]
test = "\\.js$"
use = ["use-strict", "strip-bom"]
"#,
        )
        .unwrap();

        let (options, plugins) = config
            .into_build(Path::new("/project"), None, &TransformRegistry::with_builtins())
            .unwrap();

        assert_eq!(options.root, PathBuf::from("/project"));
        assert_eq!(options.output.path, PathBuf::from("/project/build/out"));
        assert_eq!(options.output.filename_for("admin"), "admin.bundle.js");
        assert_eq!(options.resolve.extensions, [".js", ".cjs"]);
        assert_eq!(options.module.rules.len(), 1);
        assert_eq!(options.module.rules[0].transforms.len(), 2);
        let names: Vec<_> = options.entry.entries().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["main", "admin"]);
        let plugin_names: Vec<_> = plugins.iter().map(|p| p.name()).collect();
        assert_eq!(plugin_names, ["run-logger", "done-logger"]);
    }

    #[test]
    fn test_root_override_wins() {
        let config = Config::parse("root = \"app\"\nentry = \"./index.js\"").unwrap();
        let (options, _) = config
            .into_build(
                Path::new("/project"),
                Some(Path::new("/elsewhere")),
                &TransformRegistry::with_builtins(),
            )
            .unwrap();
        assert_eq!(options.root, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_unknown_transform_is_rejected() {
        let config = Config::parse(
            r#"
entry = "./index.js"
[[module.rules]]
test = "\\.js$"
use = ["minify"]
"#,
        )
        .unwrap();
        let err = config
            .into_build(Path::new("/project"), None, &TransformRegistry::with_builtins())
            .err().unwrap();
        assert!(format!("{err:#}").contains("unknown transform 'minify'"));
    }

    #[test]
    fn test_unknown_plugin_is_rejected() {
        let config = Config::parse("entry = \"./index.js\"\nplugins = [\"html\"]").unwrap();
        let err = config
            .into_build(Path::new("/project"), None, &TransformRegistry::with_builtins())
            .err().unwrap();
        assert!(err.to_string().contains("unknown plugin 'html'"));
    }
}
