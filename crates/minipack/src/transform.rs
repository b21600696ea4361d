//! Rule-selected source transforms ("loaders").
//!
//! A rule pairs a path pattern with an ordered list of transforms. For a given
//! module path the transforms of every matching rule are concatenated in rule
//! order, then applied right to left: the last transform sees the raw source
//! and the first one produces the text handed to the parser.

use std::{fmt, sync::Arc};

use log::trace;
use regex::Regex;

use crate::types::FxIndexMap;

/// A text-to-text source transform.
pub trait Transform {
    fn transform(&self, source: &str) -> String;
}

impl<F> Transform for F
where
    F: Fn(&str) -> String,
{
    fn transform(&self, source: &str) -> String {
        self(source)
    }
}

pub type SharedTransform = Arc<dyn Transform>;

/// A path pattern plus the transforms it selects.
#[derive(Clone)]
pub struct Rule {
    pub pattern: Regex,
    pub transforms: Vec<SharedTransform>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern.as_str())
            .field("transforms", &self.transforms.len())
            .finish()
    }
}

impl Rule {
    pub fn new(pattern: &str, transforms: Vec<SharedTransform>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            transforms,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Ordered rule set applied to every module before parsing.
#[derive(Debug, Clone, Default)]
pub struct TransformChain {
    rules: Vec<Rule>,
}

impl TransformChain {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Transforms selected for `path`, concatenated in rule order.
    pub fn transforms_for(&self, path: &str) -> Vec<&SharedTransform> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .flat_map(|rule| rule.transforms.iter())
            .collect()
    }

    /// Run the selected transforms over `source`, last one first.
    pub fn apply(&self, path: &str, source: String) -> String {
        let transforms = self.transforms_for(path);
        if transforms.is_empty() {
            return source;
        }
        trace!("Applying {} transform(s) to {path}", transforms.len());
        transforms
            .iter()
            .rev()
            .fold(source, |code, transform| transform.transform(&code))
    }
}

/// Named transforms available to configuration files.
pub struct TransformRegistry {
    transforms: FxIndexMap<String, SharedTransform>,
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.transforms.keys()).finish()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TransformRegistry {
    pub fn empty() -> Self {
        Self {
            transforms: FxIndexMap::default(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("use-strict", use_strict);
        registry.register("strip-bom", strip_bom);
        registry.register("normalize-newlines", normalize_newlines);
        registry.register("trim-trailing-whitespace", trim_trailing_whitespace);
        registry
    }

    pub fn register(&mut self, name: &str, transform: impl Transform + 'static) {
        self.transforms.insert(name.to_owned(), Arc::new(transform));
    }

    pub fn get(&self, name: &str) -> Option<SharedTransform> {
        self.transforms.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }
}

fn use_strict(source: &str) -> String {
    format!("\"use strict\";\n{source}")
}

fn strip_bom(source: &str) -> String {
    source.strip_prefix('\u{feff}').unwrap_or(source).to_owned()
}

fn normalize_newlines(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}

fn trim_trailing_whitespace(source: &str) -> String {
    let mut out = source
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    if source.ends_with('\n') {
        out.push('\n');
    }
    out
}
