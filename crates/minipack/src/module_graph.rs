//! The deduplicated module graph of one build.
//!
//! Modules are keyed by canonical id and kept in discovery order. Exactly one
//! [`Module`] exists per id, no matter how many entries or importers reach it.

use std::path::PathBuf;

use petgraph::{algo::tarjan_scc, graph::DiGraph};
use serde::Serialize;

use crate::types::{FxIndexMap, FxIndexSet};

/// A dependency edge discovered in a module, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Canonical id of the required module
    pub id: String,
    /// Resolved absolute path of the required module
    pub path: PathBuf,
    /// The request string as written in the source
    pub request: String,
}

/// A source file after transformation and reference rewriting.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub id: String,
    pub path: PathBuf,
    /// Entries whose traversal reaches this module. Only ever grows.
    pub owning_entries: FxIndexSet<String>,
    pub dependencies: Vec<Dependency>,
    /// Final text with every `require` literal rewritten to a canonical id
    #[serde(rename = "source")]
    pub transformed_source: String,
    /// Hex SHA-256 of `transformed_source`
    #[serde(rename = "hash")]
    pub content_hash: String,
}

impl Module {
    pub fn is_owned_by(&self, entry: &str) -> bool {
        self.owning_entries.contains(entry)
    }
}

#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: FxIndexMap<String, Module>,
    /// Every file read during traversal, in read order
    file_dependencies: FxIndexSet<PathBuf>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly built module. Returns `false` and keeps the existing
    /// module if the id is already present.
    pub fn insert(&mut self, module: Module) -> bool {
        if self.modules.contains_key(&module.id) {
            return false;
        }
        self.file_dependencies.insert(module.path.clone());
        self.modules.insert(module.id.clone(), module);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Module> {
        self.modules.get(id)
    }

    /// Add `entry` to the owners of `id`.
    ///
    /// Returns `None` if the module is unknown, otherwise whether the entry
    /// was newly added.
    pub fn add_owner(&mut self, id: &str, entry: &str) -> Option<bool> {
        let module = self.modules.get_mut(id)?;
        if module.owning_entries.contains(entry) {
            return Some(false);
        }
        module.owning_entries.insert(entry.to_owned());
        Some(true)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Modules reached from `entry`, in discovery order.
    pub fn members_of<'a>(&'a self, entry: &'a str) -> impl Iterator<Item = &'a Module> + 'a {
        self.modules().filter(move |module| module.is_owned_by(entry))
    }

    pub fn file_dependencies(&self) -> impl Iterator<Item = &PathBuf> {
        self.file_dependencies.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Groups of module ids that require each other, directly or transitively.
    ///
    /// Each group and the list of groups follow discovery order.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut graph = DiGraph::<usize, ()>::new();
        let nodes: Vec<_> = (0..self.modules.len()).map(|i| graph.add_node(i)).collect();

        for (from, module) in self.modules.values().enumerate() {
            for dep in &module.dependencies {
                if let Some(to) = self.modules.get_index_of(&dep.id) {
                    graph.update_edge(nodes[from], nodes[to], ());
                }
            }
        }

        let mut cycles: Vec<Vec<usize>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut indices: Vec<usize> = component.into_iter().map(|n| graph[n]).collect();
                indices.sort_unstable();
                indices
            })
            .collect();
        cycles.sort_unstable_by_key(|indices| indices[0]);

        cycles
            .into_iter()
            .map(|indices| {
                indices
                    .into_iter()
                    .filter_map(|i| self.modules.get_index(i).map(|(id, _)| id.clone()))
                    .collect()
            })
            .collect()
    }

    pub fn into_parts(self) -> (Vec<Module>, Vec<PathBuf>) {
        (
            self.modules.into_values().collect(),
            self.file_dependencies.into_iter().collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn module(id: &str, owner: &str, deps: &[&str]) -> Module {
        Module {
            id: id.to_owned(),
            path: PathBuf::from(format!("/p/{id}")),
            owning_entries: std::iter::once(owner.to_owned()).collect(),
            dependencies: deps
                .iter()
                .map(|dep| Dependency {
                    id: (*dep).to_owned(),
                    path: PathBuf::from(format!("/p/{dep}")),
                    request: (*dep).to_owned(),
                })
                .collect(),
            transformed_source: String::new(),
            content_hash: String::new(),
        }
    }

    #[test]
    fn test_insert_keeps_first_module() {
        let mut graph = ModuleGraph::new();
        assert!(graph.insert(module("./a.js", "main", &[])));
        assert!(!graph.insert(module("./a.js", "admin", &[])));
        assert_eq!(graph.len(), 1);
        assert!(graph.get("./a.js").unwrap().is_owned_by("main"));
        assert!(!graph.get("./a.js").unwrap().is_owned_by("admin"));
    }

    #[test]
    fn test_add_owner_is_monotonic() {
        let mut graph = ModuleGraph::new();
        graph.insert(module("./a.js", "main", &[]));

        assert_eq!(graph.add_owner("./a.js", "admin"), Some(true));
        assert_eq!(graph.add_owner("./a.js", "admin"), Some(false));
        assert_eq!(graph.add_owner("./missing.js", "admin"), None);

        let owners: Vec<_> = graph.get("./a.js").unwrap().owning_entries.iter().collect();
        assert_eq!(owners, ["main", "admin"]);
    }

    #[test]
    fn test_members_of_filters_by_owner() {
        let mut graph = ModuleGraph::new();
        graph.insert(module("./index.js", "main", &[]));
        graph.insert(module("./admin.js", "admin", &[]));
        graph.insert(module("./util.js", "main", &[]));
        graph.add_owner("./util.js", "admin");

        let ids: Vec<_> = graph.members_of("admin").map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["./admin.js", "./util.js"]);
    }

    #[test]
    fn test_cycles_detects_mutual_and_self_requires() {
        let mut graph = ModuleGraph::new();
        graph.insert(module("./index.js", "main", &["./a.js"]));
        graph.insert(module("./a.js", "main", &["./b.js"]));
        graph.insert(module("./b.js", "main", &["./a.js", "./self.js"]));
        graph.insert(module("./self.js", "main", &["./self.js"]));

        assert_eq!(
            graph.cycles(),
            vec![
                vec!["./a.js".to_owned(), "./b.js".to_owned()],
                vec!["./self.js".to_owned()],
            ]
        );
    }
}
