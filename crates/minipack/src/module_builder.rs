//! Builds modules from files and drives the dependency traversal.
//!
//! Per file: read, run the transform chain, parse, discover `require` calls,
//! resolve them, rewrite each literal to the dependency's canonical id, and
//! splice the rewritten literals back into the text.
//!
//! Traversal is an explicit depth-first work-list. A module enters the graph
//! as soon as its own file has been processed, before any of its
//! dependencies are visited, so a require cycle reaches an id that is already
//! present and stops there.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use sha2::{Digest, Sha256};

use crate::{
    error::{BundleError, Result},
    module_graph::{Dependency, Module, ModuleGraph},
    parser::{JsParser, hash_bang_range},
    resolver::ModuleResolver,
    transform::TransformChain,
    util::{module_id, normalize_path, to_unix_path},
    visitors::RequireDiscoveryVisitor,
};

pub struct ModuleBuilder<'a> {
    root: &'a Path,
    resolver: &'a ModuleResolver,
    transforms: &'a TransformChain,
    parser: JsParser,
}

impl std::fmt::Debug for ModuleBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleBuilder")
            .field("root", &self.root)
            .field("resolver", &self.resolver)
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}

impl<'a> ModuleBuilder<'a> {
    /// `root` must be absolute; canonical ids are computed relative to it.
    pub fn new(
        root: &'a Path,
        resolver: &'a ModuleResolver,
        transforms: &'a TransformChain,
    ) -> Result<Self> {
        Ok(Self {
            root,
            resolver,
            transforms,
            parser: JsParser::new()?,
        })
    }

    /// Canonical id of the file at `path`.
    pub fn module_id(&self, path: &Path) -> String {
        module_id(&normalize_path(self.root), &normalize_path(path))
    }

    /// Build every module reachable from `module_path` on behalf of
    /// `entry_name` and return the id of the module at `module_path`.
    ///
    /// Modules already in `graph` are not read again; they only gain
    /// `entry_name` as an owner, and so does everything they depend on.
    pub fn build(
        &mut self,
        graph: &mut ModuleGraph,
        entry_name: &str,
        module_path: &Path,
    ) -> Result<String> {
        let module_path = normalize_path(module_path);
        let root_id = self.module_id(&module_path);
        let mut pending = vec![(root_id.clone(), module_path)];

        while let Some((id, path)) = pending.pop() {
            let next: Vec<(String, PathBuf)> = match graph.add_owner(&id, entry_name) {
                Some(false) => continue,
                Some(true) => {
                    debug!("Module {id} is also reached from entry '{entry_name}'");
                    graph
                        .get(&id)
                        .map(dependency_targets)
                        .unwrap_or_default()
                }
                None => {
                    let module = self.build_module(entry_name, id, &path)?;
                    let targets = dependency_targets(&module);
                    graph.insert(module);
                    targets
                }
            };
            // reversed so the first dependency in source order is visited first
            pending.extend(next.into_iter().rev());
        }

        Ok(root_id)
    }

    /// Read, transform, parse and rewrite a single file.
    pub fn build_module(&mut self, entry_name: &str, id: String, path: &Path) -> Result<Module> {
        let raw = fs::read_to_string(path).map_err(|e| BundleError::io("read", path, e))?;
        let source = self.transforms.apply(&to_unix_path(path), raw);

        let tree = self.parser.parse(path, &source)?;
        let calls = RequireDiscoveryVisitor::discover(&source, &tree);

        let base_dir = path.parent().unwrap_or(self.root);
        let mut dependencies = Vec::with_capacity(calls.len());
        let mut rewritten = String::with_capacity(source.len());
        let mut cursor = hash_bang_range(&tree).map_or(0, |range| range.end);

        for call in &calls {
            let dep_path = self.resolver.resolve(base_dir, &call.request)?;
            let dep_id = self.module_id(&dep_path);
            trace!(
                "{id}:{}: require('{}') -> {dep_id}",
                call.line, call.request
            );

            rewritten.push_str(&source[cursor..call.literal_range.start]);
            rewritten.push_str(&call.rewritten_literal(&dep_id));
            cursor = call.literal_range.end;

            dependencies.push(Dependency {
                id: dep_id,
                path: dep_path,
                request: call.request.clone(),
            });
        }
        rewritten.push_str(&source[cursor..]);

        debug!(
            "Built module {id} with {} dependenc{}",
            dependencies.len(),
            if dependencies.len() == 1 { "y" } else { "ies" }
        );

        Ok(Module {
            content_hash: format!("{:x}", Sha256::digest(rewritten.as_bytes())),
            id,
            path: path.to_path_buf(),
            owning_entries: std::iter::once(entry_name.to_owned()).collect(),
            dependencies,
            transformed_source: rewritten,
        })
    }
}

fn dependency_targets(module: &Module) -> Vec<(String, PathBuf)> {
    module
        .dependencies
        .iter()
        .map(|dep| (dep.id.clone(), dep.path.clone()))
        .collect()
}
