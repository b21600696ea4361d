//! One build invocation: traverse every entry into a shared module graph,
//! group modules into units and render each unit.

use log::{debug, info, warn};

use crate::{
    code_generator::UnitSource,
    error::{BundleError, Result},
    module_builder::ModuleBuilder,
    module_graph::{Module, ModuleGraph},
    options::BuildOptions,
    resolver::ModuleResolver,
    stats::{Chunk, Stats},
    types::FxIndexMap,
    util::normalize_path,
};

#[derive(Debug)]
pub struct Compilation<'a> {
    options: &'a BuildOptions,
    graph: ModuleGraph,
    chunks: Vec<Chunk>,
}

impl<'a> Compilation<'a> {
    pub fn new(options: &'a BuildOptions) -> Self {
        Self {
            options,
            graph: ModuleGraph::new(),
            chunks: Vec::new(),
        }
    }

    /// Run the whole build. Any error aborts it; no partial report exists.
    pub fn build(mut self) -> Result<Stats> {
        self.build_graph()?;

        let cycles = self.graph.cycles();
        for cycle in &cycles {
            warn!("Circular dependency: {}", cycle.join(" -> "));
        }

        let assets = self.render_assets()?;
        let (modules, file_dependencies) = self.graph.into_parts();
        info!(
            "Built {} module(s) into {} unit(s)",
            modules.len(),
            self.chunks.len()
        );

        Ok(Stats {
            assets,
            chunks: self.chunks,
            modules,
            file_dependencies,
        })
    }

    fn build_graph(&mut self) -> Result<()> {
        let root = normalize_path(&self.options.root);
        let resolver = ModuleResolver::new(self.options.resolve.extensions.clone());
        let transforms = self.options.transform_chain();
        let mut builder = ModuleBuilder::new(&root, &resolver, &transforms)?;

        let mut entry_ids = Vec::new();
        for (name, path) in self.options.entry.entries() {
            debug!("Building entry '{name}' from {}", path.display());
            let entry_id = builder.build(&mut self.graph, name, &root.join(path))?;
            entry_ids.push((name.to_owned(), entry_id));
        }

        for (name, entry_module_id) in entry_ids {
            let module_ids = self
                .graph
                .members_of(&name)
                .map(|module| module.id.clone())
                .collect();
            let filename = self.options.output.filename_for(&name);
            self.chunks.push(Chunk {
                name,
                entry_module_id,
                filename,
                module_ids,
            });
        }
        Ok(())
    }

    fn render_assets(&self) -> Result<FxIndexMap<String, String>> {
        let mut assets = FxIndexMap::default();
        let mut owners: FxIndexMap<&str, &str> = FxIndexMap::default();

        for chunk in &self.chunks {
            if let Some(first) = owners.insert(&chunk.filename, &chunk.name) {
                return Err(BundleError::DuplicateAsset {
                    filename: chunk.filename.clone(),
                    first: first.to_owned(),
                    second: chunk.name.clone(),
                });
            }

            let members = chunk
                .module_ids
                .iter()
                .map(|id| self.module(chunk, id))
                .collect::<Result<Vec<&Module>>>()?;
            let entry = self.module(chunk, &chunk.entry_module_id)?;
            let unit = UnitSource {
                entry,
                members: &members,
            };
            assets.insert(chunk.filename.clone(), unit.render());
        }
        Ok(assets)
    }

    fn module(&self, chunk: &Chunk, id: &str) -> Result<&Module> {
        self.graph.get(id).ok_or_else(|| BundleError::UnknownModule {
            unit: chunk.name.clone(),
            id: id.to_owned(),
        })
    }
}
