//! Build report returned to the caller.

use std::path::PathBuf;

use serde::Serialize;

use crate::{module_graph::Module, types::FxIndexMap};

/// Summary of one emitted unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub name: String,
    #[serde(rename = "entry")]
    pub entry_module_id: String,
    /// Filename the unit is emitted under
    pub filename: String,
    /// Member module ids in discovery order; includes the entry
    #[serde(rename = "modules")]
    pub module_ids: Vec<String>,
}

/// Everything a finished build produced. Nothing in here has been written
/// to disk yet.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    /// Filename to rendered unit text
    pub assets: FxIndexMap<String, String>,
    pub chunks: Vec<Chunk>,
    pub modules: Vec<Module>,
    /// Every file read during the build, in read order
    pub file_dependencies: Vec<PathBuf>,
}

/// Section flags accepted by [`Stats::to_json`].
///
/// Kept for API compatibility only: the snapshot is always complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsOptions {
    pub assets: bool,
    pub chunks: bool,
    pub modules: bool,
}

impl StatsOptions {
    pub fn all() -> Self {
        Self {
            assets: true,
            chunks: true,
            modules: true,
        }
    }
}

impl Stats {
    pub fn chunk(&self, name: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.name == name)
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.id == id)
    }

    pub fn asset_for(&self, chunk_name: &str) -> Option<&str> {
        let chunk = self.chunk(chunk_name)?;
        self.assets.get(&chunk.filename).map(String::as_str)
    }

    /// Serializable snapshot of the report. `options` is ignored.
    pub fn to_json(&self, _options: &StatsOptions) -> StatsJson<'_> {
        StatsJson {
            assets: &self.assets,
            chunks: &self.chunks,
            modules: &self.modules,
            file_dependencies: &self.file_dependencies,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsJson<'a> {
    pub assets: &'a FxIndexMap<String, String>,
    pub chunks: &'a [Chunk],
    pub modules: &'a [Module],
    pub file_dependencies: &'a [PathBuf],
}
