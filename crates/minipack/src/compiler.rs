//! Compiler: owns the options and hooks, runs builds and writes units.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    compilation::Compilation,
    error::{BundleError, Result},
    hooks::{CompilerHooks, Plugin},
    options::BuildOptions,
    stats::Stats,
};

#[derive(Debug)]
pub struct Compiler {
    options: BuildOptions,
    pub hooks: CompilerHooks,
}

impl Compiler {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            hooks: CompilerHooks::default(),
        }
    }

    /// Create a compiler and let each plugin register its hooks, in order.
    pub fn with_plugins(options: BuildOptions, plugins: &[Box<dyn Plugin>]) -> Self {
        let mut compiler = Self::new(options);
        for plugin in plugins {
            compiler.apply(plugin.as_ref());
        }
        compiler
    }

    pub fn apply(&mut self, plugin: &dyn Plugin) {
        debug!("Applying plugin '{}'", plugin.name());
        plugin.apply(self);
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build every unit in memory without touching the output directory.
    pub fn compile(&self) -> Result<Stats> {
        Compilation::new(&self.options).build()
    }

    /// Fire `run`, compile, write every asset, then fire `done`.
    ///
    /// A failed build writes nothing and does not fire `done`.
    pub fn run(&self) -> Result<Stats> {
        self.hooks.run.call();
        let stats = self.compile()?;
        self.emit_assets(&stats)?;
        self.hooks.done.call();
        Ok(stats)
    }

    /// Write every asset into the output directory.
    ///
    /// Assets are first written next to their targets as `<name>.tmp` and
    /// only renamed into place once every write succeeded. On failure the
    /// staged files and any already-renamed targets are removed, so a failed
    /// emit leaves no unit behind.
    pub fn emit_assets(&self, stats: &Stats) -> Result<()> {
        let out_dir = &self.options.output.path;
        fs::create_dir_all(out_dir)
            .map_err(|e| BundleError::io("create output directory", out_dir, e))?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(stats.assets.len());
        for (filename, source) in &stats.assets {
            let target = out_dir.join(filename);
            let temp = staging_path(&target);
            debug!("Writing {}", temp.display());
            let written = match target.parent() {
                Some(parent) => fs::create_dir_all(parent).and_then(|()| fs::write(&temp, source)),
                None => fs::write(&temp, source),
            };
            if let Err(e) = written {
                staged.push((temp, target.clone()));
                discard(staged.iter().map(|(temp, _)| temp.as_path()));
                return Err(BundleError::io("write", target, e));
            }
            staged.push((temp, target));
        }

        for (index, (temp, target)) in staged.iter().enumerate() {
            debug!("Publishing {}", target.display());
            if let Err(e) = fs::rename(temp, target) {
                discard(staged[..index].iter().map(|(_, target)| target.as_path()));
                discard(staged[index..].iter().map(|(temp, _)| temp.as_path()));
                return Err(BundleError::io("write", target, e));
            }
        }
        Ok(())
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Best-effort removal of files left behind by a failed emit.
fn discard<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            debug!("Could not remove {}: {e}", path.display());
        }
    }
}
