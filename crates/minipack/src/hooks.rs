//! Synchronous lifecycle hooks and the plugins that tap them.

use std::fmt;

use log::{info, trace};

use crate::compiler::Compiler;

struct Tap {
    name: String,
    callback: Box<dyn Fn()>,
}

/// Ordered callback registry. `call` runs every callback in registration
/// order; callbacks cannot cancel or defer the build.
#[derive(Default)]
pub struct SyncHook {
    taps: Vec<Tap>,
}

impl fmt::Debug for SyncHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tap_names()).finish()
    }
}

impl SyncHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tap(&mut self, name: impl Into<String>, callback: impl Fn() + 'static) {
        self.taps.push(Tap {
            name: name.into(),
            callback: Box::new(callback),
        });
    }

    pub fn call(&self) {
        for tap in &self.taps {
            trace!("Calling tap '{}'", tap.name);
            (tap.callback)();
        }
    }

    pub fn tap_names(&self) -> impl Iterator<Item = &str> {
        self.taps.iter().map(|tap| tap.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct CompilerHooks {
    /// Fired before compilation starts
    pub run: SyncHook,
    /// Fired after every asset has been written
    pub done: SyncHook,
}

/// Extension point: a plugin registers hook callbacks on the compiler.
pub trait Plugin {
    fn name(&self) -> &str;
    fn apply(&self, compiler: &mut Compiler);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunLoggerPlugin;

impl Plugin for RunLoggerPlugin {
    fn name(&self) -> &str {
        "run-logger"
    }

    fn apply(&self, compiler: &mut Compiler) {
        compiler.hooks.run.tap(self.name(), || info!("Build started"));
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DoneLoggerPlugin;

impl Plugin for DoneLoggerPlugin {
    fn name(&self) -> &str {
        "done-logger"
    }

    fn apply(&self, compiler: &mut Compiler) {
        compiler.hooks.done.tap(self.name(), || info!("Build finished"));
    }
}

/// Look up a built-in plugin by its configuration name.
pub fn builtin_plugin(name: &str) -> Option<Box<dyn Plugin>> {
    match name {
        "run-logger" => Some(Box::new(RunLoggerPlugin)),
        "done-logger" => Some(Box::new(DoneLoggerPlugin)),
        _ => None,
    }
}
