//! minipack: a minimal CommonJS module bundler.
//!
//! Starting from one or more entry files, minipack follows `require('...')`
//! calls, runs each file through rule-selected transforms, rewrites every
//! request to a canonical project-relative id and emits one self-executing
//! script per entry.

pub mod code_generator;
pub mod compilation;
pub mod compiler;
pub mod config;
pub mod error;
pub mod hooks;
pub mod module_builder;
pub mod module_graph;
pub mod options;
pub mod parser;
pub mod resolver;
pub mod stats;
pub mod transform;
pub mod types;
pub mod util;
pub mod visitors;

pub use compiler::Compiler;
pub use error::{BundleError, Result};
pub use hooks::{Plugin, SyncHook};
pub use module_graph::{Module, ModuleGraph};
pub use options::{BuildOptions, Entry};
pub use stats::{Stats, StatsOptions};
pub use transform::{Rule, Transform, TransformChain, TransformRegistry};
