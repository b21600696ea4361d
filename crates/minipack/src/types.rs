//! Shared type definitions for the minipack crate
//!
//! Insertion-ordered collections keyed with `FxHasher`. Ordering matters
//! everywhere in the bundler: module discovery order drives registry layout,
//! and entry declaration order drives unit order.

use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

/// Type alias for FxHasher-based IndexMap
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Type alias for FxHasher-based IndexSet
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;
