//! Syntax tree visitors.

mod require_discovery;

pub use require_discovery::{RequireCall, RequireDiscoveryVisitor};
