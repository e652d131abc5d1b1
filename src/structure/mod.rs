//! Tree construction and lazy reference resolution

pub mod resolver;
pub mod tree_builder;

pub use resolver::{ReferenceResolver, ResolveOutcome};
pub use tree_builder::TreeBuilder;
