// Type definitions for the structural description and the display tree

pub mod tree;
pub mod value;

pub use tree::*;
pub use value::*;
