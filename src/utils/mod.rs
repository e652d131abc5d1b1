//! Utility Module Implementation
//!
//! Logging setup, file helpers and the key/value configuration trait.

use crate::error::Result;

pub mod io;
pub mod logger;

pub use self::{io::*, logger::Logger};

/// Configuration that can be validated and adjusted key by key
pub trait UtilityConfig: Send + Sync {
    fn validate(&self) -> Result<()>;
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}
