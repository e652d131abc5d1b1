//! Tree rendering for the command line

use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

pub mod formatter;

pub use formatter::TreeFormatter;

/// Tree output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for TreeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeFormat::Text => f.write_str("text"),
            TreeFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for TreeFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(TreeFormat::Text),
            "json" => Ok(TreeFormat::Json),
            other => Err(Error::ConfigError(format!("Unknown output format: {}", other))),
        }
    }
}
