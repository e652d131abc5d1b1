//! Logger setup for the explorer binary and tests

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber
pub struct Logger {
    level: String,
    initialized: bool,
}

impl Logger {
    pub fn new() -> Self {
        Self::with_level("info")
    }

    pub fn with_level(level: &str) -> Self {
        Self {
            level: level.to_string(),
            initialized: false,
        }
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    /// Installs the subscriber once. `RUST_LOG` wins over the configured level.
    ///
    /// A subscriber installed elsewhere (for example by a test harness) is
    /// left in place.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
        {
            Ok(()) => info!("Logger initialized with level: {}", self.level),
            Err(e) => debug!("Subscriber already installed: {}", e),
        }
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
