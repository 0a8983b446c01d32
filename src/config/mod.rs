//! Configuration loading for the engine.
//!
//! Layered, lowest priority first:
//! 1. Hardcoded defaults
//! 2. An optional TOML settings file
//! 3. `WATCHQ_`-prefixed environment variables (highest priority)

mod queue;
pub use queue::*;

#[cfg(test)]
mod config_test;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use tracing::debug;

use crate::Result;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Settings {
    /// Note pool sizing applied to newly created queues
    #[serde(default)]
    pub queue: QueueConfig,
}

impl Settings {
    /// Load settings, layering an optional file and the environment over
    /// the defaults.
    ///
    /// # Arguments
    /// * `path` - Optional path to a TOML settings file
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!("loading settings from {}", path);
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Environment overlay, e.g. WATCHQ_QUEUE__DEFAULT_NOTE_CAPACITY=64
        builder = builder.add_source(
            Environment::with_prefix("WATCHQ")
                .prefix_separator("_")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.queue.validate()?;
        Ok(settings)
    }
}
