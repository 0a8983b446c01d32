use serde::Deserialize;
use serde::Serialize;

use crate::constants::MAX_QUEUE_NOTES;
use crate::Error;
use crate::Result;
use crate::SizeError;

/// Note pool sizing for newly created queues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Pool size a queue starts with, before any explicit `set_size`
    /// Must be a power of two
    /// Default value is set via default_note_capacity() function
    #[serde(default = "default_note_capacity")]
    pub default_note_capacity: u32,

    /// Largest pool `set_size` will accept on queues built from this
    /// configuration; capped by the engine-wide hard maximum
    #[serde(default = "default_max_note_capacity")]
    pub max_note_capacity: u32,
}

fn default_note_capacity() -> u32 {
    32
}

fn default_max_note_capacity() -> u32 {
    MAX_QUEUE_NOTES
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_note_capacity: default_note_capacity(),
            max_note_capacity: default_max_note_capacity(),
        }
    }
}

impl QueueConfig {
    /// Reject configurations no queue could be built from.
    pub fn validate(&self) -> Result<()> {
        if self.default_note_capacity == 0 {
            return Err(Error::Size(SizeError::Zero));
        }
        if !self.default_note_capacity.is_power_of_two() {
            return Err(Error::Size(SizeError::NotPowerOfTwo {
                requested: self.default_note_capacity,
            }));
        }
        let limit = self.max_note_capacity.min(MAX_QUEUE_NOTES);
        if self.default_note_capacity > limit {
            return Err(Error::Size(SizeError::ExceedsLimit {
                requested: self.default_note_capacity,
                limit,
            }));
        }
        Ok(())
    }
}
