//! Memory-pressure policy and output buffer placement
//!
//! Synthesis produces audio of unknown length. When headroom is short the
//! output goes to a temporary file instead of a growing in-memory buffer.

pub mod destination;
pub mod policy;

pub use destination::{AudioDestination, DestinationSelector, OutputMode};
pub use policy::{MemoryPolicy, DEFAULT_LOW_MEMORY_THRESHOLD};

use crate::platform;
use crate::{Error, Result};

/// Source of the available-memory estimate
pub trait MemoryProbe: Send + Sync {
    /// Bytes of headroom currently available
    fn available_memory(&self) -> u64;
}

/// Reads available memory from the operating system
///
/// Where no estimate can be obtained this reports `u64::MAX`, so the
/// system is never considered short of memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMemory;

impl MemoryProbe for SystemMemory {
    fn available_memory(&self) -> u64 {
        platform::available_memory().unwrap_or(u64::MAX)
    }
}

/// Reports a constant amount of available memory
#[derive(Debug, Clone, Copy)]
pub struct FixedMemory(pub u64);

impl FixedMemory {
    /// Build from a textual byte count, as given in a component descriptor
    pub fn from_arg(bytes: &str) -> Result<Self> {
        bytes
            .parse()
            .map(FixedMemory)
            .map_err(|e| Error::Parse(format!("Invalid byte count '{}': {}", bytes, e)))
    }
}

impl MemoryProbe for FixedMemory {
    fn available_memory(&self) -> u64 {
        self.0
    }
}
