//! Low-memory detection

use super::MemoryProbe;
use crate::config::PropertySource;
use log::debug;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Property holding the low-memory threshold in bytes
pub const LOW_MEMORY_PROPERTY: &str = "runtime.lowmemory";

/// Threshold used when the property is unset or unusable
pub const DEFAULT_LOW_MEMORY_THRESHOLD: u64 = 10_000_000;

static GLOBAL: OnceCell<Arc<MemoryPolicy>> = OnceCell::new();

/// Decides whether the process is short of memory
///
/// The threshold is read from configuration on the first query and never
/// re-read afterwards.
pub struct MemoryPolicy {
    properties: Arc<dyn PropertySource>,
    probe: Arc<dyn MemoryProbe>,
    threshold: OnceCell<u64>,
}

impl MemoryPolicy {
    pub fn new(properties: Arc<dyn PropertySource>, probe: Arc<dyn MemoryProbe>) -> Self {
        Self {
            properties,
            probe,
            threshold: OnceCell::new(),
        }
    }

    /// The process-wide policy
    ///
    /// The first call decides the configuration and probe; later calls get
    /// the same policy back and their arguments are ignored.
    pub fn global(properties: Arc<dyn PropertySource>, probe: Arc<dyn MemoryProbe>) -> Arc<Self> {
        let policy = GLOBAL.get_or_init(|| Arc::new(Self::new(properties, probe)));
        Arc::clone(policy)
    }

    /// Less than the threshold is available
    pub fn is_low_memory(&self) -> bool {
        self.probe.available_memory() < self.threshold()
    }

    /// Less than half the threshold is available
    pub fn is_very_low_memory(&self) -> bool {
        self.probe.available_memory() < self.threshold() / 2
    }

    /// The low-memory threshold in bytes
    pub fn threshold(&self) -> u64 {
        *self.threshold.get_or_init(|| {
            let configured = self
                .properties
                .get_integer(LOW_MEMORY_PROPERTY, DEFAULT_LOW_MEMORY_THRESHOLD as i64);
            let threshold = u64::try_from(configured).unwrap_or(DEFAULT_LOW_MEMORY_THRESHOLD);
            debug!("Low memory threshold: {} bytes", threshold);
            threshold
        })
    }
}
