//! Process-wide cache of loaded allophone sets

use super::AllophoneSet;
use crate::Result;
use log::debug;
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Slot = Arc<OnceCell<Arc<AllophoneSet>>>;

static GLOBAL: Lazy<ResourceCache> = Lazy::new(ResourceCache::new);

/// Maps resource identifiers to loaded sets
///
/// Entries are never evicted. Each identifier has its own slot, so a load
/// of one set never waits on another; concurrent callers asking for the
/// same uncached identifier block until the first load finishes and then
/// share its result. A failed load leaves the slot empty for a later retry.
pub struct ResourceCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// The cache shared by the whole process
    pub fn global() -> &'static ResourceCache {
        &GLOBAL
    }

    /// A previously loaded set
    pub fn get(&self, identifier: &str) -> Option<Arc<AllophoneSet>> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.get(identifier).and_then(|slot| slot.get().cloned())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Return the cached set, running `load` only if there is none yet
    pub fn get_or_load<F>(&self, identifier: &str, load: F) -> Result<Arc<AllophoneSet>>
    where
        F: FnOnce() -> Result<AllophoneSet>,
    {
        let slot = self.slot(identifier);
        let set = slot.get_or_try_init(|| {
            debug!("Loading resource {}", identifier);
            load().map(Arc::new)
        })?;
        Ok(Arc::clone(set))
    }

    /// Number of loaded sets
    pub fn len(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, identifier: &str) -> Slot {
        {
            let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
            if let Some(slot) = slots.get(identifier) {
                return Arc::clone(slot);
            }
        }
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        let slot = slots.entry(identifier.to_string()).or_default();
        Arc::clone(slot)
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}
