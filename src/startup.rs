//! Bringing the voice system up exactly once

use crate::config::Config;
use crate::{Error, Result};
use log::{debug, info};
use std::sync::Mutex;

/// Lifecycle state of the surrounding system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    Off,
    Starting,
    Running,
    ShuttingDown,
}

/// Something that can be started
pub trait Lifecycle: Send + Sync {
    fn state(&self) -> SystemState;

    /// Run the start sequence
    fn startup(&self) -> Result<()>;
}

/// Start the system if it is off
///
/// Callers serialize on the configuration's startup lock, so concurrent
/// calls run the start sequence at most once.
pub fn ensure_started(config: &Config, lifecycle: &dyn Lifecycle) -> Result<()> {
    let _guard = config
        .startup_lock()
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    if lifecycle.state() == SystemState::Off {
        lifecycle.startup()?;
    } else {
        debug!("System already {:?}", lifecycle.state());
    }
    Ok(())
}

type Hook = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// Lifecycle that runs a list of startup hooks in order
///
/// If a hook fails the system goes back to `Off`, so a later
/// `ensure_started` tries again from the first hook.
pub struct SystemLifecycle {
    state: Mutex<SystemState>,
    hooks: Vec<(String, Hook)>,
}

impl SystemLifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SystemState::Off),
            hooks: Vec::new(),
        }
    }

    /// Add a named step to the start sequence
    pub fn on_startup<F>(mut self, name: &str, hook: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.push((name.to_string(), Box::new(hook)));
        self
    }

    /// Mark the system as stopped
    pub fn shutdown(&self) {
        self.set_state(SystemState::ShuttingDown);
        info!("System shutting down");
        self.set_state(SystemState::Off);
    }

    fn set_state(&self, next: SystemState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }
}

impl Default for SystemLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for SystemLifecycle {
    fn state(&self) -> SystemState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn startup(&self) -> Result<()> {
        info!("Starting system ({} steps)", self.hooks.len());
        self.set_state(SystemState::Starting);

        for (name, hook) in &self.hooks {
            debug!("Startup step: {}", name);
            if let Err(e) = hook() {
                self.set_state(SystemState::Off);
                return Err(Error::Startup(format!("{} failed: {}", name, e.message())));
            }
        }

        self.set_state(SystemState::Running);
        info!("System running");
        Ok(())
    }
}
