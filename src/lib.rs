//! vocalrt - runtime services for a voice-processing system
//!
//! Wires components from configuration descriptors, resolves and caches
//! the allophone sets voices and languages need, and decides where
//! synthesized audio is buffered based on available memory.

pub mod config;
pub mod error;
pub mod factory;
pub mod formats;
pub mod locale;
pub mod memory;
pub mod platform;
pub mod resource;
pub mod startup;
pub mod voice;

pub use error::{Error, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "vocalrt";
