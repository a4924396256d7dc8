//! Component factory
//!
//! Components are wired at startup from descriptors found in the
//! configuration, e.g. `runtime.memoryprobe = vocalrt.memory.FixedMemory(5000000)`.
//! Types are looked up in a registry of named constructors.

pub mod descriptor;
pub mod registry;

pub use descriptor::{ObjectDescriptor, PROPERTY_SENTINEL};
pub use registry::{ComponentRegistry, Constructor};
