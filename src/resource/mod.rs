//! Phonetic resources
//!
//! Allophone sets are expensive to parse and shared by every voice of a
//! language, so they are loaded once per identifier and cached for the
//! life of the process.

pub mod allophones;
pub mod cache;
pub mod resolver;

pub use allophones::{Allophone, AllophoneSet, JsonAllophoneParser, ResourceParser};
pub use cache::ResourceCache;
pub use resolver::{ResourceResolver, RESOURCE_SET_SUFFIX};
