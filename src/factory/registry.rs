//! Constructing components by name

use super::descriptor::ObjectDescriptor;
use crate::config::PropertySource;
use crate::error::first_meaningful_message;
use crate::memory::{FixedMemory, MemoryProbe, SystemMemory};
use crate::resource::{JsonAllophoneParser, ResourceParser};
use crate::{Error, Result};
use log::{debug, warn};
use std::collections::HashMap;

/// Builds a component from its resolved string arguments
pub type Constructor<T> = Box<dyn Fn(&[String]) -> Result<Box<T>> + Send + Sync>;

/// Named constructors for components of type `T`
///
/// Each type name may have one constructor per argument count. All
/// arguments are strings; a constructor parses them itself if it needs
/// numbers or flags.
pub struct ComponentRegistry<T: ?Sized> {
    types: HashMap<String, HashMap<usize, Constructor<T>>>,
}

impl<T: ?Sized> ComponentRegistry<T> {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register the constructor taking `arity` string arguments
    ///
    /// Replaces any constructor previously registered for the same name
    /// and arity.
    pub fn register<F>(&mut self, type_name: &str, arity: usize, constructor: F) -> &mut Self
    where
        F: Fn(&[String]) -> Result<Box<T>> + Send + Sync + 'static,
    {
        self.types
            .entry(type_name.to_string())
            .or_default()
            .insert(arity, Box::new(constructor));
        self
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the component a descriptor describes
    ///
    /// Every failure is reported as a configuration error naming the
    /// descriptor, and nothing is returned.
    pub fn instantiate(&self, descriptor: &str, properties: &dyn PropertySource) -> Result<Box<T>> {
        self.build(descriptor, properties).map_err(|e| {
            let message = first_meaningful_message(&e);
            warn!("Cannot instantiate '{}': {}", descriptor, message);
            Error::Config(format!(
                "Cannot instantiate object from '{}': {}",
                descriptor, message
            ))
        })
    }

    fn build(&self, descriptor: &str, properties: &dyn PropertySource) -> Result<Box<T>> {
        let parsed = ObjectDescriptor::parse(descriptor)?;
        let args = parsed.resolve_args(properties)?.unwrap_or_default();

        let constructors = self
            .types
            .get(&parsed.type_name)
            .ok_or_else(|| Error::NotFound(format!("Unknown type: {}", parsed.type_name)))?;
        let constructor = constructors.get(&args.len()).ok_or_else(|| {
            Error::NotFound(format!(
                "{} has no constructor taking {} string argument(s)",
                parsed.type_name,
                args.len()
            ))
        })?;

        debug!("Instantiating {} with {:?}", parsed.type_name, args);
        constructor(&args)
    }
}

impl<T: ?Sized> Default for ComponentRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry<dyn MemoryProbe> {
    /// Registry knowing the crate's memory probes
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("vocalrt.memory.SystemMemory", 0, |_| {
                let probe: Box<dyn MemoryProbe> = Box::new(SystemMemory);
                Ok(probe)
            })
            .register("vocalrt.memory.FixedMemory", 1, |args| {
                let probe: Box<dyn MemoryProbe> = Box::new(FixedMemory::from_arg(&args[0])?);
                Ok(probe)
            });
        registry
    }
}

impl ComponentRegistry<dyn ResourceParser> {
    /// Registry knowing the crate's resource parsers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("vocalrt.resource.JsonAllophoneParser", 0, |_| {
            let parser: Box<dyn ResourceParser> = Box::new(JsonAllophoneParser);
            Ok(parser)
        });
        registry
    }
}
