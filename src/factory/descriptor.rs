//! Component descriptors
//!
//! A descriptor names a type and optionally its constructor arguments:
//!
//! - `vocalrt.memory.SystemMemory`
//! - `vocalrt.memory.FixedMemory(250000000)`
//! - `vocalrt.memory.FixedMemory($runtime.memorybytes)`
//!
//! An argument starting with `$` is replaced by the value of the named
//! configuration property.

use crate::config::PropertySource;
use crate::{Error, Result};

/// Marks an argument as a reference to a configuration property
pub const PROPERTY_SENTINEL: char = '$';

/// A parsed, not yet resolved, descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub type_name: String,
    /// None without parentheses; `Some(vec![])` for `Type()`
    pub raw_args: Option<Vec<String>>,
}

impl ObjectDescriptor {
    /// Split a descriptor into type name and raw arguments
    ///
    /// The argument list runs from the first `(` to the last `)`.
    pub fn parse(text: &str) -> Result<Self> {
        let (type_name, raw_args) = match text.find('(') {
            Some(open) => {
                let close = text
                    .rfind(')')
                    .filter(|&close| close > open)
                    .ok_or_else(|| Error::Parse("missing closing parenthesis".to_string()))?;
                let inner = &text[open + 1..close];
                let mut args: Vec<String> = if inner.trim().is_empty() {
                    Vec::new()
                } else {
                    inner.split(',').map(str::to_string).collect()
                };
                // Trailing empty pieces are not arguments: `T(a,,)` takes one
                while args.last().is_some_and(|a| a.is_empty()) {
                    args.pop();
                }
                (&text[..open], Some(args))
            }
            None => (text, None),
        };

        let type_name = type_name.trim();
        if type_name.is_empty() {
            return Err(Error::Parse("missing type name".to_string()));
        }

        Ok(Self {
            type_name: type_name.to_string(),
            raw_args,
        })
    }

    /// Substitute property references and trim every argument
    pub fn resolve_args(&self, properties: &dyn PropertySource) -> Result<Option<Vec<String>>> {
        let Some(raw) = &self.raw_args else {
            return Ok(None);
        };
        raw.iter()
            .map(|arg| match arg.strip_prefix(PROPERTY_SENTINEL) {
                Some(name) => properties
                    .get_property(name)
                    .map(|value| value.trim().to_string())
                    .ok_or_else(|| Error::Config(format!("No such property: {}", name))),
                None => Ok(arg.trim().to_string()),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}
