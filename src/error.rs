//! Error types for vocalrt

use std::io;
use thiserror::Error;

/// Main error type for vocalrt
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed configuration, unloadable resource,
    /// or a descriptor that cannot be instantiated
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A property or resource that was asked for does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Startup error: {0}")]
    Startup(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for vocalrt operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The message without the category prefix added by `Display`
    pub fn message(&self) -> String {
        match self {
            Error::Config(m)
            | Error::NotFound(m)
            | Error::Parse(m)
            | Error::Startup(m)
            | Error::IniParse(m)
            | Error::Other(m) => m.clone(),
            Error::Io(e) => e.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(format!("JSON error: {}", e))
    }
}

/// Find the most specific non-empty message in an error's source chain
///
/// Wrapping errors often carry only a category ("I/O error: ..."), so the
/// innermost cause with text is what an operator wants to see. Falls back to
/// the top-level message when nothing in the chain has one.
pub fn first_meaningful_message(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    let mut deepest = None;

    while let Some(e) = current {
        let text = match e.downcast_ref::<Error>() {
            Some(own) => own.message(),
            None => e.to_string(),
        };
        if !text.trim().is_empty() {
            deepest = Some(text);
        }
        current = e.source();
    }

    deepest.unwrap_or_else(|| err.to_string())
}
