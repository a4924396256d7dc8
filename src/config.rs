//! Configuration management
//!
//! Properties live in an INI file. A property name like `en_US.resourceset`
//! can be written either flat in the general section or as
//! `[en_US] resourceset = ...`; lookups try the flat key first.

use crate::locale::Locale;
use crate::{Error, Result};
use ini::Ini;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Section mapping locale tags to property prefixes
const LOCALES_SECTION: &str = "locales";

/// Read access to the configuration store
///
/// Everything that consumes configuration goes through this trait so tests
/// and embedders can substitute their own store.
pub trait PropertySource: Send + Sync {
    /// Raw value of a property, if set
    fn get_property(&self, name: &str) -> Option<String>;

    /// Integer value of a property, or `default` when unset or unparsable
    fn get_integer(&self, name: &str, default: i64) -> i64 {
        self.get_property(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Open the data stream the property's value refers to
    ///
    /// Fails with `Error::NotFound` when the property is unset and with
    /// `Error::Io` when the referenced data cannot be opened.
    fn open_stream(&self, name: &str) -> Result<Box<dyn Read + Send>>;

    /// Configuration namespace registered for a locale
    fn locale_prefix(&self, locale: &Locale) -> Option<String>;
}

/// INI-backed configuration store
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.vocalrt.cfg unless given explicitly)
    path: PathBuf,

    /// Serializes system startup; see `startup::ensure_started`
    startup_lock: Mutex<()>,
}

impl Config {
    /// Load configuration from the default location, or start empty
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            info!("Config file {:?} not found, using defaults", path);
            Ok(Self::from_ini(Ini::new(), path))
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let ini = Ini::load_from_file(path)
            .map_err(|e| Error::IniParse(format!("Failed to load config {}: {}", path.display(), e)))?;
        Ok(Self::from_ini(ini, path.to_path_buf()))
    }

    /// Parse configuration from a string
    ///
    /// Relative stream paths resolve against the current directory.
    pub fn from_ini_str(text: &str) -> Result<Self> {
        let ini = Ini::load_from_str(text)
            .map_err(|e| Error::IniParse(format!("Failed to parse config: {}", e)))?;
        Ok(Self::from_ini(ini, PathBuf::from("vocalrt.cfg")))
    }

    fn from_ini(ini: Ini, path: PathBuf) -> Self {
        Self {
            ini,
            path,
            startup_lock: Mutex::new(()),
        }
    }

    /// Get config file path (~/.vocalrt.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vocalrt.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that relative resource paths resolve against
    pub fn base_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Set a property in the general section
    pub fn set(&mut self, name: &str, value: &str) {
        self.ini.with_general_section().set(name, value);
    }

    /// Set a value in a named section
    pub fn set_in(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Get a string value, falling back to `default`
    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.get_property(name).unwrap_or_else(|| default.to_string())
    }

    /// Lock taken while the surrounding system is started
    pub fn startup_lock(&self) -> &Mutex<()> {
        &self.startup_lock
    }

    fn resolve_path(&self, value: &str) -> PathBuf {
        let candidate = PathBuf::from(value);
        if candidate.is_absolute() {
            candidate
        } else {
            self.base_dir().join(candidate)
        }
    }
}

impl PropertySource for Config {
    fn get_property(&self, name: &str) -> Option<String> {
        if let Some(v) = self.ini.get_from(None::<String>, name) {
            return Some(v.to_string());
        }
        let (section, key) = name.rsplit_once('.')?;
        self.ini.get_from(Some(section), key).map(str::to_string)
    }

    fn open_stream(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        let value = self
            .get_property(name)
            .ok_or_else(|| Error::NotFound(format!("No such property: {}", name)))?;
        let path = self.resolve_path(value.trim());
        debug!("Opening stream for {} at {:?}", name, path);
        let file = File::open(&path).map_err(|e| {
            std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
        })?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn locale_prefix(&self, locale: &Locale) -> Option<String> {
        let full = locale.to_string();
        self.ini
            .get_from(Some(LOCALES_SECTION), &full)
            .or_else(|| {
                self.ini
                    .get_from(Some(LOCALES_SECTION), locale.language())
            })
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
    }
}
