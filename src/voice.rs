//! Voices and the documents that select them
//!
//! Voice lifecycle belongs to the synthesis layer; this module only needs
//! to look voices up and ask them for their allophone set.

use crate::locale::Locale;
use crate::resource::AllophoneSet;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// A synthesis voice
pub trait Voice: Send + Sync {
    fn name(&self) -> &str;

    fn locale(&self) -> &Locale;

    /// The allophone set this voice was built with, if any
    fn own_resource(&self) -> Option<Arc<AllophoneSet>>;
}

/// The attributes of a voice-selection element in a document
///
/// e.g. `<voice name="cmu-slt" gender="female">`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceScope {
    attributes: BTreeMap<String, String>,
}

impl VoiceScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope that selects a voice by name
    pub fn named(name: &str) -> Self {
        Self::new().with("name", name)
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A position inside a structured document
pub trait DocumentContext {
    /// Nearest enclosing voice-selection element, if any
    fn enclosing_voice(&self) -> Option<VoiceScope>;

    /// Language declared on the document root (e.g. `xml:lang="en-US"`)
    fn document_language(&self) -> Option<String>;
}

/// Finds voices for documents and locales
pub trait VoiceRegistry: Send + Sync {
    /// The voice a voice-selection element refers to
    fn voice_at(&self, scope: &VoiceScope) -> Option<Arc<dyn Voice>>;

    /// The default voice for a locale
    fn default_voice_for(&self, locale: &Locale) -> Option<Arc<dyn Voice>>;
}

/// A voice with a fixed name, locale and optional allophone set
pub struct SimpleVoice {
    name: String,
    locale: Locale,
    resource: Option<Arc<AllophoneSet>>,
}

impl SimpleVoice {
    pub fn new(name: &str, locale: Locale, resource: Option<Arc<AllophoneSet>>) -> Self {
        Self {
            name: name.to_string(),
            locale,
            resource,
        }
    }
}

impl Voice for SimpleVoice {
    fn name(&self) -> &str {
        &self.name
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn own_resource(&self) -> Option<Arc<AllophoneSet>> {
        self.resource.clone()
    }
}

/// In-memory voice registry
///
/// Voices are found by the scope's `name` attribute (case-insensitive).
/// The first voice registered for a locale is its default unless another
/// one is registered with `make_default`. A locale with a country falls
/// back to the language's default.
#[derive(Default)]
pub struct VoiceTable {
    by_name: RwLock<HashMap<String, Arc<dyn Voice>>>,
    defaults: RwLock<HashMap<Locale, Arc<dyn Voice>>>,
}

impl VoiceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, voice: Arc<dyn Voice>, make_default: bool) {
        debug!("Registering voice {} ({})", voice.name(), voice.locale());
        let locale = voice.locale().clone();
        {
            let mut defaults = self.defaults.write().unwrap_or_else(|e| e.into_inner());
            if make_default || !defaults.contains_key(&locale) {
                defaults.insert(locale, Arc::clone(&voice));
            }
        }
        self.by_name
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(voice.name().to_lowercase(), voice);
    }

    pub fn len(&self) -> usize {
        self.by_name.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VoiceRegistry for VoiceTable {
    fn voice_at(&self, scope: &VoiceScope) -> Option<Arc<dyn Voice>> {
        let name = scope.get("name")?.trim().to_lowercase();
        let by_name = self.by_name.read().unwrap_or_else(|e| e.into_inner());
        by_name.get(&name).cloned()
    }

    fn default_voice_for(&self, locale: &Locale) -> Option<Arc<dyn Voice>> {
        let defaults = self.defaults.read().unwrap_or_else(|e| e.into_inner());
        defaults
            .get(locale)
            .or_else(|| defaults.get(&locale.language_only()))
            .cloned()
    }
}
