//! Finding the allophone set that applies to a document or locale

use super::{AllophoneSet, ResourceCache, ResourceParser};
use crate::config::PropertySource;
use crate::locale::Locale;
use crate::voice::{DocumentContext, VoiceRegistry};
use crate::{Error, Result};
use log::debug;
use std::sync::Arc;

/// Suffix appended to a locale prefix to name its resource property
pub const RESOURCE_SET_SUFFIX: &str = "resourceset";

/// Resolves allophone sets through voices and locale configuration
///
/// `Ok(None)` means no set applies; errors mean one should apply but could
/// not be loaded.
pub struct ResourceResolver<'c> {
    properties: Arc<dyn PropertySource>,
    voices: Arc<dyn VoiceRegistry>,
    parser: Arc<dyn ResourceParser>,
    cache: &'c ResourceCache,
}

impl ResourceResolver<'static> {
    /// Resolver backed by the process-wide cache
    pub fn new(
        properties: Arc<dyn PropertySource>,
        voices: Arc<dyn VoiceRegistry>,
        parser: Arc<dyn ResourceParser>,
    ) -> Self {
        Self::with_cache(properties, voices, parser, ResourceCache::global())
    }
}

impl<'c> ResourceResolver<'c> {
    pub fn with_cache(
        properties: Arc<dyn PropertySource>,
        voices: Arc<dyn VoiceRegistry>,
        parser: Arc<dyn ResourceParser>,
        cache: &'c ResourceCache,
    ) -> Self {
        Self {
            properties,
            voices,
            parser,
            cache,
        }
    }

    /// The allophone set for a position in a document
    ///
    /// Tries the voice selected around the position, then the default voice
    /// of the document's language; a voice found either way answers with its
    /// own set. Without a voice, falls back to the language's configuration.
    pub fn resolve_for_context(
        &self,
        context: &dyn DocumentContext,
    ) -> Result<Option<Arc<AllophoneSet>>> {
        let mut voice = context
            .enclosing_voice()
            .and_then(|scope| self.voices.voice_at(&scope));

        if voice.is_none() {
            voice = document_locale(context).and_then(|l| self.voices.default_voice_for(&l));
        }

        if let Some(voice) = voice {
            debug!("Using allophone set of voice {}", voice.name());
            return Ok(voice.own_resource());
        }

        match document_locale(context) {
            Some(locale) => self.resolve_for_locale(&locale),
            None => Ok(None),
        }
    }

    /// The allophone set configured for a locale
    pub fn resolve_for_locale(&self, locale: &Locale) -> Result<Option<Arc<AllophoneSet>>> {
        let Some(prefix) = self.properties.locale_prefix(locale) else {
            debug!("No configuration prefix for locale {}", locale);
            return Ok(None);
        };
        let property = format!("{}.{}", prefix, RESOURCE_SET_SUFFIX);
        self.load_required(&property).map(Some)
    }

    /// The allophone set named by a property; never absent
    ///
    /// A set already cached under the property's value is returned without
    /// opening its data again.
    pub fn load_required(&self, property: &str) -> Result<Arc<AllophoneSet>> {
        let identifier = self
            .properties
            .get_property(property)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config(format!("No such property: {}", property)))?;

        if let Some(set) = self.cache.get(&identifier) {
            return Ok(set);
        }

        self.cache.get_or_load(&identifier, || {
            let mut stream = self.properties.open_stream(property).map_err(|e| {
                Error::Config(format!(
                    "Cannot open resource stream for property {}: {}",
                    property,
                    e.message()
                ))
            })?;
            self.parser.parse(&mut stream, &identifier).map_err(|e| {
                Error::Config(format!(
                    "Cannot load resource '{}' from property {}: {}",
                    identifier,
                    property,
                    e.message()
                ))
            })
        })
    }
}

fn document_locale(context: &dyn DocumentContext) -> Option<Locale> {
    context
        .document_language()
        .and_then(|tag| Locale::parse(&tag))
}
