//! Allophone set resolution tests
//!
//! Exercises the voice -> default voice -> locale property chain and the
//! load-once behaviour of the resource cache against real files.

use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vocalrt::config::{Config, PropertySource};
use vocalrt::locale::Locale;
use vocalrt::resource::{
    AllophoneSet, JsonAllophoneParser, ResourceCache, ResourceParser, ResourceResolver,
};
use vocalrt::voice::{DocumentContext, SimpleVoice, Voice, VoiceScope, VoiceTable};
use vocalrt::{Error, Result};

fn data(name: &str) -> String {
    format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Config wrapper that counts opened streams
struct CountingStore {
    inner: Config,
    opens: AtomicUsize,
}

impl PropertySource for CountingStore {
    fn get_property(&self, name: &str) -> Option<String> {
        self.inner.get_property(name)
    }

    fn open_stream(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.inner.open_stream(name)
    }

    fn locale_prefix(&self, locale: &Locale) -> Option<String> {
        self.inner.locale_prefix(locale)
    }
}

fn store() -> Arc<CountingStore> {
    let text = format!(
        "en_US.resourceset = {en}\n\
         en_GB.resourceset = {en}\n\
         de.resourceset = {de}\n\
         fr.resourceset = {broken}\n\
         it.resourceset = /nonexistent/it.json\n\
         \n\
         [locales]\n\
         en_US = en_US\n\
         en_GB = en_GB\n\
         de = de\n\
         fr = fr\n\
         it = it\n\
         es = es\n",
        en = data("en_US.json"),
        de = data("de.json"),
        broken = data("broken.json"),
    );
    Arc::new(CountingStore {
        inner: Config::from_ini_str(&text).unwrap(),
        opens: AtomicUsize::new(0),
    })
}

fn resolver<'c>(
    store: &Arc<CountingStore>,
    voices: Arc<VoiceTable>,
    cache: &'c ResourceCache,
) -> ResourceResolver<'c> {
    let properties: Arc<dyn PropertySource> = store.clone();
    ResourceResolver::with_cache(properties, voices, Arc::new(JsonAllophoneParser), cache)
}

fn load_file(name: &str) -> Arc<AllophoneSet> {
    let mut file = std::fs::File::open(data(name)).unwrap();
    Arc::new(JsonAllophoneParser.parse(&mut file, name).unwrap())
}

struct Doc {
    voice: Option<VoiceScope>,
    lang: Option<&'static str>,
}

impl DocumentContext for Doc {
    fn enclosing_voice(&self) -> Option<VoiceScope> {
        self.voice.clone()
    }

    fn document_language(&self) -> Option<String> {
        self.lang.map(str::to_string)
    }
}

#[test]
fn test_load_required_caches_by_identifier() {
    let store = store();
    let cache = ResourceCache::new();
    let resolver = resolver(&store, Arc::new(VoiceTable::new()), &cache);

    let first = resolver.load_required("en_US.resourceset").unwrap();
    let second = resolver.load_required("en_US.resourceset").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.opens.load(Ordering::SeqCst), 1);
    assert_eq!(first.name(), "en_US");
    assert_eq!(first.identifier(), data("en_US.json"));
}

#[test]
fn test_same_identifier_from_two_properties_is_shared() {
    let store = store();
    let cache = ResourceCache::new();
    let resolver = resolver(&store, Arc::new(VoiceTable::new()), &cache);

    let us = resolver
        .resolve_for_locale(&Locale::parse("en-US").unwrap())
        .unwrap()
        .unwrap();
    let gb = resolver
        .resolve_for_locale(&Locale::parse("en-GB").unwrap())
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&us, &gb));
    assert_eq!(store.opens.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_load_required_errors() {
    let store = store();
    let cache = ResourceCache::new();
    let resolver = resolver(&store, Arc::new(VoiceTable::new()), &cache);

    let err = resolver.load_required("xx.resourceset").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("No such property: xx.resourceset"));

    let err = resolver.load_required("it.resourceset").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err
        .to_string()
        .contains("Cannot open resource stream for property it.resourceset"));

    let err = resolver.load_required("fr.resourceset").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("Cannot load resource"), "{}", text);
    assert!(text.contains("no silence symbol"), "{}", text);
    assert!(cache.is_empty());
}

#[test]
fn test_resolve_for_locale() {
    let store = store();
    let cache = ResourceCache::new();
    let resolver = resolver(&store, Arc::new(VoiceTable::new()), &cache);

    // de_AT has no prefix of its own and falls back to the language
    let de = resolver
        .resolve_for_locale(&Locale::parse("de_AT").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(de.name(), "de");
    assert!(de.contains("a:"));

    // No prefix registered: nothing applies
    let pt = resolver.resolve_for_locale(&Locale::parse("pt").unwrap());
    assert!(pt.unwrap().is_none());

    // Prefix registered but no resource property: that's a configuration error
    assert!(resolver
        .resolve_for_locale(&Locale::parse("es").unwrap())
        .is_err());
}

#[test]
fn test_context_precedence() {
    let store = store();
    let cache = ResourceCache::new();
    let scoped_set = load_file("de.json");
    let default_set = load_file("en_US.json");

    let voices = Arc::new(VoiceTable::new());
    let en_us = Locale::parse("en_US").unwrap();
    let scoped: Arc<dyn Voice> = Arc::new(SimpleVoice::new(
        "slt",
        en_us.clone(),
        Some(scoped_set.clone()),
    ));
    let fallback: Arc<dyn Voice> =
        Arc::new(SimpleVoice::new("kal", en_us, Some(default_set.clone())));
    voices.register(fallback, true);
    voices.register(scoped, false);
    let resolver = resolver(&store, voices, &cache);

    // A voice selected around the position wins
    let doc = Doc {
        voice: Some(VoiceScope::named("slt")),
        lang: Some("en-US"),
    };
    let set = resolver.resolve_for_context(&doc).unwrap().unwrap();
    assert!(Arc::ptr_eq(&set, &scoped_set));

    // Unknown voice: the language's default voice answers
    let doc = Doc {
        voice: Some(VoiceScope::named("nobody")),
        lang: Some("en-US"),
    };
    let set = resolver.resolve_for_context(&doc).unwrap().unwrap();
    assert!(Arc::ptr_eq(&set, &default_set));

    // No voice markup at all: same default voice
    let doc = Doc {
        voice: None,
        lang: Some("en_US"),
    };
    let set = resolver.resolve_for_context(&doc).unwrap().unwrap();
    assert!(Arc::ptr_eq(&set, &default_set));

    // The voices carry their own sets, so configuration was never consulted
    assert_eq!(store.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn test_context_falls_back_to_locale_property() {
    let store = store();
    let cache = ResourceCache::new();
    let resolver = resolver(&store, Arc::new(VoiceTable::new()), &cache);

    let doc = Doc {
        voice: Some(VoiceScope::named("slt")),
        lang: Some("de"),
    };
    let set = resolver.resolve_for_context(&doc).unwrap().unwrap();
    assert_eq!(set.name(), "de");
    assert_eq!(store.opens.load(Ordering::SeqCst), 1);
}

#[test]
fn test_context_without_any_source_is_none() {
    let store = store();
    let cache = ResourceCache::new();
    let resolver = resolver(&store, Arc::new(VoiceTable::new()), &cache);

    let no_lang = Doc {
        voice: None,
        lang: None,
    };
    assert!(resolver.resolve_for_context(&no_lang).unwrap().is_none());

    let unknown = Doc {
        voice: None,
        lang: Some("pt-BR"),
    };
    assert!(resolver.resolve_for_context(&unknown).unwrap().is_none());

    let garbage = Doc {
        voice: None,
        lang: Some(""),
    };
    assert!(resolver.resolve_for_context(&garbage).unwrap().is_none());
}

#[test]
fn test_voice_without_resource_is_final() {
    let store = store();
    let cache = ResourceCache::new();
    let voices = Arc::new(VoiceTable::new());
    voices.register(
        Arc::new(SimpleVoice::new("bare", Locale::parse("de").unwrap(), None)),
        true,
    );
    let resolver = resolver(&store, voices, &cache);

    // The default voice for de has no set; the locale property is not tried
    let doc = Doc {
        voice: None,
        lang: Some("de"),
    };
    assert!(resolver.resolve_for_context(&doc).unwrap().is_none());
    assert_eq!(store.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn test_global_cache_resolver() {
    let properties: Arc<dyn PropertySource> = store();
    let resolver = ResourceResolver::new(
        properties,
        Arc::new(VoiceTable::new()),
        Arc::new(JsonAllophoneParser),
    );
    let set = resolver.load_required("de.resourceset").unwrap();
    assert!(Arc::ptr_eq(
        &set,
        &ResourceCache::global().get(&data("de.json")).unwrap()
    ));
}
