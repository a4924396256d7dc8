//! Allophone sets: the phonetic inventory of a language
//!
//! An allophone set is loaded from a JSON document:
//!
//! ```json
//! {
//!   "name": "en_US",
//!   "locale": "en_US",
//!   "ignore_chars": ",.",
//!   "allophones": [
//!     { "ph": "_", "vc": "0" },
//!     { "ph": "A", "vc": "+", "features": { "vlng": "l" } }
//!   ]
//! }
//! ```
//!
//! `vc` is `+` for vowels, `-` for consonants and `0` for the silence symbol.

use crate::locale::Locale;
use crate::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

/// One phone symbol and its phonological features
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Allophone {
    /// Phone symbol
    pub ph: String,
    /// Vowel/consonant marker
    #[serde(default)]
    pub vc: Option<String>,
    #[serde(default)]
    pub features: HashMap<String, String>,
}

impl Allophone {
    pub fn is_vowel(&self) -> bool {
        self.vc.as_deref() == Some("+")
    }

    pub fn is_pause(&self) -> bool {
        self.vc.as_deref() == Some("0")
    }

    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features.get(name).map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct AllophoneSetDocument {
    name: String,
    locale: String,
    #[serde(default)]
    ignore_chars: String,
    allophones: Vec<Allophone>,
}

/// A loaded phonetic resource
#[derive(Debug)]
pub struct AllophoneSet {
    identifier: String,
    name: String,
    locale: Locale,
    ignore_chars: String,
    allophones: HashMap<String, Allophone>,
    silence: String,
    /// Longest symbol length in chars, for segmentation
    max_symbol_len: usize,
}

impl AllophoneSet {
    /// Identifier this set was loaded under
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Characters that carry no phonetic content (e.g. syllable punctuation)
    pub fn ignore_chars(&self) -> &str {
        &self.ignore_chars
    }

    pub fn allophone(&self, ph: &str) -> Option<&Allophone> {
        self.allophones.get(ph)
    }

    pub fn contains(&self, ph: &str) -> bool {
        self.allophones.contains_key(ph)
    }

    /// The silence allophone
    pub fn silence(&self) -> &Allophone {
        &self.allophones[&self.silence]
    }

    pub fn len(&self) -> usize {
        self.allophones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allophones.is_empty()
    }

    /// Split a phone string into allophone symbols by longest match
    ///
    /// Whitespace and ignore characters are skipped.
    pub fn split_into_allophones(&self, phones: &str) -> Result<Vec<String>> {
        let chars: Vec<char> = phones.chars().collect();
        let mut out = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i].is_whitespace() || self.ignore_chars.contains(chars[i]) {
                i += 1;
                continue;
            }
            let longest = (1..=self.max_symbol_len.min(chars.len() - i))
                .rev()
                .map(|n| chars[i..i + n].iter().collect::<String>())
                .find(|candidate| self.contains(candidate));
            match longest {
                Some(symbol) => {
                    i += symbol.chars().count();
                    out.push(symbol);
                }
                None => {
                    return Err(Error::Parse(format!(
                        "'{}' in '{}' is not an allophone of {}",
                        chars[i], phones, self.name
                    )))
                }
            }
        }

        Ok(out)
    }
}

/// Turns a data stream into an allophone set
pub trait ResourceParser: Send + Sync {
    fn parse(&self, reader: &mut dyn Read, identifier: &str) -> Result<AllophoneSet>;
}

/// Parses the JSON allophone set format
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonAllophoneParser;

impl ResourceParser for JsonAllophoneParser {
    fn parse(&self, reader: &mut dyn Read, identifier: &str) -> Result<AllophoneSet> {
        let doc: AllophoneSetDocument = serde_json::from_reader(reader)?;

        let locale = Locale::parse(&doc.locale).ok_or_else(|| {
            Error::Parse(format!("Invalid locale '{}' in allophone set {}", doc.locale, doc.name))
        })?;

        let mut allophones = HashMap::with_capacity(doc.allophones.len());
        let mut silence = None;
        for allophone in doc.allophones {
            if allophone.ph.is_empty() {
                return Err(Error::Parse(format!("Empty allophone symbol in {}", doc.name)));
            }
            if allophone.is_pause() {
                silence = Some(allophone.ph.clone());
            }
            if let Some(previous) = allophones.insert(allophone.ph.clone(), allophone) {
                return Err(Error::Parse(format!(
                    "Allophone '{}' defined twice in {}",
                    previous.ph, doc.name
                )));
            }
        }

        let silence = silence.ok_or_else(|| {
            Error::Parse(format!("Allophone set {} has no silence symbol", doc.name))
        })?;
        let max_symbol_len = allophones
            .keys()
            .map(|k| k.chars().count())
            .max()
            .unwrap_or(1);

        debug!(
            "Parsed allophone set {} ({}) with {} allophones",
            doc.name,
            identifier,
            allophones.len()
        );

        Ok(AllophoneSet {
            identifier: identifier.to_string(),
            name: doc.name,
            locale,
            ignore_chars: doc.ignore_chars,
            allophones,
            silence,
            max_symbol_len,
        })
    }
}
