//! Language/region tags
//!
//! Documents declare their language as `en-US`, `en_US` or just `en`.
//! Configuration is keyed by the underscore form.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{2,8})(?:[-_]([A-Za-z]{2}|[0-9]{3}))?(?:[-_]([A-Za-z0-9]{1,8}))?$")
        .expect("locale tag pattern is valid")
});

/// A parsed language tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    country: Option<String>,
    variant: Option<String>,
}

impl Locale {
    /// Parse a language tag; returns None for empty or malformed tags
    pub fn parse(tag: &str) -> Option<Self> {
        let caps = TAG.captures(tag.trim())?;
        Some(Self {
            language: caps[1].to_lowercase(),
            country: caps.get(2).map(|m| m.as_str().to_uppercase()),
            variant: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }

    /// Build a locale from its parts
    pub fn new(language: &str, country: Option<&str>) -> Self {
        Self {
            language: language.to_lowercase(),
            country: country.map(str::to_uppercase),
            variant: None,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// The same locale with country and variant dropped
    pub fn language_only(&self) -> Self {
        Self::new(&self.language, None)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.language)?;
        if let Some(country) = &self.country {
            write!(f, "_{}", country)?;
        }
        if let Some(variant) = &self.variant {
            write!(f, "_{}", variant)?;
        }
        Ok(())
    }
}
