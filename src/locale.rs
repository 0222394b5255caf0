//! Locale identifiers and fallback resolution

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BarberError;

/// A language with optional region and variant (e.g. `en`, `en-US`, `en-US-POSIX`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    /// ISO 639 language code, lower-cased
    pub language: String,
    /// ISO 3166 region code, upper-cased
    pub region: Option<String>,
    pub variant: Option<String>,
}

impl Locale {
    pub const EN_US: &'static str = "en-US";
    pub const EN_CA: &'static str = "en-CA";
    pub const EN_GB: &'static str = "en-GB";

    /// Create a language-only locale
    pub fn new(language: impl AsRef<str>) -> Self {
        Self {
            language: language.as_ref().to_ascii_lowercase(),
            region: None,
            variant: None,
        }
    }

    /// Create a locale with a region
    pub fn with_region(language: impl AsRef<str>, region: impl AsRef<str>) -> Self {
        Self {
            region: Some(region.as_ref().to_ascii_uppercase()),
            ..Self::new(language)
        }
    }

    /// Parse a locale tag, accepting `-` or `_` as separator
    pub fn parse(tag: &str) -> Result<Self, BarberError> {
        let mut parts = tag.trim().split(['-', '_']);

        let language = match parts.next() {
            Some(lang) if is_subtag(lang) => lang.to_ascii_lowercase(),
            _ => return Err(BarberError::InvalidLocale(tag.to_string())),
        };

        let region = match parts.next() {
            Some(region) if is_subtag(region) => Some(region.to_ascii_uppercase()),
            Some(_) => return Err(BarberError::InvalidLocale(tag.to_string())),
            None => None,
        };

        let rest: Vec<&str> = parts.collect();
        let variant = if rest.is_empty() {
            None
        } else if rest.iter().all(|s| is_subtag(s)) {
            Some(rest.join("-"))
        } else {
            return Err(BarberError::InvalidLocale(tag.to_string()));
        };

        Ok(Self {
            language,
            region,
            variant,
        })
    }

    /// The language-only form of this locale
    pub fn language_only(&self) -> Self {
        Self::new(&self.language)
    }

    pub fn is_language_only(&self) -> bool {
        self.region.is_none() && self.variant.is_none()
    }

    /// Lookup order for this locale: exact, then language-only, then `default`.
    /// Duplicates are removed, keeping the first occurrence.
    pub fn fallback_chain(&self, default: &Locale) -> Vec<Locale> {
        let mut chain = vec![self.clone()];
        for candidate in [self.language_only(), default.clone()] {
            if !chain.contains(&candidate) {
                chain.push(candidate);
            }
        }
        chain
    }
}

fn is_subtag(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

impl Default for Locale {
    fn default() -> Self {
        Self::with_region("en", "US")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.language)?;
        if let Some(region) = &self.region {
            write!(f, "-{}", region)?;
        }
        if let Some(variant) = &self.variant {
            write!(f, "-{}", variant)?;
        }
        Ok(())
    }
}

impl FromStr for Locale {
    type Err = BarberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = BarberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parsing() {
        let l = Locale::parse("en-US").unwrap();
        assert_eq!(l.language, "en");
        assert_eq!(l.region.as_deref(), Some("US"));
        assert_eq!(l.variant, None);
        assert_eq!(l.to_string(), "en-US");
    }

    #[test]
    fn test_locale_with_underscore_and_case() {
        let l = Locale::parse("EN_gb").unwrap();
        assert_eq!(l, Locale::with_region("en", "GB"));
    }

    #[test]
    fn test_locale_with_variant() {
        let l = Locale::parse("en-US-POSIX").unwrap();
        assert_eq!(l.variant.as_deref(), Some("POSIX"));
        assert_eq!(l.to_string(), "en-US-POSIX");
    }

    #[test]
    fn test_invalid_locales() {
        assert!(Locale::parse("").is_err());
        assert!(Locale::parse("en--US").is_err());
        assert!(Locale::parse("en-U S").is_err());
    }

    #[test]
    fn test_fallback_chain() {
        let requested = Locale::parse("fr-CA").unwrap();
        let chain = requested.fallback_chain(&Locale::default());
        assert_eq!(
            chain,
            vec![Locale::with_region("fr", "CA"), Locale::new("fr"), Locale::default()]
        );
    }

    #[test]
    fn test_fallback_chain_dedups() {
        let chain = Locale::new("en").fallback_chain(&Locale::new("en"));
        assert_eq!(chain, vec![Locale::new("en")]);
    }

    #[test]
    fn test_serde_as_string() {
        let l: Locale = serde_json::from_str("\"en_CA\"").unwrap();
        assert_eq!(serde_json::to_string(&l).unwrap(), "\"en-CA\"");
    }
}
