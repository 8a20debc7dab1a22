//! Site locales and bilingual values.
//!
//! The site is published in English and Arabic. Every user-facing text field
//! is stored as a [`Bilingual`] pair so both variants travel together.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A supported site locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    /// Every supported locale, in display order.
    pub const ALL: [Self; 2] = [Self::En, Self::Ar];

    /// Two-letter code, also used as the JSON key inside bilingual documents.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// Text direction for the `dir` HTML attribute.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::En => "ltr",
            Self::Ar => "rtl",
        }
    }

    /// The other locale of the pair.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::En => Self::Ar,
            Self::Ar => Self::En,
        }
    }

    /// Parse a locale code, accepting region subtags (`ar-SA`, `en_GB`).
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::En),
            "ar" => Some(Self::Ar),
            _ => None,
        }
    }

    /// Pick the best supported locale from an `Accept-Language` header.
    ///
    /// Entries are ranked by their `q` weight (default 1.0); ties keep header
    /// order. Entries with `q=0` are ignored.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut best: Option<(Self, f32)> = None;

        for entry in header.split(',') {
            let mut parts = entry.split(';');
            let Some(locale) = parts.next().and_then(Self::parse) else {
                continue;
            };
            let weight = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);

            if weight <= 0.0 {
                continue;
            }
            if best.is_none_or(|(_, w)| weight > w) {
                best = Some((locale, weight));
            }
        }

        best.map(|(locale, _)| locale)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unsupported locale: {s}"))
    }
}

/// A value carried in both site locales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Bilingual<T> {
    pub en: T,
    pub ar: T,
}

impl<T> Bilingual<T> {
    #[must_use]
    pub const fn new(en: T, ar: T) -> Self {
        Self { en, ar }
    }

    #[must_use]
    pub const fn get(&self, locale: Locale) -> &T {
        match locale {
            Locale::En => &self.en,
            Locale::Ar => &self.ar,
        }
    }

    pub const fn get_mut(&mut self, locale: Locale) -> &mut T {
        match locale {
            Locale::En => &mut self.en,
            Locale::Ar => &mut self.ar,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Bilingual<U> {
        Bilingual {
            en: f(self.en),
            ar: f(self.ar),
        }
    }
}

impl Bilingual<String> {
    /// Both variants are non-blank.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.en.trim().is_empty() && !self.ar.trim().is_empty()
    }

    /// The requested variant, or the other locale's text when it is blank.
    #[must_use]
    pub fn text(&self, locale: Locale) -> &str {
        let wanted = self.get(locale);
        if wanted.trim().is_empty() {
            self.get(locale.other())
        } else {
            wanted
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!(Locale::parse("en"), Some(Locale::En));
        assert_eq!(Locale::parse("AR"), Some(Locale::Ar));
        assert_eq!(Locale::parse("ar-SA"), Some(Locale::Ar));
        assert_eq!(Locale::parse("en_GB"), Some(Locale::En));
        assert_eq!(Locale::parse("fr"), None);
        assert_eq!(Locale::parse(""), None);
    }

    #[test]
    fn test_accept_language_prefers_weight() {
        assert_eq!(
            Locale::from_accept_language("en-US;q=0.5, ar;q=0.9"),
            Some(Locale::Ar)
        );
        assert_eq!(
            Locale::from_accept_language("fr-FR, ar-EG;q=0.7, en;q=0.6"),
            Some(Locale::Ar)
        );
        assert_eq!(Locale::from_accept_language("en, ar"), Some(Locale::En));
        assert_eq!(Locale::from_accept_language("de, fr;q=0.8"), None);
        assert_eq!(Locale::from_accept_language("ar;q=0, en;q=0.1"), Some(Locale::En));
    }

    #[test]
    fn test_direction() {
        assert_eq!(Locale::Ar.dir(), "rtl");
        assert_eq!(Locale::En.dir(), "ltr");
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Locale::Ar).unwrap(), "\"ar\"");
        let parsed: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Locale::En);
    }

    #[test]
    fn test_bilingual_text_falls_back_to_other_locale() {
        let title = Bilingual::new("Rules".to_string(), "  ".to_string());
        assert_eq!(title.text(Locale::Ar), "Rules");
        assert_eq!(title.text(Locale::En), "Rules");
        assert!(!title.is_complete());
    }
}
