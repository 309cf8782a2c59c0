// ── Dial code domain type ──
//
// A catalog entry pairing a country with its international calling code.
// Values are immutable once built; the catalog only ever appends them.

use serde::{Deserialize, Serialize};

use crate::phone::normalize_prefix;

const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;
const NO_PREFIX_EMOJI: &str = "\u{1F310}";
const NO_PREFIX_LABEL: &str = "No prefix";

/// One entry of the dial-code catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialCode {
    short_code: String,
    country: String,
    flag_emoji: String,
    normalized_prefix: String,
}

impl DialCode {
    /// Build a seeded country entry. The flag is derived from `iso2`.
    pub fn country(iso2: &str, country: &str, prefix: &str) -> Self {
        Self {
            short_code: iso2.trim().to_uppercase(),
            country: country.to_owned(),
            flag_emoji: flag_emoji(iso2),
            normalized_prefix: normalize_prefix(prefix),
        }
    }

    /// The catalog's "no prefix" entry.
    pub fn no_prefix() -> Self {
        Self {
            short_code: String::new(),
            country: NO_PREFIX_LABEL.to_owned(),
            flag_emoji: NO_PREFIX_EMOJI.to_owned(),
            normalized_prefix: String::new(),
        }
    }

    /// Synthesize an entry for a prefix that no seeded country claims.
    pub fn custom(prefix: &str) -> Self {
        let normalized_prefix = normalize_prefix(prefix);
        Self {
            short_code: String::new(),
            country: format!("Prefix {normalized_prefix}"),
            flag_emoji: String::new(),
            normalized_prefix,
        }
    }

    pub fn short_code(&self) -> &str {
        &self.short_code
    }

    pub fn country_name(&self) -> &str {
        &self.country
    }

    pub fn flag_emoji(&self) -> &str {
        &self.flag_emoji
    }

    pub fn normalized_prefix(&self) -> &str {
        &self.normalized_prefix
    }

    pub fn has_prefix(&self) -> bool {
        !self.normalized_prefix.is_empty()
    }

    /// Label shown in pickers: flag, short code and prefix, each part
    /// dropped when absent. Falls back to the country name.
    pub fn picker_display(&self) -> String {
        let base = match (self.short_code.is_empty(), self.normalized_prefix.is_empty()) {
            (true, true) => self.country.clone(),
            (true, false) => self.normalized_prefix.clone(),
            (false, true) => self.short_code.clone(),
            (false, false) => format!("{} {}", self.short_code, self.normalized_prefix),
        };
        let base = if base.trim().is_empty() {
            self.country.clone()
        } else {
            base
        };

        if self.flag_emoji.is_empty() {
            base
        } else {
            format!("{} {base}", self.flag_emoji)
        }
    }

    /// Lowercase haystack used by catalog search.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.country, self.short_code, self.normalized_prefix
        )
        .to_lowercase()
    }
}

/// Compose the two regional-indicator symbols for an ISO alpha-2 code.
/// Anything other than exactly two ASCII letters yields an empty string.
fn flag_emoji(iso2: &str) -> String {
    let code = iso2.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return String::new();
    }

    code.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter_map(|c| char::from_u32(REGIONAL_INDICATOR_A + (u32::from(c) - u32::from('A'))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_entry_derives_flag_and_prefix() {
        let pt = DialCode::country("pt", "Portugal", "00351");
        assert_eq!(pt.short_code(), "PT");
        assert_eq!(pt.flag_emoji(), "\u{1F1F5}\u{1F1F9}");
        assert_eq!(pt.normalized_prefix(), "+351");
        assert_eq!(pt.picker_display(), "\u{1F1F5}\u{1F1F9} PT +351");
    }

    #[test]
    fn flag_requires_two_letters() {
        assert_eq!(DialCode::country("", "Nowhere", "+1").flag_emoji(), "");
        assert_eq!(DialCode::country("P1", "Nowhere", "+1").flag_emoji(), "");
        assert_eq!(DialCode::country("PRT", "Portugal", "+351").flag_emoji(), "");
    }

    #[test]
    fn custom_entry_is_labelled_from_prefix() {
        let custom = DialCode::custom("00999");
        assert_eq!(custom.normalized_prefix(), "+999");
        assert_eq!(custom.country_name(), "Prefix +999");
        assert_eq!(custom.picker_display(), "+999");
    }

    #[test]
    fn no_prefix_entry_shows_country_label() {
        let none = DialCode::no_prefix();
        assert!(!none.has_prefix());
        assert_eq!(none.picker_display(), "\u{1F310} No prefix");
    }

    #[test]
    fn search_text_is_lowercase() {
        let es = DialCode::country("ES", "Spain", "+34");
        assert_eq!(es.search_text(), "spain es +34");
    }
}
