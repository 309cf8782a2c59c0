// ── Phone canonicalization ──
//
// Pure functions that split a raw phone number into dial prefix and local
// body, and bring both halves into canonical form. None of them fail: bad
// input degrades to an empty prefix or body.

mod catalog;
mod seed;

use serde::{Deserialize, Serialize};

pub use catalog::{DEFAULT_COUNTRY, DialCodeCatalog};
pub use seed::{DIAL_CODE_SEED, SeedEntry, is_known_dial_code};

/// Maximum length of a canonical phone body, in characters.
pub const PHONE_BODY_MAX: usize = 20;

/// Length of a Portuguese national number, grouped 3-3-3 when matched.
const NATIONAL_NUMBER_LEN: usize = 9;

/// Longest dial code digit run considered when splitting.
pub const MAX_DIAL_DIGITS: usize = 4;

const INTERNATIONAL_ESCAPE: &str = "00";

/// Result of [`split_phone`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhoneSplit {
    /// Normalized dial prefix (`"+<digits>"`) or empty.
    pub prefix: String,
    /// Remainder of the input after the prefix, not yet normalized.
    pub body: String,
}

impl PhoneSplit {
    fn unprefixed(body: String) -> Self {
        Self {
            prefix: String::new(),
            body,
        }
    }
}

/// Canonicalize a dial prefix to `"+<digits>"`, or empty when no digits.
///
/// Leading `+` signs and the `00` international escape are removed, every
/// non-digit character is dropped. Idempotent.
pub fn normalize_prefix(raw: &str) -> String {
    let digits: String = raw
        .trim()
        .trim_start_matches('+')
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    let digits = digits.trim_start_matches(INTERNATIONAL_ESCAPE);

    if digits.is_empty() {
        String::new()
    } else {
        format!("+{digits}")
    }
}

/// Split a raw phone number into its dial prefix and body.
///
/// With a non-empty `model_prefix` only that prefix (or its `00` form) is
/// stripped. Otherwise a leading `+` or `00` followed by one to four digits
/// is taken as the prefix, preferring the longest run that is a known dial
/// code.
pub fn split_phone(raw: &str, model_prefix: &str) -> PhoneSplit {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return PhoneSplit::default();
    }

    let model_prefix = normalize_prefix(model_prefix);
    if !model_prefix.is_empty() {
        let body = strip_prefix_forms(trimmed, &model_prefix).unwrap_or(trimmed);
        return PhoneSplit {
            prefix: model_prefix,
            body: body.to_owned(),
        };
    }

    let after_marker = trimmed
        .strip_prefix('+')
        .or_else(|| trimmed.strip_prefix(INTERNATIONAL_ESCAPE));

    let Some(after_marker) = after_marker else {
        return PhoneSplit::unprefixed(trimmed.to_owned());
    };

    let run_len = after_marker
        .bytes()
        .take(MAX_DIAL_DIGITS)
        .take_while(u8::is_ascii_digit)
        .count();
    if run_len == 0 {
        return PhoneSplit::unprefixed(trimmed.to_owned());
    }

    let code_len = (1..=run_len)
        .rev()
        .find(|&len| is_known_dial_code(&after_marker[..len]))
        .unwrap_or(run_len);

    let (code, rest) = after_marker.split_at(code_len);
    PhoneSplit {
        prefix: normalize_prefix(code),
        body: rest.trim_start().to_owned(),
    }
}

/// Canonicalize a phone body: digits only, 9-digit national numbers
/// grouped `3 3 3`, truncated to [`PHONE_BODY_MAX`]. Idempotent.
pub fn normalize_body(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    let mut body = if digits.len() == NATIONAL_NUMBER_LEN {
        format!("{} {} {}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        digits
    };
    body.truncate(PHONE_BODY_MAX);
    body
}

/// Remove a leading `prefix` (or its `00` form) from `text`, along with
/// the whitespace after it. Without a match `text` comes back as given.
pub fn strip_known_prefix(text: &str, prefix: &str) -> String {
    let prefix = normalize_prefix(prefix);
    if prefix.is_empty() {
        return text.to_owned();
    }

    strip_prefix_forms(text.trim_start(), &prefix).map_or_else(|| text.to_owned(), str::to_owned)
}

/// Count of digits in a phone body, ignoring grouping.
pub fn digit_count(body: &str) -> usize {
    body.chars().filter(char::is_ascii_digit).count()
}

/// `"+351"` -> `"00351"`.
fn escaped_form(prefix: &str) -> Option<String> {
    prefix
        .strip_prefix('+')
        .map(|digits| format!("{INTERNATIONAL_ESCAPE}{digits}"))
}

fn strip_prefix_forms<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.strip_prefix(prefix)
        .or_else(|| escaped_form(prefix).and_then(|alt| text.strip_prefix(alt.as_str())))
        .map(str::trim_start)
}
