// ── Currency canonicalization ──
//
// Credit values arrive typed by hand in either decimal convention
// (`1.234,50`, `1234.5`, `1 234,50 €`). Everything is folded into one
// canonical string: `[-]<int with space thousands>,<2 digits>€`.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Canonical rendering of zero, also the fallback for unparseable input.
pub const ZERO_CREDIT: &str = "0,00€";

const CURRENCY_SYMBOL: char = '€';

/// Parse a locale-ambiguous amount.
///
/// Heuristic, in order:
/// 1. drop the euro sign and all whitespace;
/// 2. several dots and no comma: the dots group thousands;
/// 3. a dot and no comma: the dot is the decimal separator;
/// 4. remaining dots group thousands, the comma is the decimal separator.
pub fn parse_credit(raw: &str) -> Option<Decimal> {
    let mut cleaned: String = raw
        .chars()
        .filter(|&c| c != CURRENCY_SYMBOL && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let has_comma = cleaned.contains(',');
    if !has_comma && cleaned.matches('.').count() > 1 {
        cleaned.retain(|c| c != '.');
    }
    if !has_comma && cleaned.contains('.') {
        cleaned = cleaned.replace('.', ",");
    }

    let candidate = cleaned.replace('.', "").replace(',', ".");
    Decimal::from_str(&candidate).ok()
}

/// Canonicalize a credit value. Never fails: anything unparseable renders
/// as [`ZERO_CREDIT`]. Idempotent.
pub fn format_credit(raw: &str) -> String {
    parse_credit(raw).map_or_else(|| ZERO_CREDIT.to_owned(), render)
}

/// Render an amount in canonical form, rounding half away from zero to
/// cents. The sign is kept only when the rounded amount is below zero.
pub fn render(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let magnitude = rounded.abs();
    let whole = magnitude.trunc();
    let cents = ((magnitude - whole) * Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or_default();

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!(
        "{sign}{},{cents:02}{CURRENCY_SYMBOL}",
        group_thousands(&whole.to_string())
    )
}

/// `"1234567"` -> `"1 234 567"`.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_examples() {
        assert_eq!(format_credit("1234.5"), "1 234,50€");
        assert_eq!(format_credit(""), "0,00€");
        assert_eq!(format_credit("-10,5"), "-10,50€");
    }

    #[test]
    fn dot_conventions() {
        assert_eq!(format_credit("1.234.567"), "1 234 567,00€");
        assert_eq!(format_credit("1.234,5"), "1 234,50€");
        assert_eq!(format_credit("12.5"), "12,50€");
        assert_eq!(format_credit("0.05"), "0,05€");
    }

    #[test]
    fn symbol_and_spaces_are_ignored() {
        assert_eq!(format_credit(" 1 234,50 € "), "1 234,50€");
        assert_eq!(format_credit("€99"), "99,00€");
    }

    #[test]
    fn garbage_falls_back_to_zero() {
        assert_eq!(format_credit("abc"), ZERO_CREDIT);
        assert_eq!(format_credit("   "), ZERO_CREDIT);
        assert_eq!(format_credit("€"), ZERO_CREDIT);
        assert_eq!(format_credit("1,2,3"), ZERO_CREDIT);
        assert_eq!(parse_credit("--"), None);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_credit("2,345"), "2,35€");
        assert_eq!(format_credit("-2,345"), "-2,35€");
        assert_eq!(format_credit("0,994"), "0,99€");
        assert_eq!(format_credit("999,995"), "1 000,00€");
    }

    #[test]
    fn negative_zero_has_no_sign() {
        assert_eq!(format_credit("-0"), "0,00€");
        assert_eq!(format_credit("-0,001"), "0,00€");
        assert_eq!(format_credit("-0,01"), "-0,01€");
    }

    #[test]
    fn format_is_idempotent() {
        let samples = [
            "1234.5",
            "-10,5",
            "1.234.567",
            "0,005",
            "-0,001",
            "12",
            "1 000 000,99 €",
            "7.5",
            "-1.000,10",
        ];
        for raw in samples {
            let once = format_credit(raw);
            assert_eq!(format_credit(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1 000");
        assert_eq!(group_thousands("123456"), "123 456");
    }
}
