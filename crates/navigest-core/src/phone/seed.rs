// ── Static dial code table ──
//
// `(iso2, country, dial digits)`, ordered by ISO code. Country codes form a
// prefix-free set, which `split_phone` relies on to pick the right run.

/// One row of the seed table.
pub type SeedEntry = (&'static str, &'static str, &'static str);

pub const DIAL_CODE_SEED: &[SeedEntry] = &[
    ("AD", "Andorra", "376"),
    ("AE", "United Arab Emirates", "971"),
    ("AO", "Angola", "244"),
    ("AR", "Argentina", "54"),
    ("AT", "Austria", "43"),
    ("AU", "Australia", "61"),
    ("BE", "Belgium", "32"),
    ("BG", "Bulgaria", "359"),
    ("BR", "Brazil", "55"),
    ("CA", "Canada", "1"),
    ("CH", "Switzerland", "41"),
    ("CL", "Chile", "56"),
    ("CN", "China", "86"),
    ("CO", "Colombia", "57"),
    ("CV", "Cape Verde", "238"),
    ("CY", "Cyprus", "357"),
    ("CZ", "Czechia", "420"),
    ("DE", "Germany", "49"),
    ("DK", "Denmark", "45"),
    ("DZ", "Algeria", "213"),
    ("EE", "Estonia", "372"),
    ("EG", "Egypt", "20"),
    ("ES", "Spain", "34"),
    ("FI", "Finland", "358"),
    ("FR", "France", "33"),
    ("GB", "United Kingdom", "44"),
    ("GR", "Greece", "30"),
    ("GW", "Guinea-Bissau", "245"),
    ("HR", "Croatia", "385"),
    ("HU", "Hungary", "36"),
    ("IE", "Ireland", "353"),
    ("IL", "Israel", "972"),
    ("IN", "India", "91"),
    ("IT", "Italy", "39"),
    ("JP", "Japan", "81"),
    ("KR", "South Korea", "82"),
    ("LT", "Lithuania", "370"),
    ("LU", "Luxembourg", "352"),
    ("LV", "Latvia", "371"),
    ("MA", "Morocco", "212"),
    ("MC", "Monaco", "377"),
    ("MO", "Macau", "853"),
    ("MT", "Malta", "356"),
    ("MX", "Mexico", "52"),
    ("MZ", "Mozambique", "258"),
    ("NL", "Netherlands", "31"),
    ("NO", "Norway", "47"),
    ("NZ", "New Zealand", "64"),
    ("PL", "Poland", "48"),
    ("PT", "Portugal", "351"),
    ("RO", "Romania", "40"),
    ("RS", "Serbia", "381"),
    ("SA", "Saudi Arabia", "966"),
    ("SE", "Sweden", "46"),
    ("SI", "Slovenia", "386"),
    ("SK", "Slovakia", "421"),
    ("ST", "Sao Tome and Principe", "239"),
    ("TL", "Timor-Leste", "670"),
    ("TN", "Tunisia", "216"),
    ("TR", "Turkey", "90"),
    ("UA", "Ukraine", "380"),
    ("US", "United States", "1"),
    ("VE", "Venezuela", "58"),
    ("ZA", "South Africa", "27"),
];

/// Whether `digits` (no leading `+`) is a seeded country calling code.
pub fn is_known_dial_code(digits: &str) -> bool {
    DIAL_CODE_SEED.iter().any(|&(_, _, code)| code == digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_sorted_by_iso_code() {
        let codes: Vec<_> = DIAL_CODE_SEED.iter().map(|&(iso, _, _)| iso).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn seed_codes_are_prefix_free() {
        for &(iso_a, _, a) in DIAL_CODE_SEED {
            for &(iso_b, _, b) in DIAL_CODE_SEED {
                if a != b {
                    assert!(!b.starts_with(a), "{iso_a} +{a} is a prefix of {iso_b} +{b}");
                }
            }
        }
    }

    #[test]
    fn known_codes() {
        assert!(is_known_dial_code("351"));
        assert!(is_known_dial_code("1"));
        assert!(!is_known_dial_code("35"));
        assert!(!is_known_dial_code(""));
    }
}
