// ── Dial code catalog ──
//
// Shared, append-only list of dial codes. Readers take lock-free snapshots;
// appends publish a new list through `ArcSwap::rcu`, so concurrent
// `ensure_for_prefix` calls for the same prefix converge on one entry.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use super::normalize_prefix;
use super::seed::{DIAL_CODE_SEED, SeedEntry};
use crate::model::DialCode;

/// Short code of the domestic country when none is configured.
pub const DEFAULT_COUNTRY: &str = "PT";

pub struct DialCodeCatalog {
    entries: ArcSwap<Vec<Arc<DialCode>>>,
    default_country: String,
}

impl DialCodeCatalog {
    /// Build the catalog from the static seed: the "no prefix" entry first,
    /// then every country in ISO order.
    pub fn seeded(default_country: &str) -> Self {
        Self::from_seed(DIAL_CODE_SEED, default_country)
    }

    pub fn from_seed(seed: &[SeedEntry], default_country: &str) -> Self {
        let mut entries = Vec::with_capacity(seed.len() + 1);
        entries.push(Arc::new(DialCode::no_prefix()));
        entries.extend(
            seed.iter()
                .map(|&(iso2, country, digits)| Arc::new(DialCode::country(iso2, country, digits))),
        );

        Self {
            entries: ArcSwap::from_pointee(entries),
            default_country: default_country.trim().to_uppercase(),
        }
    }

    /// Append country entries whose short code is not in the catalog yet.
    /// Returns how many were added.
    pub fn extend_countries<'a, I>(&self, extra: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let additions: Vec<Arc<DialCode>> = extra
            .into_iter()
            .map(|(iso2, country, digits)| Arc::new(DialCode::country(iso2, country, digits)))
            .collect();

        let mut added = 0;
        self.entries.rcu(|current| {
            let mut next = Vec::clone(current);
            added = 0;
            for entry in &additions {
                let known = next
                    .iter()
                    .any(|d| !d.short_code().is_empty() && d.short_code() == entry.short_code());
                if !known {
                    next.push(Arc::clone(entry));
                    added += 1;
                }
            }
            next
        });
        added
    }

    /// Snapshot of every entry in catalog order.
    pub fn entries(&self) -> Arc<Vec<Arc<DialCode>>> {
        self.entries.load_full()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }

    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    /// The "no prefix" entry (always first).
    pub fn no_prefix(&self) -> Arc<DialCode> {
        self.entries
            .load()
            .iter()
            .find(|d| !d.has_prefix() && d.short_code().is_empty())
            .cloned()
            .unwrap_or_else(|| Arc::new(DialCode::no_prefix()))
    }

    /// The domestic entry, falling back to "no prefix" when the configured
    /// country is not in the catalog.
    pub fn default_entry(&self) -> Arc<DialCode> {
        self.find_by_short_code(&self.default_country)
            .unwrap_or_else(|| self.no_prefix())
    }

    /// Case-insensitive lookup by ISO code.
    pub fn find_by_short_code(&self, short_code: &str) -> Option<Arc<DialCode>> {
        let wanted = short_code.trim();
        if wanted.is_empty() {
            return None;
        }
        self.entries
            .load()
            .iter()
            .find(|d| d.short_code().eq_ignore_ascii_case(wanted))
            .cloned()
    }

    /// First entry with the given prefix. Several countries may share one
    /// (`+1`); catalog order decides.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<Arc<DialCode>> {
        let normalized = normalize_prefix(prefix);
        if normalized.is_empty() {
            return Some(self.no_prefix());
        }
        self.entries
            .load()
            .iter()
            .find(|d| d.normalized_prefix() == normalized)
            .cloned()
    }

    /// Entry for `prefix`, synthesizing and appending a custom one when no
    /// entry carries it. Idempotent per normalized prefix.
    pub fn ensure_for_prefix(&self, prefix: &str) -> Arc<DialCode> {
        let normalized = normalize_prefix(prefix);
        if let Some(existing) = self.find_by_prefix(&normalized) {
            return existing;
        }

        let mut resolved = None;
        self.entries.rcu(|current| {
            if let Some(existing) = current.iter().find(|d| d.normalized_prefix() == normalized) {
                resolved = Some(Arc::clone(existing));
                return Arc::clone(current);
            }
            let custom = Arc::new(DialCode::custom(&normalized));
            resolved = Some(Arc::clone(&custom));
            let mut next = Vec::clone(current);
            next.push(custom);
            Arc::new(next)
        });

        debug!(prefix = %normalized, "dial code catalog: ensured custom entry");
        resolved.unwrap_or_else(|| Arc::new(DialCode::custom(&normalized)))
    }

    /// Entries whose search text contains `query` (case-insensitive).
    /// An empty query returns the whole catalog.
    pub fn search(&self, query: &str) -> Vec<Arc<DialCode>> {
        let needle = query.trim().to_lowercase();
        self.entries
            .load()
            .iter()
            .filter(|d| needle.is_empty() || d.search_text().contains(&needle))
            .cloned()
            .collect()
    }

    /// Whether a client dialled through `dial` counts as external.
    ///
    /// The domestic entry (same prefix or same short code) and entries
    /// without a prefix are not external.
    pub fn is_external(&self, dial: &DialCode) -> bool {
        let domestic = self.default_entry();

        let same_prefix =
            dial.has_prefix() && dial.normalized_prefix() == domestic.normalized_prefix();
        let same_code = !dial.short_code().is_empty()
            && dial.short_code().eq_ignore_ascii_case(domestic.short_code());

        !(same_prefix || same_code || !dial.has_prefix())
    }
}

impl Default for DialCodeCatalog {
    fn default() -> Self {
        Self::seeded(DEFAULT_COUNTRY)
    }
}

impl std::fmt::Debug for DialCodeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialCodeCatalog")
            .field("entries", &self.len())
            .field("default_country", &self.default_country)
            .finish()
    }
}
