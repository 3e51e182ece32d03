// src/registry.rs
//
// Process-wide name reference registry — six category dictionaries,
// seeded at startup and grown by `learn_token` during resolution.
//
// Readers take a cheap `Arc<Registry>` snapshot for the duration of one
// resolution (`ArcSwap::load_full`); writers build a new `Registry` value
// (seed ∪ learned) and publish it atomically. This is the single-writer/
// multi-reader discipline described in the concurrency section: no lock
// is ever held across a classification call.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameCategory {
    FirstName,
    LastName,
    MiddleName,
    Prefix,
    Relationship,
    Descriptor,
}

impl NameCategory {
    pub const ALL: [NameCategory; 6] = [
        NameCategory::FirstName,
        NameCategory::LastName,
        NameCategory::MiddleName,
        NameCategory::Prefix,
        NameCategory::Relationship,
        NameCategory::Descriptor,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceSource {
    Seed,
    Learned,
}

/// Persisted-schema-contract shape the caller stores/loads rows with
/// (see §6 of the spec). The core never accesses a database directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameReferenceRow {
    pub token:      String,
    pub category:   NameCategory,
    pub source:     ReferenceSource,
    pub confidence: f32,
    pub frequency:  u64,
}

/// Immutable registry value. Cheap to snapshot via `Arc`; never mutated
/// in place once published.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    first_name:   HashSet<String>,
    last_name:    HashSet<String>,
    middle_name:  HashSet<String>,
    prefix:       HashSet<String>,
    relationship: HashSet<String>,
    descriptor:   HashSet<String>,
}

impl Registry {
    fn set_for(&self, category: NameCategory) -> &HashSet<String> {
        match category {
            NameCategory::FirstName => &self.first_name,
            NameCategory::LastName => &self.last_name,
            NameCategory::MiddleName => &self.middle_name,
            NameCategory::Prefix => &self.prefix,
            NameCategory::Relationship => &self.relationship,
            NameCategory::Descriptor => &self.descriptor,
        }
    }

    fn set_for_mut(&mut self, category: NameCategory) -> &mut HashSet<String> {
        match category {
            NameCategory::FirstName => &mut self.first_name,
            NameCategory::LastName => &mut self.last_name,
            NameCategory::MiddleName => &mut self.middle_name,
            NameCategory::Prefix => &mut self.prefix,
            NameCategory::Relationship => &mut self.relationship,
            NameCategory::Descriptor => &mut self.descriptor,
        }
    }

    pub fn contains(&self, category: NameCategory, token: &str) -> bool {
        self.set_for(category).contains(&token.to_lowercase())
    }

    fn insert(&mut self, category: NameCategory, token: &str) -> bool {
        self.set_for_mut(category).insert(token.to_lowercase())
    }

    fn seeded() -> Self {
        let mut reg = Self::default();
        for token in SEED_FIRST_NAMES {
            reg.insert(NameCategory::FirstName, token);
        }
        for token in SEED_LAST_NAMES {
            reg.insert(NameCategory::LastName, token);
        }
        for token in SEED_MIDDLE_NAMES {
            reg.insert(NameCategory::MiddleName, token);
        }
        for token in SEED_PREFIXES {
            reg.insert(NameCategory::Prefix, token);
        }
        for token in SEED_RELATIONSHIPS {
            reg.insert(NameCategory::Relationship, token);
        }
        for token in SEED_DESCRIPTORS {
            reg.insert(NameCategory::Descriptor, token);
        }
        reg
    }

    pub fn get_counts(&self) -> [(NameCategory, usize); 6] {
        [
            (NameCategory::FirstName, self.first_name.len()),
            (NameCategory::LastName, self.last_name.len()),
            (NameCategory::MiddleName, self.middle_name.len()),
            (NameCategory::Prefix, self.prefix.len()),
            (NameCategory::Relationship, self.relationship.len()),
            (NameCategory::Descriptor, self.descriptor.len()),
        ]
    }

    pub fn get_seed_entries() -> Vec<NameReferenceRow> {
        let mut rows = Vec::new();
        let groups: [(NameCategory, &[&str]); 6] = [
            (NameCategory::FirstName, SEED_FIRST_NAMES),
            (NameCategory::LastName, SEED_LAST_NAMES),
            (NameCategory::MiddleName, SEED_MIDDLE_NAMES),
            (NameCategory::Prefix, SEED_PREFIXES),
            (NameCategory::Relationship, SEED_RELATIONSHIPS),
            (NameCategory::Descriptor, SEED_DESCRIPTORS),
        ];
        for (category, tokens) in groups {
            for token in tokens {
                rows.push(NameReferenceRow {
                    token: token.to_string(),
                    category,
                    source: ReferenceSource::Seed,
                    confidence: 1.0,
                    frequency: 0,
                });
            }
        }
        rows
    }
}

// ── Seed dictionaries ────────────────────────────────────────────────────
// Small, representative seeds — the registry is meant to be grown via
// `load_from_database` and `learn_token` in production, not to be
// exhaustive at compile time.

const SEED_FIRST_NAMES: &[&str] = &[
    "rahul", "amit", "rohan", "priya", "neha", "vikram", "arjun", "sanjay",
    "deepak", "anita", "pooja", "kiran", "ravi", "suresh", "harsh", "aditya",
    "john", "michael", "james", "robert", "mary", "linda", "susan", "karen",
    "mohammed", "ali", "fatima", "ayesha", "wei", "li", "hiroshi", "yuki",
];

const SEED_LAST_NAMES: &[&str] = &[
    "sharma", "patel", "gupta", "kumar", "singh", "reddy", "rao", "nair",
    "iyer", "mehta", "shah", "joshi", "verma", "yadav", "khan", "chopra",
    "smith", "johnson", "williams", "brown", "jones", "garcia", "miller",
    "davis", "chen", "wang", "tanaka", "suzuki",
];

const SEED_MIDDLE_NAMES: &[&str] = &["kumar", "k", "d", "b", "prasad", "lal"];

const SEED_PREFIXES: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "prof", "sir", "madam", "shri", "smt",
];

const SEED_RELATIONSHIPS: &[&str] = &[
    "papa", "mom", "mum", "mother", "father", "dad", "daddy", "mummy",
    "bhaiya", "bhai", "didi", "sister", "brother", "uncle", "aunty", "aunt",
    "chacha", "chachi", "mama", "mami", "nana", "nani", "dada", "dadi",
    "husband", "wife", "beta", "beti", "boss", "friend",
];

const SEED_DESCRIPTORS: &[&str] = &[
    "office", "clinic", "hospital", "shop", "store", "service", "delivery",
    "spam", "loan", "insurance", "bank", "fraud", "scam", "unknown",
    "work", "home", "personal", "business", "new", "old", "backup",
];

// ── Process-wide handle ─────────────────────────────────────────────────

/// Published snapshot handle. `load_full()` returns an `Arc<Registry>`
/// that a reader keeps for one resolution; writers construct a whole new
/// `Registry` and `store()` it.
pub struct SharedRegistry {
    inner: ArcSwap<Registry>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Registry::seeded()),
        }
    }

    pub fn snapshot(&self) -> Arc<Registry> {
        self.inner.load_full()
    }

    /// Bulk-load rows (typically read by the caller from the persisted
    /// `NameReference` table at startup).
    pub fn load_from_database(&self, entries: &[(String, NameCategory)]) {
        let mut next = (*self.inner.load_full()).clone();
        for (token, category) in entries {
            next.insert(*category, token);
        }
        self.inner.store(Arc::new(next));
    }

    /// Learn one token during resolution. Returns true iff newly added.
    /// Tokens shorter than 2 chars are rejected; only FIRST/LAST/MIDDLE
    /// name categories are accepted for auto-learning.
    pub fn learn_token(&self, token: &str, category: NameCategory, min_len: usize) -> bool {
        if token.chars().count() < min_len {
            return false;
        }
        if !matches!(
            category,
            NameCategory::FirstName | NameCategory::LastName | NameCategory::MiddleName
        ) {
            return false;
        }
        let mut next = (*self.inner.load_full()).clone();
        let added = next.insert(category, token);
        if added {
            self.inner.store(Arc::new(next));
        }
        added
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_contains_known_tokens() {
        let reg = SharedRegistry::new();
        let snap = reg.snapshot();
        assert!(snap.contains(NameCategory::FirstName, "Rahul"));
        assert!(snap.contains(NameCategory::LastName, "SHARMA"));
        assert!(snap.contains(NameCategory::Relationship, "papa"));
    }

    #[test]
    fn learn_token_rejects_short_tokens() {
        let reg = SharedRegistry::new();
        assert!(!reg.learn_token("a", NameCategory::FirstName, 2));
    }

    #[test]
    fn learn_token_rejects_non_name_categories() {
        let reg = SharedRegistry::new();
        assert!(!reg.learn_token("xyzzy", NameCategory::Descriptor, 2));
    }

    #[test]
    fn learn_token_accepts_new_first_name() {
        let reg = SharedRegistry::new();
        assert!(reg.learn_token("zyrah", NameCategory::FirstName, 2));
        assert!(reg.snapshot().contains(NameCategory::FirstName, "zyrah"));
        // Second insert is not "newly added".
        assert!(!reg.learn_token("zyrah", NameCategory::FirstName, 2));
    }

    #[test]
    fn get_seed_entries_nonempty_for_every_category() {
        let rows = Registry::get_seed_entries();
        for category in NameCategory::ALL {
            assert!(rows.iter().any(|r| r.category == category));
        }
    }
}
