// src/stats.rs
//
// Corpus-wide token statistics: frequency, position, solo-occurrence and
// trust aggregates consulted by the classifier (S2). Built by a periodic
// aggregator external to a single resolution (scheduling is a caller
// responsibility, §6) and cached behind a reader/writer lock the same
// way the teacher guards `StateStore`'s shared maps.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::{CleanedEntry, TokenStats, TokenStatsMap};

#[derive(Default)]
struct Accumulator {
    global_frequency: u64,
    numbers: HashSet<String>,
    first_count: u64,
    last_count: u64,
    solo_count: u64,
    trust_sum: f32,
}

/// Aggregate per-token statistics across a corpus of `(phone, CleanedEntry)`
/// pairs. Monoidal over entry concatenation: callers may call this once
/// per shard and merge the resulting maps (see `merge_token_stats`).
pub fn build_global_token_stats(entries: &[(String, CleanedEntry)]) -> TokenStatsMap {
    let mut acc: HashMap<String, Accumulator> = HashMap::new();

    for (phone, entry) in entries {
        let n = entry.tokens.len();
        for (idx, token) in entry.tokens.iter().enumerate() {
            let a = acc.entry(token.clone()).or_default();
            a.global_frequency += 1;
            a.numbers.insert(phone.clone());
            a.trust_sum += entry.trust_score;
            if idx == 0 {
                a.first_count += 1;
            }
            if idx == n - 1 {
                a.last_count += 1;
            }
            if n == 1 {
                a.solo_count += 1;
            }
        }
    }

    acc.into_iter()
        .map(|(token, a)| {
            let freq = a.global_frequency.max(1) as f32;
            let stats = TokenStats {
                global_frequency: a.global_frequency,
                number_count: a.numbers.len() as u64,
                position_first_pct: a.first_count as f32 / freq,
                position_last_pct: a.last_count as f32 / freq,
                solo_frequency: a.solo_count,
                avg_trust_weight: a.trust_sum / freq,
            };
            (token, stats)
        })
        .collect()
}

/// Merge two token-stats maps produced over disjoint corpora shards.
/// `build_global_token_stats(a ++ b) == merge_token_stats(build(a), build(b))`.
pub fn merge_token_stats(a: &TokenStatsMap, b: &TokenStatsMap) -> TokenStatsMap {
    let mut out = a.clone();
    for (token, sb) in b {
        out.entry(token.clone())
            .and_modify(|sa| *sa = merge_one(*sa, *sb))
            .or_insert(*sb);
    }
    out
}

fn merge_one(a: TokenStats, b: TokenStats) -> TokenStats {
    let global_frequency = a.global_frequency + b.global_frequency;
    let first = a.position_first_pct * a.global_frequency as f32
        + b.position_first_pct * b.global_frequency as f32;
    let last = a.position_last_pct * a.global_frequency as f32
        + b.position_last_pct * b.global_frequency as f32;
    let trust = a.avg_trust_weight * a.global_frequency as f32
        + b.avg_trust_weight * b.global_frequency as f32;
    let denom = global_frequency.max(1) as f32;
    TokenStats {
        global_frequency,
        number_count: a.number_count + b.number_count,
        position_first_pct: first / denom,
        position_last_pct: last / denom,
        solo_frequency: a.solo_frequency + b.solo_frequency,
        avg_trust_weight: trust / denom,
    }
}

/// Shared, swappable cache of the latest global statistics snapshot.
/// Refreshed by the caller's periodic aggregator (§2, §6); read by S2.
pub struct StatsCache {
    inner: RwLock<Arc<TokenStatsMap>>,
}

impl StatsCache {
    pub fn new(initial: TokenStatsMap) -> Self {
        Self {
            inner: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn snapshot(&self) -> Arc<TokenStatsMap> {
        self.inner.read().clone()
    }

    pub fn refresh(&self, stats: TokenStatsMap) {
        *self.inner.write() = Arc::new(stats);
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new(TokenStatsMap::new())
    }
}
