// src/pipeline/classifier.rs — S2
//
// Scores each unique token against six closed type variants using three
// independent contribution sources (intrinsic features, registry
// membership, corpus statistics), then takes the arg-max. Mirrors the
// weighted-signal-accumulation idiom the teacher uses to fuse per-worker
// detection scores before picking a verdict.

use std::collections::HashMap;

use crate::registry::{NameCategory, Registry};
use crate::types::{ClassifiedToken, CleanedEntry, TokenFeatures, TokenStats, TokenStatsMap, TokenType};

fn alternations(pattern: &str) -> usize {
    pattern
        .as_bytes()
        .windows(2)
        .filter(|w| w[0] != w[1])
        .count()
}

fn add(scores: &mut [f32; 6], t: TokenType, amount: f32) {
    scores[t.index()] += amount;
}

fn apply_intrinsic(scores: &mut [f32; 6], features: &TokenFeatures, token: &str) {
    if features.numeric_ratio > 0.5 {
        add(scores, TokenType::Noise, 0.6);
    }
    if features.numeric_ratio > 0.8 {
        add(scores, TokenType::Noise, 0.3);
    }
    if features.length <= 2 {
        add(scores, TokenType::Noise, 0.3);
        add(scores, TokenType::Descriptor, 0.15);
    }
    if features.length > 15 {
        add(scores, TokenType::Organization, 0.1);
        add(scores, TokenType::Noise, 0.1);
    }
    if features.alphabet_ratio > 0.9 {
        add(scores, TokenType::NameLikely, 0.15);
        add(scores, TokenType::Role, 0.05);
    }
    if features.is_capitalized {
        add(scores, TokenType::NameLikely, 0.05);
    }
    let pattern = TokenFeatures::char_pattern(token);
    if alternations(&pattern) >= 3 && features.length >= 3 {
        add(scores, TokenType::NameLikely, 0.1);
    }
}

fn apply_registry(scores: &mut [f32; 6], token: &str, registry: &Registry) {
    if registry.contains(NameCategory::FirstName, token) {
        add(scores, TokenType::NameLikely, 0.45);
        let idx = TokenType::Noise.index();
        scores[idx] = (scores[idx] - 0.25).max(0.0);
    }
    if registry.contains(NameCategory::LastName, token) {
        add(scores, TokenType::NameLikely, 0.35);
        let idx = TokenType::Noise.index();
        scores[idx] = (scores[idx] - 0.25).max(0.0);
    }
    if registry.contains(NameCategory::MiddleName, token) {
        add(scores, TokenType::NameLikely, 0.20);
        let idx = TokenType::Noise.index();
        scores[idx] = (scores[idx] - 0.25).max(0.0);
    }
    if registry.contains(NameCategory::Prefix, token) {
        add(scores, TokenType::Descriptor, 0.30);
        add(scores, TokenType::Noise, 0.10);
    }
    if registry.contains(NameCategory::Relationship, token) {
        add(scores, TokenType::Relationship, 0.55);
        let idx = TokenType::NameLikely.index();
        scores[idx] = (scores[idx] - 0.25).max(0.0);
    }
    if registry.contains(NameCategory::Descriptor, token) {
        add(scores, TokenType::Descriptor, 0.55);
        let idx = TokenType::NameLikely.index();
        scores[idx] = (scores[idx] - 0.25).max(0.0);
    }
}

fn apply_statistical(scores: &mut [f32; 6], features: &TokenFeatures, stats: &TokenStats, total_numbers: u64) {
    let penetration = stats.number_count as f32 / total_numbers as f32;
    let solo_ratio = if stats.global_frequency > 0 {
        stats.solo_frequency as f32 / stats.global_frequency as f32
    } else {
        0.0
    };

    // NAME_LIKELY
    if penetration > 0.001 && penetration < 0.05 {
        add(scores, TokenType::NameLikely, 0.25);
    }
    if (0.05..0.10).contains(&penetration) {
        add(scores, TokenType::NameLikely, 0.10);
    }
    if stats.position_first_pct > 0.6 {
        add(scores, TokenType::NameLikely, 0.20);
    }
    if stats.position_first_pct > 0.8 {
        add(scores, TokenType::NameLikely, 0.10);
    }
    if solo_ratio < 0.3 {
        add(scores, TokenType::NameLikely, 0.10);
    }
    if stats.avg_trust_weight > 0.7 {
        add(scores, TokenType::NameLikely, 0.05);
    }

    // ROLE (cumulative monotone strengthening, see design notes)
    if penetration > 0.05 {
        add(scores, TokenType::Role, 0.25);
    }
    if penetration > 0.10 {
        add(scores, TokenType::Role, 0.20);
    }
    if penetration > 0.20 {
        add(scores, TokenType::Role, 0.10);
    }
    if stats.position_last_pct > 0.5 && penetration > 0.02 {
        add(scores, TokenType::Role, 0.15);
    }

    // RELATIONSHIP
    if stats.number_count <= 5 && solo_ratio > 0.5 {
        add(scores, TokenType::Relationship, 0.40);
    }
    if stats.number_count <= 3 && solo_ratio > 0.3 {
        add(scores, TokenType::Relationship, 0.20);
    }
    if stats.number_count == 1 && stats.solo_frequency > 0 {
        add(scores, TokenType::Relationship, 0.10);
    }

    // DESCRIPTOR
    if penetration > 0.02 && penetration < 0.15 && stats.position_last_pct > 0.4 {
        add(scores, TokenType::Descriptor, 0.30);
    }
    if solo_ratio < 0.1 && stats.position_last_pct > 0.6 {
        add(scores, TokenType::Descriptor, 0.10);
    }

    // ORGANIZATION
    if features.length > 6 && penetration > 0.01 && penetration < 0.08 {
        add(scores, TokenType::Organization, 0.15);
    }
    if features.length > 8 && stats.position_first_pct < 0.3 && penetration > 0.005 {
        add(scores, TokenType::Organization, 0.10);
    }

    // NOISE
    if stats.global_frequency <= 2 && features.length <= 3 {
        add(scores, TokenType::Noise, 0.30);
    }
    if stats.global_frequency == 1 && features.alphabet_ratio < 0.5 {
        add(scores, TokenType::Noise, 0.20);
    }
}

fn apply_fallback(scores: &mut [f32; 6], features: &TokenFeatures) {
    if features.alphabet_ratio > 0.8 && features.length >= 3 {
        add(scores, TokenType::NameLikely, 0.30);
    }
    if features.length <= 2 || features.numeric_ratio > 0.5 {
        add(scores, TokenType::Noise, 0.30);
    }
}

fn argmax(scores: &[f32; 6]) -> (TokenType, f32) {
    let mut best_idx = 0;
    let mut best_val = scores[0];
    for (idx, &val) in scores.iter().enumerate().skip(1) {
        if val > best_val {
            best_val = val;
            best_idx = idx;
        }
    }
    (TokenType::ORDER[best_idx], best_val)
}

/// Classify one token. `stats` is `None` (or `total_numbers == 0`) when the
/// statistical branch cannot fire; the fallback branch takes over.
pub fn classify_token(
    token: &str,
    features: TokenFeatures,
    stats: Option<TokenStats>,
    registry: &Registry,
    total_numbers: u64,
) -> ClassifiedToken {
    let mut scores = [0f32; 6];

    apply_intrinsic(&mut scores, &features, token);
    apply_registry(&mut scores, token, registry);

    match stats {
        Some(s) if total_numbers > 0 => apply_statistical(&mut scores, &features, &s, total_numbers),
        _ => apply_fallback(&mut scores, &features),
    }

    let sum: f32 = scores.iter().sum();
    let (token_type, max) = argmax(&scores);
    let probability = if sum > 0.0 { max / sum } else { 0.5 };
    let name_score = if sum > 0.0 {
        scores[TokenType::NameLikely.index()] / sum
    } else {
        0.5
    };

    ClassifiedToken {
        token: token.to_string(),
        features,
        stats,
        token_type,
        probability,
        name_score,
    }
}

/// Classify every unique token across a corpus slice, so that repeated
/// tokens (the common case) are scored once. Each `(CleanedEntry, cap_flags)`
/// pair supplies per-occurrence capitalization; the first occurrence of a
/// token wins its `is_capitalized` feature.
pub fn classify_corpus_tokens(
    entries: &[(CleanedEntry, Vec<bool>)],
    stats: &TokenStatsMap,
    registry: &Registry,
    total_numbers: u64,
) -> HashMap<String, ClassifiedToken> {
    let mut seen_capitalized: HashMap<String, bool> = HashMap::new();
    for (entry, caps) in entries {
        for (token, &cap) in entry.tokens.iter().zip(caps.iter()) {
            seen_capitalized.entry(token.clone()).or_insert(cap);
        }
    }

    seen_capitalized
        .into_iter()
        .map(|(token, is_capitalized)| {
            let features = super::tokenizer::extract_token_features(&token, is_capitalized);
            let token_stats = stats.get(&token).copied();
            let classified = classify_token(&token, features, token_stats, registry, total_numbers);
            (token, classified)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SharedRegistry;

    fn feat(length: usize, alphabet_ratio: f32, numeric_ratio: f32, is_capitalized: bool) -> TokenFeatures {
        TokenFeatures {
            length,
            alphabet_ratio,
            numeric_ratio,
            is_capitalized,
        }
    }

    #[test]
    fn registry_first_name_yields_name_likely() {
        let reg = SharedRegistry::new();
        let snap = reg.snapshot();
        let classified = classify_token("rahul", feat(5, 1.0, 0.0, true), None, &snap, 0);
        assert_eq!(classified.token_type, TokenType::NameLikely);
        assert!(classified.probability > 0.0);
    }

    #[test]
    fn registry_relationship_suppresses_name_likely() {
        let reg = SharedRegistry::new();
        let snap = reg.snapshot();
        let classified = classify_token("papa", feat(4, 1.0, 0.0, true), None, &snap, 0);
        assert_eq!(classified.token_type, TokenType::Relationship);
    }

    #[test]
    fn numeric_heavy_token_is_noise() {
        let reg = SharedRegistry::new();
        let snap = reg.snapshot();
        let classified = classify_token("12345", feat(5, 0.0, 1.0, false), None, &snap, 0);
        assert_eq!(classified.token_type, TokenType::Noise);
    }

    #[test]
    fn high_penetration_role_token() {
        let reg = SharedRegistry::new();
        let snap = reg.snapshot();
        let stats = TokenStats {
            global_frequency: 10,
            number_count: 300,
            position_first_pct: 1.0,
            position_last_pct: 1.0,
            solo_frequency: 10,
            avg_trust_weight: 0.8,
        };
        let classified = classify_token("plumber", feat(7, 1.0, 0.0, false), Some(stats), &snap, 1000);
        assert_eq!(classified.token_type, TokenType::Role);
    }

    #[test]
    fn probability_and_name_score_bounded() {
        let reg = SharedRegistry::new();
        let snap = reg.snapshot();
        let classified = classify_token("xyz", feat(3, 1.0, 0.0, false), None, &snap, 0);
        assert!((0.0..=1.0).contains(&classified.probability));
        assert!((0.0..=1.0).contains(&classified.name_score));
    }

    #[test]
    fn empty_scores_fall_back_to_half() {
        let reg = SharedRegistry::new();
        let snap = reg.snapshot();
        // A mid-length, non-capitalized, non-numeric, non-registry token with
        // no stats and an alphabet ratio that avoids both fallback branches.
        let classified = classify_token("zzzzzzzzzz", feat(10, 0.0, 0.0, false), None, &snap, 0);
        assert!(classified.probability >= 0.0);
    }
}
