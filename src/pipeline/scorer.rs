// src/pipeline/scorer.rs — S5
//
// Five independent signals folded into one composite score per cluster.
// Grounded on the teacher's fusion engine: per-signal weights live in
// config, each signal clamped to [0,1] before the weighted combine.

use std::collections::HashMap;

use crate::config::ScorerWeights;
use crate::types::{ClassifiedToken, NameCluster, ScoredCluster, TokenType};

fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

fn token_lookup(cluster: &NameCluster) -> HashMap<&str, &ClassifiedToken> {
    let mut map = HashMap::new();
    for entry in &cluster.entries {
        for token in &entry.tokens {
            map.entry(token.token.as_str()).or_insert(token);
        }
    }
    map
}

fn structural_score(rep_tokens: &[&str], lookup: &HashMap<&str, &ClassifiedToken>) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0u32;
    let mut name_likely_count = 0u32;
    let mut non_name_penalty = 0.0f32;

    for t in rep_tokens {
        if let Some(ct) = lookup.get(*t) {
            sum += ct.name_score;
            count += 1;
            match ct.token_type {
                TokenType::NameLikely => name_likely_count += 1,
                TokenType::Relationship | TokenType::Descriptor => non_name_penalty += 0.15,
                TokenType::Organization => non_name_penalty += 0.10,
                _ => {}
            }
        }
    }

    let avg = if count > 0 { sum / count as f32 } else { 0.5 };
    let completeness_bonus = if name_likely_count >= 2 { 0.15 } else { 0.0 };
    clamp01(avg + completeness_bonus - non_name_penalty)
}

fn uniqueness_score(rep_tokens: &[&str], lookup: &HashMap<&str, &ClassifiedToken>) -> f32 {
    let mut generic_penalty = 0.0f32;
    for t in rep_tokens {
        if let Some(ct) = lookup.get(*t) {
            generic_penalty += match ct.token_type {
                TokenType::Role => 0.3,
                TokenType::Descriptor => 0.2,
                TokenType::Organization => 0.15,
                _ => 0.0,
            };
        }
    }
    let denom = rep_tokens.len().max(1) as f32;
    (1.0 - generic_penalty / denom).max(0.0)
}

fn noise_score(cluster: &NameCluster) -> f32 {
    let mut noise = 0u32;
    let mut total = 0u32;
    for entry in &cluster.entries {
        for token in &entry.tokens {
            total += 1;
            if token.token_type == TokenType::Noise {
                noise += 1;
            }
        }
    }
    if total == 0 {
        0.0
    } else {
        noise as f32 / total as f32
    }
}

/// Score every cluster. `total_contributors` is the count of distinct
/// phone-number contributors in the corpus (0 iff no entries at all).
pub fn score_clusters(
    clusters: &[NameCluster],
    total_contributors: u64,
    weights: &ScorerWeights,
) -> Vec<ScoredCluster> {
    clusters
        .iter()
        .map(|cluster| {
            let frequency_weight = if total_contributors == 0 {
                0.0
            } else {
                (cluster.frequency as f32 / total_contributors as f32).min(1.0)
            };

            let trust_weight = if cluster.entries.is_empty() {
                0.0
            } else {
                (cluster.total_trust_weight / cluster.entries.len() as f32).min(1.0)
            };

            let rep_tokens: Vec<&str> = cluster.representative.split_whitespace().collect();
            let lookup = token_lookup(cluster);
            let structural = structural_score(&rep_tokens, &lookup);
            let uniqueness = uniqueness_score(&rep_tokens, &lookup);
            let noise = noise_score(cluster);

            let score = clamp01(
                weights.frequency * frequency_weight + weights.trust * trust_weight
                    + weights.structural * structural
                    + weights.uniqueness * uniqueness
                    - weights.noise * noise,
            );

            ScoredCluster {
                cluster: cluster.clone(),
                score,
                frequency_weight,
                trust_weight,
                structural_score: structural,
                uniqueness_score: uniqueness,
                noise_score: noise,
            }
        })
        .collect()
}
