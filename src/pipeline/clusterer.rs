// src/pipeline/clusterer.rs — S4
//
// Two-phase canonical-key clustering: group candidates whose tokens are a
// permutation of one another, then fold single-token candidates into the
// first (by descending token count) multi-token cluster that contains
// their token. Mirrors the incremental union-by-shared-key growth the
// teacher uses to grow account clusters over a sliding window.

use std::collections::{HashMap, HashSet};

use crate::types::{NameCandidate, NameCluster};

struct Group {
    key: String,
    variants: Vec<String>,
    entries: Vec<NameCandidate>,
    user_ids: Vec<String>,
    total_trust_weight: f32,
}

fn canonical_key(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_count(key: &str) -> usize {
    key.split_whitespace().count()
}

fn dedup_preserve_order(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item.clone());
        }
    }
    out
}

fn representative(variants: &[String]) -> String {
    let mut best = variants[0].clone();
    let mut best_len = best.chars().count();
    for v in &variants[1..] {
        let len = v.chars().count();
        if len > best_len {
            best = v.clone();
            best_len = len;
        }
    }
    best
}

/// Cluster candidates by canonical key and merge single-token candidates
/// into the first qualifying multi-token cluster. Order of the returned
/// clusters follows descending canonical-key token count, then first
/// insertion (matching phase-2 traversal order).
pub fn cluster_candidates(candidates: &[NameCandidate]) -> Vec<NameCluster> {
    // Phase 1: group by canonical key, preserving first-seen key order.
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Group> = HashMap::new();

    for candidate in candidates {
        let key = canonical_key(&candidate.name);
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            Group {
                key: key.clone(),
                variants: Vec::new(),
                entries: Vec::new(),
                user_ids: Vec::new(),
                total_trust_weight: 0.0,
            }
        });
        group.variants.push(candidate.name.clone());
        group.user_ids.push(candidate.source_entry.user_id.clone());
        group.total_trust_weight += candidate.source_entry.trust_score;
        group.entries.push(candidate.clone());
    }

    // Phase 2: sort keys by descending token count, stable.
    let mut sorted_keys = order.clone();
    sorted_keys.sort_by_key(|k| std::cmp::Reverse(token_count(k)));

    let mut merged: HashSet<String> = HashSet::new();
    let mut emit_order: Vec<String> = Vec::new();

    for key in &sorted_keys {
        if merged.contains(key) {
            continue;
        }
        if token_count(key) == 1 {
            let single_token = key.as_str();
            let target = sorted_keys.iter().find(|candidate_key| {
                *candidate_key != key
                    && !merged.contains(*candidate_key)
                    && token_count(candidate_key) > 1
                    && candidate_key
                        .split_whitespace()
                        .any(|t| t == single_token)
            });
            if let Some(target_key) = target {
                let target_key = target_key.clone();
                let absorbed = groups.remove(key).expect("group exists for key");
                let target_group = groups.get_mut(&target_key).expect("target group exists");
                target_group.variants.extend(absorbed.variants);
                target_group.entries.extend(absorbed.entries);
                target_group.user_ids.extend(absorbed.user_ids);
                target_group.total_trust_weight += absorbed.total_trust_weight;
                merged.insert(key.clone());
                continue;
            }
        }
        emit_order.push(key.clone());
    }

    emit_order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .map(|group| {
            let variants = dedup_preserve_order(&group.variants);
            let rep = representative(&variants);
            let user_ids = dedup_preserve_order(&group.user_ids);
            NameCluster {
                representative: rep,
                variants,
                entries: group.entries,
                frequency: user_ids.len(),
                total_trust_weight: group.total_trust_weight,
                user_ids,
            }
        })
        .collect()
}

/// Retained as a pure utility, off the clustering hot path.
pub fn name_similarity(a: &str, b: &str) -> f32 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    if a_lower == b_lower {
        return 1.0;
    }

    let a_tokens: HashSet<&str> = a_lower.split_whitespace().collect();
    let b_tokens: HashSet<&str> = b_lower.split_whitespace().collect();
    if a_tokens.is_subset(&b_tokens) || b_tokens.is_subset(&a_tokens) {
        return 0.85;
    }

    let dist = levenshtein(&a_lower, &b_lower);
    let max_len = a_lower.chars().count().max(b_lower.chars().count()).max(1);
    let lev_sim = 1.0 - (dist as f32 / max_len as f32);

    let intersection = a_tokens.intersection(&b_tokens).count();
    let union = a_tokens.union(&b_tokens).count().max(1);
    let jaccard = intersection as f32 / union as f32;

    0.4 * lev_sim + 0.6 * jaccard
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for i in 1..=a.len() {
        let mut prev = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let temp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j - 1])
            };
            prev = temp;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassifiedToken, EntryRef, TokenFeatures, TokenType};

    fn candidate(name: &str, user_id: &str, trust: f32) -> NameCandidate {
        let tokens = name
            .split_whitespace()
            .map(|t| ClassifiedToken {
                token: t.to_lowercase(),
                features: TokenFeatures {
                    length: t.len(),
                    alphabet_ratio: 1.0,
                    numeric_ratio: 0.0,
                    is_capitalized: true,
                },
                stats: None,
                token_type: TokenType::NameLikely,
                probability: 1.0,
                name_score: 1.0,
            })
            .collect();
        NameCandidate {
            name: name.to_string(),
            tokens,
            source_entry: EntryRef {
                user_id: user_id.to_string(),
                trust_score: trust,
            },
        }
    }

    #[test]
    fn permutation_invariant_clustering() {
        let candidates = vec![
            candidate("rahul sharma", "u1", 0.9),
            candidate("sharma rahul", "u2", 0.7),
        ];
        let clusters = cluster_candidates(&candidates);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].frequency, 2);
    }

    #[test]
    fn subset_merge_absorbs_single_token() {
        let candidates = vec![
            candidate("harsh patel", "u1", 1.0),
            candidate("harsh patel", "u2", 1.0),
            candidate("patel", "u3", 1.0),
        ];
        let clusters = cluster_candidates(&candidates);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].representative, "harsh patel");
        assert_eq!(clusters[0].frequency, 3);
        assert!(clusters[0].variants.contains(&"patel".to_string()));
    }

    #[test]
    fn unrelated_single_token_does_not_merge() {
        let candidates = vec![
            candidate("rahul sharma", "u1", 0.9),
            candidate("patel", "u4", 0.5),
        ];
        let clusters = cluster_candidates(&candidates);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn tie_break_by_first_insertion_on_equal_length() {
        let candidates = vec![
            candidate("amit kumar", "u1", 0.9),
            candidate("kumar amit", "u2", 0.9),
        ];
        let clusters = cluster_candidates(&candidates);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].representative, "amit kumar");
    }

    #[test]
    fn name_similarity_equal_strings_is_one() {
        assert_eq!(name_similarity("Rahul", "rahul"), 1.0);
    }

    #[test]
    fn name_similarity_subset_tokens_is_point_eight_five() {
        assert_eq!(name_similarity("rahul sharma", "rahul"), 0.85);
    }
}
