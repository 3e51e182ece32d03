// src/pipeline/context.rs — S6
//
// A single left-to-right pass over every cleaned entry's tokens,
// accumulating role/relationship/descriptor token sets and the tag union,
// all in first-seen order (determinism is a hard requirement here).

use std::collections::{HashMap, HashSet};

use crate::types::{ClassifiedToken, CleanedEntry, ExtractedContext, TokenType};

pub fn mine_context(
    entries: &[CleanedEntry],
    classified: &HashMap<String, ClassifiedToken>,
) -> ExtractedContext {
    let mut role_tokens = Vec::new();
    let mut role_seen = HashSet::new();
    let mut role_counts: HashMap<String, u32> = HashMap::new();

    let mut relationship_tokens = Vec::new();
    let mut relationship_seen = HashSet::new();

    let mut descriptor_tokens = Vec::new();
    let mut descriptor_seen = HashSet::new();

    let mut tags = Vec::new();
    let mut tags_seen = HashSet::new();

    for entry in entries {
        for token in &entry.tokens {
            let Some(ct) = classified.get(token) else {
                continue;
            };
            match ct.token_type {
                TokenType::Role => {
                    *role_counts.entry(token.clone()).or_insert(0) += 1;
                    if role_seen.insert(token.clone()) {
                        role_tokens.push(token.clone());
                    }
                    if tags_seen.insert(token.clone()) {
                        tags.push(token.clone());
                    }
                }
                TokenType::Relationship => {
                    if relationship_seen.insert(token.clone()) {
                        relationship_tokens.push(token.clone());
                    }
                    if tags_seen.insert(token.clone()) {
                        tags.push(token.clone());
                    }
                }
                TokenType::Descriptor => {
                    if descriptor_seen.insert(token.clone()) {
                        descriptor_tokens.push(token.clone());
                    }
                }
                TokenType::Organization => {
                    if tags_seen.insert(token.clone()) {
                        tags.push(token.clone());
                    }
                }
                _ => {}
            }
        }
    }

    let probable_role = role_tokens
        .iter()
        .max_by_key(|t| {
            let count = role_counts.get(*t).copied().unwrap_or(0);
            // First-seen tie-break: earlier tokens must win ties, so bias
            // the key by negative position using role_tokens' own order.
            let pos = role_tokens.iter().position(|x| x == *t).unwrap_or(usize::MAX);
            (count, std::cmp::Reverse(pos))
        })
        .cloned();

    ExtractedContext {
        tags,
        probable_role,
        role_tokens,
        relationship_tokens,
        descriptor_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenFeatures;

    fn classified(token: &str, token_type: TokenType) -> ClassifiedToken {
        ClassifiedToken {
            token: token.to_string(),
            features: TokenFeatures {
                length: token.len(),
                alphabet_ratio: 1.0,
                numeric_ratio: 0.0,
                is_capitalized: false,
            },
            stats: None,
            token_type,
            probability: 1.0,
            name_score: 0.1,
        }
    }

    fn entry(tokens: &[&str]) -> CleanedEntry {
        CleanedEntry {
            raw: tokens.join(" "),
            cleaned: tokens.join(" "),
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
            user_id: "u1".to_string(),
            trust_score: 0.8,
            timestamp: 0,
            country: "IN".to_string(),
        }
    }

    #[test]
    fn probable_role_picks_highest_occurrence_count() {
        let mut map = HashMap::new();
        map.insert("plumber".to_string(), classified("plumber", TokenType::Role));
        map.insert("driver".to_string(), classified("driver", TokenType::Role));
        let entries = vec![
            entry(&["plumber"]),
            entry(&["plumber"]),
            entry(&["driver"]),
        ];
        let ctx = mine_context(&entries, &map);
        assert_eq!(ctx.probable_role, Some("plumber".to_string()));
        assert_eq!(ctx.tags, vec!["plumber".to_string(), "driver".to_string()]);
    }

    #[test]
    fn no_role_tokens_yields_none() {
        let map = HashMap::new();
        let entries = vec![entry(&["xyz"])];
        let ctx = mine_context(&entries, &map);
        assert_eq!(ctx.probable_role, None);
    }

    #[test]
    fn relationship_tokens_collected_in_first_seen_order() {
        let mut map = HashMap::new();
        map.insert("papa".to_string(), classified("papa", TokenType::Relationship));
        map.insert("mom".to_string(), classified("mom", TokenType::Relationship));
        let entries = vec![entry(&["mom", "papa", "mom"])];
        let ctx = mine_context(&entries, &map);
        assert_eq!(ctx.relationship_tokens, vec!["mom".to_string(), "papa".to_string()]);
    }
}
