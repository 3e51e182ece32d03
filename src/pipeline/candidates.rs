// src/pipeline/candidates.rs — S3
//
// Filters each entry's classified tokens down to the name-bearing
// subsequence and emits one NameCandidate per entry that has any left.

use std::collections::HashMap;

use crate::types::{CleanedEntry, ClassifiedToken, EntryRef, NameCandidate, TokenType};

fn keep(token: &ClassifiedToken) -> bool {
    match token.token_type {
        TokenType::Relationship | TokenType::Descriptor | TokenType::Noise => false,
        TokenType::NameLikely => true,
        _ => token.name_score > 0.35,
    }
}

/// Extract one candidate per cleaned entry that retains at least one
/// name-bearing token, preserving source order.
pub fn extract_candidates(
    entries: &[CleanedEntry],
    classified: &HashMap<String, ClassifiedToken>,
) -> Vec<NameCandidate> {
    let mut out = Vec::new();
    for entry in entries {
        let kept: Vec<ClassifiedToken> = entry
            .tokens
            .iter()
            .filter_map(|t| classified.get(t))
            .filter(|c| keep(c))
            .cloned()
            .collect();

        if kept.is_empty() {
            continue;
        }

        let name = kept
            .iter()
            .map(|c| c.token.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        out.push(NameCandidate {
            name,
            tokens: kept,
            source_entry: EntryRef {
                user_id: entry.user_id.clone(),
                trust_score: entry.trust_score,
            },
        });
    }
    out
}
