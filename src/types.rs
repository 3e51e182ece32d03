// src/types.rs
//
// Shared data types flowing through the identity resolution pipeline.
// Mirrors the shape of the data model section of the resolver spec: raw
// crowd entries in, an IdentityProfile out, with the intermediate stage
// types (CleanedEntry, ClassifiedToken, NameCluster, ...) in between.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Input ──────────────────────────────────────────────────────────────────

/// One crowdsourced saved-name contribution for a phone number. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrowdEntry {
    pub saved_name:  String,
    pub user_id:     String,
    pub timestamp:   i64,
    pub country:     String,
    pub trust_score: f32,
}

// ── S1 output ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanedEntry {
    pub raw:         String,
    pub cleaned:     String,
    pub tokens:      Vec<String>,
    pub user_id:     String,
    pub trust_score: f32,
    pub timestamp:   i64,
    pub country:     String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenFeatures {
    pub length:         usize,
    pub alphabet_ratio: f32,
    pub numeric_ratio:  f32,
    pub is_capitalized: bool,
}

impl TokenFeatures {
    pub fn char_pattern(token: &str) -> String {
        const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];
        token
            .chars()
            .take(8)
            .map(|c| {
                if c.is_ascii_digit() {
                    'D'
                } else if VOWELS.contains(&c) {
                    'V'
                } else if c.is_ascii_alphabetic() {
                    'C'
                } else {
                    'X'
                }
            })
            .collect()
    }
}

// ── Corpus-wide statistics cache ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenStats {
    pub global_frequency:    u64,
    pub number_count:        u64,
    pub position_first_pct:  f32,
    pub position_last_pct:   f32,
    pub solo_frequency:      u64,
    pub avg_trust_weight:    f32,
}

pub type TokenStatsMap = HashMap<String, TokenStats>;

// ── S2 output ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    NameLikely,
    Relationship,
    Role,
    Organization,
    Descriptor,
    Noise,
}

impl TokenType {
    /// Declaration order used both as the score-vector index and as the
    /// tie-break order for arg-max.
    pub const ORDER: [TokenType; 6] = [
        TokenType::NameLikely,
        TokenType::Relationship,
        TokenType::Role,
        TokenType::Organization,
        TokenType::Descriptor,
        TokenType::Noise,
    ];

    pub fn index(self) -> usize {
        Self::ORDER.iter().position(|t| *t == self).unwrap()
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenType::NameLikely => "name_likely",
            TokenType::Relationship => "relationship",
            TokenType::Role => "role",
            TokenType::Organization => "organization",
            TokenType::Descriptor => "descriptor",
            TokenType::Noise => "noise",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedToken {
    pub token:       String,
    pub features:    TokenFeatures,
    pub stats:       Option<TokenStats>,
    pub token_type:  TokenType,
    pub probability: f32,
    pub name_score:  f32,
}

// ── S3 output ────────────────────────────────────────────────────────────

/// Compact view of the contributing entry, inlined to avoid a borrow back
/// into `CleanedEntry` (see DESIGN.md — cyclic ownership risk).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRef {
    pub user_id:     String,
    pub trust_score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameCandidate {
    pub name:        String,
    pub tokens:      Vec<ClassifiedToken>,
    pub source_entry: EntryRef,
}

// ── S4 output ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameCluster {
    pub representative:   String,
    pub variants:         Vec<String>,
    pub entries:          Vec<NameCandidate>,
    pub frequency:        usize,
    pub total_trust_weight: f32,
    pub user_ids:         Vec<String>,
}

// ── S5 output ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCluster {
    pub cluster:          NameCluster,
    pub score:            f32,
    pub frequency_weight: f32,
    pub trust_weight:     f32,
    pub structural_score: f32,
    pub uniqueness_score: f32,
    pub noise_score:      f32,
}

// ── S6 output ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedContext {
    pub tags:               Vec<String>,
    pub probable_role:      Option<String>,
    pub role_tokens:        Vec<String>,
    pub relationship_tokens: Vec<String>,
    pub descriptor_tokens:  Vec<String>,
}

// ── S7 output ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub name:           String,
    pub confidence:     f32,
    pub tags:           Vec<String>,
    pub probable_role:  Option<String>,
    pub description:    String,
    pub reasoning:      String,
}

impl IdentityProfile {
    pub fn sentinel() -> Self {
        Self {
            name: "Unknown".to_string(),
            confidence: 0.0,
            tags: Vec::new(),
            probable_role: None,
            description: "No reliable identity could be determined from the available sources."
                .to_string(),
            reasoning: "No candidate clusters survived the pipeline.".to_string(),
        }
    }
}

// ── Ambient: pipeline log trace ─────────────────────────────────────────────

/// A pure value emitted by the orchestrator at each stage boundary.
/// Independent of the `tracing` events emitted for operational visibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub step:      String,
    pub detail:    String,
    pub timestamp: i64,
}

impl LogRecord {
    pub fn new(step: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            detail: detail.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
