// src/pipeline/tokenizer.rs — S1
//
// Strips junk characters, splits into lowercase tokens, and (as an
// implementation detail used by the classifier) remembers which tokens
// were capitalized in the source text before lowering.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{CleanedEntry, CrowdEntry, TokenFeatures};

static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "[",
        "\u{1F300}-\u{1FAFF}",
        "\u{2600}-\u{27BF}",
        "\u{FE00}-\u{FE0F}",
        "\u{200D}",
        "\u{20E3}",
        "]",
    ))
    .unwrap()
});

static BRACKET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}").unwrap()
});

static JUNK_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[!@#$%^&*=_~|\\<>/]{2,}").unwrap()
});

static DISALLOWED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "[^A-Za-z",
        r"\p{Devanagari}\p{Bengali}\p{Gurmukhi}\p{Gujarati}\p{Oriya}",
        r"\p{Tamil}\p{Telugu}\p{Kannada}\p{Malayalam}",
        r" .\-']",
    ))
    .unwrap()
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn is_upper_codepoint(c: char) -> bool {
    c.is_uppercase()
}

/// Normalize one crowd entry. Returns `None` when the raw name is empty,
/// whitespace-only, or collapses entirely under the character pipeline.
pub fn normalize_entry(entry: &CrowdEntry) -> Option<CleanedEntry> {
    let raw = entry.saved_name.trim();
    if raw.is_empty() {
        return None;
    }

    let step1 = EMOJI_RE.replace_all(raw, "");
    let step2 = BRACKET_RE.replace_all(&step1, "");
    let step3 = JUNK_RUN_RE.replace_all(&step2, " ");
    let step4 = DISALLOWED_RE.replace_all(&step3, " ");
    let step5 = WHITESPACE_RE.replace_all(step4.trim(), " ");

    let mut tokens = Vec::new();
    let mut cap_flags = Vec::new();
    for word in step5.split_whitespace() {
        let trimmed = word.trim_matches(|c| c == '.' || c == '-' || c == '\'');
        if trimmed.is_empty() {
            continue;
        }
        let capitalized = trimmed.chars().next().map(is_upper_codepoint).unwrap_or(false);
        cap_flags.push(capitalized);
        tokens.push(trimmed.to_lowercase());
    }

    if tokens.is_empty() {
        return None;
    }

    Some(CleanedEntry {
        raw: entry.saved_name.clone(),
        cleaned: tokens.join(" "),
        tokens,
        user_id: entry.user_id.clone(),
        trust_score: entry.trust_score,
        timestamp: entry.timestamp,
        country: entry.country.clone(),
    })
}

/// Per-position capitalization flags, parallel to `CleanedEntry.tokens`.
/// Not part of the documented data model; an implementation aid so the
/// classifier can see "was this occurrence capitalized in the source
/// text" without re-parsing `raw`.
pub fn capitalization_flags(entry: &CrowdEntry) -> Vec<bool> {
    let raw = entry.saved_name.trim();
    let step1 = EMOJI_RE.replace_all(raw, "");
    let step2 = BRACKET_RE.replace_all(&step1, "");
    let step3 = JUNK_RUN_RE.replace_all(&step2, " ");
    let step4 = DISALLOWED_RE.replace_all(&step3, " ");
    let step5 = WHITESPACE_RE.replace_all(step4.trim(), " ");

    step5
        .split_whitespace()
        .filter_map(|word| {
            let trimmed = word.trim_matches(|c| c == '.' || c == '-' || c == '\'');
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.chars().next().map(is_upper_codepoint).unwrap_or(false))
            }
        })
        .collect()
}

/// Extract the intrinsic per-token features used by the classifier.
/// Counts are taken over the lowercased token, per the spec; capitalized
/// is supplied by the caller (from `capitalization_flags`) since a bare
/// lowercase string can never itself look capitalized.
pub fn extract_token_features(token: &str, is_capitalized: bool) -> TokenFeatures {
    let length = token.chars().count();
    if length == 0 {
        return TokenFeatures {
            length: 0,
            alphabet_ratio: 0.0,
            numeric_ratio: 0.0,
            is_capitalized,
        };
    }
    let alpha = token.chars().filter(|c| c.is_alphabetic()).count();
    let digits = token.chars().filter(|c| c.is_ascii_digit()).count();
    TokenFeatures {
        length,
        alphabet_ratio: alpha as f32 / length as f32,
        numeric_ratio: digits as f32 / length as f32,
        is_capitalized,
    }
}

/// Title-case each whitespace-separated word: first code unit uppercased,
/// rest lowercased.
pub fn capitalize_name(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
