// src/pipeline/consensus.rs — S7
//
// Picks the winning cluster, derives four-factor confidence, and formats
// the final profile. The reasoning trace mirrors the teacher's
// fusion-decision-to-alert-text idiom: totals, winner breakdown,
// runner-up, then the tail of the pipeline's own log.

use crate::config::{ConsensusWeights, ResolverConfig};
use crate::pipeline::tokenizer::capitalize_name;
use crate::types::{ExtractedContext, IdentityProfile, LogRecord, ScoredCluster};

fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

fn confidence_level(confidence: f32, config: &ResolverConfig) -> &'static str {
    if confidence >= config.high_confidence_threshold {
        "high"
    } else if confidence >= config.moderate_confidence_threshold {
        "moderate"
    } else {
        "low"
    }
}

fn four_factor_confidence(
    winner: &ScoredCluster,
    runner_up: Option<&ScoredCluster>,
    total_entries: u64,
    weights: &ConsensusWeights,
    single_cluster_dominance: f32,
) -> (f32, f32, f32, f32, f32) {
    let dominance = match runner_up {
        Some(r) => ((winner.score - r.score) / winner.score.max(0.01)).min(1.0),
        None => single_cluster_dominance,
    };
    let agreement = if total_entries == 0 {
        0.0
    } else {
        (winner.cluster.frequency as f32 / total_entries as f32).min(1.0)
    };
    let reliability = winner.structural_score;
    let trust = winner.trust_weight;

    let confidence = clamp01(
        weights.dominance * dominance
            + weights.agreement * agreement
            + weights.reliability * reliability
            + weights.trust * trust,
    );
    (confidence, dominance, agreement, reliability, trust)
}

fn build_description(
    name: &str,
    probable_role: Option<&str>,
    level: &str,
    frequency: usize,
) -> String {
    let mut s = format!("Identified as {name}");
    if let Some(role) = probable_role {
        s.push_str(&format!(", likely a {role}"));
    }
    s.push_str(&format!(" with {level} confidence"));
    s.push_str(&format!(" based on {frequency} source(s)."));
    s
}

fn build_reasoning(
    scored: &[ScoredCluster],
    winner: &ScoredCluster,
    runner_up: Option<&ScoredCluster>,
    context: &ExtractedContext,
    total_entries: u64,
    logs: &[LogRecord],
) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Resolved from {total_entries} entries across {} clusters.",
        scored.len()
    ));
    lines.push(format!(
        "Winner: \"{}\" score={:.3} freq={} trust={:.3} structural={:.3} unique={:.3} noise={:.3}",
        winner.cluster.representative,
        winner.score,
        winner.cluster.frequency,
        winner.trust_weight,
        winner.structural_score,
        winner.uniqueness_score,
        winner.noise_score,
    ));

    let mut top_variants: Vec<&String> = winner.cluster.variants.iter().collect();
    top_variants.truncate(5);
    if !top_variants.is_empty() {
        lines.push(format!(
            "Top variants: {}",
            top_variants
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    if let Some(r) = runner_up {
        lines.push(format!(
            "Runner-up: \"{}\" score={:.3} freq={}",
            r.cluster.representative, r.score, r.cluster.frequency
        ));
    }

    if !context.tags.is_empty() {
        lines.push(format!("Tags: {}", context.tags.join(", ")));
    }
    if let Some(role) = &context.probable_role {
        lines.push(format!("Probable role: {role}"));
    }

    for log in logs.iter().rev().take(6).collect::<Vec<_>>().into_iter().rev() {
        lines.push(format!("[{}] {}", log.step, log.detail));
    }

    lines.join("\n")
}

/// Resolve the winning cluster into a final profile. Empty `scored` emits
/// the sentinel profile, with tags/role from context still attached.
pub fn resolve_consensus(
    scored: &[ScoredCluster],
    total_entries: u64,
    context: &ExtractedContext,
    config: &ResolverConfig,
    logs: &[LogRecord],
) -> IdentityProfile {
    if scored.is_empty() {
        let mut sentinel = IdentityProfile::sentinel();
        sentinel.tags = context.tags.clone();
        sentinel.probable_role = context.probable_role.clone();
        return sentinel;
    }

    let mut ordered: Vec<&ScoredCluster> = scored.iter().collect();
    ordered.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let winner = ordered[0];
    let runner_up = ordered.get(1).copied();

    let (confidence, _, _, _, _) = four_factor_confidence(
        winner,
        runner_up,
        total_entries,
        &config.consensus,
        config.single_cluster_dominance,
    );
    let confidence = (confidence * 100.0).round() / 100.0;

    let name = capitalize_name(&winner.cluster.representative);
    let level = confidence_level(confidence, config);
    let description = build_description(&name, context.probable_role.as_deref(), level, winner.cluster.frequency);
    let reasoning = build_reasoning(scored, winner, runner_up, context, total_entries, logs);

    IdentityProfile {
        name,
        confidence,
        tags: context.tags.clone(),
        probable_role: context.probable_role.clone(),
        description,
        reasoning,
    }
}
