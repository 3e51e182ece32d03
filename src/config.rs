// src/config.rs
//
// Every tunable numeric constant named by the spec, collected so they can
// be overridden from a TOML/JSON file instead of baked in. Defaults
// reproduce the spec's literal constants exactly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerWeights {
    pub frequency:  f32,
    pub trust:      f32,
    pub structural: f32,
    pub uniqueness: f32,
    pub noise:      f32,
}

impl Default for ScorerWeights {
    fn default() -> Self {
        Self {
            frequency:  0.30,
            trust:      0.25,
            structural: 0.25,
            uniqueness: 0.15,
            noise:      0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusWeights {
    pub dominance:   f32,
    pub agreement:   f32,
    pub reliability: f32,
    pub trust:       f32,
}

impl Default for ConsensusWeights {
    fn default() -> Self {
        Self {
            dominance:   0.25,
            agreement:   0.35,
            reliability: 0.20,
            trust:       0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub scorer:    ScorerWeights,
    pub consensus: ConsensusWeights,
    pub high_confidence_threshold:     f32,
    pub moderate_confidence_threshold: f32,
    pub min_learn_token_len:           usize,
    pub single_cluster_dominance:      f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            scorer: ScorerWeights::default(),
            consensus: ConsensusWeights::default(),
            high_confidence_threshold:     0.8,
            moderate_confidence_threshold: 0.5,
            min_learn_token_len:           2,
            single_cluster_dominance:      0.8,
        }
    }
}
