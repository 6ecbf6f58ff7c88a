//! Engine configuration: vote thresholds, decidedness heuristics, and the
//! per-media-type ensemble models.
//!
//! Everything here is operational configuration. The early-decidedness
//! pending cutoff in particular is an empirically tuned heuristic and is
//! deliberately not a hard-coded constant.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::types::MediaType;

/// Tunables for the vote and decision paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineConfig {
    /// Vote total that is `high` regardless of experimental status.
    pub override_votes: u32,
    /// Vote total that maps to `high`.
    pub high_votes: u32,
    /// Vote total that maps to `uncertain`.
    pub uncertain_votes: u32,
    /// With a non-zero vote total, the verdict is considered settled early
    /// once at most this many manipulation models are still pending.
    pub decided_pending_cutoff: usize,
    /// Tolerance for the cache-invalidation score comparison.
    pub score_tolerance: f64,
    pub ensemble: EnsembleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            override_votes: constants::OVERRIDE_VOTES,
            high_votes: constants::HIGH_VOTES,
            uncertain_votes: constants::UNCERTAIN_VOTES,
            decided_pending_cutoff: constants::DEFAULT_DECIDED_PENDING_CUTOFF,
            score_tolerance: constants::SCORE_TOLERANCE,
            ensemble: EnsembleConfig::default(),
        }
    }
}

/// One logistic ensemble: `sigmoid(intercept + Σ weight * score)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnsembleModel {
    pub intercept: f64,
    /// Model id → logistic weight.
    pub weights: FxHashMap<String, f64>,
    /// Ensemble score at or below this is `low`.
    pub low_cutoff: f64,
    /// Ensemble score at or above this is `high`.
    pub high_cutoff: f64,
}

/// Per-media-type ensemble models plus the score substituted for a weighted
/// model that has not produced a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EnsembleConfig {
    pub default_score: f64,
    pub image: Option<EnsembleModel>,
    pub video: Option<EnsembleModel>,
    pub audio: Option<EnsembleModel>,
}

impl EnsembleConfig {
    pub fn model_for(&self, media_type: MediaType) -> Option<&EnsembleModel> {
        match media_type {
            MediaType::Image => self.image.as_ref(),
            MediaType::Video => self.video.as_ref(),
            MediaType::Audio => self.audio.as_ref(),
            MediaType::Unknown => None,
        }
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        let weights = |entries: &[(&str, f64)]| -> FxHashMap<String, f64> {
            entries
                .iter()
                .map(|(id, w)| (id.to_string(), *w))
                .collect()
        };

        Self {
            default_score: constants::DEFAULT_ENSEMBLE_SCORE,
            image: Some(EnsembleModel {
                intercept: -1.9,
                weights: weights(&[
                    ("ufd", 2.1),
                    ("hive-image-genai-v2", 1.6),
                    ("rd-elm-img", 1.3),
                    ("rd-oak-img", 0.9),
                    ("rd-pine-img", 0.7),
                    ("rd-cedar-img", 0.8),
                    ("sensity-image", 1.1),
                ]),
                low_cutoff: 0.2,
                high_cutoff: 0.6,
            }),
            video: Some(EnsembleModel {
                intercept: -1.6,
                weights: weights(&[
                    ("ufd-video", 1.9),
                    ("rd-video", 1.4),
                    ("noiseprint-vid", 0.8),
                    ("rd-swin-vid", 0.9),
                ]),
                low_cutoff: 0.25,
                high_cutoff: 0.65,
            }),
            audio: Some(EnsembleModel {
                intercept: -1.4,
                weights: weights(&[("rd-audio", 1.5), ("sensity-voice", 1.8)]),
                low_cutoff: 0.25,
                high_cutoff: 0.6,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = EngineConfig::default();
        assert_eq!(config.override_votes, 3);
        assert_eq!(config.high_votes, 2);
        assert_eq!(config.uncertain_votes, 1);
        assert_eq!(config.decided_pending_cutoff, 2);
    }

    #[test]
    fn test_ensemble_model_lookup() {
        let config = EngineConfig::default();
        let image = config.ensemble.model_for(MediaType::Image).unwrap();
        assert_eq!(image.low_cutoff, 0.2);
        assert_eq!(image.high_cutoff, 0.6);
        assert!(config.ensemble.model_for(MediaType::Unknown).is_none());
    }
}
