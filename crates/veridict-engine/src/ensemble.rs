//! Ensemble aggregation: an alternative logistic decision model per media
//! type, used for offline comparison. It never feeds the shown verdict.

use veridict_core::{EngineConfig, EnsembleModel, MediaType, ModelRegistry, ModelResult, Verdict};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Logistic score for one ensemble model over the current result set.
///
/// A configured model with no result contributes `weight * default_score`
/// instead of being omitted: absence of a result is weak evidence, not
/// neutral. Weights iterate in id order so the floating-point sum is
/// reproducible.
fn logistic_score(model: &EnsembleModel, default_score: f64, results: &[ModelResult]) -> f64 {
    let mut weighted: Vec<(&String, f64)> = model.weights.iter().map(|(id, w)| (id, *w)).collect();
    weighted.sort_by(|a, b| a.0.cmp(b.0));

    let mut z = model.intercept;
    for (id, weight) in weighted {
        let score = results
            .iter()
            .find(|r| &r.model_id == id)
            .map(|r| r.score())
            .unwrap_or(default_score);
        z += weight * score;
    }
    sigmoid(z)
}

fn tier(model: &EnsembleModel, score: f64) -> Verdict {
    if score <= model.low_cutoff {
        Verdict::Low
    } else if score >= model.high_cutoff {
        Verdict::High
    } else {
        Verdict::Uncertain
    }
}

/// Ensemble score in [0, 1] for the media type, if one is configured.
pub fn ensemble_score(
    config: &EngineConfig,
    media_type: MediaType,
    results: &[ModelResult],
) -> Option<f64> {
    let model = config.ensemble.model_for(media_type)?;
    Some(logistic_score(model, config.ensemble.default_score, results))
}

/// Ensemble verdict for the media type.
///
/// For video, the video-model tier and the audio-track tier are computed
/// independently and the worse one wins: manipulation in either track taints
/// the whole video.
pub fn ensemble_verdict(
    registry: &ModelRegistry,
    config: &EngineConfig,
    media_type: MediaType,
    results: &[ModelResult],
) -> Verdict {
    match media_type {
        MediaType::Video => {
            let video_tier = single_tier(config, MediaType::Video, results);
            let audio_results: Vec<ModelResult> = results
                .iter()
                .filter(|r| {
                    registry
                        .get(&r.model_id)
                        .is_some_and(|m| m.media_type == MediaType::Audio)
                })
                .cloned()
                .collect();
            let audio_tier = single_tier(config, MediaType::Audio, &audio_results);
            video_tier.worse(audio_tier)
        }
        _ => single_tier(config, media_type, results),
    }
}

fn single_tier(config: &EngineConfig, media_type: MediaType, results: &[ModelResult]) -> Verdict {
    match config.ensemble.model_for(media_type) {
        Some(model) => tier(
            model,
            logistic_score(model, config.ensemble.default_score, results),
        ),
        None => Verdict::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;
    use veridict_core::{CachedResult, EnsembleConfig, Rank};

    fn model(intercept: f64, weights: &[(&str, f64)], low: f64, high: f64) -> EnsembleModel {
        EnsembleModel {
            intercept,
            weights: weights
                .iter()
                .map(|(id, w)| (id.to_string(), *w))
                .collect::<FxHashMap<_, _>>(),
            low_cutoff: low,
            high_cutoff: high,
        }
    }

    fn result(id: &str, score: f64) -> ModelResult {
        ModelResult::new(id, CachedResult::new(Rank::Uncertain, score))
    }

    #[test]
    fn test_absent_model_uses_default_score() {
        let mut config = EngineConfig::default();
        config.ensemble = EnsembleConfig {
            default_score: 0.25,
            image: Some(model(0.0, &[("a", 1.0), ("b", 1.0)], 0.2, 0.6)),
            video: None,
            audio: None,
        };

        // Only "a" has a result; "b" contributes 1.0 * 0.25, not 0.
        let with_default =
            ensemble_score(&config, MediaType::Image, &[result("a", 0.5)]).unwrap();
        let expected = sigmoid(0.5 + 0.25);
        assert!((with_default - expected).abs() < 1e-12);

        let if_omitted = sigmoid(0.5);
        assert!((with_default - if_omitted).abs() > 1e-3);
    }

    #[test]
    fn test_cutoff_mapping() {
        let mut config = EngineConfig::default();
        config.ensemble = EnsembleConfig {
            default_score: 0.0,
            image: Some(model(0.0, &[("a", 8.0)], 0.2, 0.6)),
            video: None,
            audio: None,
        };

        // a = 0: sigmoid(0) = 0.5 → uncertain
        let registry = ModelRegistry::builtin();
        let v = ensemble_verdict(&registry, &config, MediaType::Image, &[result("a", 0.0)]);
        assert_eq!(v, Verdict::Uncertain);

        // a = 1: sigmoid(8) ≈ 1 → high
        let v = ensemble_verdict(&registry, &config, MediaType::Image, &[result("a", 1.0)]);
        assert_eq!(v, Verdict::High);

        // a = -1: sigmoid(-8) ≈ 0 → low
        let v = ensemble_verdict(&registry, &config, MediaType::Image, &[result("a", -1.0)]);
        assert_eq!(v, Verdict::Low);
    }

    #[test]
    fn test_video_takes_worse_of_tracks() {
        let registry = ModelRegistry::builtin();
        let config = EngineConfig::default();

        // Innocuous video models, screaming audio model.
        let results = vec![
            result("ufd-video", 0.0),
            result("rd-video", 0.0),
            result("noiseprint-vid", 0.0),
            result("rd-swin-vid", 0.0),
            result("rd-audio", 1.0),
            result("sensity-voice", 1.0),
        ];
        let combined = ensemble_verdict(&registry, &config, MediaType::Video, &results);

        let audio_only: Vec<ModelResult> = results[4..].to_vec();
        let audio_tier = ensemble_verdict(&registry, &config, MediaType::Audio, &audio_only);
        assert_eq!(combined, combined.worse(audio_tier));
        assert!(combined.severity() >= audio_tier.severity());
    }

    #[test]
    fn test_unconfigured_media_type_is_unknown() {
        let registry = ModelRegistry::builtin();
        let config = EngineConfig::default();
        assert_eq!(
            ensemble_verdict(&registry, &config, MediaType::Unknown, &[]),
            Verdict::Unknown
        );
        assert!(ensemble_score(&config, MediaType::Unknown, &[]).is_none());
    }
}
