//! Relevance detection: is manipulation-model output even applicable here?
//!
//! Relevance models report on face counts and on the presence of synthetic
//! artwork or on-image text. Their findings become "experimental reasons"
//! that cap the shown verdict at `uncertain`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use veridict_core::{
    EngineConfig, MediaType, ModelRegistry, ModelResult, RelevanceCategory, Verdict,
};

use crate::votes::{count_votes, vote_verdict};

/// A face counts as confidently detected at or above this detection score.
const FACE_CONFIDENCE: f64 = 0.5;

/// Number of confident faces at which an image has "too many" for
/// face-manipulation models to be meaningful.
const MANY_FACES: usize = 5;

/// A relevance-derived flag that downgrades confidence in the vote verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentalReason {
    FacesTooFew,
    FacesTooMany,
    Artwork,
    Text,
}

impl ExperimentalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FacesTooFew => "faces-too-few",
            Self::FacesTooMany => "faces-too-many",
            Self::Artwork => "artwork",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ExperimentalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relevance findings for one media item.
#[derive(Debug, Clone, Default)]
pub struct RelevanceOutcome {
    /// Whether relevance can no longer change: some flag fired, or every
    /// category has no relevant models still pending.
    pub decided: bool,
    pub reasons: SmallVec<[ExperimentalReason; 4]>,
}

/// Run the relevance rules over the current result set.
///
/// Per category: faces uses a majority rule over face-count reports; artwork
/// and text fire on any model reporting a score of exactly 1. For video, a
/// `high` verdict from the audio track alone short-circuits everything —
/// video-specific relevance signals are irrelevant once audio alone proves
/// manipulation.
pub fn detect(
    registry: &ModelRegistry,
    config: &EngineConfig,
    media_type: MediaType,
    results: &[ModelResult],
    pending: &[String],
) -> RelevanceOutcome {
    if media_type == MediaType::Video && audio_track_is_high(registry, config, results) {
        return RelevanceOutcome {
            decided: true,
            reasons: SmallVec::new(),
        };
    }

    let mut reasons = SmallVec::new();
    let mut all_decided = true;

    for &category in RelevanceCategory::all() {
        let models = registry.relevance_models(media_type, category);
        let category_results: Vec<&ModelResult> = results
            .iter()
            .filter(|r| models.iter().any(|m| m.id == r.model_id))
            .collect();
        let category_pending = pending
            .iter()
            .filter(|id| models.iter().any(|m| &m.id == *id))
            .count();

        let flag = match category {
            RelevanceCategory::Faces => face_flag(media_type, &category_results),
            RelevanceCategory::Artwork => {
                exact_score_flag(&category_results, ExperimentalReason::Artwork)
            }
            RelevanceCategory::Text => exact_score_flag(&category_results, ExperimentalReason::Text),
        };

        match flag {
            Some(reason) => reasons.push(reason),
            None if category_pending > 0 => all_decided = false,
            None => {}
        }
    }

    RelevanceOutcome {
        decided: !reasons.is_empty() || all_decided,
        reasons,
    }
}

/// Majority rule over face-count reports.
///
/// With `n` face-relevance results and `threshold = ceil(n / 2)`: too-few
/// fires when at least `threshold` results report zero confident faces;
/// otherwise, for images only, too-many fires when at least `threshold`
/// report five or more. Video skips the too-many rule: a crowd scene would
/// wrongly flag a single-subject video.
fn face_flag(media_type: MediaType, results: &[&ModelResult]) -> Option<ExperimentalReason> {
    let n = results.len();
    if n == 0 {
        return None;
    }
    let threshold = n.div_ceil(2);

    let zero_faces = results
        .iter()
        .filter(|r| r.result.confident_faces(FACE_CONFIDENCE) == 0)
        .count();
    if zero_faces >= threshold {
        return Some(ExperimentalReason::FacesTooFew);
    }

    if media_type == MediaType::Image {
        let many_faces = results
            .iter()
            .filter(|r| r.result.confident_faces(FACE_CONFIDENCE) >= MANY_FACES)
            .count();
        if many_faces >= threshold {
            return Some(ExperimentalReason::FacesTooMany);
        }
    }
    None
}

/// Artwork and text fire on a score of exactly 1.
fn exact_score_flag(
    results: &[&ModelResult],
    reason: ExperimentalReason,
) -> Option<ExperimentalReason> {
    results.iter().any(|r| r.score() == 1.0).then_some(reason)
}

/// Whether the audio track of a video, on its own votes, already reaches
/// `high`.
fn audio_track_is_high(
    registry: &ModelRegistry,
    config: &EngineConfig,
    results: &[ModelResult],
) -> bool {
    let audio_results: Vec<ModelResult> = results
        .iter()
        .filter(|r| {
            registry
                .get(&r.model_id)
                .is_some_and(|m| m.media_type == MediaType::Audio)
        })
        .cloned()
        .collect();
    if audio_results.is_empty() {
        return false;
    }
    let count = count_votes(registry, MediaType::Video, &audio_results, None);
    vote_verdict(config, &count) == Verdict::High
}
