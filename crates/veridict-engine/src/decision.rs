//! Decision orchestration: combines ground truth, verified-source status,
//! votes, ensemble, and relevance into the final externally-visible verdict,
//! including the "should we show results yet" gate.
//!
//! Visible state machine per media item:
//! `unknown → (partial, hidden) → shown(provisional) → shown(final)`.
//! Transitions happen only when new model results arrive or ground truth /
//! trusted-source fields are edited; staleness and timeouts belong to the
//! external scheduler.

use serde::Serialize;
use smallvec::SmallVec;
use tracing::debug;

use veridict_core::{
    EngineConfig, GroundTruth, MediaRecord, MediaType, ModelRegistry, ModelResult, Verdict,
};

use crate::ensemble::ensemble_verdict;
use crate::relevance::{self, ExperimentalReason};
use crate::resolver::resolve_results;
use crate::votes::{
    count_votes, pending_manipulation_count, vote_decided, vote_verdict,
};

/// The aggregate decision for one media item. Ephemeral: recomputed on demand
/// from the current result set, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResult {
    /// Whether enough model results are ready to show anything. Until true,
    /// `verdict` and `experimental_verdict` are forced to `unknown`.
    pub show_results: bool,
    /// Ground-truth / trusted-source overridden tier.
    pub verdict: Verdict,
    /// The tier actually shown to end users: `verdict`, demoted to
    /// `uncertain` when any experimental reason was found.
    pub experimental_verdict: Verdict,
    /// Raw vote-only tier, informational.
    pub vote_verdict: Verdict,
    /// Raw ensemble-only tier, informational.
    pub ensemble_verdict: Verdict,
    pub experimental_reasons: SmallVec<[ExperimentalReason; 4]>,
}

/// Compute the decision for one media item.
///
/// `results` is the ready result set (resolver output), `pending` the model
/// ids still awaiting a run. Pure and deterministic: identical inputs yield
/// identical output.
pub fn compute_verdict(
    registry: &ModelRegistry,
    config: &EngineConfig,
    media_type: MediaType,
    ground_truth: GroundTruth,
    trusted: bool,
    results: &[ModelResult],
    pending: &[String],
) -> DecisionResult {
    // Ground-truth fake outranks a verified source: an operator label that
    // the item is fake is definitive even for trusted uploads.
    let definitive = if ground_truth.is_fake() {
        Some(Verdict::High)
    } else if trusted {
        Some(Verdict::Trusted)
    } else if ground_truth.is_real() {
        Some(Verdict::Low)
    } else {
        None
    };

    let count = count_votes(registry, media_type, results, None);
    let raw_vote_verdict = vote_verdict(config, &count);
    let pending_manipulation = pending_manipulation_count(registry, media_type, pending);
    let vote_is_decided = vote_decided(config, &count, pending_manipulation);
    let outcome = relevance::detect(registry, config, media_type, results, pending);
    let raw_ensemble_verdict = ensemble_verdict(registry, config, media_type, results);

    let show_results = count.manipulation_ready > 0
        && (pending.is_empty() || definitive.is_some() || vote_is_decided || outcome.decided);

    let verdict = if show_results {
        definitive.unwrap_or(raw_vote_verdict)
    } else {
        Verdict::Unknown
    };

    // An overwhelming vote count suppresses relevance-based doubt, and a
    // definitive verdict is beyond doubt entirely.
    let experimental_reasons = if show_results
        && definitive.is_none()
        && count.votes < config.override_votes
    {
        outcome.reasons
    } else {
        SmallVec::new()
    };

    let experimental_verdict = if !experimental_reasons.is_empty() {
        Verdict::Uncertain
    } else {
        verdict
    };

    debug!(
        media_type = %media_type,
        votes = count.votes,
        show_results,
        verdict = %verdict,
        shown = %experimental_verdict,
        "decision computed"
    );

    DecisionResult {
        show_results,
        verdict,
        experimental_verdict,
        vote_verdict: raw_vote_verdict,
        ensemble_verdict: raw_ensemble_verdict,
        experimental_reasons,
    }
}

/// Decide directly over a storage record: resolves the cached results
/// (skipping ignored models) and picks the ground-truth field matching the
/// media type (audio media uses the audio label; video falls back to it when
/// the visual label is unknown).
pub fn decide_record(
    registry: &ModelRegistry,
    config: &EngineConfig,
    record: &MediaRecord,
    pending: &[String],
) -> DecisionResult {
    let media_type = record.media_type();
    let ground_truth = match media_type {
        MediaType::Audio => record.audio_ground_truth,
        MediaType::Video if record.visual_ground_truth == GroundTruth::Unknown => {
            record.audio_ground_truth
        }
        _ => record.visual_ground_truth,
    };
    let results = resolve_results(registry, media_type, &record.results, true);
    compute_verdict(
        registry,
        config,
        media_type,
        ground_truth,
        record.verified_source,
        &results,
        pending,
    )
}
