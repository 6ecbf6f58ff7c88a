//! Vote aggregation: the primary production decision algorithm.
//!
//! Each manipulation-model result whose score crosses its model's fake cutoff
//! contributes a policy-weighted vote (ignore = 0, include = 1, trust = 2);
//! the total maps to a three-tier verdict with one special case for
//! noise-only evidence.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use veridict_core::{
    EngineConfig, ManipulationCategory, MediaType, ModelRegistry, ModelResult, Policy, Rank,
    Verdict,
};

/// Candidate policy assignment, `model id → policy`. Overrides the registry
/// policy during an optimizer replay.
pub type PolicyMap = FxHashMap<String, Policy>;

/// Outcome of a vote count over one result set.
#[derive(Debug, Clone, Default)]
pub struct VoteCount {
    /// Weighted vote total.
    pub votes: u32,
    /// Manipulation categories of the models that contributed a non-zero
    /// vote. Feeds the noise special case.
    pub contributors: SmallVec<[ManipulationCategory; 4]>,
    /// Number of manipulation-model results present and applicable, voting
    /// or not. Feeds the show-results gate.
    pub manipulation_ready: usize,
}

/// Count weighted fake votes over manipulation-model results.
///
/// A result votes `0` when its model's effective policy is `ignore`, its rank
/// is `n/a`, or its score is below the model's fake cutoff; otherwise it
/// votes the policy weight. Relevance models and results that do not apply to
/// this media type never vote. `overrides` substitutes candidate policies
/// during optimization.
pub fn count_votes(
    registry: &ModelRegistry,
    media_type: MediaType,
    results: &[ModelResult],
    overrides: Option<&PolicyMap>,
) -> VoteCount {
    let mut count = VoteCount::default();
    for result in results {
        let Some(descriptor) = registry.get(&result.model_id) else {
            continue;
        };
        let Some(category) = descriptor.kind.manipulation_category() else {
            continue;
        };
        if !descriptor.applies_to(media_type) {
            continue;
        }
        count.manipulation_ready += 1;

        let policy = overrides
            .and_then(|map| map.get(&result.model_id).copied())
            .unwrap_or_else(|| descriptor.policy_for(media_type));
        if policy == Policy::Ignore
            || result.rank() == Rank::NotApplicable
            || result.score() < descriptor.fake_score
        {
            continue;
        }

        count.votes += policy.vote_weight();
        count.contributors.push(category);
    }
    count
}

/// The noise special case, shared by the production verdict and the offline
/// optimizer so the rule cannot drift apart between them.
///
/// Visual-noise detectors are comparatively unreliable as sole evidence: a
/// vote total sitting exactly at the `high` threshold is capped when every
/// contributing fake vote came from `noise`-category models.
pub fn noise_limited(config: &EngineConfig, count: &VoteCount) -> bool {
    count.votes == config.high_votes
        && !count.contributors.is_empty()
        && count
            .contributors
            .iter()
            .all(|c| *c == ManipulationCategory::Noise)
}

/// Map a vote count to the three-tier vote verdict.
pub fn vote_verdict(config: &EngineConfig, count: &VoteCount) -> Verdict {
    if noise_limited(config, count) {
        return Verdict::Uncertain;
    }
    if count.votes >= config.high_votes {
        Verdict::High
    } else if count.votes >= config.uncertain_votes {
        Verdict::Uncertain
    } else {
        Verdict::Low
    }
}

/// Whether the vote outcome can still change as pending models finish.
///
/// Decided once the total exceeds the `uncertain` threshold (another vote can
/// only keep it at `high`), or once there are votes and so few manipulation
/// models still pending that the outcome cannot plausibly flip.
pub fn vote_decided(config: &EngineConfig, count: &VoteCount, pending_manipulation: usize) -> bool {
    count.votes > config.uncertain_votes
        || (count.votes > 0 && pending_manipulation <= config.decided_pending_cutoff)
}

/// Number of still-pending model ids that are applicable manipulation models.
pub fn pending_manipulation_count(
    registry: &ModelRegistry,
    media_type: MediaType,
    pending: &[String],
) -> usize {
    pending
        .iter()
        .filter_map(|id| registry.get(id))
        .filter(|m| m.kind.is_manipulation() && m.applies_to(media_type))
        .count()
}
