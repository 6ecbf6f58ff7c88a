//! Offline policy optimizer: exhaustive search over the discrete space of
//! per-model policies, maximizing accuracy, F1, precision, and recall
//! against a labeled corpus.
//!
//! The space is 3^N assignments for N enabled manipulation models; N is
//! typically ≤ 15, so combinations run into the low millions. Tractable as
//! an offline batch job, never per-request. The sweep is parallelized with
//! rayon, reports progress roughly every [`PROGRESS_EVERY`] combinations,
//! and checks a cancellation token between combinations.

pub mod worker;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use veridict_core::{
    CachedResult, EngineConfig, MediaType, ModelRegistry, ModelResult, OptimizeError, Policy,
    Verdict,
};

use crate::relevance;
use crate::resolver::resolve_results;
use crate::votes::{count_votes, vote_verdict, PolicyMap};

/// Progress is reported after every chunk of this many combinations.
pub const PROGRESS_EVERY: u64 = 1000;

/// One labeled corpus item: a cached result map plus its human label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledSample {
    pub results: FxHashMap<String, CachedResult>,
    /// True when the item is known manipulated.
    pub fake: bool,
}

/// Confusion counts for one policy assignment over the corpus.
///
/// `indeterminate` counts items whose vote landed in `uncertain` or was
/// vetoed by experimental status. All ratio accessors return 0 rather than
/// NaN when their denominator is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: u64,
    pub true_pos: u64,
    pub false_pos: u64,
    pub true_neg: u64,
    pub false_neg: u64,
    pub indeterminate: u64,
}

impl Stats {
    fn ratio(numerator: u64, denominator: u64) -> f64 {
        if denominator == 0 {
            0.0
        } else {
            numerator as f64 / denominator as f64
        }
    }

    pub fn accuracy(&self) -> f64 {
        Self::ratio(self.true_pos + self.true_neg, self.total)
    }

    pub fn precision(&self) -> f64 {
        Self::ratio(self.true_pos, self.true_pos + self.false_pos)
    }

    pub fn recall(&self) -> f64 {
        Self::ratio(self.true_pos, self.true_pos + self.false_neg)
    }

    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }

    pub fn false_positive_rate(&self) -> f64 {
        Self::ratio(self.false_pos, self.false_pos + self.true_neg)
    }

    /// Record one prediction. `None` means indeterminate.
    pub fn record(&mut self, predicted: Option<bool>, fake: bool) {
        self.total += 1;
        match (predicted, fake) {
            (None, _) => self.indeterminate += 1,
            (Some(true), true) => self.true_pos += 1,
            (Some(true), false) => self.false_pos += 1,
            (Some(false), false) => self.true_neg += 1,
            (Some(false), true) => self.false_neg += 1,
        }
    }
}

/// Best-so-far policy assignment for one objective.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveBest {
    pub policies: PolicyMap,
    pub stats: Stats,
}

/// Final result of one optimization run: the winning assignment per
/// objective.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeOutcome {
    pub accuracy: ObjectiveBest,
    pub f1: ObjectiveBest,
    pub precision: ObjectiveBest,
    pub recall: ObjectiveBest,
}

/// Best candidate tracked during the sweep: metric value, combination index,
/// and the stats that produced it. Ties keep the lower index so the parallel
/// sweep matches a sequential first-best scan.
#[derive(Debug, Clone, Copy)]
struct Best {
    value: f64,
    index: u64,
    stats: Stats,
}

impl Default for Best {
    fn default() -> Self {
        Self {
            value: -1.0,
            index: u64::MAX,
            stats: Stats::default(),
        }
    }
}

impl Best {
    fn offer(&mut self, value: f64, index: u64, stats: &Stats) {
        if value > self.value || (value == self.value && index < self.index) {
            self.value = value;
            self.index = index;
            self.stats = *stats;
        }
    }

    fn merge(mut self, other: Best) -> Best {
        self.offer(other.value, other.index, &other.stats);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BestSet {
    accuracy: Best,
    f1: Best,
    precision: Best,
    recall: Best,
}

impl BestSet {
    fn offer(&mut self, index: u64, stats: &Stats) {
        self.accuracy.offer(stats.accuracy(), index, stats);
        self.f1.offer(stats.f1(), index, stats);
        self.precision.offer(stats.precision(), index, stats);
        self.recall.offer(stats.recall(), index, stats);
    }

    fn merge(self, other: BestSet) -> BestSet {
        BestSet {
            accuracy: self.accuracy.merge(other.accuracy),
            f1: self.f1.merge(other.f1),
            precision: self.precision.merge(other.precision),
            recall: self.recall.merge(other.recall),
        }
    }
}

/// Decode a combination index into a policy assignment over the id-sorted
/// model list: ternary digits, least significant first.
fn decode_policies(model_ids: &[String], index: u64) -> PolicyMap {
    let mut map = PolicyMap::default();
    let mut remainder = index;
    for id in model_ids {
        let digit = (remainder % 3) as usize;
        map.insert(id.clone(), Policy::all()[digit]);
        remainder /= 3;
    }
    map
}

/// Pre-resolved corpus item. Relevance does not depend on the candidate
/// policies, so the experimental veto is computed once up front.
struct Prepared {
    results: Vec<ModelResult>,
    fake: bool,
    has_reasons: bool,
}

/// Run the exhaustive policy search.
///
/// `progress` receives fractions in [0, 1]; `cancel` is checked between
/// combinations, and a set token aborts with [`OptimizeError::Cancelled`].
/// An empty model set degenerates to the single trivial combination, which
/// is not an error.
pub fn optimize(
    registry: &ModelRegistry,
    config: &EngineConfig,
    media_type: MediaType,
    corpus: &[LabeledSample],
    progress: &(dyn Fn(f64) + Sync),
    cancel: &AtomicBool,
) -> Result<OptimizeOutcome, OptimizeError> {
    let model_ids: Vec<String> = registry
        .enabled_manipulation_models(media_type)
        .iter()
        .map(|m| m.id.clone())
        .collect();
    let total = 3u64
        .checked_pow(model_ids.len() as u32)
        .unwrap_or(u64::MAX);

    info!(
        media_type = %media_type,
        models = model_ids.len(),
        combinations = total,
        samples = corpus.len(),
        "policy search started"
    );

    let prepared: Vec<Prepared> = corpus
        .iter()
        .map(|sample| {
            let results = resolve_results(registry, media_type, &sample.results, false);
            let outcome = relevance::detect(registry, config, media_type, &results, &[]);
            Prepared {
                results,
                fake: sample.fake,
                has_reasons: !outcome.reasons.is_empty(),
            }
        })
        .collect();

    let evaluate = |index: u64| -> Stats {
        let overrides = decode_policies(&model_ids, index);
        let mut stats = Stats::default();
        for sample in &prepared {
            let count = count_votes(registry, media_type, &sample.results, Some(&overrides));
            let verdict = vote_verdict(config, &count);
            let vetoed = sample.has_reasons && count.votes < config.override_votes;
            let predicted = if vetoed {
                None
            } else {
                match verdict {
                    Verdict::High => Some(true),
                    Verdict::Low => Some(false),
                    _ => None,
                }
            };
            stats.record(predicted, sample.fake);
        }
        stats
    };

    let done = AtomicU64::new(0);
    let best = (0..total)
        .into_par_iter()
        .try_fold(BestSet::default, |mut acc, index| {
            if cancel.load(Ordering::Relaxed) {
                return Err(OptimizeError::Cancelled);
            }
            let stats = evaluate(index);
            acc.offer(index, &stats);
            let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
            if completed % PROGRESS_EVERY == 0 {
                progress(completed as f64 / total as f64);
            }
            Ok(acc)
        })
        .try_reduce(BestSet::default, |a, b| Ok(a.merge(b)))?;

    progress(1.0);
    info!(media_type = %media_type, "policy search finished");

    let objective = |b: Best| ObjectiveBest {
        policies: decode_policies(&model_ids, b.index),
        stats: b.stats,
    };
    Ok(OptimizeOutcome {
        accuracy: objective(best.accuracy),
        f1: objective(best.f1),
        precision: objective(best.precision),
        recall: objective(best.recall),
    })
}
