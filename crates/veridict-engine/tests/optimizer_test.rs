//! Policy optimizer integration tests: search convergence, degenerate
//! inputs, and the worker thread protocol.

use std::sync::atomic::AtomicBool;

use rustc_hash::FxHashMap;
use veridict_core::{
    CachedResult, EngineConfig, ManipulationCategory, MediaType, ModelDescriptor, ModelRegistry,
    Policy, Rank,
};
use veridict_engine::optimizer::worker;
use veridict_engine::{optimize, LabeledSample, OptimizeEvent, OptimizeRequest};

/// Two image detectors: one that tracks the label perfectly and one that
/// inverts it.
fn oracle_registry() -> ModelRegistry {
    ModelRegistry::new(vec![
        ModelDescriptor::manipulation(
            "oracle",
            MediaType::Image,
            ManipulationCategory::Face,
            Policy::Include,
        ),
        ModelDescriptor::manipulation(
            "liar",
            MediaType::Image,
            ManipulationCategory::Face,
            Policy::Include,
        ),
    ])
    .unwrap()
}

fn sample(oracle_score: f64, liar_score: f64, fake: bool) -> LabeledSample {
    let mut results = FxHashMap::default();
    results.insert("oracle".to_string(), CachedResult::new(Rank::High, oracle_score));
    results.insert("liar".to_string(), CachedResult::new(Rank::High, liar_score));
    LabeledSample { results, fake }
}

fn oracle_corpus() -> Vec<LabeledSample> {
    vec![
        sample(0.95, 0.05, true),
        sample(0.91, 0.12, true),
        sample(0.88, 0.03, true),
        sample(0.07, 0.96, false),
        sample(0.11, 0.89, false),
        sample(0.02, 0.93, false),
    ]
}

#[test]
fn test_search_finds_perfect_policy() {
    let registry = oracle_registry();
    let config = EngineConfig::default();
    let cancel = AtomicBool::new(false);

    let outcome = optimize(
        &registry,
        &config,
        MediaType::Image,
        &oracle_corpus(),
        &|_| {},
        &cancel,
    )
    .unwrap();

    // Only trusting the oracle and ignoring the liar classifies every sample:
    // trust alone reaches the high tier, and with the liar silenced the real
    // samples land at low.
    assert_eq!(outcome.accuracy.stats.accuracy(), 1.0);
    assert_eq!(outcome.accuracy.stats.indeterminate, 0);
    assert_eq!(outcome.accuracy.policies["oracle"], Policy::Trust);
    assert_eq!(outcome.accuracy.policies["liar"], Policy::Ignore);
    assert_eq!(outcome.f1.stats.f1(), 1.0);
    assert_eq!(outcome.recall.stats.recall(), 1.0);
    assert_eq!(outcome.precision.stats.precision(), 1.0);
}

#[test]
fn test_empty_model_set_is_trivial() {
    // No audio models in this registry: the search space collapses to the
    // single empty assignment, which is not an error.
    let registry = oracle_registry();
    let config = EngineConfig::default();
    let cancel = AtomicBool::new(false);
    let corpus = vec![sample(0.1, 0.1, false), sample(0.2, 0.2, false)];

    let outcome = optimize(
        &registry,
        &config,
        MediaType::Audio,
        &corpus,
        &|_| {},
        &cancel,
    )
    .unwrap();
    assert!(outcome.accuracy.policies.is_empty());
    // Zero votes predicts real for every sample.
    assert_eq!(outcome.accuracy.stats.true_neg, 2);
    assert_eq!(outcome.accuracy.stats.accuracy(), 1.0);
}

#[test]
fn test_cancellation_aborts_search() {
    let registry = oracle_registry();
    let config = EngineConfig::default();
    let cancel = AtomicBool::new(true);

    let result = optimize(
        &registry,
        &config,
        MediaType::Image,
        &oracle_corpus(),
        &|_| {},
        &cancel,
    );
    assert!(result.is_err());
}

#[test]
fn test_worker_protocol_progress_then_complete() {
    let handle = worker::spawn(oracle_registry(), EngineConfig::default());
    handle
        .submit(OptimizeRequest {
            media_type: MediaType::Image,
            corpus: oracle_corpus(),
        })
        .unwrap();

    let mut last_progress = None;
    let mut outcome = None;
    for event in handle.events().iter() {
        match event {
            OptimizeEvent::Progress(fraction) => {
                assert!((0.0..=1.0).contains(&fraction));
                last_progress = Some(fraction);
            }
            OptimizeEvent::Complete(result) => {
                outcome = Some(result);
                break;
            }
            OptimizeEvent::Failed(message) => panic!("worker failed: {message}"),
        }
    }
    assert_eq!(last_progress, Some(1.0));
    assert_eq!(outcome.unwrap().accuracy.stats.accuracy(), 1.0);
}

#[test]
fn test_worker_wait_returns_outcome() {
    let handle = worker::spawn(oracle_registry(), EngineConfig::default());
    handle
        .submit(OptimizeRequest {
            media_type: MediaType::Image,
            corpus: oracle_corpus(),
        })
        .unwrap();
    let outcome = handle.wait().unwrap();
    assert_eq!(outcome.accuracy.policies["oracle"], Policy::Trust);
}

#[test]
fn test_worker_cancel_fails_the_run() {
    // A wide registry makes the sweep long enough for the cancel to land
    // before completion.
    let mut models = Vec::new();
    for i in 0..14 {
        models.push(ModelDescriptor::manipulation(
            format!("model-{i:02}"),
            MediaType::Image,
            ManipulationCategory::Imagen,
            Policy::Include,
        ));
    }
    let registry = ModelRegistry::new(models).unwrap();

    let mut results = FxHashMap::default();
    for i in 0..14 {
        results.insert(format!("model-{i:02}"), CachedResult::new(Rank::High, 0.9));
    }
    let corpus = vec![
        LabeledSample { results: results.clone(), fake: true },
        LabeledSample { results, fake: false },
    ];

    let handle = worker::spawn(registry, EngineConfig::default());
    handle
        .submit(OptimizeRequest {
            media_type: MediaType::Image,
            corpus,
        })
        .unwrap();
    handle.cancel();
    assert!(handle.wait().is_err());
}

#[test]
fn test_dropping_idle_handle_does_not_hang() {
    let handle = worker::spawn(oracle_registry(), EngineConfig::default());
    drop(handle);
}
