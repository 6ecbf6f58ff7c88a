//! The Veridict aggregation and decision engine.
//!
//! Ingests independent, asynchronously-arriving detector results and produces
//! one stable, explainable verdict per media item, even while some models are
//! still pending. All aggregation paths are pure, synchronous functions over
//! in-memory data; the one long-running piece, the policy optimizer, runs in
//! its own worker thread behind a message protocol.
//!
//! Data flow: registry → [`resolver`] → { [`relevance`], [`votes`],
//! [`ensemble`] } → [`decision`]. The [`optimizer`] wraps the vote path in a
//! brute-force search over the per-model policy space.

pub mod decision;
pub mod ensemble;
pub mod optimizer;
pub mod relevance;
pub mod resolver;
pub mod votes;

pub use decision::{compute_verdict, decide_record, DecisionResult};
pub use ensemble::{ensemble_score, ensemble_verdict};
pub use optimizer::worker::{OptimizeEvent, OptimizeRequest, OptimizerHandle};
pub use optimizer::{optimize, LabeledSample, ObjectiveBest, OptimizeOutcome, Stats};
pub use relevance::{ExperimentalReason, RelevanceOutcome};
pub use resolver::resolve_results;
pub use votes::{count_votes, vote_decided, vote_verdict, PolicyMap, VoteCount};
