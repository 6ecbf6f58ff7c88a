//! Core types, model registry, config, errors, and tolerant equality for the
//! Veridict decision engine.
//!
//! Everything in this crate is immutable after construction and safe to share
//! across threads. The aggregation logic itself lives in `veridict-engine`;
//! this crate defines the vocabulary it speaks.

pub mod config;
pub mod constants;
pub mod equality;
pub mod errors;
pub mod registry;
pub mod tracing;
pub mod types;

pub use config::{EngineConfig, EnsembleConfig, EnsembleModel};
pub use errors::{OptimizeError, RegistryError};
pub use registry::{ModelDescriptor, ModelRegistry};
pub use types::{
    CachedResult, DetectedFace, DetectedFrame, FaceBounds, GroundTruth, ManipulationCategory,
    MediaRecord, MediaType, ModelKind, ModelResult, Policy, Rank, RelevanceCategory, Verdict,
};
