//! Shared constants for thresholds and defaults.

/// Default per-model cutoff above which a score counts as "uncertain".
pub const DEFAULT_UNCERTAIN_SCORE: f64 = 0.33;

/// Default per-model cutoff above which a score counts as "fake".
pub const DEFAULT_FAKE_SCORE: f64 = 0.5;

/// Vote total that yields `high` regardless of experimental status.
pub const OVERRIDE_VOTES: u32 = 3;

/// Vote total that yields `high`.
pub const HIGH_VOTES: u32 = 2;

/// Vote total that yields `uncertain`.
pub const UNCERTAIN_VOTES: u32 = 1;

/// Maximum number of still-pending manipulation models for which a non-zero
/// vote total is considered settled early.
pub const DEFAULT_DECIDED_PENDING_CUTOFF: usize = 2;

/// Score contributed by a weighted ensemble model that has no result yet.
/// Absence is weak evidence, not neutral.
pub const DEFAULT_ENSEMBLE_SCORE: f64 = 0.25;

/// Absolute score difference below which two results are the same under the
/// cache-invalidation comparison.
pub const SCORE_TOLERANCE: f64 = 1e-9;
