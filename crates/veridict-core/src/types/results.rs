//! Result records: one model's cached output for one media item, and the
//! storage-collaborator record shape they arrive in.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{GroundTruth, MediaType, Rank};

/// Bounding box of a detected face, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One detected face with its detection confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bounds: FaceBounds,
    /// Detection confidence in [0, 1].
    pub score: f64,
}

/// One flagged frame of a video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedFrame {
    pub index: u64,
    pub score: f64,
}

/// One model's cached output for one media item.
///
/// Written once per model run, keyed by media id + model id; a rerun
/// overwrites the entry for that model id only. Optional payload fields that
/// are absent or malformed deserialize to empty, never error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResult {
    pub rank: Rank,
    /// Probability of manipulation in [0, 1].
    pub score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<DetectedFace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<DetectedFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl CachedResult {
    /// A bare rank/score result with no structured payload.
    pub fn new(rank: Rank, score: f64) -> Self {
        Self {
            rank,
            score,
            faces: Vec::new(),
            frames: Vec::new(),
            generator: None,
            rationale: None,
            source_url: None,
        }
    }

    pub fn with_faces(mut self, faces: Vec<DetectedFace>) -> Self {
        self.faces = faces;
        self
    }

    /// Number of faces detected at or above the given confidence.
    pub fn confident_faces(&self, min_score: f64) -> usize {
        self.faces.iter().filter(|f| f.score >= min_score).count()
    }
}

/// A cached result with its model id merged in. Output of the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResult {
    pub model_id: String,
    #[serde(flatten)]
    pub result: CachedResult,
}

impl ModelResult {
    pub fn new(model_id: impl Into<String>, result: CachedResult) -> Self {
        Self {
            model_id: model_id.into(),
            result,
        }
    }

    pub fn rank(&self) -> Rank {
        self.result.rank
    }

    pub fn score(&self) -> f64 {
        self.result.score
    }
}

/// Per-media-item record as supplied by the storage collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub mime_type: String,
    #[serde(default)]
    pub results: FxHashMap<String, CachedResult>,
    #[serde(default)]
    pub visual_ground_truth: GroundTruth,
    #[serde(default)]
    pub audio_ground_truth: GroundTruth,
    #[serde(default)]
    pub verified_source: bool,
}

impl MediaRecord {
    pub fn media_type(&self) -> MediaType {
        MediaType::from_mime(&self.mime_type)
    }
}
