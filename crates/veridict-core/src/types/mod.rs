//! Closed vocabulary of the decision engine.
//!
//! Every concept the source data expresses as a string literal (rank, policy,
//! verdict, categories, ground truth) is a closed enum here, so adding a tier
//! or category is a compile-time-enforced change at every match site.

mod results;

pub use results::{
    CachedResult, DetectedFace, DetectedFrame, FaceBounds, MediaRecord, ModelResult,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shared `Display` body delegating to `as_str`.
macro_rules! fmt_as_str {
    () => {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    };
}

/// Kind of media an item or model deals with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
    Image,
    Unknown,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Unknown => "unknown",
        }
    }

    /// Derive the media type from a MIME type string.
    pub fn from_mime(mime: &str) -> Self {
        match mime.split('/').next() {
            Some("video") => Self::Video,
            Some("audio") => Self::Audio,
            Some("image") => Self::Image,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for MediaType {
    fmt_as_str!();
}

/// One model's coarse opinion for one media item.
///
/// `NotApplicable` means the model ran but has no opinion (e.g. a relevance
/// model); it contributes zero votes but is retained for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Unknown,
    #[serde(rename = "n/a")]
    NotApplicable,
    Low,
    Uncertain,
    High,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::NotApplicable => "n/a",
            Self::Low => "low",
            Self::Uncertain => "uncertain",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Rank {
    fmt_as_str!();
}

/// Per-model setting controlling whether and how strongly its vote counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    Ignore,
    Include,
    Trust,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Include => "include",
            Self::Trust => "trust",
        }
    }

    /// Weight of one fake-scoring vote under this policy.
    pub fn vote_weight(&self) -> u32 {
        match self {
            Self::Ignore => 0,
            Self::Include => 1,
            Self::Trust => 2,
        }
    }

    /// All policies, in enumeration order used by the optimizer.
    pub fn all() -> &'static [Policy] {
        &[Self::Ignore, Self::Include, Self::Trust]
    }
}

impl fmt::Display for Policy {
    fmt_as_str!();
}

/// Final coarse classification for one media item.
///
/// `Trusted` and `Low` are the same confidence tier; `Trusted` additionally
/// signals a verified source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Unknown,
    Trusted,
    Low,
    Uncertain,
    High,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Trusted => "trusted",
            Self::Low => "low",
            Self::Uncertain => "uncertain",
            Self::High => "high",
        }
    }

    /// Severity ordering: `High > Uncertain > Low == Trusted > Unknown`.
    pub fn severity(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Trusted | Self::Low => 1,
            Self::Uncertain => 2,
            Self::High => 3,
        }
    }

    /// The more severe of two verdicts.
    pub fn worse(self, other: Verdict) -> Verdict {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Verdict {
    fmt_as_str!();
}

/// What a manipulation model actually detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManipulationCategory {
    Face,
    Imagen,
    Noise,
    Audio,
    Semantic,
    Other,
}

impl ManipulationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Imagen => "imagen",
            Self::Noise => "noise",
            Self::Audio => "audio",
            Self::Semantic => "semantic",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ManipulationCategory {
    fmt_as_str!();
}

/// Applicability signal a relevance model reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceCategory {
    Faces,
    Artwork,
    Text,
}

impl RelevanceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faces => "faces",
            Self::Artwork => "artwork",
            Self::Text => "text",
        }
    }

    pub fn all() -> &'static [RelevanceCategory] {
        &[Self::Faces, Self::Artwork, Self::Text]
    }
}

impl fmt::Display for RelevanceCategory {
    fmt_as_str!();
}

/// Role of a model: scoring manipulation likelihood, or gauging whether
/// manipulation scores are applicable at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "category", rename_all = "lowercase")]
pub enum ModelKind {
    Manipulation(ManipulationCategory),
    Relevance(RelevanceCategory),
}

impl ModelKind {
    pub fn is_manipulation(&self) -> bool {
        matches!(self, Self::Manipulation(_))
    }

    pub fn manipulation_category(&self) -> Option<ManipulationCategory> {
        match self {
            Self::Manipulation(c) => Some(*c),
            Self::Relevance(_) => None,
        }
    }

    pub fn relevance_category(&self) -> Option<RelevanceCategory> {
        match self {
            Self::Manipulation(_) => None,
            Self::Relevance(c) => Some(*c),
        }
    }
}

/// Human-assigned real/fake label. Serialized uppercase to match the stored
/// tri-state fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroundTruth {
    True,
    False,
    #[default]
    Unknown,
}

impl GroundTruth {
    pub fn is_fake(&self) -> bool {
        matches!(self, Self::True)
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Self::False)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_serde_n_a() {
        let json = serde_json::to_string(&Rank::NotApplicable).unwrap();
        assert_eq!(json, "\"n/a\"");
        let back: Rank = serde_json::from_str("\"n/a\"").unwrap();
        assert_eq!(back, Rank::NotApplicable);
    }

    #[test]
    fn test_policy_vote_weight() {
        assert_eq!(Policy::Ignore.vote_weight(), 0);
        assert_eq!(Policy::Include.vote_weight(), 1);
        assert_eq!(Policy::Trust.vote_weight(), 2);
    }

    #[test]
    fn test_verdict_severity_ordering() {
        assert_eq!(Verdict::Low.severity(), Verdict::Trusted.severity());
        assert!(Verdict::High.severity() > Verdict::Uncertain.severity());
        assert!(Verdict::Uncertain.severity() > Verdict::Low.severity());
        assert_eq!(Verdict::Uncertain.worse(Verdict::High), Verdict::High);
        assert_eq!(Verdict::High.worse(Verdict::Low), Verdict::High);
    }

    #[test]
    fn test_media_type_from_mime() {
        assert_eq!(MediaType::from_mime("video/mp4"), MediaType::Video);
        assert_eq!(MediaType::from_mime("audio/wav"), MediaType::Audio);
        assert_eq!(MediaType::from_mime("image/png"), MediaType::Image);
        assert_eq!(MediaType::from_mime("application/pdf"), MediaType::Unknown);
    }

    #[test]
    fn test_ground_truth_serde_uppercase() {
        let gt: GroundTruth = serde_json::from_str("\"TRUE\"").unwrap();
        assert!(gt.is_fake());
        let gt: GroundTruth = serde_json::from_str("\"UNKNOWN\"").unwrap();
        assert_eq!(gt, GroundTruth::Unknown);
    }

    #[test]
    fn test_model_kind_accessors() {
        let m = ModelKind::Manipulation(ManipulationCategory::Noise);
        assert!(m.is_manipulation());
        assert_eq!(m.manipulation_category(), Some(ManipulationCategory::Noise));
        assert_eq!(m.relevance_category(), None);

        let r = ModelKind::Relevance(RelevanceCategory::Faces);
        assert!(!r.is_manipulation());
        assert_eq!(r.relevance_category(), Some(RelevanceCategory::Faces));
    }
}
