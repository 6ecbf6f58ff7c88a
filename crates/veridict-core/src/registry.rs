//! The model registry: a static catalog mapping model ids to media type,
//! category, score cutoffs, and vote policy.
//!
//! The registry is constructed once (built-in catalog or an operator TOML
//! file), is immutable afterwards, and is passed explicitly into every
//! aggregation function — no ambient global lookup.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FAKE_SCORE, DEFAULT_UNCERTAIN_SCORE};
use crate::errors::RegistryError;
use crate::types::{ManipulationCategory, MediaType, ModelKind, Policy, RelevanceCategory};

fn default_uncertain_score() -> f64 {
    DEFAULT_UNCERTAIN_SCORE
}

fn default_fake_score() -> f64 {
    DEFAULT_FAKE_SCORE
}

fn default_true() -> bool {
    true
}

/// Static description of one detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModelDescriptor {
    pub id: String,
    pub media_type: MediaType,
    #[serde(flatten)]
    pub kind: ModelKind,
    pub policy: Policy,
    /// Policy used when this model scores the audio track of a video. Falls
    /// back to `policy` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_policy: Option<Policy>,
    /// Score at or above which the model's own rank is `uncertain`.
    #[serde(default = "default_uncertain_score")]
    pub uncertain_score: f64,
    /// Score at or above which the model's result counts as a fake call.
    #[serde(default = "default_fake_score")]
    pub fake_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Disabled models are excluded from optimizer search entirely.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Hidden models still aggregate but are not surfaced in UIs.
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl ModelDescriptor {
    pub fn manipulation(
        id: impl Into<String>,
        media_type: MediaType,
        category: ManipulationCategory,
        policy: Policy,
    ) -> Self {
        Self {
            id: id.into(),
            media_type,
            kind: ModelKind::Manipulation(category),
            policy,
            track_policy: None,
            uncertain_score: DEFAULT_UNCERTAIN_SCORE,
            fake_score: DEFAULT_FAKE_SCORE,
            display_name: None,
            enabled: true,
            visible: true,
        }
    }

    pub fn relevance(
        id: impl Into<String>,
        media_type: MediaType,
        category: RelevanceCategory,
    ) -> Self {
        Self {
            id: id.into(),
            media_type,
            kind: ModelKind::Relevance(category),
            policy: Policy::Include,
            track_policy: None,
            uncertain_score: DEFAULT_UNCERTAIN_SCORE,
            fake_score: DEFAULT_FAKE_SCORE,
            display_name: None,
            enabled: true,
            visible: true,
        }
    }

    /// Placeholder for a model id that is absent from the catalog: policy
    /// `ignore`, cutoffs irrelevant. Lets downstream code treat a truly
    /// unknown model uniformly with a registered-but-disabled one.
    pub fn missing(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_type: MediaType::Unknown,
            kind: ModelKind::Manipulation(ManipulationCategory::Other),
            policy: Policy::Ignore,
            track_policy: None,
            uncertain_score: DEFAULT_UNCERTAIN_SCORE,
            fake_score: DEFAULT_FAKE_SCORE,
            display_name: None,
            enabled: false,
            visible: false,
        }
    }

    pub fn with_track_policy(mut self, policy: Policy) -> Self {
        self.track_policy = Some(policy);
        self
    }

    pub fn with_fake_score(mut self, cutoff: f64) -> Self {
        self.fake_score = cutoff;
        self
    }

    /// Whether this model's output applies to the given media type. An audio
    /// model also applies to video, via the audio track.
    pub fn applies_to(&self, media_type: MediaType) -> bool {
        self.media_type == media_type
            || (media_type == MediaType::Video && self.media_type == MediaType::Audio)
    }

    /// Effective policy for the given media type, resolving the audio-track
    /// special case.
    pub fn policy_for(&self, media_type: MediaType) -> Policy {
        if media_type == MediaType::Video && self.media_type == MediaType::Audio {
            self.track_policy.unwrap_or(self.policy)
        } else {
            self.policy
        }
    }
}

/// TOML file shape: a list of `[[models]]` tables.
#[derive(Debug, Deserialize)]
struct Catalog {
    models: Vec<ModelDescriptor>,
}

/// Immutable catalog of all known models.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: FxHashMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    pub fn new(models: Vec<ModelDescriptor>) -> Result<Self, RegistryError> {
        let mut map = FxHashMap::default();
        for model in models {
            let id = model.id.clone();
            if map.insert(id.clone(), model).is_some() {
                return Err(RegistryError::DuplicateModel(id));
            }
        }
        Ok(Self { models: map })
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, RegistryError> {
        let catalog: Catalog = toml::from_str(text)?;
        Self::new(catalog.models)
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.get(id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Effective policy for a model id on the given media type; unknown ids
    /// resolve to `ignore`.
    pub fn policy_for(&self, id: &str, media_type: MediaType) -> Policy {
        self.models
            .get(id)
            .map(|m| m.policy_for(media_type))
            .unwrap_or(Policy::Ignore)
    }

    /// Manipulation models applicable to the media type, id-sorted for
    /// deterministic iteration.
    pub fn manipulation_models(&self, media_type: MediaType) -> Vec<&ModelDescriptor> {
        let mut out: Vec<&ModelDescriptor> = self
            .models
            .values()
            .filter(|m| m.kind.is_manipulation() && m.applies_to(media_type))
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// Enabled manipulation models applicable to the media type: the
    /// optimizer's search dimensions.
    pub fn enabled_manipulation_models(&self, media_type: MediaType) -> Vec<&ModelDescriptor> {
        let mut out = self.manipulation_models(media_type);
        out.retain(|m| m.enabled);
        out
    }

    /// Relevance models of one category applicable to the media type,
    /// id-sorted.
    pub fn relevance_models(
        &self,
        media_type: MediaType,
        category: RelevanceCategory,
    ) -> Vec<&ModelDescriptor> {
        let mut out: Vec<&ModelDescriptor> = self
            .models
            .values()
            .filter(|m| m.kind.relevance_category() == Some(category) && m.applies_to(media_type))
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// The built-in production catalog.
    pub fn builtin() -> Self {
        use ManipulationCategory::{Face, Imagen, Noise, Semantic};
        use MediaType::{Audio, Image, Video};
        use Policy::{Include, Trust};

        let models = vec![
            // Image manipulation
            ModelDescriptor::manipulation("ufd", Image, Face, Include),
            ModelDescriptor::manipulation("hive-image-genai-v2", Image, Imagen, Include),
            ModelDescriptor::manipulation("rd-elm-img", Image, Imagen, Include),
            ModelDescriptor::manipulation("rd-oak-img", Image, Semantic, Include),
            ModelDescriptor::manipulation("rd-pine-img", Image, Noise, Include),
            ModelDescriptor::manipulation("rd-cedar-img", Image, Noise, Include),
            ModelDescriptor::manipulation("sensity-image", Image, Face, Include),
            // Video manipulation
            ModelDescriptor::manipulation("ufd-video", Video, Face, Include),
            ModelDescriptor::manipulation("rd-video", Video, Imagen, Include),
            ModelDescriptor::manipulation("noiseprint-vid", Video, Noise, Include),
            ModelDescriptor::manipulation("rd-swin-vid", Video, Noise, Include),
            // Audio manipulation; track policy applies when scoring the audio
            // track of a video
            ModelDescriptor::manipulation("rd-audio", Audio, ManipulationCategory::Audio, Include)
                .with_track_policy(Include),
            ModelDescriptor::manipulation(
                "sensity-voice",
                Audio,
                ManipulationCategory::Audio,
                Trust,
            )
            .with_track_policy(Trust),
            // Relevance
            ModelDescriptor::relevance("face-scan", Image, RelevanceCategory::Faces),
            ModelDescriptor::relevance("face-scan-vid", Video, RelevanceCategory::Faces),
            ModelDescriptor::relevance("artwork-scan", Image, RelevanceCategory::Artwork),
            ModelDescriptor::relevance("text-scan", Image, RelevanceCategory::Text),
        ];

        // The built-in catalog has no duplicate ids.
        Self::new(models).unwrap_or(Self {
            models: FxHashMap::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_fixture_models() {
        let registry = ModelRegistry::builtin();
        for id in [
            "ufd",
            "hive-image-genai-v2",
            "rd-elm-img",
            "rd-oak-img",
            "rd-pine-img",
            "rd-cedar-img",
            "sensity-image",
        ] {
            assert!(registry.get(id).is_some(), "missing {id}");
        }
    }

    #[test]
    fn test_track_policy_resolves_for_video() {
        let registry = ModelRegistry::builtin();
        let voice = registry.get("sensity-voice").unwrap();
        assert!(voice.applies_to(MediaType::Audio));
        assert!(voice.applies_to(MediaType::Video));
        assert!(!voice.applies_to(MediaType::Image));
        assert_eq!(registry.policy_for("sensity-voice", MediaType::Video), Policy::Trust);
    }

    #[test]
    fn test_unknown_model_policy_is_ignore() {
        let registry = ModelRegistry::builtin();
        assert_eq!(registry.policy_for("no-such-model", MediaType::Image), Policy::Ignore);
    }

    #[test]
    fn test_missing_placeholder_is_ignored_and_disabled() {
        let m = ModelDescriptor::missing("gone");
        assert_eq!(m.policy, Policy::Ignore);
        assert!(!m.enabled);
    }

    #[test]
    fn test_manipulation_models_sorted_and_filtered() {
        let registry = ModelRegistry::builtin();
        let image = registry.manipulation_models(MediaType::Image);
        let ids: Vec<&str> = image.iter().map(|m| m.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(!ids.contains(&"face-scan"), "relevance models excluded");
        assert!(!ids.contains(&"rd-audio"), "audio models do not apply to image");
    }

    #[test]
    fn test_video_manipulation_includes_audio_track_models() {
        let registry = ModelRegistry::builtin();
        let video = registry.manipulation_models(MediaType::Video);
        let ids: Vec<&str> = video.iter().map(|m| m.id.as_str()).collect();
        assert!(ids.contains(&"rd-audio"));
        assert!(ids.contains(&"ufd-video"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models.toml");
        std::fs::write(
            &path,
            r#"
            [[models]]
            id = "file-model"
            media-type = "audio"
            kind = "manipulation"
            category = "audio"
            policy = "include"
            track-policy = "trust"
            "#,
        )
        .unwrap();
        let registry = ModelRegistry::load(&path).unwrap();
        assert_eq!(registry.policy_for("file-model", MediaType::Video), Policy::Trust);
        assert_eq!(registry.policy_for("file-model", MediaType::Audio), Policy::Include);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let models = vec![
            ModelDescriptor::manipulation("dup", MediaType::Image, ManipulationCategory::Face, Policy::Include),
            ModelDescriptor::manipulation("dup", MediaType::Image, ManipulationCategory::Noise, Policy::Trust),
        ];
        assert!(matches!(
            ModelRegistry::new(models),
            Err(RegistryError::DuplicateModel(id)) if id == "dup"
        ));
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            [[models]]
            id = "custom-img"
            media-type = "image"
            kind = "manipulation"
            category = "imagen"
            policy = "trust"
            fake-score = 0.7

            [[models]]
            id = "custom-faces"
            media-type = "image"
            kind = "relevance"
            category = "faces"
            policy = "include"
        "#;
        let registry = ModelRegistry::from_toml_str(toml).unwrap();
        let custom = registry.get("custom-img").unwrap();
        assert_eq!(custom.policy, Policy::Trust);
        assert_eq!(custom.fake_score, 0.7);
        assert_eq!(custom.uncertain_score, DEFAULT_UNCERTAIN_SCORE);
        assert!(custom.enabled);
        assert_eq!(
            registry.get("custom-faces").unwrap().kind.relevance_category(),
            Some(RelevanceCategory::Faces)
        );
    }
}
