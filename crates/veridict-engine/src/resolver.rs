//! Result resolver: turns a stored `model id → cached result` map into an
//! ordered list of typed result records.

use rustc_hash::FxHashMap;
use tracing::warn;

use veridict_core::{CachedResult, MediaType, ModelRegistry, ModelResult, Policy};

/// Resolve a cached-result map into an id-sorted list of [`ModelResult`]s.
///
/// With `skip_ignored`, results whose model resolves to policy `ignore` for
/// this media type are dropped (the audio-track policy of a video is
/// honored). Pass `skip_ignored = false` for contexts that need the full
/// unfiltered set, such as display or audio-track re-derivation.
///
/// A model id present in the cache but absent from the registry is logged and
/// dropped; vendor catalogs evolve and old cached results must stay loadable.
pub fn resolve_results(
    registry: &ModelRegistry,
    media_type: MediaType,
    cache: &FxHashMap<String, CachedResult>,
    skip_ignored: bool,
) -> Vec<ModelResult> {
    let mut ids: Vec<&String> = cache.keys().collect();
    ids.sort();

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(descriptor) = registry.get(id) else {
            warn!(model_id = %id, "cached result references unknown model, dropping");
            continue;
        };
        if skip_ignored && descriptor.policy_for(media_type) == Policy::Ignore {
            continue;
        }
        // Indexing is fine: id came from the cache's own key set.
        out.push(ModelResult::new(id.clone(), cache[id].clone()));
    }
    out
}
