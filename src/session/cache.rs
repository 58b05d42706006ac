//! Generation-keyed surface caches.
//!
//! Surfaces are never authoritative: each entry remembers the key it was built for, and a lookup
//! with any other key misses. Dropping the whole cache only costs a rebuild.

use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::Raster;
use crate::mask::builder::AlphaMask;
use crate::mask::layer::LayerId;
use crate::mask::stroke::StrokeId;

/// A value together with the key it was computed for.
#[derive(Clone, Debug)]
pub(crate) struct Cached<K, V> {
    key: K,
    value: Arc<V>,
}

impl<K: PartialEq, V> Cached<K, V> {
    pub(crate) fn new(key: K, value: Arc<V>) -> Self {
        Self { key, value }
    }

    pub(crate) fn get(&self, key: &K) -> Option<Arc<V>> {
        (self.key == *key).then(|| Arc::clone(&self.value))
    }
}

pub(crate) fn lookup<K: PartialEq, V>(slot: &Option<Cached<K, V>>, key: &K) -> Option<Arc<V>> {
    slot.as_ref().and_then(|c| c.get(key))
}

/// `(source generation, mask revision)`.
pub(crate) type MaskKey = (u64, u64);
/// `(source generation, global generation, adjustment revision)`.
pub(crate) type AdjustedKey = (u64, u64, u64);

/// Everything a contributing layer feeds into the composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LayerStamp {
    pub(crate) id: LayerId,
    pub(crate) mask_rev: u64,
    pub(crate) adjust_rev: u64,
    pub(crate) invert: bool,
}

/// Identifies one mask composite: source, global adjustments and contributing layers in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CompositeKey {
    pub(crate) source: u64,
    pub(crate) global: u64,
    pub(crate) layers: Vec<LayerStamp>,
}

/// Composite key plus the light stroke generation.
pub(crate) type LightKey = (CompositeKey, u64);

#[derive(Debug, Default)]
pub(crate) struct SurfaceCache {
    pub(crate) base: Option<Cached<(u64, u64), Raster>>,
    pub(crate) masks: HashMap<LayerId, Cached<MaskKey, AlphaMask>>,
    pub(crate) adjusted: HashMap<LayerId, Cached<AdjustedKey, Raster>>,
    pub(crate) composite: Option<Cached<CompositeKey, Raster>>,
    pub(crate) output: Option<Cached<LightKey, Raster>>,
    pub(crate) removal: Option<Cached<MaskKey, AlphaMask>>,
    /// Light stroke coverage keyed by source generation; strokes are immutable.
    pub(crate) light: HashMap<StrokeId, Cached<u64, AlphaMask>>,
}

impl SurfaceCache {
    pub(crate) fn mask(&self, id: LayerId, key: &MaskKey) -> Option<Arc<AlphaMask>> {
        self.masks.get(&id).and_then(|c| c.get(key))
    }

    pub(crate) fn adjusted(&self, id: LayerId, key: &AdjustedKey) -> Option<Arc<Raster>> {
        self.adjusted.get(&id).and_then(|c| c.get(key))
    }

    pub(crate) fn light_mask(&self, id: StrokeId, source_gen: u64) -> Option<Arc<AlphaMask>> {
        self.light.get(&id).and_then(|c| c.get(&source_gen))
    }

    /// Drop per-layer entries for layers that no longer exist.
    pub(crate) fn forget_layer(&mut self, id: LayerId) {
        self.masks.remove(&id);
        self.adjusted.remove(&id);
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Which stages a render recomputed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// The globally adjusted base was rebuilt.
    pub base_rebuilt: bool,
    /// Layer masks rasterized from geometry.
    pub masks_rebuilt: u32,
    /// Layers whose adjusted copy of the source was recomputed.
    pub layers_adjusted: u32,
    /// The mask composite was rebuilt.
    pub composite_rebuilt: bool,
    /// The light stroke pass was rerun.
    pub light_rebuilt: bool,
    /// Light stroke masks rasterized from their points.
    pub light_masks_rebuilt: u32,
}

impl RenderStats {
    /// `true` when the render was served entirely from cache.
    pub fn fully_cached(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/cache.rs"]
mod tests;
