//! The edit session: authoritative editing state, invalidation bookkeeping and cached rendering.
//!
//! Every mutator bumps the revision of exactly the collection it touches. `render()` derives
//! cache keys from those revisions and recomputes only the stages whose key changed, in
//! dependency order: base, layer masks, layer adjustments, mask composite, light pass.
//! `export()` works on `&self` and never writes to the caches.

use std::sync::Arc;

use crate::adjust::model::Adjustments;
use crate::adjust::transfer::apply_adjustments;
use crate::assets::codec::{decode_image, encode_png};
use crate::composite::layers::{adjust_for_layer, composite_over, layer_contributes};
use crate::composite::light::{LightMode, LightStroke, light_mask, light_pass_with_masks};
use crate::export::crop::{CropRect, crop};
use crate::export::flatten::{ExportOptions, Transforms, export_size, flatten};
use crate::foundation::core::{Point, Raster};
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::foundation::opts::EngineOpts;
use crate::mask::builder::{AlphaMask, paint_dab, paint_segment, render_strokes};
use crate::mask::gradient::GradientDescriptor;
use crate::mask::layer::{LayerId, MaskGeometry, MaskKind, MaskLayer};
use crate::mask::stroke::{BrushParams, Stroke, StrokeId, StrokeList};
use crate::overlay::interaction::{GestureKind, Interaction};
use crate::overlay::model::{
    ImageContent, OverlayContent, OverlayId, OverlayStack, OverlayTemplate, OverlayTransform,
    TextContent, normalize_degrees,
};
use crate::overlay::text::FontRegistry;
use crate::session::cache::{
    AdjustedKey, Cached, CompositeKey, LayerStamp, LightKey, MaskKey, RenderStats, SurfaceCache,
    lookup,
};
use crate::session::remote::{EditRequest, ImageEditService, transform_mask};

/// Effect settings captured when a light stroke starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSettings {
    /// Effect.
    pub mode: LightMode,
    /// Strength, `[0, 100]`.
    pub intensity: f32,
    /// Straight RGB override for the fill modes.
    pub color: Option<[u8; 3]>,
}

/// Destination of a new stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokeTarget {
    /// The active mask layer, which must be a brush layer.
    ActiveLayer,
    /// A new light stroke.
    Light(LightSettings),
    /// The removal mask sent along with remote edits.
    Removal,
}

/// A committed stroke collection, for undo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeCollection {
    /// Strokes of one brush layer.
    Layer(LayerId),
    /// Light strokes.
    Light,
    /// Removal strokes.
    Removal,
}

#[derive(Clone, Copy, Debug)]
enum ActiveTarget {
    Layer(LayerId),
    Light(LightSettings),
    Removal,
}

#[derive(Debug)]
struct ActiveStroke {
    target: ActiveTarget,
    stroke: Stroke,
    surface: AlphaMask,
}

#[derive(Clone, Debug)]
struct LayerSlot {
    layer: MaskLayer,
    mask_rev: u64,
    adjust_rev: u64,
}

#[derive(Default)]
struct Fresh {
    base: Option<Arc<Raster>>,
    masks: Vec<(LayerId, MaskKey, Arc<AlphaMask>)>,
    adjusted: Vec<(LayerId, AdjustedKey, Arc<Raster>)>,
    composite: Option<Arc<Raster>>,
    light_masks: Vec<(StrokeId, Arc<AlphaMask>)>,
}

struct Evaluation {
    key: LightKey,
    output: Arc<Raster>,
    fresh: Option<Fresh>,
}

/// One photo being edited.
#[derive(Debug)]
pub struct EditSession {
    opts: EngineOpts,
    source: Arc<Raster>,
    source_gen: u64,
    global: Adjustments,
    global_gen: u64,
    layers: Vec<LayerSlot>,
    active_layer: Option<LayerId>,
    light: StrokeList<LightStroke>,
    removal: StrokeList<Stroke>,
    overlays: OverlayStack,
    gesture: Interaction,
    transforms: Transforms,
    fonts: FontRegistry,
    active_stroke: Option<ActiveStroke>,
    cache: SurfaceCache,
    next_layer: u64,
    next_stroke: u64,
}

fn check_point(p: Point) -> RetouchResult<()> {
    if !p.x.is_finite() || !p.y.is_finite() {
        return Err(RetouchError::validation("stroke points must be finite"));
    }
    Ok(())
}

impl EditSession {
    /// Start editing `source` with empty derived state.
    pub fn new(source: Raster, opts: EngineOpts) -> RetouchResult<Self> {
        source.validate()?;
        opts.check_dimensions(source.width, source.height)?;
        Ok(Self {
            opts,
            source: Arc::new(source),
            source_gen: 1,
            global: Adjustments::default(),
            global_gen: 1,
            layers: Vec::new(),
            active_layer: None,
            light: StrokeList::new(),
            removal: StrokeList::new(),
            overlays: OverlayStack::new(),
            gesture: Interaction::new(),
            transforms: Transforms::default(),
            fonts: FontRegistry::new(),
            active_stroke: None,
            cache: SurfaceCache::default(),
            next_layer: 0,
            next_stroke: 0,
        })
    }

    /// Decode `bytes` and start editing.
    pub fn from_image_bytes(bytes: &[u8], opts: EngineOpts) -> RetouchResult<Self> {
        Self::new(decode_image(bytes, &opts)?, opts)
    }

    /// Engine options.
    pub fn opts(&self) -> &EngineOpts {
        &self.opts
    }

    /// The unedited source.
    pub fn source(&self) -> &Raster {
        &self.source
    }

    /// Size of the export canvas, which overlay percentages refer to.
    pub fn canvas_size(&self) -> (u32, u32) {
        export_size(
            self.source.width,
            self.source.height,
            self.transforms.rotation,
        )
    }

    // ----- global adjustments -----

    /// Global adjustments.
    pub fn adjustments(&self) -> &Adjustments {
        &self.global
    }

    /// Replace the global adjustments. Invalidates everything downstream of the base.
    pub fn set_adjustments(&mut self, adjustments: Adjustments) -> RetouchResult<()> {
        adjustments.validate()?;
        if adjustments != self.global {
            self.global = adjustments;
            self.global_gen += 1;
        }
        Ok(())
    }

    /// Back to neutral.
    pub fn reset_adjustments(&mut self) {
        if !self.global.is_neutral() {
            self.global = Adjustments::default();
            self.global_gen += 1;
        }
    }

    // ----- mask layers -----

    fn slot(&self, id: LayerId) -> RetouchResult<&LayerSlot> {
        self.layers
            .iter()
            .find(|s| s.layer.id == id)
            .ok_or_else(|| RetouchError::validation(format!("unknown layer {}", id.0)))
    }

    fn slot_mut(&mut self, id: LayerId) -> RetouchResult<&mut LayerSlot> {
        self.layers
            .iter_mut()
            .find(|s| s.layer.id == id)
            .ok_or_else(|| RetouchError::validation(format!("unknown layer {}", id.0)))
    }

    /// Append a layer on top and make it active.
    pub fn add_layer(&mut self, name: impl Into<String>, kind: MaskKind) -> LayerId {
        self.next_layer += 1;
        let id = LayerId(self.next_layer);
        self.layers.push(LayerSlot {
            layer: MaskLayer::new(id, name, kind),
            mask_rev: 0,
            adjust_rev: 0,
        });
        self.active_layer = Some(id);
        id
    }

    /// Remove a layer. If it was active, the topmost remaining layer becomes active.
    pub fn remove_layer(&mut self, id: LayerId) -> RetouchResult<MaskLayer> {
        let idx = self
            .layers
            .iter()
            .position(|s| s.layer.id == id)
            .ok_or_else(|| RetouchError::validation(format!("unknown layer {}", id.0)))?;
        if matches!(
            self.active_stroke.as_ref().map(|a| a.target),
            Some(ActiveTarget::Layer(l)) if l == id
        ) {
            self.active_stroke = None;
        }
        let slot = self.layers.remove(idx);
        self.cache.forget_layer(id);
        if self.active_layer == Some(id) {
            self.active_layer = self.layers.last().map(|s| s.layer.id);
        }
        Ok(slot.layer)
    }

    /// Layers in composite order (bottom first).
    pub fn layers(&self) -> impl Iterator<Item = &MaskLayer> {
        self.layers.iter().map(|s| &s.layer)
    }

    /// Lookup.
    pub fn layer(&self, id: LayerId) -> Option<&MaskLayer> {
        self.slot(id).ok().map(|s| &s.layer)
    }

    /// The layer new brush strokes go to. Always `Some` while any layer exists.
    pub fn active_layer(&self) -> Option<LayerId> {
        self.active_layer
    }

    /// Select the layer for editing.
    pub fn set_active_layer(&mut self, id: LayerId) -> RetouchResult<()> {
        self.slot(id)?;
        self.active_layer = Some(id);
        Ok(())
    }

    /// Move a layer to `index` in composite order, clamped to the end.
    pub fn move_layer(&mut self, id: LayerId, index: usize) -> RetouchResult<()> {
        let from = self
            .layers
            .iter()
            .position(|s| s.layer.id == id)
            .ok_or_else(|| RetouchError::validation(format!("unknown layer {}", id.0)))?;
        let slot = self.layers.remove(from);
        let to = index.min(self.layers.len());
        self.layers.insert(to, slot);
        Ok(())
    }

    /// Replace a layer's own adjustments.
    pub fn set_layer_adjustments(
        &mut self,
        id: LayerId,
        adjustments: Adjustments,
    ) -> RetouchResult<()> {
        adjustments.validate()?;
        let slot = self.slot_mut(id)?;
        if slot.layer.adjustments != adjustments {
            slot.layer.adjustments = adjustments;
            slot.adjust_rev += 1;
        }
        Ok(())
    }

    /// Show or hide a layer.
    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> RetouchResult<()> {
        self.slot_mut(id)?.layer.visible = visible;
        Ok(())
    }

    /// Toggle coverage inversion.
    pub fn set_layer_invert(&mut self, id: LayerId, invert: bool) -> RetouchResult<()> {
        self.slot_mut(id)?.layer.invert = invert;
        Ok(())
    }

    /// Rename a layer.
    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> RetouchResult<()> {
        self.slot_mut(id)?.layer.name = name.into();
        Ok(())
    }

    /// Set the descriptor of a gradient layer.
    pub fn set_layer_gradient(
        &mut self,
        id: LayerId,
        gradient: GradientDescriptor,
    ) -> RetouchResult<()> {
        gradient.validate()?;
        let slot = self.slot_mut(id)?;
        match &mut slot.layer.geometry {
            MaskGeometry::Linear(g) | MaskGeometry::Radial(g) => *g = Some(gradient),
            MaskGeometry::Brush(_) => {
                return Err(RetouchError::validation(
                    "brush layers do not take a gradient",
                ));
            }
        }
        slot.mask_rev += 1;
        Ok(())
    }

    /// A layer's final coverage, `invert` applied.
    pub fn layer_mask(&self, id: LayerId) -> RetouchResult<AlphaMask> {
        let slot = self.slot(id)?;
        let raw = self.raw_layer_mask(slot)?;
        Ok(if slot.layer.invert {
            raw.inverted()
        } else {
            AlphaMask::clone(&raw)
        })
    }

    fn raw_layer_mask(&self, slot: &LayerSlot) -> RetouchResult<Arc<AlphaMask>> {
        let key = (self.source_gen, slot.mask_rev);
        match self.cache.mask(slot.layer.id, &key) {
            Some(m) => Ok(m),
            None => Ok(Arc::new(
                slot.layer.render_raw(self.source.width, self.source.height)?,
            )),
        }
    }

    // ----- strokes -----

    /// Start a stroke at `point` (image pixels).
    pub fn begin_stroke(
        &mut self,
        target: StrokeTarget,
        brush: BrushParams,
        point: Point,
    ) -> RetouchResult<()> {
        if self.active_stroke.is_some() {
            return Err(RetouchError::validation("a stroke is already in progress"));
        }
        brush.validate()?;
        check_point(point)?;
        let stroke = Stroke {
            id: StrokeId(self.next_stroke + 1),
            points: vec![point],
            brush,
        };
        let (target, surface) = match target {
            StrokeTarget::ActiveLayer => {
                let id = self
                    .active_layer
                    .ok_or_else(|| RetouchError::validation("no active layer"))?;
                let slot = self.slot(id)?;
                if slot.layer.kind() != MaskKind::Brush {
                    return Err(RetouchError::validation(
                        "strokes can only be painted on brush layers",
                    ));
                }
                let raw = self.raw_layer_mask(slot)?;
                (ActiveTarget::Layer(id), AlphaMask::clone(&raw))
            }
            StrokeTarget::Light(settings) => {
                LightStroke {
                    stroke: stroke.clone(),
                    mode: settings.mode,
                    intensity: settings.intensity,
                    color: settings.color,
                }
                .validate()?;
                (
                    ActiveTarget::Light(settings),
                    AlphaMask::new(self.source.width, self.source.height)?,
                )
            }
            StrokeTarget::Removal => {
                let raw = self.removal_mask()?;
                (ActiveTarget::Removal, AlphaMask::clone(&raw))
            }
        };
        self.next_stroke += 1;
        let mut active = ActiveStroke {
            target,
            stroke,
            surface,
        };
        paint_dab(&mut active.surface, point, &brush);
        self.active_stroke = Some(active);
        Ok(())
    }

    /// Continue the stroke in progress. Only the new segment is painted.
    pub fn extend_stroke(&mut self, point: Point) -> RetouchResult<()> {
        check_point(point)?;
        let active = self
            .active_stroke
            .as_mut()
            .ok_or_else(|| RetouchError::validation("no stroke in progress"))?;
        let prev = active.stroke.points.last().copied().unwrap_or(point);
        paint_segment(&mut active.surface, prev, point, &active.stroke.brush);
        active.stroke.points.push(point);
        Ok(())
    }

    /// Coverage of the stroke in progress, painted over its target's committed coverage
    /// (light strokes start from an empty surface).
    pub fn active_stroke_surface(&self) -> Option<&AlphaMask> {
        self.active_stroke.as_ref().map(|a| &a.surface)
    }

    /// Commit the stroke in progress to its collection.
    #[tracing::instrument(skip(self))]
    pub fn commit_stroke(&mut self) -> RetouchResult<StrokeId> {
        let active = self
            .active_stroke
            .take()
            .ok_or_else(|| RetouchError::validation("no stroke in progress"))?;
        let ActiveStroke {
            target,
            stroke,
            surface,
        } = active;
        let id = stroke.id;
        match target {
            ActiveTarget::Layer(layer) => {
                let source_gen = self.source_gen;
                let slot = self.slot_mut(layer)?;
                let MaskGeometry::Brush(list) = &mut slot.layer.geometry else {
                    return Err(RetouchError::validation(
                        "strokes can only be painted on brush layers",
                    ));
                };
                list.push(stroke);
                slot.mask_rev += 1;
                let key = (source_gen, slot.mask_rev);
                self.cache
                    .masks
                    .insert(layer, Cached::new(key, Arc::new(surface)));
            }
            ActiveTarget::Light(settings) => {
                let light = LightStroke {
                    stroke,
                    mode: settings.mode,
                    intensity: settings.intensity,
                    color: settings.color,
                };
                light.validate()?;
                self.light.push(light);
                self.cache
                    .light
                    .insert(id, Cached::new(self.source_gen, Arc::new(surface)));
            }
            ActiveTarget::Removal => {
                self.removal.push(stroke);
                let key = (self.source_gen, self.removal.generation());
                self.cache.removal = Some(Cached::new(key, Arc::new(surface)));
            }
        }
        tracing::debug!(stroke = id.0, "stroke committed");
        Ok(id)
    }

    /// Drop the stroke in progress. Returns `false` when there was none.
    pub fn cancel_stroke(&mut self) -> bool {
        self.active_stroke.take().is_some()
    }

    /// Paint a whole polyline in one call.
    pub fn paint_stroke(
        &mut self,
        target: StrokeTarget,
        brush: BrushParams,
        points: &[Point],
    ) -> RetouchResult<StrokeId> {
        let Some((&first, rest)) = points.split_first() else {
            return Err(RetouchError::validation(
                "stroke must have at least one point",
            ));
        };
        self.begin_stroke(target, brush, first)?;
        for &p in rest {
            if let Err(e) = self.extend_stroke(p) {
                self.cancel_stroke();
                return Err(e);
            }
        }
        self.commit_stroke()
    }

    /// Remove the most recently committed stroke of `collection`.
    pub fn undo_stroke(&mut self, collection: StrokeCollection) -> RetouchResult<Option<StrokeId>> {
        if self.active_stroke.is_some() {
            return Err(RetouchError::validation(
                "finish or cancel the stroke in progress first",
            ));
        }
        let undone = match collection {
            StrokeCollection::Layer(id) => {
                let slot = self.slot_mut(id)?;
                let MaskGeometry::Brush(list) = &mut slot.layer.geometry else {
                    return Err(RetouchError::validation("layer has no strokes"));
                };
                let popped = list.pop().map(|s| s.id);
                if popped.is_some() {
                    slot.mask_rev += 1;
                }
                popped
            }
            StrokeCollection::Light => {
                let popped = self.light.pop().map(|s| s.stroke.id);
                if let Some(id) = popped {
                    self.cache.light.remove(&id);
                }
                popped
            }
            StrokeCollection::Removal => self.removal.pop().map(|s| s.id),
        };
        Ok(undone)
    }

    /// Committed light strokes in paint order.
    pub fn light_strokes(&self) -> impl Iterator<Item = &LightStroke> {
        self.light.iter().map(|s| s.as_ref())
    }

    /// Committed removal strokes in paint order.
    pub fn removal_strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.removal.iter().map(|s| s.as_ref())
    }

    /// Drop every removal stroke.
    pub fn clear_removal(&mut self) {
        self.removal.clear();
    }

    /// Coverage of the removal strokes.
    pub fn removal_mask(&self) -> RetouchResult<Arc<AlphaMask>> {
        let key = (self.source_gen, self.removal.generation());
        if let Some(m) = lookup(&self.cache.removal, &key) {
            return Ok(m);
        }
        Ok(Arc::new(render_strokes(
            self.source.width,
            self.source.height,
            self.removal.iter().map(|s| s.as_ref()),
        )?))
    }

    // ----- rendering -----

    fn composite_key(&self) -> CompositeKey {
        CompositeKey {
            source: self.source_gen,
            global: self.global_gen,
            layers: self
                .layers
                .iter()
                .filter(|s| layer_contributes(&s.layer))
                .map(|s| LayerStamp {
                    id: s.layer.id,
                    mask_rev: s.mask_rev,
                    adjust_rev: s.adjust_rev,
                    invert: s.layer.invert,
                })
                .collect(),
        }
    }

    fn build_composite(
        &self,
        key: &CompositeKey,
        fresh: &mut Fresh,
        stats: &mut RenderStats,
    ) -> RetouchResult<Raster> {
        let (w, h) = (self.source.width, self.source.height);
        let base_key = (key.source, key.global);
        let base = match lookup(&self.cache.base, &base_key) {
            Some(b) => b,
            None => {
                tracing::debug!("rebuilding adjusted base");
                stats.base_rebuilt = true;
                let b = Arc::new(apply_adjustments(&self.source, &self.global, &self.opts));
                fresh.base = Some(Arc::clone(&b));
                b
            }
        };

        let mut parts = Vec::with_capacity(key.layers.len());
        for stamp in &key.layers {
            let slot = self.slot(stamp.id)?;
            let mask_key = (key.source, stamp.mask_rev);
            let raw = match self.cache.mask(stamp.id, &mask_key) {
                Some(m) => m,
                None => {
                    tracing::debug!(layer = stamp.id.0, "rasterizing layer mask");
                    stats.masks_rebuilt += 1;
                    let m = Arc::new(slot.layer.render_raw(w, h)?);
                    fresh.masks.push((stamp.id, mask_key, Arc::clone(&m)));
                    m
                }
            };
            let adjusted_key = (key.source, key.global, stamp.adjust_rev);
            let adjusted = match self.cache.adjusted(stamp.id, &adjusted_key) {
                Some(r) => r,
                None => {
                    tracing::debug!(layer = stamp.id.0, "adjusting layer");
                    stats.layers_adjusted += 1;
                    let r = Arc::new(adjust_for_layer(
                        &self.source,
                        &self.global,
                        &slot.layer,
                        &self.opts,
                    ));
                    fresh.adjusted.push((stamp.id, adjusted_key, Arc::clone(&r)));
                    r
                }
            };
            let mask = if stamp.invert {
                Arc::new(raw.inverted())
            } else {
                raw
            };
            parts.push((adjusted, mask));
        }
        composite_over(
            &base,
            parts.iter().map(|(r, m)| (r.as_ref(), m.as_ref())),
            self.opts.parallel,
        )
    }

    fn evaluate(&self, stats: &mut RenderStats) -> RetouchResult<Evaluation> {
        let key: LightKey = (self.composite_key(), self.light.generation());
        if let Some(output) = lookup(&self.cache.output, &key) {
            return Ok(Evaluation {
                key,
                output,
                fresh: None,
            });
        }

        let mut fresh = Fresh::default();
        let composite = match lookup(&self.cache.composite, &key.0) {
            Some(c) => c,
            None => {
                stats.composite_rebuilt = true;
                let c = Arc::new(self.build_composite(&key.0, &mut fresh, stats)?);
                fresh.composite = Some(Arc::clone(&c));
                c
            }
        };
        let output = if self.light.is_empty() {
            composite
        } else {
            tracing::debug!(strokes = self.light.len(), "running light pass");
            stats.light_rebuilt = true;
            let mut masks = Vec::with_capacity(self.light.len());
            for s in self.light_strokes() {
                let id = s.stroke.id;
                let m = match self.cache.light_mask(id, self.source_gen) {
                    Some(m) => m,
                    None => {
                        tracing::debug!(stroke = id.0, "rasterizing light stroke");
                        stats.light_masks_rebuilt += 1;
                        let m = Arc::new(light_mask(s, self.source.width, self.source.height)?);
                        fresh.light_masks.push((id, Arc::clone(&m)));
                        m
                    }
                };
                masks.push(m);
            }
            let painted = self.light_strokes().zip(masks.iter().map(|m| m.as_ref()));
            Arc::new(light_pass_with_masks(&composite, painted, &self.opts)?)
        };
        Ok(Evaluation {
            key,
            output,
            fresh: Some(fresh),
        })
    }

    fn absorb(&mut self, key: LightKey, output: &Arc<Raster>, fresh: Fresh) {
        if let Some(b) = fresh.base {
            self.cache.base = Some(Cached::new((key.0.source, key.0.global), b));
        }
        for (id, k, m) in fresh.masks {
            self.cache.masks.insert(id, Cached::new(k, m));
        }
        for (id, k, r) in fresh.adjusted {
            self.cache.adjusted.insert(id, Cached::new(k, r));
        }
        if let Some(c) = fresh.composite {
            self.cache.composite = Some(Cached::new(key.0.clone(), c));
        }
        for (id, m) in fresh.light_masks {
            self.cache.light.insert(id, Cached::new(key.0.source, m));
        }
        self.cache.output = Some(Cached::new(key, Arc::clone(output)));
    }

    /// Bring every stale stage up to date and return the live composite.
    pub fn render(&mut self) -> RetouchResult<Arc<Raster>> {
        self.render_with_stats().map(|(r, _)| r)
    }

    /// Like [`EditSession::render`], also reporting which stages were recomputed.
    #[tracing::instrument(skip(self), fields(w = self.source.width, h = self.source.height))]
    pub fn render_with_stats(&mut self) -> RetouchResult<(Arc<Raster>, RenderStats)> {
        let mut stats = RenderStats::default();
        let eval = self.evaluate(&mut stats)?;
        if let Some(fresh) = eval.fresh {
            self.absorb(eval.key, &eval.output, fresh);
        }
        tracing::debug!(?stats, "render done");
        Ok((eval.output, stats))
    }

    /// Drop every cached surface. The next render rebuilds identical output.
    pub fn invalidate_surfaces(&mut self) {
        self.cache.clear();
    }

    // ----- export -----

    /// Export transforms.
    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    /// Replace the export transforms.
    pub fn set_transforms(&mut self, transforms: Transforms) -> RetouchResult<()> {
        if !transforms.rotation.is_finite() {
            return Err(RetouchError::validation("rotation must be finite"));
        }
        self.gesture.cancel();
        self.transforms = transforms;
        Ok(())
    }

    /// Registered fonts.
    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// Register a font under `name` for text overlays.
    pub fn register_font(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> RetouchResult<()> {
        self.fonts.register(name, bytes)
    }

    /// Flatten the current state. Uses fresh caches when available, never writes them.
    #[tracing::instrument(skip(self))]
    pub fn export_with(&self, opts: ExportOptions) -> RetouchResult<Raster> {
        let mut stats = RenderStats::default();
        let composite = self.evaluate(&mut stats)?.output;
        let overlays = self.overlays.in_paint_order();
        flatten(
            &composite,
            &overlays,
            &self.transforms,
            &self.fonts,
            opts,
        )
    }

    /// Flatten with overlays.
    pub fn export(&self) -> RetouchResult<Raster> {
        self.export_with(ExportOptions::default())
    }

    /// Flatten and encode as PNG.
    pub fn export_png(&self) -> RetouchResult<Vec<u8>> {
        encode_png(&self.export()?)
    }

    // ----- overlays -----

    /// Overlay stack.
    pub fn overlays(&self) -> &OverlayStack {
        &self.overlays
    }

    /// Add a text overlay on top.
    pub fn add_text_overlay(
        &mut self,
        text: TextContent,
        transform: OverlayTransform,
    ) -> RetouchResult<OverlayId> {
        self.overlays.add_text(text, transform)
    }

    /// Add an image overlay centered at `(x, y)`, `width` percent wide, height from its aspect.
    pub fn add_image_overlay(
        &mut self,
        image: Raster,
        x: f64,
        y: f64,
        width: f64,
    ) -> RetouchResult<OverlayId> {
        let (cw, ch) = self.canvas_size();
        let content = ImageContent::new(image)?;
        self.overlays
            .add_image(content, x, y, width, f64::from(cw) / f64::from(ch))
    }

    /// Instantiate a text template at the canvas center.
    pub fn instantiate_template(&mut self, template: &OverlayTemplate) -> RetouchResult<OverlayId> {
        self.overlays.instantiate_template(template)
    }

    /// Replace an overlay's placement.
    pub fn set_overlay_transform(
        &mut self,
        id: OverlayId,
        transform: OverlayTransform,
    ) -> RetouchResult<()> {
        transform.validate()?;
        self.overlays.require_mut(id)?.transform = OverlayTransform {
            rotation: normalize_degrees(transform.rotation),
            ..transform
        };
        Ok(())
    }

    /// Replace the payload of a text overlay.
    pub fn set_overlay_text(&mut self, id: OverlayId, text: TextContent) -> RetouchResult<()> {
        text.validate()?;
        match &mut self.overlays.require_mut(id)?.content {
            OverlayContent::Text(t) => {
                *t = text;
                Ok(())
            }
            OverlayContent::Image(_) => Err(RetouchError::validation(
                "overlay is not a text overlay",
            )),
        }
    }

    /// Remove an overlay, cancelling any gesture on it.
    pub fn remove_overlay(&mut self, id: OverlayId) -> RetouchResult<()> {
        self.overlays.remove(id)?;
        if self.gesture.target() == Some(id) {
            self.gesture.cancel();
        }
        Ok(())
    }

    /// Paint an overlay above all others.
    pub fn bring_overlay_to_front(&mut self, id: OverlayId) -> RetouchResult<()> {
        self.overlays.bring_to_front(id)
    }

    /// Start moving, resizing or rotating an overlay. `pointer` is in canvas percent.
    pub fn begin_gesture(
        &mut self,
        kind: GestureKind,
        id: OverlayId,
        pointer: Point,
    ) -> RetouchResult<()> {
        let canvas = self.canvas_size();
        let overlay = self
            .overlays
            .get(id)
            .ok_or_else(|| RetouchError::validation(format!("unknown overlay {}", id.0)))?;
        self.gesture.begin(kind, overlay, pointer, canvas);
        Ok(())
    }

    /// Follow the pointer.
    pub fn update_gesture(&mut self, pointer: Point) -> RetouchResult<()> {
        let target = self
            .gesture
            .target()
            .ok_or_else(|| RetouchError::validation("no overlay gesture in progress"))?;
        let canvas = self.canvas_size();
        let overlay = self.overlays.require_mut(target)?;
        self.gesture.update(overlay, pointer, canvas)
    }

    /// Finish the gesture.
    pub fn end_gesture(&mut self) -> RetouchResult<OverlayId> {
        self.gesture.end()
    }

    /// Abandon the gesture, keeping whatever transform it last produced.
    pub fn cancel_gesture(&mut self) {
        self.gesture.cancel();
    }

    // ----- destructive operations -----

    fn reset_derived(&mut self) {
        self.global = Adjustments::default();
        self.global_gen += 1;
        self.layers.clear();
        self.active_layer = None;
        self.light.clear();
        self.removal.clear();
        self.overlays.clear();
        self.gesture.cancel();
        self.transforms = Transforms::default();
        self.active_stroke = None;
        self.cache.clear();
    }

    /// Swap in a new source and reset every piece of derived state.
    #[tracing::instrument(skip_all, fields(w = source.width, h = source.height))]
    pub fn replace_source(&mut self, source: Raster) -> RetouchResult<()> {
        source.validate()?;
        self.opts.check_dimensions(source.width, source.height)?;
        self.source = Arc::new(source);
        self.source_gen += 1;
        self.reset_derived();
        Ok(())
    }

    /// Crop the original source and replace it with the result.
    pub fn crop(&mut self, rect: &CropRect) -> RetouchResult<()> {
        let cropped = crop(&self.source, rect, &self.opts)?;
        self.replace_source(cropped)
    }

    /// Send the flattened base and removal mask to `service`. On success the returned image
    /// becomes the new source; on failure nothing changes.
    #[tracing::instrument(skip(self, service, instruction))]
    pub fn apply_remote_edit(
        &mut self,
        service: &dyn ImageEditService,
        instruction: &str,
    ) -> RetouchResult<()> {
        let base = self.export_with(ExportOptions { mask_pass: true })?;
        let removal = self.removal_mask()?;
        let mask = if removal.is_clear() {
            None
        } else {
            Some(transform_mask(&removal, &self.transforms)?)
        };
        let request = EditRequest::new(instruction, &base, mask.as_ref())?;
        let response = service.edit(&request).map_err(|failure| {
            tracing::warn!(%failure, "remote edit failed");
            RetouchError::Remote(failure)
        })?;
        let edited = response.decode(&self.opts)?;
        self.replace_source(edited)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
