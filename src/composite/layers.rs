//! Mask-layer compositing: locally adjusted copies of the source blended over the global base.

use crate::adjust::model::Adjustments;
use crate::adjust::transfer::apply_adjustments;
use crate::composite::blend::mask_lerp_in_place;
use crate::foundation::core::Raster;
use crate::foundation::error::RetouchResult;
use crate::foundation::opts::EngineOpts;
use crate::mask::builder::AlphaMask;
use crate::mask::layer::MaskLayer;

/// `true` when the layer participates in compositing.
pub fn layer_contributes(layer: &MaskLayer) -> bool {
    layer.visible && !layer.adjustments.is_neutral()
}

/// The source adjusted with `global ⊕ layer`.
pub fn adjust_for_layer(
    source: &Raster,
    global: &Adjustments,
    layer: &MaskLayer,
    opts: &EngineOpts,
) -> Raster {
    apply_adjustments(source, &global.merged(&layer.adjustments), opts)
}

/// Blend each `(adjusted, mask)` pair over `base` in order.
pub fn composite_over<'a>(
    base: &Raster,
    layers: impl IntoIterator<Item = (&'a Raster, &'a AlphaMask)>,
    parallel: bool,
) -> RetouchResult<Raster> {
    let mut out = base.clone();
    for (adjusted, mask) in layers {
        mask_lerp_in_place(&mut out, adjusted, mask, parallel)?;
    }
    Ok(out)
}

/// Full uncached composite: global base plus every contributing layer.
pub fn render_layers(
    source: &Raster,
    global: &Adjustments,
    layers: &[MaskLayer],
    opts: &EngineOpts,
) -> RetouchResult<Raster> {
    let base = apply_adjustments(source, global, opts);
    let mut parts = Vec::new();
    for layer in layers.iter().filter(|l| layer_contributes(l)) {
        let adjusted = adjust_for_layer(source, global, layer, opts);
        let mask = layer.render_mask(source.width, source.height)?;
        parts.push((adjusted, mask));
    }
    composite_over(&base, parts.iter().map(|(r, m)| (r, m)), opts.parallel)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/layers.rs"]
mod tests;
