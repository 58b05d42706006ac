use super::*;
use crate::foundation::core::Point;
use crate::mask::gradient::GradientDescriptor;
use crate::mask::layer::{LayerId, MaskGeometry, MaskKind};

fn source() -> Raster {
    let mut data = Vec::new();
    for y in 0..20u32 {
        for x in 0..20u32 {
            data.extend_from_slice(&[(x * 12) as u8, (y * 12) as u8, 140, 255]);
        }
    }
    Raster::from_premul(20, 20, data).unwrap()
}

fn left_half_layer(adjustments: Adjustments) -> MaskLayer {
    let mut layer = MaskLayer::new(LayerId(1), "left", MaskKind::LinearGradient);
    // Steep gradient: full coverage up to x = 9, none from x = 10.
    layer.geometry = MaskGeometry::Linear(Some(GradientDescriptor {
        start: Point::new(45.0, 50.0),
        end: Point::new(50.0, 50.0),
        ratio: None,
        rotation: None,
        feather: 0.0,
    }));
    layer.adjustments = adjustments;
    layer
}

#[test]
fn neutral_layer_changes_nothing() {
    let src = source();
    let global = Adjustments {
        contrast: 30.0,
        ..Adjustments::default()
    };
    let opts = EngineOpts::default();
    let without = render_layers(&src, &global, &[], &opts).unwrap();
    let with = render_layers(
        &src,
        &global,
        &[left_half_layer(Adjustments::default())],
        &opts,
    )
    .unwrap();
    assert_eq!(without, with);
}

#[test]
fn hidden_layer_is_skipped() {
    let src = source();
    let mut layer = left_half_layer(Adjustments {
        brightness: 60.0,
        ..Adjustments::default()
    });
    layer.visible = false;
    assert!(!layer_contributes(&layer));
    let opts = EngineOpts::default();
    let out = render_layers(&src, &Adjustments::default(), &[layer], &opts).unwrap();
    assert_eq!(out, src);
}

#[test]
fn layer_applies_only_inside_mask() {
    let src = source();
    let layer = left_half_layer(Adjustments {
        brightness: 60.0,
        ..Adjustments::default()
    });
    let opts = EngineOpts::default();
    let out = render_layers(&src, &Adjustments::default(), &[layer], &opts).unwrap();
    assert!(out.pixel(2, 5)[2] > src.pixel(2, 5)[2]);
    assert_eq!(out.pixel(15, 5), src.pixel(15, 5));
}

#[test]
fn later_layers_win() {
    let src = Raster::solid(20, 20, [100, 100, 100, 255]).unwrap();
    let bright = left_half_layer(Adjustments {
        brightness: 50.0,
        ..Adjustments::default()
    });
    let mut dark = left_half_layer(Adjustments {
        brightness: -50.0,
        ..Adjustments::default()
    });
    dark.id = LayerId(2);
    let opts = EngineOpts::default();
    let out = render_layers(&src, &Adjustments::default(), &[bright, dark], &opts).unwrap();
    assert_eq!(out.pixel(0, 0)[0], 50);
}
