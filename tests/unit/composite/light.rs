use super::*;
use crate::foundation::core::Point;
use crate::mask::stroke::{BrushParams, StrokeId};

fn dot(mode: LightMode, intensity: f32) -> LightStroke {
    LightStroke {
        stroke: Stroke {
            id: StrokeId(1),
            points: vec![Point::new(5.0, 5.0)],
            brush: BrushParams {
                radius: 3.0,
                feather: 0.0,
                strength: 100.0,
                erase: false,
            },
        },
        mode,
        intensity,
        color: None,
    }
}

#[test]
fn erase_light_strokes_are_rejected() {
    let mut s = dot(LightMode::RaiseWhite, 50.0);
    assert!(s.validate().is_ok());
    s.stroke.brush.erase = true;
    let err = s.validate().unwrap_err();
    assert!(err.to_string().contains("cannot erase"));
}

#[test]
fn intensity_domain_is_checked() {
    assert!(dot(LightMode::Blur, 101.0).validate().is_err());
}

#[test]
fn effect_only_inside_stroke() {
    let base = Raster::solid(20, 20, [90, 90, 90, 255]).unwrap();
    let out = light_pass(&base, [&dot(LightMode::RaiseWhite, 100.0)], &EngineOpts::default())
        .unwrap();
    assert!(out.pixel(5, 5)[0] > 90);
    assert_eq!(out.pixel(15, 15), base.pixel(15, 15));
}

#[test]
fn darken_and_raise_move_in_opposite_directions() {
    let base = Raster::solid(10, 10, [120, 120, 120, 255]).unwrap();
    let opts = EngineOpts::default();
    let up = light_pass(&base, [&dot(LightMode::RaiseShadows, 80.0)], &opts).unwrap();
    let down = light_pass(&base, [&dot(LightMode::Darken, 80.0)], &opts).unwrap();
    assert!(up.pixel(5, 5)[1] > 120);
    assert!(down.pixel(5, 5)[1] < 120);
}

#[test]
fn color_override_tints_fill_modes() {
    let mut s = dot(LightMode::RaiseWhite, 100.0);
    s.color = Some([255, 0, 0]);
    assert_eq!(s.fill_color(), Some([1.0, 0.0, 0.0]));
    let base = Raster::solid(10, 10, [100, 100, 100, 255]).unwrap();
    let out = light_pass(&base, [&s], &EngineOpts::default()).unwrap();
    let px = out.pixel(5, 5);
    assert!(px[0] > 100);
    assert_eq!(px[1], 100);
    assert!(dot(LightMode::Blur, 10.0).fill_color().is_none());
}

#[test]
fn zero_intensity_is_noop_for_every_mode() {
    let mut data = Vec::new();
    for i in 0..100u32 {
        data.extend_from_slice(&[(i * 2) as u8, 80, (255 - i) as u8, 255]);
    }
    let base = Raster::from_premul(10, 10, data).unwrap();
    for mode in LightMode::ALL {
        assert_eq!(light_effect(&base, mode, 0.0, None, false), base, "{mode:?}");
    }
}

#[test]
fn strokes_apply_in_commit_order() {
    let base = Raster::solid(10, 10, [100, 100, 100, 255]).unwrap();
    let opts = EngineOpts::default();
    let warm = dot(LightMode::RaiseWarm, 100.0);
    let desat = dot(LightMode::ReduceSaturation, 100.0);

    let warm_then_desat = light_pass(&base, [&warm, &desat], &opts).unwrap();
    let px = warm_then_desat.pixel(5, 5);
    assert!(px[0].abs_diff(px[2]) <= 1, "{px:?}");

    let desat_then_warm = light_pass(&base, [&desat, &warm], &opts).unwrap();
    let px = desat_then_warm.pixel(5, 5);
    assert!(px[0] > px[2] + 10, "{px:?}");
    assert_eq!(desat_then_warm.pixel(0, 0), base.pixel(0, 0));
}

#[test]
fn prepainted_masks_match_rasterized_pass() {
    let base = Raster::solid(20, 20, [90, 120, 60, 255]).unwrap();
    let s = dot(LightMode::RaiseWarm, 70.0);
    let opts = EngineOpts::default();
    let mask = light_mask(&s, 20, 20).unwrap();
    assert_eq!(
        light_pass_with_masks(&base, [(&s, &mask)], &opts).unwrap(),
        light_pass(&base, [&s], &opts).unwrap()
    );

    let small = light_mask(&s, 10, 10).unwrap();
    assert!(light_pass_with_masks(&base, [(&s, &small)], &opts).is_err());
}
