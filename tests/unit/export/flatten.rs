use super::*;
use crate::foundation::core::Point;
use crate::overlay::model::{ImageContent, OverlayId, OverlayTransform, TextContent};

fn numbered(w: u32, h: u32) -> Raster {
    let mut data = Vec::new();
    for i in 0..(w * h) {
        data.extend_from_slice(&[i as u8, (i * 3) as u8, 7, 255]);
    }
    Raster::from_premul(w, h, data).unwrap()
}

fn assert_close(a: [u8; 4], b: [u8; 4]) {
    for i in 0..4 {
        assert!(a[i].abs_diff(b[i]) <= 2, "{a:?} vs {b:?}");
    }
}

fn image_overlay(rgba: [u8; 4], opacity: f64) -> Overlay {
    Overlay {
        id: OverlayId(1),
        transform: OverlayTransform {
            x: 50.0,
            y: 50.0,
            width: 50.0,
            height: 50.0,
            rotation: 0.0,
            opacity,
        },
        content: OverlayContent::Image(
            ImageContent::new(Raster::solid(8, 8, rgba).unwrap()).unwrap(),
        ),
        z_index: 1,
        template_id: None,
    }
}

#[test]
fn identity_export_matches_composite() {
    let src = numbered(5, 3);
    let out = flatten(
        &src,
        &[],
        &Transforms::default(),
        &FontRegistry::new(),
        ExportOptions::default(),
    )
    .unwrap();
    assert_eq!(out, src);
    assert!(Transforms::default().is_identity());
}

#[test]
fn export_size_follows_rotated_bounds() {
    assert_eq!(export_size(40, 20, 0.0), (40, 20));
    assert_eq!(export_size(40, 20, 90.0), (20, 40));
    assert_eq!(export_size(40, 20, -270.0), (20, 40));
    assert_eq!(export_size(40, 20, 180.0), (40, 20));
    let (w, h) = export_size(100, 100, 45.0);
    assert_eq!((w, h), (141, 141));
}

#[test]
fn quarter_turn_is_lossless() {
    let src = numbered(3, 2);
    let t = Transforms {
        rotation: 90.0,
        ..Transforms::default()
    };
    let out = transform_composite(&src, &t).unwrap();
    assert_eq!((out.width, out.height), (2, 3));
    // Clockwise: the bottom-left source pixel lands top-left.
    assert_eq!(out.pixel(0, 0), src.pixel(0, 1));
    assert_eq!(out.pixel(1, 0), src.pixel(0, 0));
    assert_eq!(out.pixel(1, 2), src.pixel(2, 0));

    let back = transform_composite(
        &out,
        &Transforms {
            rotation: 270.0,
            ..Transforms::default()
        },
    )
    .unwrap();
    assert_eq!(back, src);
}

#[test]
fn quarter_turn_agrees_with_affine() {
    let (w, h) = (3u32, 2u32);
    let t = Transforms {
        rotation: 90.0,
        flip_x: true,
        flip_y: false,
    };
    let src = numbered(w, h);
    let out = transform_composite(&src, &t).unwrap();
    let a = base_transform(w, h, &t);
    for y in 0..h {
        for x in 0..w {
            let p = a * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let (ox, oy) = ((p.x - 0.5).round() as u32, (p.y - 0.5).round() as u32);
            assert_eq!(out.pixel(ox, oy), src.pixel(x, y), "({x},{y})");
        }
    }
}

#[test]
fn double_flip_equals_half_turn() {
    let src = numbered(4, 3);
    let flipped = transform_composite(
        &src,
        &Transforms {
            rotation: 0.0,
            flip_x: true,
            flip_y: true,
        },
    )
    .unwrap();
    let turned = transform_composite(
        &src,
        &Transforms {
            rotation: 180.0,
            ..Transforms::default()
        },
    )
    .unwrap();
    assert_eq!(flipped, turned);
}

#[test]
fn arbitrary_rotation_has_transparent_corners() {
    let src = Raster::solid(20, 20, [200, 10, 10, 255]).unwrap();
    let out = transform_composite(
        &src,
        &Transforms {
            rotation: 45.0,
            ..Transforms::default()
        },
    )
    .unwrap();
    assert_eq!((out.width, out.height), (28, 28));
    assert_eq!(out.pixel(0, 0)[3], 0);
    assert_close(out.pixel(14, 14), [200, 10, 10, 255]);
}

#[test]
fn image_overlay_paints_its_box_only() {
    let src = Raster::solid(40, 40, [0, 0, 255, 255]).unwrap();
    let o = image_overlay([255, 0, 0, 255], 100.0);
    let out = flatten(
        &src,
        &[&o],
        &Transforms::default(),
        &FontRegistry::new(),
        ExportOptions::default(),
    )
    .unwrap();
    assert_close(out.pixel(20, 20), [255, 0, 0, 255]);
    assert_eq!(out.pixel(2, 2), [0, 0, 255, 255]);
    assert_eq!(out.pixel(37, 20), [0, 0, 255, 255]);
}

#[test]
fn mask_pass_skips_overlays() {
    let src = Raster::solid(16, 16, [0, 0, 255, 255]).unwrap();
    let o = image_overlay([255, 0, 0, 255], 100.0);
    let out = flatten(
        &src,
        &[&o],
        &Transforms::default(),
        &FontRegistry::new(),
        ExportOptions { mask_pass: true },
    )
    .unwrap();
    assert_eq!(out, src);
}

#[test]
fn zero_opacity_overlay_is_invisible() {
    let src = Raster::solid(16, 16, [0, 0, 255, 255]).unwrap();
    let o = image_overlay([255, 0, 0, 255], 0.0);
    let out = flatten(
        &src,
        &[&o],
        &Transforms::default(),
        &FontRegistry::new(),
        ExportOptions::default(),
    )
    .unwrap();
    assert_eq!(out, src);
}

#[test]
fn text_with_unregistered_font_fails_export() {
    let src = Raster::solid(16, 16, [0, 0, 0, 255]).unwrap();
    let o = Overlay {
        content: OverlayContent::Text(TextContent {
            content: "hello".into(),
            font: "Nowhere".into(),
            size: 10.0,
            color: [255, 255, 255, 255],
            weight: 400,
            italic: false,
        }),
        ..image_overlay([0, 0, 0, 0], 100.0)
    };
    let err = flatten(
        &src,
        &[&o],
        &Transforms::default(),
        &FontRegistry::new(),
        ExportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RetouchError::Export(_)), "{err}");
}
