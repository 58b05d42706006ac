use super::*;
use crate::mask::stroke::StrokeId;

fn hard(radius: f32) -> BrushParams {
    BrushParams {
        radius,
        feather: 0.0,
        strength: 100.0,
        erase: false,
    }
}

fn stroke(points: &[(f64, f64)], brush: BrushParams) -> Stroke {
    Stroke {
        id: StrokeId(1),
        points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        brush,
    }
}

#[test]
fn hard_brush_has_crisp_edge() {
    let mut m = AlphaMask::new(60, 40).unwrap();
    paint_stroke(&mut m, &stroke(&[(10.0, 20.0), (50.0, 20.0)], hard(5.0)));
    for x in 10..=50 {
        assert_eq!(m.get(x, 20), 1.0);
        assert_eq!(m.get(x, 24), 1.0, "inside at x={x}");
        assert_eq!(m.get(x, 26), 0.0, "outside at x={x}");
        assert_eq!(m.get(x, 14), 0.0);
    }
    assert_eq!(m.get(10, 25), 1.0);
    assert_eq!(m.get(4, 20), 0.0);
    assert_eq!(m.get(56, 20), 0.0);
}

#[test]
fn feathered_dab_fades_linearly() {
    let brush = BrushParams {
        radius: 10.0,
        feather: 25.0,
        strength: 100.0,
        erase: false,
    };
    assert_eq!(brush.inner_radius(), 5.0);
    assert_eq!(dab_falloff(&brush, 5.0), 1.0);
    assert!((dab_falloff(&brush, 7.5) - 0.5).abs() < 1e-6);
    assert_eq!(dab_falloff(&brush, 10.0), 0.0);
}

#[test]
fn strength_scales_single_dab() {
    let mut m = AlphaMask::new(9, 9).unwrap();
    let brush = BrushParams {
        strength: 40.0,
        ..hard(3.0)
    };
    paint_dab(&mut m, Point::new(4.0, 4.0), &brush);
    assert!((m.get(4, 4) - 0.4).abs() < 1e-6);
    paint_dab(&mut m, Point::new(4.0, 4.0), &brush);
    assert!((m.get(4, 4) - 0.64).abs() < 1e-6);
}

#[test]
fn erase_removes_coverage() {
    let mut m = AlphaMask::new(30, 30).unwrap();
    paint_stroke(&mut m, &stroke(&[(15.0, 15.0)], hard(10.0)));
    let eraser = BrushParams {
        erase: true,
        ..hard(4.0)
    };
    paint_stroke(&mut m, &stroke(&[(15.0, 15.0)], eraser));
    assert_eq!(m.get(15, 15), 0.0);
    assert_eq!(m.get(15, 23), 1.0);
}

#[test]
fn dab_outside_canvas_is_ignored() {
    let mut m = AlphaMask::new(10, 10).unwrap();
    paint_dab(&mut m, Point::new(-50.0, 5.0), &hard(5.0));
    paint_dab(&mut m, Point::new(5.0, 90.0), &hard(5.0));
    assert!(m.is_clear());
}

#[test]
fn far_off_segment_endpoint_is_clipped_to_canvas() {
    let mut far = AlphaMask::new(16, 16).unwrap();
    paint_segment(&mut far, Point::new(0.0, 8.0), Point::new(1e12, 8.0), &hard(1.0));
    for x in 1..16 {
        assert_eq!(far.get(x, 8), 1.0, "x={x}");
    }
    assert_eq!(far.get(0, 0), 0.0);

    let mut near = AlphaMask::new(16, 16).unwrap();
    paint_segment(&mut near, Point::new(0.0, 8.0), Point::new(40.0, 8.0), &hard(1.0));
    assert_eq!(far.get(15, 8), near.get(15, 8));
}

#[test]
fn segment_missing_the_canvas_paints_nothing() {
    let mut m = AlphaMask::new(8, 8).unwrap();
    paint_segment(&mut m, Point::new(-1e9, -50.0), Point::new(1e9, -50.0), &hard(3.0));
    assert!(m.data.iter().all(|&a| a == 0.0));
}

#[test]
fn segments_painted_incrementally_match_full_stroke() {
    let brush = BrushParams {
        radius: 6.0,
        feather: 60.0,
        strength: 70.0,
        erase: false,
    };
    let pts = [(5.0, 5.0), (30.0, 12.0), (22.0, 35.0), (40.0, 38.0)];
    let mut full = AlphaMask::new(48, 48).unwrap();
    paint_stroke(&mut full, &stroke(&pts, brush));

    let mut live = AlphaMask::new(48, 48).unwrap();
    let first = Point::new(pts[0].0, pts[0].1);
    paint_dab(&mut live, first, &brush);
    let mut prev = first;
    for &(x, y) in &pts[1..] {
        let p = Point::new(x, y);
        paint_segment(&mut live, prev, p, &brush);
        prev = p;
    }
    assert_eq!(full, live);
}

#[test]
fn invert_is_complement() {
    let mut m = AlphaMask::new(20, 20).unwrap();
    paint_stroke(
        &mut m,
        &stroke(
            &[(3.0, 3.0), (16.0, 11.0)],
            BrushParams {
                radius: 4.0,
                feather: 80.0,
                strength: 55.0,
                erase: false,
            },
        ),
    );
    let inv = m.inverted();
    for (a, b) in m.data.iter().zip(&inv.data) {
        assert!((a + b - 1.0).abs() < 1e-6);
    }
}

#[test]
fn render_strokes_with_no_strokes_is_clear() {
    let m = render_strokes(8, 8, std::iter::empty()).unwrap();
    assert!(m.is_clear());
    assert_eq!(m.to_luma8(), vec![0u8; 64]);
}
