use super::*;

fn linear(sx: f64, sy: f64, ex: f64, ey: f64) -> GradientDescriptor {
    GradientDescriptor {
        start: Point::new(sx, sy),
        end: Point::new(ex, ey),
        ratio: None,
        rotation: None,
        feather: 0.0,
    }
}

#[test]
fn linear_gradient_hits_anchor_values() {
    let m = render_linear(&linear(50.0, 20.0, 50.0, 80.0), 100, 100).unwrap();
    assert_eq!(m.get(50, 20), 1.0);
    assert_eq!(m.get(50, 80), 0.0);
    assert!((m.get(50, 50) - 0.5).abs() < 1e-6);
    assert_eq!(m.get(0, 10), 1.0);
    assert_eq!(m.get(99, 95), 0.0);
    // Unlimited laterally.
    assert_eq!(m.get(3, 50), m.get(97, 50));
}

#[test]
fn zero_magnitude_gradient_is_transparent() {
    let g = linear(40.0, 40.0, 40.0, 40.0);
    assert!(render_linear(&g, 16, 16).unwrap().is_clear());
    assert!(render_radial(&g, 16, 16).unwrap().is_clear());
}

#[test]
fn radial_circle_with_feather() {
    let g = GradientDescriptor {
        feather: 50.0,
        ..linear(50.0, 50.0, 70.0, 50.0)
    };
    let m = render_radial(&g, 100, 100).unwrap();
    assert_eq!(m.get(50, 50), 1.0);
    assert_eq!(m.get(60, 50), 1.0);
    assert!((m.get(65, 50) - 0.5).abs() < 1e-6);
    assert_eq!(m.get(70, 50), 0.0);
    assert_eq!(m.get(50, 65), m.get(65, 50));
}

#[test]
fn radial_ratio_and_rotation_shape_the_ellipse() {
    let flat = GradientDescriptor {
        ratio: Some(0.5),
        ..linear(50.0, 50.0, 70.0, 50.0)
    };
    let m = render_radial(&flat, 100, 100).unwrap();
    assert_eq!(m.get(68, 50), 1.0);
    assert_eq!(m.get(50, 62), 0.0);
    assert_eq!(m.get(50, 58), 1.0);

    let turned = GradientDescriptor {
        rotation: Some(90.0),
        ..flat
    };
    let m = render_radial(&turned, 100, 100).unwrap();
    assert_eq!(m.get(50, 68), 1.0);
    assert_eq!(m.get(62, 50), 0.0);
}

#[test]
fn validation_rejects_bad_descriptors() {
    assert!(linear(0.0, 0.0, 10.0, 10.0).validate().is_ok());
    let bad_ratio = GradientDescriptor {
        ratio: Some(0.0),
        ..linear(0.0, 0.0, 10.0, 10.0)
    };
    assert!(bad_ratio.validate().is_err());
    let bad_feather = GradientDescriptor {
        feather: 120.0,
        ..linear(0.0, 0.0, 10.0, 10.0)
    };
    assert!(bad_feather.validate().is_err());
    assert!(linear(f64::NAN, 0.0, 1.0, 1.0).validate().is_err());
}
