use super::*;

#[test]
fn brush_domains_are_checked() {
    assert!(BrushParams::default().validate().is_ok());
    for bad in [
        BrushParams {
            radius: 0.0,
            ..BrushParams::default()
        },
        BrushParams {
            feather: 101.0,
            ..BrushParams::default()
        },
        BrushParams {
            strength: f32::NAN,
            ..BrushParams::default()
        },
    ] {
        assert!(bad.validate().is_err(), "{bad:?}");
    }
}

#[test]
fn inner_radius_tracks_feather() {
    let hard = BrushParams {
        radius: 10.0,
        feather: 0.0,
        ..BrushParams::default()
    };
    assert_eq!(hard.inner_radius(), 10.0);
    let soft = BrushParams {
        feather: 100.0,
        ..hard
    };
    assert_eq!(soft.inner_radius(), 0.0);
    assert!(hard.sample_step() <= hard.radius / 4.0);
}

#[test]
fn stroke_needs_points() {
    let s = Stroke {
        id: StrokeId(1),
        points: vec![],
        brush: BrushParams::default(),
    };
    assert!(s.validate().is_err());
}

#[test]
fn list_generation_bumps_on_every_change() {
    let mut list = StrokeList::new();
    assert_eq!(list.generation(), 0);
    list.push(1u32);
    list.push(2u32);
    assert_eq!(list.generation(), 2);
    assert_eq!(list.pop().as_deref(), Some(&2));
    assert_eq!(list.generation(), 3);
    assert_eq!(list.len(), 1);

    list.clear();
    assert!(list.is_empty());
    assert_eq!(list.generation(), 4);
    assert!(list.pop().is_none());
    assert_eq!(list.generation(), 4);
}

#[test]
fn clones_share_records() {
    let mut list = StrokeList::new();
    let a = list.push(String::from("a"));
    let copy = list.clone();
    assert!(Arc::ptr_eq(&a, copy.last().unwrap()));
}
