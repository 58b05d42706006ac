use super::*;

#[test]
fn minimal_recipe_parses_with_defaults() {
    let r = RenderRecipe::from_json(r#"{"source":"in.png"}"#).unwrap();
    assert_eq!(r.source, PathBuf::from("in.png"));
    assert!(r.adjustments.is_neutral());
    assert!(r.layers.is_empty());
    assert!(r.transforms.is_identity());
}

#[test]
fn full_recipe_parses() {
    let json = r#"{
        "source": "photo.jpg",
        "adjustments": {"contrast": 20, "vibrance": 3},
        "layers": [
            {"name": "left", "kind": "brush", "adjustments": {"saturation": 80},
             "strokes": [{"points": [{"x": 1, "y": 2}, {"x": 3, "y": 4}],
                          "brush": {"radius": 5, "feather": 0, "strength": 100}}]},
            {"kind": "radial_gradient", "invert": true,
             "gradient": {"start": {"x": 50, "y": 50}, "end": {"x": 80, "y": 50}, "feather": 30}}
        ],
        "light": [{"mode": "raise-warm", "intensity": 40, "points": [{"x": 9, "y": 9}]}],
        "overlays": [
            {"type": "text", "text": {"content": "Hi", "font": "Inter", "size": 5}},
            {"type": "image", "path": "logo.png", "x": 80, "y": 10, "width": 15}
        ],
        "transforms": {"rotation": 90, "flip_x": true}
    }"#;
    let r = RenderRecipe::from_json(json).unwrap();
    assert_eq!(r.adjustments.contrast, 20.0);
    assert_eq!(r.layers.len(), 2);
    assert!(r.layers[0].visible);
    assert_eq!(r.layers[0].strokes[0].points[1], Point::new(3.0, 4.0));
    assert_eq!(r.layers[1].kind, MaskKind::RadialGradient);
    assert_eq!(r.light[0].mode, LightMode::RaiseWarm);
    assert_eq!(r.light[0].brush, BrushParams::default());
    assert!(matches!(r.overlays[1], OverlayRecipe::Image { width, .. } if width == 15.0));
    assert!(r.transforms.flip_x);
}

#[test]
fn unknown_fields_are_validation_errors() {
    let err = RenderRecipe::from_json(r#"{"source":"a.png","sharpen":3}"#).unwrap_err();
    assert!(matches!(err, RetouchError::Validation(_)));
}

#[test]
fn missing_source_file_is_a_resource_error() {
    let r = RenderRecipe::from_json(r#"{"source":"does/not/exist.png"}"#).unwrap();
    let err = r
        .build(Path::new("/nonexistent-dir"), EngineOpts::default())
        .unwrap_err();
    assert!(matches!(err, RetouchError::Resource(_)));
}

#[test]
fn relative_paths_resolve_against_base_dir() {
    assert_eq!(
        resolve(Path::new("/a/b"), Path::new("c.png")),
        PathBuf::from("/a/b/c.png")
    );
    assert_eq!(
        resolve(Path::new("/a/b"), Path::new("/x/c.png")),
        PathBuf::from("/x/c.png")
    );
}
