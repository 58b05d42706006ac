use super::*;

#[test]
fn request_parts_decode_back_to_png() {
    let img = Raster::solid(4, 3, [10, 20, 30, 255]).unwrap();
    let mut mask = AlphaMask::new(4, 3).unwrap();
    mask.data[0] = 1.0;
    let req = EditRequest::new("remove the lamp", &img, Some(&mask)).unwrap();
    assert_eq!(req.instruction, "remove the lamp");

    let back = EditResponse {
        image_png: req.image_png.clone(),
    }
    .decode(&EngineOpts::default())
    .unwrap();
    assert_eq!(back, img);

    let mask_png = STANDARD.decode(req.mask_png.unwrap()).unwrap();
    assert_eq!(&mask_png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn request_without_mask_omits_the_field() {
    let img = Raster::solid(2, 2, [0, 0, 0, 255]).unwrap();
    let req = EditRequest::new("brighten", &img, None).unwrap();
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("mask_png"));
}

#[test]
fn malformed_response_is_an_unknown_remote_failure() {
    let resp = EditResponse {
        image_png: "not base64!!".into(),
    };
    let err = resp.decode(&EngineOpts::default()).unwrap_err();
    assert!(matches!(err, RetouchError::Remote(RemoteFailure::Unknown)));
}

#[test]
fn undecodable_image_is_a_resource_error() {
    let resp = EditResponse::from_png(b"definitely not an image");
    let err = resp.decode(&EngineOpts::default()).unwrap_err();
    assert!(matches!(err, RetouchError::Resource(_)));
}

#[test]
fn mask_follows_quarter_turn() {
    let mut mask = AlphaMask::new(3, 2).unwrap();
    // Bottom-left pixel.
    mask.data[3] = 1.0;
    let t = Transforms {
        rotation: 90.0,
        ..Transforms::default()
    };
    let out = transform_mask(&mask, &t).unwrap();
    assert_eq!((out.width, out.height), (2, 3));
    assert_eq!(out.get(0, 0), 1.0);
    assert_eq!(out.data.iter().filter(|&&v| v > 0.0).count(), 1);
    assert_eq!(transform_mask(&mask, &Transforms::default()).unwrap(), mask);
}
