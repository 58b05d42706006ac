use super::*;

#[test]
fn png_round_trip_preserves_opaque_pixels() {
    let mut data = Vec::new();
    for i in 0..12u8 {
        data.extend_from_slice(&[i * 20, 255 - i * 20, i, 255]);
    }
    let r = Raster::from_premul(4, 3, data).unwrap();
    let png = encode_png(&r).unwrap();
    assert_eq!(&png[1..4], b"PNG");
    let back = decode_image(&png, &EngineOpts::default()).unwrap();
    assert_eq!(back, r);
}

#[test]
fn encoding_is_deterministic() {
    let r = Raster::solid(7, 5, [10, 200, 30, 128]).unwrap();
    assert_eq!(encode_png(&r).unwrap(), encode_png(&r).unwrap());
}

#[test]
fn garbage_bytes_are_a_resource_error() {
    let err = decode_image(b"not an image", &EngineOpts::default()).unwrap_err();
    assert!(err.is_recoverable(), "{err}");
}

#[test]
fn pixel_budget_applies_to_decoded_images() {
    let png = encode_png(&Raster::solid(10, 10, [0, 0, 0, 255]).unwrap()).unwrap();
    let opts = EngineOpts::default().with_max_pixels(99);
    assert!(decode_image(&png, &opts).is_err());
}

#[test]
fn gray_png_encodes() {
    let png = encode_gray_png(2, 2, &[0, 64, 128, 255]).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_luma8();
    assert_eq!(img.into_raw(), vec![0, 64, 128, 255]);
}
