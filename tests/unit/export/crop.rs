use super::*;

fn numbered(w: u32, h: u32) -> Raster {
    let mut data = Vec::new();
    for i in 0..(w * h) {
        data.extend_from_slice(&[(i * 5) as u8, (i * 11) as u8, 3, 255]);
    }
    Raster::from_premul(w, h, data).unwrap()
}

fn rect(x: f64, y: f64, width: f64, height: f64, rotation: f64) -> CropRect {
    CropRect {
        x,
        y,
        width,
        height,
        rotation,
    }
}

#[test]
fn axis_aligned_integer_crop_copies_pixels() {
    let src = numbered(10, 8);
    let out = crop(&src, &rect(2.0, 3.0, 4.0, 2.0, 0.0), &EngineOpts::default()).unwrap();
    assert_eq!((out.width, out.height), (4, 2));
    for y in 0..2 {
        for x in 0..4 {
            assert_eq!(out.pixel(x, y), src.pixel(x + 2, y + 3));
        }
    }
}

#[test]
fn full_frame_crop_is_identity() {
    let src = numbered(6, 5);
    let out = crop(&src, &rect(0.0, 0.0, 6.0, 5.0, 0.0), &EngineOpts::default()).unwrap();
    assert_eq!(out, src);
}

#[test]
fn half_pixel_offset_interpolates() {
    let src = Raster::from_premul(2, 1, vec![0, 0, 0, 255, 200, 100, 0, 255]).unwrap();
    let out = crop(&src, &rect(0.5, 0.0, 1.0, 1.0, 0.0), &EngineOpts::default()).unwrap();
    assert_eq!(out.pixel(0, 0), [100, 50, 0, 255]);
}

#[test]
fn half_turn_crop_reverses_pixels() {
    let src = numbered(4, 3);
    let out = crop(&src, &rect(0.0, 0.0, 4.0, 3.0, 180.0), &EngineOpts::default()).unwrap();
    assert_eq!(out.pixel(0, 0), src.pixel(3, 2));
    assert_eq!(out.pixel(3, 2), src.pixel(0, 0));
}

#[test]
fn outside_source_is_transparent() {
    let src = numbered(4, 4);
    let out = crop(&src, &rect(-4.0, 0.0, 4.0, 4.0, 0.0), &EngineOpts::default()).unwrap();
    assert!(out.data.iter().all(|&b| b == 0));
}

#[test]
fn degenerate_crops_are_rejected() {
    let src = numbered(4, 4);
    let opts = EngineOpts::default();
    assert!(crop(&src, &rect(0.0, 0.0, 0.2, 4.0, 0.0), &opts).is_err());
    assert!(crop(&src, &rect(f64::NAN, 0.0, 2.0, 2.0, 0.0), &opts).is_err());
    let tiny = EngineOpts::default().with_max_pixels(3);
    assert!(crop(&src, &rect(0.0, 0.0, 2.0, 2.0, 0.0), &tiny).is_err());
}
