use super::*;

fn gradient_raster(w: u32, h: u32) -> Raster {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[(x * 255 / w.max(1)) as u8, (y * 40) as u8, 90, 255]);
        }
    }
    Raster::from_premul(w, h, data).unwrap()
}

#[test]
fn identity_factors_are_noop() {
    let mut r = gradient_raster(6, 4);
    let before = r.clone();
    apply_filter_factors(&mut r, FilterFactors::default(), false);
    assert_eq!(r, before);
}

#[test]
fn saturate_keeps_grays_gray() {
    for s in [0.0, 0.5, 1.8, 3.0] {
        let out = saturate([0.4, 0.4, 0.4], s);
        assert!((out[0] - 0.4).abs() < 1e-5);
        assert!((out[1] - 0.4).abs() < 1e-5);
        assert!((out[2] - 0.4).abs() < 1e-5);
    }
}

#[test]
fn contrast_pushes_away_from_mid_gray() {
    let f = FilterFactors {
        contrast: 1.5,
        ..FilterFactors::default()
    };
    let dark = f.apply([0.3, 0.3, 0.3]);
    let bright = f.apply([0.7, 0.7, 0.7]);
    assert!(dark[0] < 0.3);
    assert!(bright[0] > 0.7);
    assert!((f.apply([0.5, 0.5, 0.5])[0] - 0.5).abs() < 1e-6);
}

#[test]
fn blur_constant_image_is_identity() {
    let r = Raster::solid(5, 4, [10, 20, 30, 255]).unwrap();
    let out = gaussian_blur(&r, 2.0, false);
    assert_eq!(out, r);
}

#[test]
fn blur_zero_sigma_is_identity() {
    let r = gradient_raster(3, 3);
    assert_eq!(gaussian_blur(&r, 0.0, false), r);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (9u32, 9u32);
    let mut r = Raster::new(w, h).unwrap();
    let center = ((4 * w + 4) * 4) as usize;
    r.data[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = gaussian_blur(&r, 1.2, false);
    let nonzero = out.data.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);
    let sum_a: u32 = out.data.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 8);
}

#[test]
fn parallel_blur_matches_serial() {
    let r = gradient_raster(17, 11);
    assert_eq!(gaussian_blur(&r, 1.5, false), gaussian_blur(&r, 1.5, true));
}

#[test]
fn unsharp_on_flat_image_is_noop() {
    let mut r = Raster::solid(6, 6, [120, 60, 30, 255]).unwrap();
    let before = r.clone();
    unsharp_mask(&mut r, 1.0, 1.0, false);
    assert_eq!(r, before);
}

#[test]
fn unsharp_increases_edge_contrast() {
    let mut data = Vec::new();
    for x in 0..8u32 {
        let v = if x < 4 { 80 } else { 170 };
        data.extend_from_slice(&[v, v, v, 255]);
    }
    let mut r = Raster::from_premul(8, 1, data).unwrap();
    unsharp_mask(&mut r, 1.0, 1.0, false);
    assert!(r.pixel(3, 0)[0] < 80);
    assert!(r.pixel(4, 0)[0] > 170);
}

#[test]
fn soft_light_with_mid_gray_is_identity() {
    for cb in [0.0, 0.1, 0.5, 0.9, 1.0] {
        assert!((soft_light_channel(cb, 0.5) - cb).abs() < 1e-6);
    }
    assert!(soft_light_channel(0.4, 1.0) > 0.4);
    assert!(soft_light_channel(0.4, 0.0) < 0.4);
}

#[test]
fn overlay_fill_at_zero_alpha_is_noop() {
    let mut r = gradient_raster(4, 4);
    let before = r.clone();
    blend_fill(&mut r, [1.0, 0.5, 0.0], 0.0, FillBlend::Overlay, false);
    assert_eq!(r, before);
}

#[test]
fn vignette_darkens_corners_not_center() {
    let mut r = Raster::solid(41, 41, [200, 200, 200, 255]).unwrap();
    vignette(&mut r, 100.0, false);
    let center = r.pixel(20, 20)[0];
    let corner = r.pixel(0, 0)[0];
    assert!(corner < 80, "corner {corner}");
    assert!(center > 190, "center {center}");
}

#[test]
fn vignette_partial_amount_keeps_inner_disc() {
    let mut r = Raster::solid(41, 41, [200, 200, 200, 255]).unwrap();
    vignette(&mut r, 30.0, false);
    assert_eq!(r.pixel(20, 20)[0], 200);
    assert_eq!(r.pixel(20, 5)[0], 200);
    assert!(r.pixel(0, 0)[0] < 200);
}
