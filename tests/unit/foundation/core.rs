use super::*;

#[test]
fn solid_premultiplies_color() {
    let r = Raster::solid(2, 1, [200, 100, 0, 128]).unwrap();
    assert_eq!(r.pixel(0, 0), [100, 50, 0, 128]);
    assert_eq!(r.pixel(1, 0), [100, 50, 0, 128]);
}

#[test]
fn from_premul_rejects_wrong_length() {
    assert!(Raster::from_premul(2, 2, vec![0; 15]).is_err());
    assert!(Raster::from_premul(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn zero_sized_raster_fails_validation() {
    let r = Raster {
        width: 0,
        height: 4,
        data: Vec::new(),
    };
    assert!(r.validate().is_err());
}

#[test]
fn opaque_straight_round_trip_is_exact() {
    let bytes = vec![12u8, 34, 56, 255, 200, 0, 9, 255];
    let r = Raster::from_straight_rgba8(2, 1, bytes.clone()).unwrap();
    assert_eq!(r.data, bytes);
    assert_eq!(r.to_straight_rgba8(), bytes);
}

#[test]
fn out_of_bounds_pixel_is_transparent() {
    let r = Raster::solid(1, 1, [255, 255, 255, 255]).unwrap();
    assert_eq!(r.pixel(5, 0), [0, 0, 0, 0]);
}

#[test]
fn percent_points_scale_by_dimensions() {
    let p = percent_to_px(Point::new(50.0, 25.0), 200, 80);
    assert_eq!(p, Point::new(100.0, 20.0));
}
