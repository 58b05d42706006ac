use std::io::Cursor;

use anyhow::Context;

use crate::foundation::core::Raster;
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::foundation::opts::EngineOpts;

/// Decode any format the `image` crate understands into a premultiplied raster.
///
/// Undecodable bytes and images over the pixel budget are resource errors.
pub fn decode_image(bytes: &[u8], opts: &EngineOpts) -> RetouchResult<Raster> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| RetouchError::resource(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    opts.check_dimensions(width, height)?;
    Raster::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Read and decode an image file.
pub fn load_image(path: &std::path::Path, opts: &EngineOpts) -> RetouchResult<Raster> {
    let bytes = std::fs::read(path)
        .map_err(|e| RetouchError::resource(format!("read '{}': {e}", path.display())))?;
    decode_image(&bytes, opts)
}

/// Encode as a lossless straight-alpha RGBA PNG.
pub fn encode_png(raster: &Raster) -> RetouchResult<Vec<u8>> {
    raster.validate()?;
    let mut out = Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut out,
        &raster.to_straight_rgba8(),
        raster.width,
        raster.height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .context("encode png")
    .map_err(|e| RetouchError::export(format!("{e:#}")))?;
    Ok(out.into_inner())
}

/// Encode a single-channel coverage buffer as an 8-bit grayscale PNG.
pub fn encode_gray_png(width: u32, height: u32, luma: &[u8]) -> RetouchResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut out,
        luma,
        width,
        height,
        image::ExtendedColorType::L8,
        image::ImageFormat::Png,
    )
    .map_err(|e| RetouchError::export(format!("encode gray png: {e}")))?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/codec.rs"]
mod tests;
