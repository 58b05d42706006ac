//! Hand-off to a remote generative edit service.
//!
//! Only the interface lives here. A request carries the flattened base (no overlays) and the
//! optional removal mask as base64 PNG parts; the response carries the replacement image.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::assets::codec::{decode_image, encode_gray_png, encode_png};
use crate::export::flatten::{Transforms, transform_composite};
use crate::foundation::core::Raster;
use crate::foundation::error::{RemoteFailure, RetouchError, RetouchResult};
use crate::foundation::opts::EngineOpts;
use crate::mask::builder::AlphaMask;

/// Request body for [`ImageEditService::edit`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Free-form instruction for the model.
    pub instruction: String,
    /// Base64 PNG of the flattened base.
    pub image_png: String,
    /// Base64 grayscale PNG of the removal mask, white where content should be removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_png: Option<String>,
}

impl EditRequest {
    /// Encode the request parts.
    pub fn new(
        instruction: impl Into<String>,
        image: &Raster,
        mask: Option<&AlphaMask>,
    ) -> RetouchResult<Self> {
        let image_png = STANDARD.encode(encode_png(image)?);
        let mask_png = match mask {
            Some(m) => Some(STANDARD.encode(encode_gray_png(m.width, m.height, &m.to_luma8())?)),
            None => None,
        };
        Ok(Self {
            instruction: instruction.into(),
            image_png,
            mask_png,
        })
    }
}

/// Successful service reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResponse {
    /// Base64 PNG (or any format `image` decodes) of the edited photo.
    pub image_png: String,
}

impl EditResponse {
    /// Wrap an encoded image.
    pub fn from_png(png: &[u8]) -> Self {
        Self {
            image_png: STANDARD.encode(png),
        }
    }

    /// Decode the returned image. A payload that is not base64 is an unknown remote failure.
    pub fn decode(&self, opts: &EngineOpts) -> RetouchResult<Raster> {
        let bytes = STANDARD.decode(self.image_png.as_bytes()).map_err(|e| {
            tracing::warn!(error = %e, "remote edit returned malformed base64");
            RetouchError::Remote(RemoteFailure::Unknown)
        })?;
        decode_image(&bytes, opts)
    }
}

/// A generative edit backend.
pub trait ImageEditService {
    /// Run one edit.
    fn edit(&self, request: &EditRequest) -> Result<EditResponse, RemoteFailure>;
}

/// Carry a source-space mask through the export transforms so it lines up with the flattened
/// base.
pub fn transform_mask(mask: &AlphaMask, transforms: &Transforms) -> RetouchResult<AlphaMask> {
    if transforms.is_identity() {
        return Ok(mask.clone());
    }
    let mut data = Vec::with_capacity(mask.data.len() * 4);
    for v in mask.to_luma8() {
        data.extend_from_slice(&[v, v, v, 255]);
    }
    let gray = Raster::from_premul(mask.width, mask.height, data)?;
    let moved = transform_composite(&gray, transforms)?;
    let mut out = AlphaMask::new(moved.width, moved.height)?;
    for (dst, px) in out.data.iter_mut().zip(moved.data.chunks_exact(4)) {
        *dst = f32::from(px[0]) / 255.0;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/session/remote.rs"]
mod tests;
