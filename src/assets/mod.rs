//! Image decoding and PNG encoding.

/// `image`-crate codec helpers.
pub mod codec;
