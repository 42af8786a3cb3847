use crate::error::WorkerError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// Header that makes the encoded payload self-describing and directly
/// renderable by downstream consumers.
pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Serializes the image as PNG and wraps it in a base64 data URI.
pub fn encode_data_uri(image: &RgbImage) -> Result<String, WorkerError> {
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|source| WorkerError::Encoding { source })?;
    Ok(format!("{DATA_URI_PREFIX}{}", BASE64.encode(png.into_inner())))
}
