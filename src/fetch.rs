use image::RgbImage;
use std::time::Duration;
use thiserror::Error;

/// Total time allowed for one image download.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures while retrieving or decoding the source image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, timeout, or non-success status.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The response body was not a decodable image.
    #[error(transparent)]
    Decode(#[from] image::ImageError),
}

/// Retrieves a source image by URL and yields it in the canonical
/// 3-channel RGB encoding.
pub trait ImageSource {
    /// The error type that can be returned during a fetch.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches and decodes one image. A single attempt, no retries.
    fn fetch(&self, url: &str) -> Result<RgbImage, Self::Error>;
}

/// HTTP-backed [`ImageSource`] with a bounded per-request timeout.
pub struct HttpImageSource {
    client: reqwest::blocking::Client,
}

impl HttpImageSource {
    /// Builds a source with the default 30-second timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl ImageSource for HttpImageSource {
    type Error = FetchError;

    fn fetch(&self, url: &str) -> Result<RgbImage, FetchError> {
        log::info!("Downloading image from: {url}");
        let body = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .bytes()?;
        // Normalize to RGB regardless of the source encoding (alpha,
        // grayscale, palette).
        let decoded = image::load_from_memory(&body)?;
        Ok(decoded.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    #[test]
    fn decode_normalizes_to_rgb() {
        // A 2x2 RGBA PNG with a translucent pixel still decodes to 3 channels.
        let rgba = image::RgbaImage::from_fn(2, 2, |x, y| {
            image::Rgba([x as u8 * 100, y as u8 * 100, 50, 128])
        });
        let mut png = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();

        let decoded = image::load_from_memory(png.get_ref()).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(1, 1).0.len(), 3);
    }
}
