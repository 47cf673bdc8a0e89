//! The image collaborator: turns encoded image buffers into pixel samples and
//! back. The engine treats it as an opaque and possibly lossy transform.

use crate::error::{Result, StegoError};
use crate::pixels::PixelData;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat, RgbImage};
use log::debug;

pub const DEFAULT_QUALITY: u8 = 95;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct PreprocessOptions {
    /// Longest edge allowed before embedding; larger images are scaled down.
    pub max_dimension: Option<u32>,
}

pub trait ImageCodec {
    /// Normalises an arbitrary input image into the form pixels are read from.
    fn preprocess_to_standard_format(
        &self,
        buffer: &[u8],
        options: &PreprocessOptions,
    ) -> Result<Vec<u8>>;

    fn decode_to_pixels(&self, buffer: &[u8]) -> Result<PixelData>;

    /// Produces the bytes that are actually transmitted. May be lossy.
    fn encode_from_pixels(&self, pixels: &PixelData, quality: u8) -> Result<Vec<u8>>;

    fn get_dimensions(&self, buffer: &[u8]) -> Result<Dimensions>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RasterCodec {
    output: OutputFormat,
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self::new(OutputFormat::Png)
    }
}

impl RasterCodec {
    pub fn new(output: OutputFormat) -> Self {
        Self { output }
    }

    fn load(&self, buffer: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory(buffer)?)
    }

    fn write(&self, img: &DynamicImage, format: ImageOutputFormat) -> Result<Vec<u8>> {
        let mut out: Vec<u8> = Vec::new();
        img.write_to(&mut out, format)?;
        Ok(out)
    }
}

impl ImageCodec for RasterCodec {
    fn preprocess_to_standard_format(
        &self,
        buffer: &[u8],
        options: &PreprocessOptions,
    ) -> Result<Vec<u8>> {
        let mut img = self.load(buffer)?;
        let (width, height) = img.dimensions();

        if let Some(max) = options.max_dimension {
            if max == 0 {
                return Err(StegoError::Input(
                    "max dimension must be positive".to_string(),
                ));
            }
            if width > max || height > max {
                img = img.resize(max, max, FilterType::Lanczos3);
                debug!(
                    "resized {}x{} to {}x{}",
                    width,
                    height,
                    img.width(),
                    img.height()
                );
            }
        }

        // PNG keeps the samples exactly as decoded
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        self.write(&rgb, ImageOutputFormat::Png)
    }

    fn decode_to_pixels(&self, buffer: &[u8]) -> Result<PixelData> {
        let rgb = self.load(buffer)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        PixelData::from_rgb_interleaved(width, height, &rgb.into_raw())
    }

    fn encode_from_pixels(&self, pixels: &PixelData, quality: u8) -> Result<Vec<u8>> {
        let buffer =
            match RgbImage::from_raw(pixels.width(), pixels.height(), pixels.to_rgb_interleaved()) {
                Some(b) => Ok(b),
                None => Err(StegoError::Codec(
                    "could not create output image buffer from raw parts".to_string(),
                )),
            }?;

        let format = match self.output {
            OutputFormat::Png => ImageOutputFormat::Png,
            OutputFormat::Jpeg => ImageOutputFormat::Jpeg(quality.max(1).min(100)),
        };
        self.write(&DynamicImage::ImageRgb8(buffer), format)
    }

    fn get_dimensions(&self, buffer: &[u8]) -> Result<Dimensions> {
        let (width, height) = self.load(buffer)?.dimensions();
        Ok(Dimensions { width, height })
    }
}
