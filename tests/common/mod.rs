#![allow(dead_code)]

use stegcast::error::Result;
use stegcast::{Dimensions, ImageCodec, PixelData, PreprocessOptions, StegoError};

/// What happens to sample LSBs when pixels are turned back into bytes.
#[derive(Debug, Copy, Clone)]
pub enum Transport {
    Lossless,
    /// Flips the LSB of every fifth sample, in embedding order. Each group of
    /// three or more contiguous copies sees at most one flip.
    FlipEveryFifth,
    /// Clears every LSB.
    Destroy,
}

/// In-memory codec: an 8-byte width/height prefix followed by interleaved RGB.
pub struct MemoryCodec {
    pub transport: Transport,
}

impl MemoryCodec {
    pub fn lossless() -> Self {
        Self {
            transport: Transport::Lossless,
        }
    }

    pub fn noisy() -> Self {
        Self {
            transport: Transport::FlipEveryFifth,
        }
    }

    pub fn destructive() -> Self {
        Self {
            transport: Transport::Destroy,
        }
    }
}

pub fn raw_image(pixels: &PixelData) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&pixels.width().to_be_bytes());
    out.extend_from_slice(&pixels.height().to_be_bytes());
    out.extend(pixels.to_rgb_interleaved());
    out
}

/// A deterministic, textured cover image.
pub fn cover(width: u32, height: u32) -> Vec<u8> {
    let total = (width * height) as usize;
    let samples: Vec<u8> = (0..total * 3).map(|i| (i * 37 % 251) as u8).collect();
    let pixels = PixelData::from_rgb_interleaved(width, height, &samples).expect("no error");
    raw_image(&pixels)
}

impl ImageCodec for MemoryCodec {
    fn preprocess_to_standard_format(
        &self,
        buffer: &[u8],
        _options: &PreprocessOptions,
    ) -> Result<Vec<u8>> {
        Ok(buffer.to_vec())
    }

    fn decode_to_pixels(&self, buffer: &[u8]) -> Result<PixelData> {
        let dims = self.get_dimensions(buffer)?;
        PixelData::from_rgb_interleaved(dims.width, dims.height, &buffer[8..])
    }

    fn encode_from_pixels(&self, pixels: &PixelData, _quality: u8) -> Result<Vec<u8>> {
        let mut samples = pixels.to_rgb_interleaved();
        for (i, sample) in samples.iter_mut().enumerate() {
            match self.transport {
                Transport::Lossless => {}
                Transport::FlipEveryFifth if i % 5 == 0 => *sample ^= 1,
                Transport::FlipEveryFifth => {}
                Transport::Destroy => *sample &= 0xFE,
            }
        }
        let out = PixelData::from_rgb_interleaved(pixels.width(), pixels.height(), &samples)?;
        Ok(raw_image(&out))
    }

    fn get_dimensions(&self, buffer: &[u8]) -> Result<Dimensions> {
        if buffer.len() < 8 {
            return Err(StegoError::Codec("truncated image".to_string()));
        }
        let width = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);
        let height = u32::from_be_bytes([buffer[4], buffer[5], buffer[6], buffer[7]]);
        Ok(Dimensions { width, height })
    }
}
