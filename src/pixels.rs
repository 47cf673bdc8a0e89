//! Raw RGB samples and the one-bit-per-sample channel carried in their LSBs.
//!
//! Traversal order is part of the wire format: pixels are visited from the
//! start pixel in row-major order, and within each pixel the channels are
//! visited in the requested order. Embedding and extraction share the same
//! walk, so a change here breaks every image written before it.

use crate::error::{Result, StegoError};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

pub const RGB_ORDER: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PixelData {
    width: u32,
    height: u32,
    red: Vec<u8>,
    green: Vec<u8>,
    blue: Vec<u8>,
}

impl PixelData {
    pub fn new(width: u32, height: u32, red: Vec<u8>, green: Vec<u8>, blue: Vec<u8>) -> Result<Self> {
        let total = pixel_count(width, height)?;
        for (name, channel) in &[("red", &red), ("green", &green), ("blue", &blue)] {
            if channel.len() != total {
                return Err(StegoError::Input(format!(
                    "{} channel has {} samples, expected {}",
                    name,
                    channel.len(),
                    total
                )));
            }
        }

        Ok(Self {
            width,
            height,
            red,
            green,
            blue,
        })
    }

    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self> {
        let total = pixel_count(width, height)?;
        Self::new(
            width,
            height,
            vec![rgb[0]; total],
            vec![rgb[1]; total],
            vec![rgb[2]; total],
        )
    }

    /// Splits an interleaved `RGBRGB...` buffer into channels.
    pub fn from_rgb_interleaved(width: u32, height: u32, samples: &[u8]) -> Result<Self> {
        let total = pixel_count(width, height)?;
        if samples.len() != total * 3 {
            return Err(StegoError::Input(format!(
                "expected {} interleaved samples, got {}",
                total * 3,
                samples.len()
            )));
        }

        let mut red = Vec::with_capacity(total);
        let mut green = Vec::with_capacity(total);
        let mut blue = Vec::with_capacity(total);
        for pixel in samples.chunks(3) {
            red.push(pixel[0]);
            green.push(pixel[1]);
            blue.push(pixel[2]);
        }
        Self::new(width, height, red, green, blue)
    }

    pub fn to_rgb_interleaved(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_pixels() * 3);
        for i in 0..self.total_pixels() {
            out.push(self.red[i]);
            out.push(self.green[i]);
            out.push(self.blue[i]);
        }
        out
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn total_pixels(&self) -> usize {
        self.red.len()
    }

    pub fn red(&self) -> &[u8] {
        &self.red
    }

    pub fn green(&self) -> &[u8] {
        &self.green
    }

    pub fn blue(&self) -> &[u8] {
        &self.blue
    }

    fn channel(&self, channel: Channel) -> &[u8] {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut [u8] {
        match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
        }
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(StegoError::Dimension {
            width: u64::from(width),
            height: u64::from(height),
        });
    }
    Ok(width as usize * height as usize)
}

fn slots_from(pixels: &PixelData, start_pixel: usize, channel_order: &[Channel]) -> usize {
    pixels.total_pixels().saturating_sub(start_pixel) * channel_order.len()
}

/// Returns a copy of `pixels` with `bits` written into sample LSBs.
pub fn embed_bits(
    pixels: &PixelData,
    bits: &[u8],
    start_pixel: usize,
    channel_order: &[Channel],
) -> Result<PixelData> {
    if channel_order.is_empty() && !bits.is_empty() {
        return Err(StegoError::Input("channel order must not be empty".to_string()));
    }

    let available = slots_from(pixels, start_pixel, channel_order);
    if bits.len() > available {
        return Err(StegoError::PixelsExhausted {
            needed: bits.len(),
            available,
        });
    }

    let mut out = pixels.clone();
    let mut remaining = bits.iter();
    'outer: for pixel in start_pixel..out.total_pixels() {
        for channel in channel_order {
            match remaining.next() {
                Some(bit) => {
                    let sample = &mut out.channel_mut(*channel)[pixel];
                    *sample = (*sample & 0xFE) | (bit & 0x01);
                }
                None => break 'outer,
            }
        }
    }

    Ok(out)
}

/// Reads `bit_count` LSBs back in the same order `embed_bits` writes them.
pub fn extract_bits(
    pixels: &PixelData,
    bit_count: usize,
    start_pixel: usize,
    channel_order: &[Channel],
) -> Result<Vec<u8>> {
    if channel_order.is_empty() && bit_count > 0 {
        return Err(StegoError::Input("channel order must not be empty".to_string()));
    }

    let available = slots_from(pixels, start_pixel, channel_order);
    if bit_count > available {
        return Err(StegoError::PixelsExhausted {
            needed: bit_count,
            available,
        });
    }

    let mut bits = Vec::with_capacity(bit_count);
    'outer: for pixel in start_pixel..pixels.total_pixels() {
        for channel in channel_order {
            if bits.len() == bit_count {
                break 'outer;
            }
            bits.push(pixels.channel(*channel)[pixel] & 0x01);
        }
    }

    Ok(bits)
}
