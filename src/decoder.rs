use crate::codec::ImageCodec;
use crate::engine::StegoEngine;
use crate::error::{Result, StegoError};
use crate::header::{EncodingMethod, SteganographyHeader, ValidationResult};
use crate::pixels::PixelData;
use crate::strategy::EncodingStrategy;
use log::debug;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DecodeOutcome {
    pub message: Vec<u8>,
    pub method: EncodingMethod,
    pub header: SteganographyHeader,
    pub validation: ValidationResult,
    pub message_length: usize,
}

impl DecodeOutcome {
    /// The message as UTF-8 text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.message).ok()
    }
}

impl<C: ImageCodec> StegoEngine<C> {
    pub fn decode_message(&self, image: &[u8]) -> Result<DecodeOutcome> {
        let pixels = self.codec.decode_to_pixels(image)?;
        self.decode_pixels(&pixels)
    }

    /// Commits to the first registered strategy whose header window carries the
    /// magic signature. Anything that goes wrong after that is final.
    pub fn probe(&self, pixels: &PixelData) -> Result<&EncodingStrategy> {
        for strategy in &self.strategies {
            match strategy.read_header(pixels) {
                Ok(header) if header.has_valid_magic() => {
                    debug!("probe: magic found under {}", strategy.method());
                    return Ok(strategy);
                }
                Ok(header) => debug!(
                    "probe: no magic under {} (found {:#010x})",
                    strategy.method(),
                    header.magic
                ),
                Err(err) => debug!("probe: {} unreadable: {}", strategy.method(), err),
            }
        }
        Err(StegoError::NoValidHeader)
    }

    pub(crate) fn decode_pixels(&self, pixels: &PixelData) -> Result<DecodeOutcome> {
        let strategy = self.probe(pixels)?;
        let decoded = strategy.decode(pixels)?;

        Ok(DecodeOutcome {
            message_length: decoded.message.len(),
            message: decoded.message,
            method: strategy.method(),
            header: decoded.header,
            validation: decoded.validation,
        })
    }
}
