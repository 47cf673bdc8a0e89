//! Hides a byte payload in the least significant bits of an image's RGB
//! samples so that it survives being re-encoded by whatever transports it.
//!
//! The payload is framed by a fixed 128-bit header carrying a CRC32 of the
//! message. Every encode is verified by decoding the image the codec actually
//! produced; if the plain one-bit-per-sample layout does not survive, the
//! engine falls back to replicating every bit and decoding by majority vote.

pub mod bits;
pub mod capacity;
pub mod checksum;
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod header;
pub mod pixels;
pub mod redundancy;
pub mod strategy;

pub const DEFAULT_REDUNDANCY_FACTOR: usize = 3;

pub use capacity::{CapacityInfo, CapacityPlanner};
pub use codec::{Dimensions, ImageCodec, OutputFormat, PreprocessOptions, RasterCodec};
pub use decoder::DecodeOutcome;
pub use encoder::{EncodeOptions, EncodeOutcome};
pub use engine::{CapacityCheck, EngineConfig, StegoEngine};
pub use error::{ErrorKind, StegoError};
pub use header::{EncodingMethod, SteganographyHeader, ValidationResult};
pub use pixels::{Channel, PixelData};
pub use strategy::EncodingStrategy;
