//! Fixed 128-bit header that precedes every embedded message.
//!
//! Layout, most significant bit first:
//!
//! | field    | bits |
//! |----------|------|
//! | magic    | 32   |
//! | version  | 16   |
//! | length   | 32   |
//! | checksum | 32   |
//! | method   | 8    |
//! | reserved | 8    |

use crate::bits::{bits_to_number, number_to_bits};
use crate::checksum::crc32;
use crate::error::{Result, StegoError};
use log::debug;
use std::convert::TryFrom;
use std::fmt;

/// "MSCH"
pub const MAGIC: u32 = 0x4D53_4348;
pub const VERSION: u16 = 1;
pub const MAX_MESSAGE_LENGTH: u32 = 64 * 1024 * 1024;

const MAGIC_BITS: usize = 32;
const VERSION_BITS: usize = 16;
const LENGTH_BITS: usize = 32;
const CHECKSUM_BITS: usize = 32;
const METHOD_BITS: usize = 8;
const RESERVED_BITS: usize = 8;

pub const HEADER_BITS: usize =
    MAGIC_BITS + VERSION_BITS + LENGTH_BITS + CHECKSUM_BITS + METHOD_BITS + RESERVED_BITS;

pub fn header_size_in_bits() -> usize {
    HEADER_BITS
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EncodingMethod {
    SimpleLsb,
    TripleRedundancy,
}

impl TryFrom<u8> for EncodingMethod {
    type Error = String;

    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            0 => Ok(EncodingMethod::SimpleLsb),
            1 => Ok(EncodingMethod::TripleRedundancy),
            _ => Err(format!("Unknown encoding method: {}", v)),
        }
    }
}

impl From<EncodingMethod> for u8 {
    fn from(method: EncodingMethod) -> u8 {
        match method {
            EncodingMethod::SimpleLsb => 0,
            EncodingMethod::TripleRedundancy => 1,
        }
    }
}

impl fmt::Display for EncodingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingMethod::SimpleLsb => write!(f, "simple-lsb"),
            EncodingMethod::TripleRedundancy => write!(f, "triple-redundancy"),
        }
    }
}

/// Outcome of a validation pass. Every problem found is listed, not just the first.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn valid() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.is_valid = self.errors.is_empty();
        self
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SteganographyHeader {
    pub magic: u32,
    pub version: u16,
    pub message_length: u32,
    pub checksum: u32,
    /// Raw method code; kept unparsed so validation can report unknown values.
    pub method_code: u8,
    pub reserved: u8,
}

impl SteganographyHeader {
    pub fn new(message_length: u32, checksum: u32, method: EncodingMethod) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            message_length,
            checksum,
            method_code: method.into(),
            reserved: 0,
        }
    }

    pub fn encoding_method(&self) -> Result<EncodingMethod> {
        EncodingMethod::try_from(self.method_code)
            .map_err(|err| StegoError::InvalidHeader(vec![err]))
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic == MAGIC
    }
}

/// Builds a header for `length` bytes. When the message bytes are supplied the
/// checksum is computed from them and their length must agree with `length`.
pub fn create_header(
    length: usize,
    method: EncodingMethod,
    message: Option<&[u8]>,
) -> Result<SteganographyHeader> {
    let message_length = u32::try_from(length).map_err(|_| {
        StegoError::Input(format!("message length {} does not fit in 32 bits", length))
    })?;

    let checksum = match message {
        Some(bytes) if bytes.len() != length => {
            return Err(StegoError::Consistency(format!(
                "declared length {} does not match message of {} bytes",
                length,
                bytes.len()
            )))
        }
        Some(bytes) => crc32(bytes),
        None => 0,
    };

    let header = SteganographyHeader::new(message_length, checksum, method);
    debug!("created header: {:?}", header);
    Ok(header)
}

pub fn serialize(header: &SteganographyHeader) -> Result<Vec<u8>> {
    let mut bits = Vec::with_capacity(HEADER_BITS);
    bits.extend(number_to_bits(u64::from(header.magic), MAGIC_BITS));
    bits.extend(number_to_bits(u64::from(header.version), VERSION_BITS));
    bits.extend(number_to_bits(u64::from(header.message_length), LENGTH_BITS));
    bits.extend(number_to_bits(u64::from(header.checksum), CHECKSUM_BITS));
    bits.extend(number_to_bits(u64::from(header.method_code), METHOD_BITS));
    bits.extend(number_to_bits(u64::from(header.reserved), RESERVED_BITS));

    if bits.len() != HEADER_BITS {
        return Err(StegoError::Consistency(format!(
            "serialized header is {} bits, expected {}",
            bits.len(),
            HEADER_BITS
        )));
    }
    Ok(bits)
}

pub fn deserialize(bits: &[u8]) -> Result<SteganographyHeader> {
    if bits.len() != HEADER_BITS {
        return Err(StegoError::HeaderSize {
            expected: HEADER_BITS,
            actual: bits.len(),
        });
    }

    let mut offset = 0;
    let mut take = |width: usize| {
        let value = bits_to_number(&bits[offset..offset + width]);
        offset += width;
        value
    };

    Ok(SteganographyHeader {
        magic: take(MAGIC_BITS) as u32,
        version: take(VERSION_BITS) as u16,
        message_length: take(LENGTH_BITS) as u32,
        checksum: take(CHECKSUM_BITS) as u32,
        method_code: take(METHOD_BITS) as u8,
        reserved: take(RESERVED_BITS) as u8,
    })
}

pub fn validate(header: &SteganographyHeader) -> ValidationResult {
    let mut errors = Vec::new();

    if header.magic != MAGIC {
        errors.push(format!(
            "Invalid magic signature: expected {:#010x}, found {:#010x}",
            MAGIC, header.magic
        ));
    }
    if header.version < 1 || header.version > VERSION {
        errors.push(format!(
            "Unsupported version: {} (supported 1..={})",
            header.version, VERSION
        ));
    }
    if header.message_length > MAX_MESSAGE_LENGTH {
        errors.push(format!(
            "Message length {} exceeds maximum {}",
            header.message_length, MAX_MESSAGE_LENGTH
        ));
    }
    if let Err(err) = EncodingMethod::try_from(header.method_code) {
        errors.push(err);
    }

    ValidationResult::from_errors(errors)
}

impl TryFrom<&[u8]> for SteganographyHeader {
    type Error = StegoError;

    fn try_from(bits: &[u8]) -> Result<Self> {
        deserialize(bits)
    }
}
