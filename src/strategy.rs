//! Encoding strategies: how header and message bits are laid into pixels.
//!
//! Both strategies write `header || message` as one MSB-first bit stream
//! starting at pixel 0 in RGB order. The triple-redundancy strategy repeats
//! every bit of that stream, header included, `factor` times.

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::capacity::CapacityPlanner;
use crate::checksum::crc32;
use crate::error::{Result, StegoError};
use crate::header::{
    self, EncodingMethod, SteganographyHeader, ValidationResult, HEADER_BITS,
};
use crate::pixels::{embed_bits, extract_bits, PixelData, RGB_ORDER};
use crate::redundancy;
use crate::DEFAULT_REDUNDANCY_FACTOR;
use log::debug;

/// Smallest factor whose layout differs from the simple strategy's.
pub const MIN_REDUNDANCY_FACTOR: usize = 2;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Scheme {
    Simple,
    TripleRedundancy { factor: usize },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EncodingStrategy {
    scheme: Scheme,
    planner: CapacityPlanner,
}

/// A message recovered by a strategy, with the header it was found under.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DecodedMessage {
    pub header: SteganographyHeader,
    pub message: Vec<u8>,
    pub validation: ValidationResult,
}

impl EncodingStrategy {
    pub fn simple() -> Self {
        Self {
            scheme: Scheme::Simple,
            planner: CapacityPlanner::new(),
        }
    }

    /// Factors below [`MIN_REDUNDANCY_FACTOR`] are raised to it: a single
    /// copy would lay bits out exactly like the simple strategy.
    pub fn triple_redundancy(factor: usize) -> Self {
        let factor = factor.max(MIN_REDUNDANCY_FACTOR);
        Self {
            scheme: Scheme::TripleRedundancy { factor },
            planner: CapacityPlanner::new().with_redundancy_factor(factor),
        }
    }

    /// The fixed method-to-strategy table. `factor` only applies to the
    /// redundant method.
    pub fn for_method(method: EncodingMethod, factor: usize) -> Self {
        match method {
            EncodingMethod::SimpleLsb => Self::simple(),
            EncodingMethod::TripleRedundancy => Self::triple_redundancy(factor),
        }
    }

    pub fn with_planner(mut self, planner: CapacityPlanner) -> Self {
        self.planner = planner.with_redundancy_factor(self.replication());
        self
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn method(&self) -> EncodingMethod {
        match self.scheme {
            Scheme::Simple => EncodingMethod::SimpleLsb,
            Scheme::TripleRedundancy { .. } => EncodingMethod::TripleRedundancy,
        }
    }

    /// How many times each stream bit is written.
    pub fn replication(&self) -> usize {
        match self.scheme {
            Scheme::Simple => 1,
            Scheme::TripleRedundancy { factor } => factor,
        }
    }

    /// Message capacity in bytes for a `width` x `height` image.
    pub fn calculate_capacity(&self, width: i64, height: i64) -> Result<usize> {
        self.planner
            .capacity_for_factor(width, height, self.replication())
    }

    pub fn can_encode(&self, pixels: &PixelData, message_length: usize) -> bool {
        self.capacity_of(pixels)
            .map(|capacity| message_length <= capacity)
            .unwrap_or(false)
    }

    pub fn encode(
        &self,
        pixels: &PixelData,
        message: &[u8],
        header: &SteganographyHeader,
    ) -> Result<PixelData> {
        if header.method_code != u8::from(self.method()) {
            return Err(StegoError::Consistency(format!(
                "header method code {} does not belong to {}",
                header.method_code,
                self.method()
            )));
        }
        if header.message_length as usize != message.len() {
            return Err(StegoError::Consistency(format!(
                "header declares {} bytes but message has {}",
                header.message_length,
                message.len()
            )));
        }

        let available = self.capacity_of(pixels)?;
        if message.len() > available {
            return Err(StegoError::Capacity {
                method: self.method(),
                required: message.len(),
                available,
            });
        }

        let mut stream = header::serialize(header)?;
        stream.extend(bytes_to_bits(message));
        let stream = redundancy::encode(&stream, self.replication())?;

        debug!(
            "{}: embedding {} bits for {} message bytes ({:.2}% of {} bytes capacity)",
            self.method(),
            stream.len(),
            message.len(),
            utilisation(message.len(), available),
            available
        );

        embed_bits(pixels, &stream, 0, &RGB_ORDER)
    }

    /// Reads the header window without validating it.
    pub fn read_header(&self, pixels: &PixelData) -> Result<SteganographyHeader> {
        let window = extract_bits(pixels, self.header_window()?, 0, &RGB_ORDER)?;
        let bits = redundancy::decode(&window, self.replication())?;
        header::deserialize(&bits)
    }

    pub fn extract_header(&self, pixels: &PixelData) -> Result<SteganographyHeader> {
        let header = self.read_header(pixels)?;
        let validation = header::validate(&header);
        if !validation.is_valid {
            return Err(StegoError::InvalidHeader(validation.errors));
        }
        Ok(header)
    }

    pub fn decode(&self, pixels: &PixelData) -> Result<DecodedMessage> {
        let header = self.extract_header(pixels)?;

        let declared = header.encoding_method()?;
        if declared != self.method() {
            return Err(StegoError::MethodMismatch {
                expected: self.method(),
                found: declared,
            });
        }

        let message_bits = (header.message_length as usize)
            .saturating_mul(8)
            .saturating_mul(self.replication());
        let window = self.header_window()?;
        let stream = extract_bits(pixels, window.saturating_add(message_bits), 0, &RGB_ORDER)?;
        let message_bits = redundancy::decode(&stream[window..], self.replication())?;
        let message = bits_to_bytes(&message_bits)?;

        let validation = validate_message(&header, &message);
        if !validation.is_valid {
            return Err(StegoError::Validation(validation.errors));
        }

        debug!(
            "{}: decoded {} bytes, header {:?}",
            self.method(),
            message.len(),
            header
        );

        Ok(DecodedMessage {
            header,
            message,
            validation,
        })
    }

    fn header_window(&self) -> Result<usize> {
        HEADER_BITS.checked_mul(self.replication()).ok_or_else(|| {
            StegoError::Input(format!(
                "redundancy factor {} overflows the header window",
                self.replication()
            ))
        })
    }

    fn capacity_of(&self, pixels: &PixelData) -> Result<usize> {
        self.calculate_capacity(i64::from(pixels.width()), i64::from(pixels.height()))
    }
}

impl Default for EncodingStrategy {
    fn default() -> Self {
        Self::triple_redundancy(DEFAULT_REDUNDANCY_FACTOR)
    }
}

/// Checks a recovered message against its header, reporting every mismatch.
pub fn validate_message(header: &SteganographyHeader, message: &[u8]) -> ValidationResult {
    let mut errors = Vec::new();

    if message.len() != header.message_length as usize {
        errors.push(format!(
            "Length mismatch: header declares {} bytes, recovered {}",
            header.message_length,
            message.len()
        ));
    }
    let checksum = crc32(message);
    if checksum != header.checksum {
        errors.push(format!(
            "Checksum mismatch: header has {:#010x}, message hashes to {:#010x}",
            header.checksum, checksum
        ));
    }

    ValidationResult::from_errors(errors)
}

fn utilisation(used: usize, available: usize) -> f64 {
    if available == 0 {
        return 100.0;
    }
    (used as f64 / available as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::create_header;

    fn cover(width: u32, height: u32) -> PixelData {
        let total = (width * height) as usize;
        let red = (0..total).map(|i| (i * 7 % 256) as u8).collect();
        let green = (0..total).map(|i| (i * 13 % 256) as u8).collect();
        let blue = (0..total).map(|i| (i * 29 % 256) as u8).collect();
        PixelData::new(width, height, red, green, blue).expect("no error")
    }

    fn encode_with(strategy: &EncodingStrategy, pixels: &PixelData, message: &[u8]) -> Result<PixelData> {
        let header = create_header(message.len(), strategy.method(), Some(message))?;
        strategy.encode(pixels, message, &header)
    }

    #[test]
    fn test_simple_hello_round_trip() {
        let strategy = EncodingStrategy::simple();
        let stego = encode_with(&strategy, &cover(20, 20), b"Hello").expect("no error");
        let decoded = strategy.decode(&stego).expect("no error");

        assert_eq!(b"Hello".to_vec(), decoded.message);
        assert_eq!(5, decoded.header.message_length);
        assert_eq!(crc32(b"Hello"), decoded.header.checksum);
        assert!(decoded.validation.is_valid);
    }

    #[test]
    fn test_triple_round_trip() {
        let strategy = EncodingStrategy::triple_redundancy(3);
        let stego = encode_with(&strategy, &cover(30, 30), b"redundant payload").expect("no error");
        let decoded = strategy.decode(&stego).expect("no error");
        assert_eq!(b"redundant payload".to_vec(), decoded.message);
        assert_eq!(EncodingMethod::TripleRedundancy, decoded.header.encoding_method().expect("no error"));
    }

    #[test]
    fn test_triple_survives_one_flip_per_group() {
        let strategy = EncodingStrategy::triple_redundancy(3);
        let stego = encode_with(&strategy, &cover(30, 30), b"noisy").expect("no error");

        // flip one sample in every group of three consecutive samples
        let mut samples = stego.to_rgb_interleaved();
        for (i, sample) in samples.iter_mut().enumerate() {
            if i % 3 == (i / 3) % 3 {
                *sample ^= 1;
            }
        }
        let damaged = PixelData::from_rgb_interleaved(30, 30, &samples).expect("no error");

        assert!(EncodingStrategy::simple().extract_header(&damaged).is_err());
        let decoded = strategy.decode(&damaged).expect("no error");
        assert_eq!(b"noisy".to_vec(), decoded.message);
    }

    #[test]
    fn test_capacity_boundary() {
        let strategy = EncodingStrategy::simple();
        let pixels = cover(100, 100);
        let capacity = strategy.calculate_capacity(100, 100).expect("no error");
        assert_eq!(3546, capacity);
        assert!(strategy.can_encode(&pixels, capacity));
        assert!(!strategy.can_encode(&pixels, capacity + 1));

        let fits = vec![0xA5; capacity];
        let stego = encode_with(&strategy, &pixels, &fits).expect("no error");
        assert_eq!(fits, strategy.decode(&stego).expect("no error").message);

        match encode_with(&strategy, &pixels, &vec![0xA5; capacity + 1]) {
            Err(StegoError::Capacity {
                required,
                available,
                ..
            }) => {
                assert_eq!(capacity + 1, required);
                assert_eq!(capacity, available);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_capacity_boundary_without_margin() {
        let strategy = EncodingStrategy::simple()
            .with_planner(CapacityPlanner::new().with_safety_margin(1.0));
        let pixels = cover(100, 100);
        assert!(encode_with(&strategy, &pixels, &vec![1; 3734]).is_ok());
        match encode_with(&strategy, &pixels, &vec![1; 3735]) {
            Err(err @ StegoError::Capacity { .. }) => {
                assert!(err.to_string().contains("requires 3735 bytes, 3734 available"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_all_zero_pixels_have_no_header() {
        let pixels = PixelData::filled(10, 10, [0, 0, 0]).expect("no error");
        match EncodingStrategy::simple().decode(&pixels) {
            Err(StegoError::InvalidHeader(errors)) => {
                assert!(errors[0].starts_with("Invalid magic signature"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_method_mismatch() {
        // a simple-layout stream whose header claims triple redundancy
        let pixels = cover(20, 20);
        let header = create_header(2, EncodingMethod::TripleRedundancy, Some(&b"hi"[..])).expect("no error");
        let mut stream = header::serialize(&header).expect("no error");
        stream.extend(bytes_to_bits(b"hi"));
        let stego = embed_bits(&pixels, &stream, 0, &RGB_ORDER).expect("no error");

        assert_eq!(
            Err(StegoError::MethodMismatch {
                expected: EncodingMethod::SimpleLsb,
                found: EncodingMethod::TripleRedundancy,
            }),
            EncodingStrategy::simple().decode(&stego)
        );
    }

    #[test]
    fn test_checksum_mismatch_is_reported() {
        let strategy = EncodingStrategy::simple();
        let stego = encode_with(&strategy, &cover(20, 20), b"Hello").expect("no error");

        // flip the LSB of the first message bit, just past the header
        let mut samples = stego.to_rgb_interleaved();
        samples[HEADER_BITS] ^= 1;
        let damaged = PixelData::from_rgb_interleaved(20, 20, &samples).expect("no error");

        match strategy.decode(&damaged) {
            Err(StegoError::Validation(errors)) => {
                assert_eq!(1, errors.len());
                assert!(errors[0].starts_with("Checksum mismatch"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_message_lists_every_mismatch() {
        let header = create_header(5, EncodingMethod::SimpleLsb, Some(&b"Hello"[..])).expect("no error");
        let result = validate_message(&header, b"Hell");
        assert!(!result.is_valid);
        assert_eq!(2, result.errors.len());
    }

    #[test]
    fn test_header_must_match_strategy() {
        let header = create_header(2, EncodingMethod::SimpleLsb, Some(&b"hi"[..])).expect("no error");
        let result = EncodingStrategy::triple_redundancy(3).encode(&cover(20, 20), b"hi", &header);
        assert!(matches!(result, Err(StegoError::Consistency(_))));
        assert!(matches!(
            EncodingStrategy::simple().encode(&cover(20, 20), b"hey", &header),
            Err(StegoError::Consistency(_))
        ));
    }

    #[test]
    fn test_method_table() {
        assert_eq!(1, EncodingStrategy::for_method(EncodingMethod::SimpleLsb, 5).replication());
        assert_eq!(5, EncodingStrategy::for_method(EncodingMethod::TripleRedundancy, 5).replication());
        assert_eq!(3, EncodingStrategy::default().replication());
    }

    #[test]
    fn test_redundant_strategy_never_degenerates_to_simple() {
        assert_eq!(2, EncodingStrategy::triple_redundancy(0).replication());
        assert_eq!(2, EncodingStrategy::triple_redundancy(1).replication());
        assert_eq!(2, EncodingStrategy::triple_redundancy(2).replication());
    }

    #[test]
    fn test_huge_factor_is_an_error_not_a_panic() {
        let strategy = EncodingStrategy::triple_redundancy(usize::MAX);
        let pixels = cover(20, 20);
        assert!(matches!(
            strategy.read_header(&pixels),
            Err(StegoError::Input(_))
        ));
        assert!(strategy.decode(&pixels).is_err());
        assert_eq!(0, strategy.calculate_capacity(20, 20).expect("no error"));
        assert!(!strategy.can_encode(&pixels, 1));
    }
}
