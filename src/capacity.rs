//! Capacity planning for the LSB channel.
//!
//! Every pixel carries one bit in each of its three colour samples. Only a
//! fraction of those bits (the safety margin) is planned for, and the header
//! is paid for under the same replication factor as the message.

use crate::error::{Result, StegoError};
use crate::header::{EncodingMethod, HEADER_BITS, MAX_MESSAGE_LENGTH};
use crate::DEFAULT_REDUNDANCY_FACTOR;

pub const DEFAULT_SAFETY_MARGIN: f64 = 0.95;
const BITS_PER_PIXEL: u64 = 3;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CapacityInfo {
    pub total_pixels: u64,
    pub available_bits: u64,
    pub simple_capacity: usize,
    pub triple_capacity: usize,
    pub header_bits: usize,
}

impl CapacityInfo {
    pub fn capacity_for(&self, method: EncodingMethod) -> usize {
        match method {
            EncodingMethod::SimpleLsb => self.simple_capacity,
            EncodingMethod::TripleRedundancy => self.triple_capacity,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CapacityPlanner {
    safety_margin: f64,
    redundancy_factor: usize,
}

impl Default for CapacityPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl CapacityPlanner {
    pub fn new() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
            redundancy_factor: DEFAULT_REDUNDANCY_FACTOR,
        }
    }

    /// Margin is clamped to `(0, 1]`; anything outside falls back to the default.
    pub fn with_safety_margin(mut self, safety_margin: f64) -> Self {
        self.safety_margin = if safety_margin > 0.0 && safety_margin <= 1.0 {
            safety_margin
        } else {
            DEFAULT_SAFETY_MARGIN
        };
        self
    }

    pub fn with_redundancy_factor(mut self, factor: usize) -> Self {
        self.redundancy_factor = factor.max(1);
        self
    }

    pub fn safety_margin(&self) -> f64 {
        self.safety_margin
    }

    pub fn redundancy_factor(&self) -> usize {
        self.redundancy_factor
    }

    pub fn calculate_capacity(&self, width: i64, height: i64) -> Result<CapacityInfo> {
        if width <= 0 || height <= 0 {
            return Err(StegoError::Dimension {
                width: width.max(0) as u64,
                height: height.max(0) as u64,
            });
        }

        let (total_pixels, available_bits) = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(BITS_PER_PIXEL).map(|bits| (pixels, bits)))
            .ok_or_else(|| {
                StegoError::Input(format!("{}x{} image is too large to plan for", width, height))
            })?;
        let effective = self.effective_bits(available_bits);

        Ok(CapacityInfo {
            total_pixels,
            available_bits,
            simple_capacity: bytes_for(effective, 1),
            triple_capacity: bytes_for(effective, self.redundancy_factor),
            header_bits: HEADER_BITS,
        })
    }

    /// Message capacity in bytes when header and message are replicated `factor` times.
    pub fn capacity_for_factor(&self, width: i64, height: i64, factor: usize) -> Result<usize> {
        let info = self.calculate_capacity(width, height)?;
        Ok(bytes_for(
            self.effective_bits(info.available_bits),
            factor.max(1),
        ))
    }

    pub fn can_fit(
        &self,
        width: i64,
        height: i64,
        message_length: usize,
        method: EncodingMethod,
    ) -> Result<bool> {
        let info = self.calculate_capacity(width, height)?;
        Ok(message_length <= info.capacity_for(method))
    }

    /// Smallest square image guaranteed to hold `message_length` bytes.
    pub fn calculate_minimum_dimensions(
        &self,
        message_length: usize,
        use_simple: bool,
    ) -> Result<(u32, u32)> {
        if message_length > MAX_MESSAGE_LENGTH as usize {
            return Err(StegoError::Input(format!(
                "message of {} bytes exceeds the {} byte limit",
                message_length, MAX_MESSAGE_LENGTH
            )));
        }

        let (factor, method) = if use_simple {
            (1, EncodingMethod::SimpleLsb)
        } else {
            (self.redundancy_factor, EncodingMethod::TripleRedundancy)
        };

        let too_wide = || {
            StegoError::Input(format!(
                "message of {} bytes needs an image wider than {} pixels",
                message_length,
                u32::MAX
            ))
        };

        let required_bits = (message_length as u64 * 8 + HEADER_BITS as u64)
            .checked_mul(factor as u64)
            .ok_or_else(too_wide)?;
        let min_pixels =
            (required_bits as f64 / (BITS_PER_PIXEL as f64 * self.safety_margin)).ceil();
        let mut side = (min_pixels.sqrt().ceil() as u64).max(1);

        // Float rounding can leave the estimate one short; walk up until it fits.
        loop {
            if side > u64::from(u32::MAX) {
                return Err(too_wide());
            }
            if self.can_fit(side as i64, side as i64, message_length, method)? {
                return Ok((side as u32, side as u32));
            }
            side += 1;
        }
    }

    fn effective_bits(&self, available_bits: u64) -> u64 {
        (available_bits as f64 * self.safety_margin).floor() as u64
    }
}

fn bytes_for(effective_bits: u64, factor: usize) -> usize {
    let per_copy = effective_bits / factor as u64;
    (per_copy.saturating_sub(HEADER_BITS as u64) / 8) as usize
}
