//! Bit replication with majority-vote recovery.
//!
//! Copies of a bit are laid out contiguously (`b0 b0 b0 b1 b1 b1 ...`), so a
//! group always lives in one or two neighbouring pixels.
//!
//! With an even factor a tied group decodes to 0. Callers that need a
//! definite winner should use an odd factor.

use crate::error::{Result, StegoError};

fn check_factor(factor: usize) -> Result<()> {
    if factor == 0 {
        return Err(StegoError::Input(
            "redundancy factor must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub fn encode(bits: &[u8], factor: usize) -> Result<Vec<u8>> {
    check_factor(factor)?;

    let total = bits.len().checked_mul(factor).ok_or_else(|| {
        StegoError::Input(format!(
            "{} bits repeated {} times overflows the stream length",
            bits.len(),
            factor
        ))
    })?;
    let mut out = Vec::with_capacity(total);
    for bit in bits {
        out.extend(std::iter::repeat(bit & 0x01).take(factor));
    }
    Ok(out)
}

pub fn decode(bits: &[u8], factor: usize) -> Result<Vec<u8>> {
    check_factor(factor)?;
    check_alignment(bits, factor)?;

    Ok(bits
        .chunks(factor)
        .map(|group| {
            let ones = group.iter().filter(|b| *b & 0x01 == 1).count();
            if ones > factor - ones {
                1
            } else {
                0
            }
        })
        .collect())
}

/// Fraction of groups whose copies disagree. Diagnostic only; decoding
/// does not depend on it.
pub fn corruption_rate(bits: &[u8], factor: usize) -> Result<f64> {
    check_factor(factor)?;
    check_alignment(bits, factor)?;

    if bits.is_empty() {
        return Ok(0.0);
    }

    let groups = bits.len() / factor;
    let disagreeing = bits
        .chunks(factor)
        .filter(|group| group.iter().any(|b| b & 0x01 != group[0] & 0x01))
        .count();
    Ok(disagreeing as f64 / groups as f64)
}

fn check_alignment(bits: &[u8], factor: usize) -> Result<()> {
    if bits.len() % factor != 0 {
        return Err(StegoError::Alignment {
            len: bits.len(),
            factor,
        });
    }
    Ok(())
}
