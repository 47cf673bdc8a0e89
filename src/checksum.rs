//! Integrity checksums.
//!
//! CRC32 (IEEE, reflected polynomial `0xEDB88320`, init and final XOR
//! `0xFFFFFFFF`) is the only algorithm the header protocol uses. The others
//! trade accuracy for speed and are offered for callers that checksum their
//! own payload framing.

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ChecksumAlgorithm {
    Crc32,
    Xor,
    Fletcher16,
    Adler32,
}

const FLETCHER_SMALL_LIMIT: usize = 64;
const ADLER_LIMIT: usize = 64 * 1024;
const ADLER_MOD: u32 = 65521;

impl ChecksumAlgorithm {
    /// Picks a fast checksum for `len` bytes of data.
    ///
    /// Fletcher-16 up to 64 bytes, where its 16-bit result is still a good
    /// detector; Adler-32 up to 64 KiB; CRC32 beyond that, where Adler-32's
    /// weak mixing starts to matter. XOR is never picked automatically.
    pub fn for_data_len(len: usize) -> Self {
        if len <= FLETCHER_SMALL_LIMIT {
            ChecksumAlgorithm::Fletcher16
        } else if len <= ADLER_LIMIT {
            ChecksumAlgorithm::Adler32
        } else {
            ChecksumAlgorithm::Crc32
        }
    }

    pub fn calculate(self, data: &[u8]) -> u32 {
        match self {
            ChecksumAlgorithm::Crc32 => crc32(data),
            ChecksumAlgorithm::Xor => u32::from(xor8(data)),
            ChecksumAlgorithm::Fletcher16 => u32::from(fletcher16(data)),
            ChecksumAlgorithm::Adler32 => adler32(data),
        }
    }

    pub fn verify(self, data: &[u8], expected: u32) -> bool {
        self.calculate(data) == expected
    }
}

impl Default for ChecksumAlgorithm {
    fn default() -> Self {
        ChecksumAlgorithm::Crc32
    }
}

pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

pub fn verify_crc32(data: &[u8], expected: u32) -> bool {
    crc32(data) == expected
}

fn xor8(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, b| acc ^ b)
}

fn fletcher16(data: &[u8]) -> u16 {
    let (sum1, sum2) = data.iter().fold((0u16, 0u16), |(s1, s2), b| {
        let s1 = (s1 + u16::from(*b)) % 255;
        (s1, (s2 + s1) % 255)
    });
    (sum2 << 8) | sum1
}

fn adler32(data: &[u8]) -> u32 {
    let (a, b) = data.iter().fold((1u32, 0u32), |(a, b), byte| {
        let a = (a + u32::from(*byte)) % ADLER_MOD;
        (a, (b + a) % ADLER_MOD)
    });
    (b << 16) | a
}
