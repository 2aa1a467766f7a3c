//! Page checksum
//!
//! Bit-reversed CRC-32 with the 802.3 / zlib polynomial, computed one bit at a
//! time. Results match any conventional CRC-32 implementation.

/// Reflected CRC-32 polynomial
pub const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;

const CRC32_INIT: u32 = 0xFFFF_FFFF;

/// Incremental CRC-32 state
///
/// Lets a checksum be accumulated over several spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32 {
    register: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub const fn new() -> Self {
        Self {
            register: CRC32_INIT,
        }
    }

    /// Feed more bytes into the register
    pub fn update(mut self, bytes: &[u8]) -> Self {
        for &byte in bytes {
            self.register ^= u32::from(byte);
            for _ in 0..8 {
                if self.register & 1 != 0 {
                    self.register = (self.register >> 1) ^ CRC32_POLYNOMIAL;
                } else {
                    self.register >>= 1;
                }
            }
        }
        self
    }

    /// Final complement of the register
    pub fn finish(self) -> u32 {
        !self.register
    }
}

/// CRC-32 of `bytes`
pub fn checksum(bytes: &[u8]) -> u32 {
    Crc32::new().update(bytes).finish()
}
