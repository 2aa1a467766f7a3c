//! Built-in test patterns
//!
//! Patterns generate plane bytes directly in the packed 1-bit format, so a
//! transfer can be exercised without an image file.

use core::fmt;
use core::str::FromStr;

use crate::image::{PLANE_SIZE, ROW_BYTES};

const STRIPE_BYTES: usize = 50;
const CHECKER_ROWS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    /// 0xAA and 0x55 alternating every 50 bytes
    Stripes,
    /// Linear ramp from 0x00 to 0xFE across the plane
    Ramp,
    /// 8x8 pixel blocks
    Checker,
    /// Every byte set to the given value
    Solid(u8),
}

impl Pattern {
    /// Byte at plane offset `index`
    pub fn byte_at(self, index: usize) -> u8 {
        match self {
            Pattern::Stripes => {
                if (index / STRIPE_BYTES) % 2 == 0 {
                    0xAA
                } else {
                    0x55
                }
            }
            Pattern::Ramp => ((index * 255) / PLANE_SIZE) as u8,
            Pattern::Checker => {
                let column = index % ROW_BYTES;
                let block_row = index / ROW_BYTES / CHECKER_ROWS;
                if (column + block_row) % 2 == 0 {
                    0xFF
                } else {
                    0x00
                }
            }
            Pattern::Solid(byte) => byte,
        }
    }

    pub fn fill(self, buf: &mut [u8]) {
        for (index, byte) in buf.iter_mut().enumerate() {
            *byte = self.byte_at(index);
        }
    }

    /// Render a full plane
    pub fn render(self) -> [u8; PLANE_SIZE] {
        let mut plane = [0u8; PLANE_SIZE];
        self.fill(&mut plane);
        plane
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Stripes => f.write_str("stripes"),
            Pattern::Ramp => f.write_str("ramp"),
            Pattern::Checker => f.write_str("checker"),
            Pattern::Solid(byte) => write!(f, "solid:0x{byte:02X}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PatternError {
    /// Name is not a known pattern
    Unknown,
    /// `solid:` value is not a byte
    InvalidByte,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Unknown => {
                f.write_str("unknown pattern (expected stripes, ramp, checker or solid:<byte>)")
            }
            PatternError::InvalidByte => f.write_str("solid pattern value is not a byte"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PatternError {}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stripes" => return Ok(Pattern::Stripes),
            "ramp" => return Ok(Pattern::Ramp),
            "checker" => return Ok(Pattern::Checker),
            _ => {}
        }

        let value = s.strip_prefix("solid:").ok_or(PatternError::Unknown)?;
        let byte = match value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
        {
            Some(hex) => u8::from_str_radix(hex, 16),
            None => value.parse(),
        }
        .map_err(|_| PatternError::InvalidByte)?;

        Ok(Pattern::Solid(byte))
    }
}
